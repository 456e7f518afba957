//! Interactive read-eval-print loop.
//!
//! Lines starting with `:` are session commands; everything else goes
//! through the full pipeline. State persists until `:reset` or exit.

use crate::reporting;
use crate::session::Session;
use ced_diagnostic::{ColorMode, DiagnosticEmitter, TerminalEmitter};
use ced_ir::StringInterner;
use ced_rt::Value;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::rc::Rc;

const PROMPT: &str = "ced> ";

pub fn run() -> Result<(), ReadlineError> {
    let mut editor = DefaultEditor::new()?;
    let history = history_path();
    if let Some(path) = &history {
        // A missing history file on first run is expected.
        let _ = editor.load_history(path);
    }

    let interner = Rc::new(StringInterner::new());
    let mut session = Session::new(&interner);
    println!("Cedilla interpreter. Type :help for commands, :quit to exit.");

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line);
                if let Some(command) = line.strip_prefix(':') {
                    if !dispatch(command, &mut session) {
                        break;
                    }
                } else {
                    evaluate(line, &mut session);
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err),
        }
    }

    if let Some(path) = &history {
        let _ = editor.save_history(path);
    }
    Ok(())
}

fn history_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| Path::new(&home).join(".ced_history"))
}

fn evaluate(line: &str, session: &mut Session<'_>) {
    let outcome = session.submit(line, None);
    if !outcome.diagnostics.is_empty() {
        let stderr = std::io::stderr();
        let is_tty = stderr.is_terminal();
        let mut emitter = TerminalEmitter::new(stderr, ColorMode::Auto, is_tty)
            .with_source(line)
            .with_file_path("<repl>");
        for diagnostic in &outcome.diagnostics {
            emitter.emit(diagnostic);
        }
        emitter.flush();
        return;
    }
    match outcome.value {
        Some(Value::Void) | None => {}
        Some(value) => println!("{}", value.render(session.interner())),
    }
}

/// Handles a `:` command; returns false when the REPL should exit.
fn dispatch(command: &str, session: &mut Session<'_>) -> bool {
    let (name, rest) = match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (command, ""),
    };
    match name {
        "q" | "quit" => return false,
        "help" => print_help(),
        "reset" => {
            session.reset();
            println!("session cleared");
        }
        "dict" => {
            let filter = (!rest.is_empty()).then_some(rest);
            print!("{}", crate::commands::render_dictionary(session, filter));
        }
        "modules" => {
            for module in session.loader.modules() {
                println!("{}", session.interner().lookup(module));
            }
        }
        "load" => {
            if rest.is_empty() {
                eprintln!("usage: :load <path>");
            } else {
                match session.load_module(Path::new(rest)) {
                    Ok(module) => {
                        println!("loaded {}", session.interner().lookup(module));
                    }
                    Err(err) => {
                        emit_plain(&reporting::load_diagnostic(&err, session.interner()));
                    }
                }
            }
        }
        "unload" => {
            if rest.is_empty() {
                eprintln!("usage: :unload <module>");
            } else {
                match session.unload_module(rest) {
                    Ok(()) => println!("unloaded {rest}"),
                    Err(err) => {
                        emit_plain(&reporting::unload_diagnostic(&err, session.interner()));
                    }
                }
            }
        }
        other => eprintln!("unknown command `:{other}`, try :help"),
    }
    true
}

fn emit_plain(diagnostic: &ced_diagnostic::Diagnostic) {
    let stderr = std::io::stderr();
    let is_tty = stderr.is_terminal();
    let mut emitter = TerminalEmitter::new(stderr, ColorMode::Auto, is_tty);
    emitter.emit(diagnostic);
    emitter.flush();
}

fn print_help() {
    println!(":help            show this message");
    println!(":quit, :q        exit the session");
    println!(":reset           clear globals, classes, and macros");
    println!(":dict [Class]    dump the class dictionary");
    println!(":modules         list loaded modules");
    println!(":load <path>     load a shared-library module");
    println!(":unload <name>   unload a module");
}
