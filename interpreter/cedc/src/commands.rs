//! Subcommand implementations for the `ced` binary.
//!
//! Every command returns a process exit code; `main` only parses the
//! subcommand name and dispatches here.

use crate::reporting;
use crate::session::Session;
use ced_diagnostic::{ColorMode, DiagnosticEmitter, TerminalEmitter};
use ced_ir::StringInterner;
use ced_rt::Value;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::rc::Rc;

struct FileArgs {
    path: PathBuf,
    include_dirs: Vec<PathBuf>,
    json: bool,
    /// Trailing positional after the file; only `dict` accepts one.
    class: Option<String>,
}

/// Parses `[-I dir]... [--json] <file> [CLASS]` from a subcommand's
/// arguments.
fn parse_file_args(args: &[String]) -> Result<FileArgs, String> {
    let mut path = None;
    let mut include_dirs = Vec::new();
    let mut json = false;
    let mut class = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--json" {
            json = true;
        } else if arg == "-I" {
            match iter.next() {
                Some(dir) => include_dirs.push(PathBuf::from(dir)),
                None => return Err("-I requires a directory".to_owned()),
            }
        } else if let Some(dir) = arg.strip_prefix("-I") {
            include_dirs.push(PathBuf::from(dir));
        } else if arg.starts_with('-') {
            return Err(format!("unknown option `{arg}`"));
        } else if path.is_none() {
            path = Some(PathBuf::from(arg));
        } else if class.is_none() {
            class = Some(arg.clone());
        } else {
            return Err(format!("unexpected argument `{arg}`"));
        }
    }
    match path {
        Some(path) => Ok(FileArgs {
            path,
            include_dirs,
            json,
            class,
        }),
        None => Err("expected a source file".to_owned()),
    }
}

fn reject_class_arg(parsed: FileArgs) -> Result<FileArgs, String> {
    match &parsed.class {
        Some(extra) => Err(format!("unexpected argument `{extra}`")),
        None => Ok(parsed),
    }
}

fn read_source(path: &Path) -> Result<String, i32> {
    std::fs::read_to_string(path).map_err(|err| {
        eprintln!("error: cannot read `{}`: {err}", path.display());
        1
    })
}

fn stderr_emitter(
    source: &str,
    path: &Path,
) -> TerminalEmitter<std::io::Stderr> {
    let stderr = std::io::stderr();
    let is_tty = stderr.is_terminal();
    TerminalEmitter::new(stderr, ColorMode::Auto, is_tty)
        .with_source(source)
        .with_file_path(path.display().to_string())
}

/// `ced run <file>`: execute a source file end to end.
pub fn run_file(args: &[String]) -> i32 {
    let parsed = match parse_file_args(args).and_then(reject_class_arg) {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("error: {message}");
            return 2;
        }
    };
    let source = match read_source(&parsed.path) {
        Ok(source) => source,
        Err(code) => return code,
    };

    let interner = Rc::new(StringInterner::new());
    let mut session = Session::new(&interner);
    for dir in &parsed.include_dirs {
        session.add_include_dir(dir);
    }

    let outcome = session.submit(&source, parsed.path.parent());
    if !outcome.diagnostics.is_empty() {
        let mut emitter = stderr_emitter(&source, &parsed.path);
        for diagnostic in &outcome.diagnostics {
            emitter.emit(diagnostic);
        }
        emitter.flush();
        return 1;
    }
    if let Some(value) = outcome.value {
        if value != Value::Void {
            println!("{}", value.render(&interner));
        }
    }
    0
}

/// `ced lex <file>`: dump the raw token stream.
pub fn lex_file(args: &[String]) -> i32 {
    let parsed = match parse_file_args(args).and_then(reject_class_arg) {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("error: {message}");
            return 2;
        }
    };
    let source = match read_source(&parsed.path) {
        Ok(source) => source,
        Err(code) => return code,
    };

    let interner = StringInterner::new();
    let (tokens, errors) = ced_lexer::lex(&source, &interner);
    for token in tokens.iter() {
        println!(
            "{:>5}..{:<5} {:?}",
            token.span.start, token.span.end, token.kind
        );
    }
    if errors.is_empty() {
        return 0;
    }
    let mut emitter = stderr_emitter(&source, &parsed.path);
    for error in &errors {
        emitter.emit(&reporting::lex_diagnostic(error));
    }
    emitter.flush();
    1
}

/// `ced parse <file>`: preprocess, parse, and dump the tree.
pub fn parse_file(args: &[String]) -> i32 {
    let parsed = match parse_file_args(args).and_then(reject_class_arg) {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("error: {message}");
            return 2;
        }
    };
    let source = match read_source(&parsed.path) {
        Ok(source) => source,
        Err(code) => return code,
    };

    let interner = StringInterner::new();
    let mut diagnostics = Vec::new();
    let (tokens, lex_errors) = ced_lexer::lex(&source, &interner);
    diagnostics.extend(lex_errors.iter().map(reporting::lex_diagnostic));

    let mut preprocessor = ced_pp::Preprocessor::new(&interner);
    for dir in &parsed.include_dirs {
        preprocessor.add_search_path(dir);
    }
    let (tokens, pp_errors) = preprocessor.run(&tokens, parsed.path.parent());
    diagnostics.extend(pp_errors.iter().map(reporting::preprocess_diagnostic));

    let (unit, parse_errors) = ced_parse::parse(&tokens, &interner);
    diagnostics.extend(parse_errors.iter().map(reporting::parse_diagnostic));

    println!("{unit:#?}");
    if diagnostics.is_empty() {
        return 0;
    }
    let mut emitter = stderr_emitter(&source, &parsed.path);
    for diagnostic in &diagnostics {
        emitter.emit(diagnostic);
    }
    emitter.flush();
    1
}

/// `ced dict <file>`: run the file, then dump the class dictionary.
pub fn dict_file(args: &[String]) -> i32 {
    let parsed = match parse_file_args(args) {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("error: {message}");
            return 2;
        }
    };
    let source = match read_source(&parsed.path) {
        Ok(source) => source,
        Err(code) => return code,
    };

    let interner = Rc::new(StringInterner::new());
    let mut session = Session::new(&interner);
    for dir in &parsed.include_dirs {
        session.add_include_dir(dir);
    }

    let outcome = session.submit(&source, parsed.path.parent());
    if !outcome.diagnostics.is_empty() {
        let mut emitter = stderr_emitter(&source, &parsed.path);
        for diagnostic in &outcome.diagnostics {
            emitter.emit(diagnostic);
        }
        emitter.flush();
        return 1;
    }

    let filter = parsed.class.as_deref();
    if let Some(class) = filter {
        if session.interpreter.dictionary.entries().all(|entry| {
            session.interner().lookup(entry.class) != class
        }) {
            eprintln!("error: class `{class}` is not in the dictionary");
            return 1;
        }
    }
    if parsed.json {
        println!("{}", dictionary_json(&session, filter));
    } else {
        print!("{}", render_dictionary(&session, filter));
    }
    0
}

/// Text dump of dictionary entries, in registration order, optionally
/// restricted to one class.
pub fn render_dictionary(session: &Session<'_>, filter: Option<&str>) -> String {
    use std::fmt::Write;

    let interner = session.interner();
    let mut out = String::new();
    for entry in session.interpreter.dictionary.entries() {
        if filter.is_some_and(|class| interner.lookup(entry.class) != class) {
            continue;
        }
        let _ = write!(out, "class {}", interner.lookup(entry.class));
        if !entry.bases.is_empty() {
            let bases: Vec<&str> = entry.bases.iter().map(|b| interner.lookup(*b)).collect();
            let _ = write!(out, " : {}", bases.join(", "));
        }
        let _ = writeln!(out);
        for member in &entry.members {
            let _ = writeln!(
                out,
                "  {} {} {}  [{}]",
                member.access.as_str(),
                member.ty.describe(interner),
                interner.lookup(member.name),
                interner.lookup(member.declared_in),
            );
        }
        for method in &entry.methods {
            let _ = writeln!(
                out,
                "  {} {} {} {}  [{}]",
                method.access.as_str(),
                method.dispatch.as_str(),
                interner.lookup(method.name),
                method.signature.describe(interner),
                interner.lookup(method.declared_in),
            );
        }
    }
    out
}

fn dictionary_json(session: &Session<'_>, filter: Option<&str>) -> String {
    let interner = session.interner();
    let entries: Vec<serde_json::Value> = session
        .interpreter
        .dictionary
        .entries()
        .filter(|entry| filter.is_none_or(|class| interner.lookup(entry.class) == class))
        .map(|entry| {
            serde_json::json!({
                "class": interner.lookup(entry.class),
                "bases": entry.bases.iter().map(|b| interner.lookup(*b)).collect::<Vec<_>>(),
                "members": entry.members.iter().map(|m| serde_json::json!({
                    "name": interner.lookup(m.name),
                    "type": m.ty.describe(interner),
                    "access": m.access.as_str(),
                    "declared_in": interner.lookup(m.declared_in),
                })).collect::<Vec<_>>(),
                "methods": entry.methods.iter().map(|m| serde_json::json!({
                    "name": interner.lookup(m.name),
                    "signature": m.signature.describe(interner),
                    "dispatch": m.dispatch.as_str(),
                    "static": m.is_static,
                    "access": m.access.as_str(),
                    "declared_in": interner.lookup(m.declared_in),
                })).collect::<Vec<_>>(),
            })
        })
        .collect();
    serde_json::to_string_pretty(&serde_json::Value::Array(entries))
        .unwrap_or_else(|_| "[]".to_owned())
}

/// `ced repl`: interactive session.
pub fn repl(_args: &[String]) -> i32 {
    match crate::repl::run() {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {err}");
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn file_args_accept_both_include_spellings() {
        let args: Vec<String> = ["-I", "inc", "-Iother", "main.C"]
            .iter()
            .map(|s| (*s).to_owned())
            .collect();
        let parsed = parse_file_args(&args).unwrap();
        assert_eq!(parsed.path, PathBuf::from("main.C"));
        assert_eq!(
            parsed.include_dirs,
            vec![PathBuf::from("inc"), PathBuf::from("other")]
        );
        assert!(!parsed.json);
    }

    #[test]
    fn file_args_reject_missing_file() {
        assert!(parse_file_args(&[]).is_err());
        assert!(parse_file_args(&["-I".to_owned()]).is_err());
        assert!(parse_file_args(&["--weird".to_owned()]).is_err());
    }

    #[test]
    fn dictionary_dump_flattens_bases() {
        let interner = Rc::new(StringInterner::new());
        let mut session = Session::new(&interner);
        let outcome = session.submit(
            "class A { public: int a; int geta() { return a; } };\n\
             class B : public A { public: int b; };\n",
            None,
        );
        assert!(outcome.is_clean(), "{:?}", outcome.diagnostics);

        let dump = render_dictionary(&session, None);
        assert!(dump.contains("class B : A"));
        // B's entry carries A's member, tagged with its declaring class.
        assert!(dump.contains("public int a  [A]"));
        assert!(dump.contains("geta"));

        let only_a = render_dictionary(&session, Some("A"));
        assert!(only_a.contains("class A"));
        assert!(!only_a.contains("class B"));
    }

    #[test]
    fn dictionary_json_is_valid() {
        let interner = Rc::new(StringInterner::new());
        let mut session = Session::new(&interner);
        session.submit("class P { public: double x; double y; };", None);

        let text = dictionary_json(&session, None);
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        let classes = parsed.as_array().unwrap();
        assert_eq!(classes[0]["class"], "P");
        assert_eq!(classes[0]["members"].as_array().unwrap().len(), 2);
    }
}
