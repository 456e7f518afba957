//! Cedilla interpreter CLI.

use cedc::commands::{dict_file, lex_file, parse_file, repl, run_file};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        std::process::exit(2);
    }

    let command = &args[1];
    let rest = &args[2..];

    let code = match command.as_str() {
        "run" => {
            if rest.is_empty() {
                eprintln!("Usage: ced run <file.C> [-I <dir>]...");
                std::process::exit(2);
            }
            run_file(rest)
        }
        "lex" => {
            if rest.is_empty() {
                eprintln!("Usage: ced lex <file.C>");
                std::process::exit(2);
            }
            lex_file(rest)
        }
        "parse" => {
            if rest.is_empty() {
                eprintln!("Usage: ced parse <file.C> [-I <dir>]...");
                std::process::exit(2);
            }
            parse_file(rest)
        }
        "dict" => {
            if rest.is_empty() {
                eprintln!("Usage: ced dict <file.C> [-I <dir>]... [--json] [CLASS]");
                std::process::exit(2);
            }
            dict_file(rest)
        }
        "repl" => repl(rest),
        "help" | "--help" | "-h" => {
            print_usage();
            0
        }
        other => {
            eprintln!("error: unknown command `{other}`");
            print_usage();
            2
        }
    };
    std::process::exit(code);
}

fn print_usage() {
    eprintln!("Cedilla: an embedded C/C++ interpreter");
    eprintln!();
    eprintln!("Usage: ced <command> [arguments]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  run <file.C>      Execute a source file");
    eprintln!("  repl              Start an interactive session");
    eprintln!("  lex <file.C>      Dump the token stream");
    eprintln!("  parse <file.C>    Dump the parsed tree");
    eprintln!("  dict <file.C>     Dump the class dictionary (--json, optional class name)");
    eprintln!("  help              Show this message");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -I <dir>          Add an include search directory");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  RUST_LOG          Tracing filter, e.g. RUST_LOG=ced_eval=debug");
}
