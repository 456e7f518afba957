//! One interpreter session: lexer, preprocessor, parser, evaluator, and
//! loader wired together behind a single `submit` entry point.
//!
//! Macro definitions and globals persist across submissions, which is what
//! makes the REPL incremental: `int x = 2 + 3;` in one line and `x * 10;`
//! in the next see the same table.

use crate::{builtins, reporting};
use ced_diagnostic::Diagnostic;
use ced_eval::{Interpreter, State};
use ced_ir::{Name, Span, StringInterner};
use ced_load::{LoadError, LoaderBridge, UnloadError};
use ced_pp::Preprocessor;
use ced_rt::Value;
use std::path::Path;
use std::rc::Rc;

/// What one submission produced.
pub struct Outcome {
    /// Value of the last evaluated statement, if evaluation ran at all.
    pub value: Option<Value>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Outcome {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

pub struct Session<'a> {
    interner: &'a Rc<StringInterner>,
    preprocessor: Preprocessor<'a>,
    pub interpreter: Interpreter,
    pub loader: LoaderBridge,
}

impl<'a> Session<'a> {
    pub fn new(interner: &'a Rc<StringInterner>) -> Self {
        let mut interpreter = Interpreter::new(Rc::clone(interner));
        let mut loader = LoaderBridge::new(Rc::clone(interner));
        builtins::install(&mut loader, &mut interpreter.table, interner);
        Session {
            interner,
            preprocessor: Preprocessor::new(interner),
            interpreter,
            loader,
        }
    }

    pub fn interner(&self) -> &StringInterner {
        self.interner
    }

    pub fn add_include_dir(&mut self, dir: impl Into<std::path::PathBuf>) {
        self.preprocessor.add_search_path(dir);
    }

    /// Runs one source fragment through the whole pipeline.
    ///
    /// Front-end errors (lex, preprocess, parse) suppress evaluation; a
    /// runtime fault still leaves every completed declaration and
    /// assignment in place.
    #[tracing::instrument(level = "debug", skip_all, fields(bytes = source.len()))]
    pub fn submit(&mut self, source: &str, current_dir: Option<&Path>) -> Outcome {
        let mut diagnostics = Vec::new();

        let (tokens, lex_errors) = ced_lexer::lex(source, self.interner);
        diagnostics.extend(lex_errors.iter().map(reporting::lex_diagnostic));

        let (tokens, pp_errors) = self.preprocessor.run(&tokens, current_dir);
        diagnostics.extend(pp_errors.iter().map(reporting::preprocess_diagnostic));

        let (unit, parse_errors) = ced_parse::parse(&tokens, self.interner);
        diagnostics.extend(parse_errors.iter().map(reporting::parse_diagnostic));

        if !diagnostics.is_empty() {
            return Outcome {
                value: None,
                diagnostics,
            };
        }

        match self.interpreter.run(&unit) {
            Ok(value) => Outcome {
                value,
                diagnostics,
            },
            Err(error) => {
                diagnostics.push(reporting::run_diagnostic(&error, self.interner));
                Outcome {
                    value: None,
                    diagnostics,
                }
            }
        }
    }

    /// Continues a submission suspended by `request_pause`.
    pub fn resume(&mut self) -> Outcome {
        match self.interpreter.resume() {
            Ok(value) => Outcome {
                value,
                diagnostics: Vec::new(),
            },
            Err(error) => Outcome {
                value: None,
                diagnostics: vec![reporting::run_diagnostic(&error, self.interner)],
            },
        }
    }

    pub fn state(&self) -> State {
        self.interpreter.state()
    }

    pub fn load_module(&mut self, path: &Path) -> Result<Name, LoadError> {
        self.loader
            .load(path, &mut self.interpreter.table, Span::DUMMY)
    }

    pub fn unload_module(&mut self, module: &str) -> Result<(), UnloadError> {
        let module = self.interner.intern(module);
        self.loader.unload(module, &mut self.interpreter.table)
    }

    /// Discards all interpreter and preprocessor state, keeping only the
    /// builtin module.
    pub fn reset(&mut self) {
        self.preprocessor.reset();
        self.interpreter = Interpreter::new(Rc::clone(self.interner));
        self.loader = LoaderBridge::new(Rc::clone(self.interner));
        builtins::install(
            &mut self.loader,
            &mut self.interpreter.table,
            self.interner,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ced_diagnostic::ErrorCode;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn submit(session: &mut Session<'_>, source: &str) -> Outcome {
        session.submit(source, None)
    }

    #[test]
    fn globals_persist_between_submissions() {
        let interner = Rc::new(StringInterner::new());
        let mut session = Session::new(&interner);

        let first = submit(&mut session, "int x = 2 + 3;");
        assert!(first.is_clean(), "{:?}", first.diagnostics);

        let second = submit(&mut session, "x * 10;");
        assert!(second.is_clean(), "{:?}", second.diagnostics);
        assert_eq!(second.value, Some(Value::Int(50)));
    }

    #[test]
    fn macros_persist_between_submissions() {
        let interner = Rc::new(StringInterner::new());
        let mut session = Session::new(&interner);

        assert!(submit(&mut session, "#define ANSWER 42\n").is_clean());
        let outcome = submit(&mut session, "ANSWER + 1;");
        assert_eq!(outcome.value, Some(Value::Int(43)));
    }

    #[test]
    fn includes_resolve_through_search_paths() {
        let dir = tempfile::tempdir().unwrap();
        let header = dir.path().join("limits.h");
        let mut file = std::fs::File::create(&header).unwrap();
        writeln!(file, "#define CAP 8").unwrap();
        drop(file);

        let interner = Rc::new(StringInterner::new());
        let mut session = Session::new(&interner);
        session.add_include_dir(dir.path());

        let outcome = submit(&mut session, "#include \"limits.h\"\nCAP * 2;");
        assert!(outcome.is_clean(), "{:?}", outcome.diagnostics);
        assert_eq!(outcome.value, Some(Value::Int(16)));
    }

    #[test]
    fn front_end_errors_suppress_evaluation() {
        let interner = Rc::new(StringInterner::new());
        let mut session = Session::new(&interner);

        let outcome = submit(&mut session, "int x = ;");
        assert!(outcome.value.is_none());
        assert_eq!(outcome.diagnostics[0].code, ErrorCode::E0301);

        // Nothing from the bad line leaked into the table.
        let retry = submit(&mut session, "int x = 1; x;");
        assert_eq!(retry.value, Some(Value::Int(1)));
    }

    #[test]
    fn faults_surface_with_their_code() {
        let interner = Rc::new(StringInterner::new());
        let mut session = Session::new(&interner);

        let outcome = submit(&mut session, "int x = 1 / 0;");
        assert_eq!(outcome.diagnostics[0].code, ErrorCode::E0604);
        assert_eq!(session.state(), State::Error);

        let unresolved = submit(&mut session, "y + 1;");
        assert_eq!(unresolved.diagnostics[0].code, ErrorCode::E0603);
    }

    #[test]
    fn builtins_are_callable_from_source() {
        let interner = Rc::new(StringInterner::new());
        let mut session = Session::new(&interner);

        let outcome = submit(&mut session, "sqrt(16.0);");
        assert!(outcome.is_clean(), "{:?}", outcome.diagnostics);
        assert_eq!(outcome.value, Some(Value::Double(4.0)));
    }

    #[test]
    fn reset_discards_globals_and_macros() {
        let interner = Rc::new(StringInterner::new());
        let mut session = Session::new(&interner);

        assert!(submit(&mut session, "#define N 3\nint x = N;").is_clean());
        session.reset();

        let after = submit(&mut session, "x;");
        assert_eq!(after.diagnostics[0].code, ErrorCode::E0603);
        // Builtins came back with the reset.
        assert_eq!(
            submit(&mut session, "len(\"abcd\");").value,
            Some(Value::Int(4))
        );
    }

    #[test]
    fn unload_builtin_module_removes_its_symbols() {
        let interner = Rc::new(StringInterner::new());
        let mut session = Session::new(&interner);

        session.unload_module(builtins::MODULE).unwrap();
        let outcome = submit(&mut session, "sqrt(4.0);");
        assert_eq!(outcome.diagnostics[0].code, ErrorCode::E0603);
    }
}
