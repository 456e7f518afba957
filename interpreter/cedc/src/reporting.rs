//! Mapping pipeline errors to diagnostics.
//!
//! Every stage keeps its own error enum; this module is the single place
//! that assigns stable error codes and renders interned names.

use ced_diagnostic::{Diagnostic, ErrorCode};
use ced_eval::RunError;
use ced_ir::StringInterner;
use ced_lexer::LexError;
use ced_load::{LoadError, UnloadError};
use ced_parse::ParseError;
use ced_pp::PreprocessError;
use ced_rt::{Fault, FaultKind};
use ced_table::DeclareError;

pub fn lex_diagnostic(error: &LexError) -> Diagnostic {
    let code = match error {
        LexError::InvalidCharacter { .. } => ErrorCode::E0101,
        LexError::UnterminatedString { .. } => ErrorCode::E0102,
        LexError::UnterminatedChar { .. } => ErrorCode::E0103,
        LexError::UnterminatedComment { .. } => ErrorCode::E0104,
        LexError::UnsupportedDirective { .. } => ErrorCode::E0204,
    };
    Diagnostic::error(code)
        .with_message(error.to_string())
        .with_label(error.span(), "here")
}

pub fn preprocess_diagnostic(error: &PreprocessError) -> Diagnostic {
    let code = match error {
        PreprocessError::MacroRecursion { .. } => ErrorCode::E0201,
        PreprocessError::IncludeNotFound { .. }
        | PreprocessError::IncludeRead { .. }
        | PreprocessError::IncludeLex { .. }
        | PreprocessError::IncludeCycle { .. }
        | PreprocessError::IncludeDepth { .. } => ErrorCode::E0202,
        PreprocessError::UnterminatedConditional { .. } => ErrorCode::E0203,
        PreprocessError::MalformedDirective { .. } => ErrorCode::E0204,
        PreprocessError::StrayConditional { .. } => ErrorCode::E0205,
    };
    Diagnostic::error(code)
        .with_message(error.to_string())
        .with_label(error.span(), "in this directive")
}

pub fn parse_diagnostic(error: &ParseError) -> Diagnostic {
    Diagnostic::error(ErrorCode::E0301)
        .with_message(error.to_string())
        .with_label(error.span, format!("expected {}", error.expected))
}

pub fn run_diagnostic(error: &RunError, interner: &StringInterner) -> Diagnostic {
    match error {
        RunError::Fault(fault) => fault_diagnostic(fault),
        RunError::Declare(declare) => declare_diagnostic(declare, interner),
        RunError::Dict(dict) => {
            let (code, message) = match dict {
                ced_dict::DictError::UnknownBase { class, base } => (
                    ErrorCode::E0501,
                    format!(
                        "`{}` inherits from `{}`, which is not a known class",
                        interner.lookup(*class),
                        interner.lookup(*base)
                    ),
                ),
                ced_dict::DictError::CyclicInheritance { class } => (
                    ErrorCode::E0502,
                    format!(
                        "registering `{}` would create an inheritance cycle",
                        interner.lookup(*class)
                    ),
                ),
            };
            Diagnostic::error(code).with_message(message)
        }
    }
}

pub fn declare_diagnostic(error: &DeclareError, interner: &StringInterner) -> Diagnostic {
    let name = interner.lookup(error.name());
    match error {
        DeclareError::Redeclaration {
            existing_kind,
            previous,
            span,
            ..
        } => Diagnostic::error(ErrorCode::E0401)
            .with_message(format!(
                "`{name}` is already declared in this scope as a {existing_kind}"
            ))
            .with_label(*span, "redeclared here")
            .with_label(*previous, "previous declaration"),
        DeclareError::ForeignClash { module, span, .. } => Diagnostic::error(ErrorCode::E0403)
            .with_message(format!(
                "module `{}` exports `{name}`, which is already bound",
                interner.lookup(*module)
            ))
            .with_label(*span, "while loading this module"),
    }
}

pub fn fault_diagnostic(fault: &Fault) -> Diagnostic {
    let code = match fault.kind {
        FaultKind::NullAccess => ErrorCode::E0601,
        FaultKind::TypeMismatch => ErrorCode::E0602,
        FaultKind::UnresolvedSymbol => ErrorCode::E0603,
        FaultKind::Arithmetic => ErrorCode::E0604,
        FaultKind::StackOverflow => ErrorCode::E0605,
        FaultKind::AmbiguousCall => ErrorCode::E0402,
    };
    let mut diagnostic = Diagnostic::error(code)
        .with_message(&fault.message)
        .with_label(fault.span, fault.kind.describe());
    for frame in fault.backtrace.iter().take(8) {
        diagnostic = diagnostic.with_note(format!("in `{}`", frame.function));
    }
    if fault.backtrace.len() > 8 {
        diagnostic =
            diagnostic.with_note(format!("... {} more frames", fault.backtrace.len() - 8));
    }
    diagnostic
}

pub fn load_diagnostic(error: &LoadError, interner: &StringInterner) -> Diagnostic {
    match error {
        LoadError::Clash(declare) => declare_diagnostic(declare, interner),
        other => Diagnostic::error(ErrorCode::E0701).with_message(other.to_string()),
    }
}

pub fn unload_diagnostic(error: &UnloadError, interner: &StringInterner) -> Diagnostic {
    match error {
        UnloadError::Unknown { module } => Diagnostic::error(ErrorCode::E0701)
            .with_message(format!("module `{}` is not loaded", interner.lookup(*module))),
        UnloadError::InUse { module } => Diagnostic::error(ErrorCode::E0702).with_message(
            format!(
                "module `{}` still has symbols in use",
                interner.lookup(*module)
            ),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ced_ir::Span;
    use pretty_assertions::assert_eq;

    #[test]
    fn fault_kinds_map_to_stable_codes() {
        let fault = Fault::new(FaultKind::UnresolvedSymbol, "`y` is not defined", Span::new(0, 1));
        assert_eq!(fault_diagnostic(&fault).code, ErrorCode::E0603);

        let fault = Fault::new(FaultKind::AmbiguousCall, "ambiguous", Span::new(0, 1));
        assert_eq!(fault_diagnostic(&fault).code, ErrorCode::E0402);
    }

    #[test]
    fn backtrace_becomes_notes() {
        let mut fault = Fault::new(FaultKind::Arithmetic, "integer / by zero", Span::new(4, 5));
        fault.push_frame("inner", Span::new(0, 10));
        fault.push_frame("outer", Span::new(0, 20));
        let diagnostic = fault_diagnostic(&fault);
        assert_eq!(diagnostic.notes, vec!["in `inner`".to_owned(), "in `outer`".to_owned()]);
    }
}
