//! Preprocessor errors.

use ced_ir::Span;
use std::path::PathBuf;
use thiserror::Error;

/// An error raised while rewriting the token stream.
///
/// The preprocessor recovers after each one (the offending directive or
/// identifier is dropped) so a whole unit is always processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreprocessError {
    #[error("macro `{name}` exceeded the expansion depth limit of {limit}")]
    MacroRecursion { name: String, limit: u32, span: Span },

    #[error("include file `{path}` not found (searched {})", format_search_list(.searched))]
    IncludeNotFound {
        path: String,
        /// Every directory tried, in search order.
        searched: Vec<PathBuf>,
        span: Span,
    },

    #[error("could not read include file `{path}`: {message}")]
    IncludeRead {
        path: String,
        message: String,
        span: Span,
    },

    #[error("lexing include file `{path}` failed: {message}")]
    IncludeLex {
        path: String,
        message: String,
        span: Span,
    },

    #[error("include cycle through `{path}`")]
    IncludeCycle { path: String, span: Span },

    #[error("includes nested deeper than {limit} levels")]
    IncludeDepth { limit: u32, span: Span },

    #[error("`{directive}` expects a macro name")]
    MalformedDirective { directive: &'static str, span: Span },

    #[error("`{directive}` without a matching `#ifdef`")]
    StrayConditional { directive: &'static str, span: Span },

    #[error("unterminated conditional: missing `#endif`")]
    UnterminatedConditional { span: Span },
}

fn format_search_list(searched: &[PathBuf]) -> String {
    if searched.is_empty() {
        return "no include directories".to_owned();
    }
    searched
        .iter()
        .map(|dir| dir.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl PreprocessError {
    pub fn span(&self) -> Span {
        match self {
            PreprocessError::MacroRecursion { span, .. }
            | PreprocessError::IncludeNotFound { span, .. }
            | PreprocessError::IncludeRead { span, .. }
            | PreprocessError::IncludeLex { span, .. }
            | PreprocessError::IncludeCycle { span, .. }
            | PreprocessError::IncludeDepth { span, .. }
            | PreprocessError::MalformedDirective { span, .. }
            | PreprocessError::StrayConditional { span, .. }
            | PreprocessError::UnterminatedConditional { span } => *span,
        }
    }
}
