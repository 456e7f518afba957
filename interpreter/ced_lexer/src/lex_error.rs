//! Lexer errors.

use ced_ir::Span;
use thiserror::Error;

/// A lexical error with the offending span.
///
/// Errors are collected per translation unit; the lexer keeps going after
/// each one so later errors still surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("invalid character `{character}`")]
    InvalidCharacter { character: char, span: Span },

    #[error("unterminated string literal")]
    UnterminatedString { span: Span },

    #[error("unterminated character literal")]
    UnterminatedChar { span: Span },

    #[error("unterminated block comment")]
    UnterminatedComment { span: Span },

    #[error("unsupported preprocessor directive `{directive}`")]
    UnsupportedDirective { directive: String, span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::InvalidCharacter { span, .. }
            | LexError::UnterminatedString { span }
            | LexError::UnterminatedChar { span }
            | LexError::UnterminatedComment { span }
            | LexError::UnsupportedDirective { span, .. } => *span,
        }
    }
}
