//! Parse errors.

use ced_ir::Span;
use thiserror::Error;

/// An unexpected token.
///
/// The parser recovers at statement granularity, so one pass can report
/// several of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected}, found {found}")]
pub struct ParseError {
    pub expected: String,
    pub found: String,
    pub span: Span,
}
