//! Symbol table errors.
//!
//! Errors carry interned names; the reporting layer renders them with the
//! session interner.

use ced_ir::{Name, Span};
use thiserror::Error;

/// Declaration failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclareError {
    #[error("name already declared in this scope as a {existing_kind}")]
    Redeclaration {
        name: Name,
        existing_kind: &'static str,
        previous: Span,
        span: Span,
    },

    #[error("foreign symbol clashes with an existing binding")]
    ForeignClash {
        name: Name,
        module: Name,
        span: Span,
    },
}

impl DeclareError {
    pub fn span(&self) -> Span {
        match self {
            DeclareError::Redeclaration { span, .. }
            | DeclareError::ForeignClash { span, .. } => *span,
        }
    }

    pub fn name(&self) -> Name {
        match self {
            DeclareError::Redeclaration { name, .. }
            | DeclareError::ForeignClash { name, .. } => *name,
        }
    }
}

/// Overload selection failure; indices refer to the candidate list given to
/// the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverloadError {
    /// No candidate accepts the argument list.
    NoViable,
    /// Two or more candidates rank equally well.
    Ambiguous(Vec<usize>),
}
