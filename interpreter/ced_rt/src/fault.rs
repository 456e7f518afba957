//! Runtime faults and evaluator control flow.

use crate::Value;
use ced_ir::Span;
use thiserror::Error;

/// What went wrong at runtime.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FaultKind {
    /// Member access or call through a null object.
    NullAccess,
    /// An operation applied to operand types it does not accept.
    TypeMismatch,
    /// A name that resolved to nothing at evaluation time.
    UnresolvedSymbol,
    /// Division or remainder by zero on integers.
    Arithmetic,
    /// A call that matched more than one overload equally well.
    AmbiguousCall,
    /// The interpreted call stack exceeded its depth limit.
    StackOverflow,
}

impl FaultKind {
    pub fn describe(self) -> &'static str {
        match self {
            FaultKind::NullAccess => "null access",
            FaultKind::TypeMismatch => "type mismatch",
            FaultKind::UnresolvedSymbol => "unresolved symbol",
            FaultKind::Arithmetic => "arithmetic error",
            FaultKind::AmbiguousCall => "ambiguous call",
            FaultKind::StackOverflow => "stack overflow",
        }
    }
}

/// One interpreted frame in a fault backtrace, innermost first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameInfo {
    pub function: String,
    pub span: Span,
}

/// A runtime fault.
///
/// Faults abort the current submission but never the session: the evaluator
/// unwinds to the top, the interpreter records the fault, and globals keep
/// the values they had when it fired.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("{message}")]
pub struct Fault {
    pub kind: FaultKind,
    pub message: String,
    pub span: Span,
    pub backtrace: Vec<FrameInfo>,
}

impl Fault {
    pub fn new(kind: FaultKind, message: impl Into<String>, span: Span) -> Self {
        Fault {
            kind,
            message: message.into(),
            span,
            backtrace: Vec::new(),
        }
    }

    /// Appends a frame while the fault unwinds through a call.
    pub fn push_frame(&mut self, function: impl Into<String>, span: Span) {
        self.backtrace.push(FrameInfo {
            function: function.into(),
            span,
        });
    }
}

/// Non-local control flow inside the evaluator.
///
/// `Return`, `Break`, and `Continue` are consumed by the construct they
/// target; only `Fault` ever escapes to the interpreter.
#[derive(Clone, Debug, PartialEq)]
pub enum Signal {
    Fault(Box<Fault>),
    Return(Value),
    Break(Span),
    Continue(Span),
}

impl From<Fault> for Signal {
    fn from(fault: Fault) -> Self {
        Signal::Fault(Box::new(fault))
    }
}

/// The result type threaded through evaluation.
pub type EvalResult = Result<Value, Signal>;
