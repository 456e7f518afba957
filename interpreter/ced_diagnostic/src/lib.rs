//! Diagnostic system for the Cedilla interpreter.
//!
//! Every stage reports through the same shape: an error code for
//! searchability, a message saying what went wrong, and labeled spans
//! saying where. The terminal emitter renders line/column positions and
//! source snippets.

mod diagnostic;
mod emitter;
mod error_code;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use emitter::{ColorMode, DiagnosticEmitter, TerminalEmitter};
pub use error_code::ErrorCode;
