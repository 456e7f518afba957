//! The interpreted call stack.

use ced_ir::Span;
use ced_rt::{Fault, FaultKind, FrameInfo};

/// Interpreted call depth limit; past this a call faults with
/// `StackOverflow` instead of exhausting the native stack.
pub const MAX_CALL_DEPTH: usize = 256;

/// One active interpreted call.
#[derive(Clone, Debug)]
pub struct CallFrame {
    /// Function or `Class::method` name, already rendered.
    pub function: String,
    /// The call site.
    pub span: Span,
}

/// The stack of active interpreted calls.
#[derive(Debug, Default)]
pub struct CallStack {
    frames: Vec<CallFrame>,
}

impl CallStack {
    pub fn new() -> Self {
        CallStack::default()
    }

    pub fn push(&mut self, function: String, span: Span) -> Result<(), Fault> {
        if self.frames.len() >= MAX_CALL_DEPTH {
            let mut fault = Fault::new(
                FaultKind::StackOverflow,
                format!("call depth exceeded {MAX_CALL_DEPTH} frames"),
                span,
            );
            fault.backtrace = self.snapshot();
            return Err(fault);
        }
        self.frames.push(CallFrame { function, span });
        Ok(())
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Snapshot for a fault record, innermost first.
    pub fn snapshot(&self) -> Vec<FrameInfo> {
        self.frames
            .iter()
            .rev()
            .map(|frame| FrameInfo {
                function: frame.function.clone(),
                span: frame.span,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn overflow_reports_with_backtrace() {
        let mut stack = CallStack::new();
        for i in 0..MAX_CALL_DEPTH {
            stack.push(format!("f{i}"), Span::DUMMY).unwrap();
        }
        let fault = stack.push("overflow".to_owned(), Span::DUMMY).unwrap_err();
        assert_eq!(fault.kind, FaultKind::StackOverflow);
        assert_eq!(fault.backtrace.len(), MAX_CALL_DEPTH);
        assert_eq!(fault.backtrace[0].function, format!("f{}", MAX_CALL_DEPTH - 1));
    }
}
