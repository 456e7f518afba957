//! Runtime values and fault machinery shared by the evaluator, the symbol
//! table, and the loader bridge.

mod fault;
mod value;

pub use fault::{EvalResult, Fault, FaultKind, FrameInfo, Signal};
pub use value::{ObjectData, Value};
