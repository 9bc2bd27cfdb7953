mod error;
mod interpreter;
mod state;
mod trace;

pub use error::{ArithmeticError, ControlFlowError, ConversionError, ExecutionError};
pub use interpreter::{Frame, FrameResult, Interpreter};
pub use state::{InternalCallEntry, MachineState};
pub use trace::ExecutionTrace;
