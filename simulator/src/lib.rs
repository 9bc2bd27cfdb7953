//! Execution engine of the AVM, a tagged-memory bytecode virtual machine for
//! public contract execution.
//!
//! A contract call runs as a frame: its bytecode is decoded into a
//! [`Program`], then an [`Interpreter`] steps through it, metering every
//! instruction in L2 and DA gas, until it returns, reverts or faults. World
//! state is reached through the [`Host`] trait; nested contract calls run as
//! child frames on the same host.

#[macro_use]
mod macros;

pub mod addressing;
pub mod config;
pub mod environment;
pub mod event;
pub mod execution;
pub mod gas;
pub mod host;
mod instruction;
pub mod memory;
mod opcodes;
mod serialization;
pub mod stats;
mod util;

pub use addressing::{Addressing, AddressingError, AddressingMode};
pub use config::SimulatorConfig;
pub use environment::{EnvironmentVariable, ExecutionEnvironment, GasFees, GlobalVariables};
pub use execution::{
    ArithmeticError, ControlFlowError, ConversionError, ExecutionError, ExecutionTrace, Frame,
    FrameResult, Interpreter, MachineState,
};
pub use gas::{Gas, OutOfGasError};
pub use host::{Checkpoint, Host, HostError, InMemoryHost, SideEffects};
pub use instruction::{Instruction, WIRE_FORMATS};
pub use memory::{Memory, MemoryCell, MemoryError, Tag, TagError};
pub use opcodes::{Opcode, OpcodeFamily};
pub use serialization::{
    decode_instruction, decode_program, encode_program, CodecError, OperandType, Program,
};
pub use util::init_logger;
