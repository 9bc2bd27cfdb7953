use thiserror::Error;

use crate::{
    addressing::AddressingError,
    gas::OutOfGasError,
    host::HostError,
    memory::{MemoryError, TagError},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArithmeticError {
    #[error("division by zero")]
    DivisionByZero,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlFlowError {
    #[error("internal call stack overflow at depth {depth}")]
    StackOverflow { depth: usize },

    #[error("internal return with an empty call stack")]
    StackEmpty,

    #[error("pc {pc} is not the start of an instruction")]
    InvalidProgramCounter { pc: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("invalid radix {radix}")]
    InvalidRadix { radix: u32 },

    #[error("value does not fit in {num_limbs} limbs of radix {radix}")]
    InsufficientLimbs { radix: u32, num_limbs: u32 },
}

/// Any fault that stops a frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("tag error: {0}")]
    Tag(#[from] TagError),

    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),

    #[error("addressing error: {0}")]
    Addressing(#[from] AddressingError),

    #[error("arithmetic error: {0}")]
    Arithmetic(#[from] ArithmeticError),

    #[error("control flow error: {0}")]
    ControlFlow(#[from] ControlFlowError),

    #[error("{0}")]
    OutOfGas(#[from] OutOfGasError),

    #[error("conversion error: {0}")]
    Conversion(#[from] ConversionError),

    #[error("host error: {0}")]
    Host(#[from] HostError),

    #[error("state modification in a static call")]
    StaticCallAlteration,

    #[error("invalid environment variable index {0}")]
    InvalidEnvironmentVariable(u8),

    #[error("call depth {depth} exceeds the maximum of {max}")]
    CallDepthExceeded { depth: usize, max: usize },
}
