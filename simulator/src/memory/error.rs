use thiserror::Error;

use super::Tag;

/// Type errors raised when a cell's tag does not satisfy an instruction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("read of uninitialized memory at address {address}")]
    Uninitialized { address: u32 },

    #[error("tag mismatch at address {address}: expected {expected}, found {found}")]
    TagMismatch {
        address: u32,
        expected: Tag,
        found: Tag,
    },

    #[error("invalid tag value {0}")]
    InvalidTag(u8),

    #[error("integral tag required at address {address}, found {found}")]
    NonIntegral { address: u32, found: Tag },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("memory slice [{start}, {start} + {len}) exceeds the addressable range")]
    SliceOutOfRange { start: u32, len: u64 },
}
