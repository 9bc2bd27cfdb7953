//! Resolution of instruction operands into concrete memory addresses.
//!
//! Each memory-offset operand of an instruction owns two bits of the wire
//! `indirect` field: bit `2i` marks operand `i` as indirect, bit `2i + 1` as
//! relative. Relative operands are offset by the base pointer stored at
//! address 0, indirect operands are dereferenced once, after any relative
//! adjustment.

use smallvec::SmallVec;
use thiserror::Error;

use crate::memory::{Memory, TagError, MAX_MEMORY_SIZE};

/// Maximum number of operands an instruction can carry addressing bits for.
pub const AVM_MAX_OPERANDS: usize = 8;

/// Address holding the base pointer for relative addressing.
pub const BASE_POINTER_ADDRESS: u32 = 0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressingError {
    #[error(
        "relative address of operand {operand} out of range: base {base} + offset {offset}"
    )]
    RelativeAddressOutOfRange { operand: usize, base: u32, offset: u32 },

    #[error("invalid pointer tag: {0}")]
    Tag(#[from] TagError),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AddressingMode {
    pub indirect: bool,
    pub relative: bool,
}

impl AddressingMode {
    pub const DIRECT: Self = Self {
        indirect: false,
        relative: false,
    };

    pub const fn is_direct(&self) -> bool {
        !self.indirect && !self.relative
    }
}

/// Per-instruction addressing descriptor.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Addressing {
    modes: SmallVec<[AddressingMode; AVM_MAX_OPERANDS]>,
}

impl Addressing {
    /// Decodes the addressing bits of the first `num_operands` operands.
    pub fn from_wire(indirect: u16, num_operands: usize) -> Self {
        let modes = (0..num_operands.min(AVM_MAX_OPERANDS))
            .map(|i| AddressingMode {
                indirect: (indirect >> (2 * i)) & 1 == 1,
                relative: (indirect >> (2 * i + 1)) & 1 == 1,
            })
            .collect();
        Self { modes }
    }

    pub fn from_modes(modes: &[AddressingMode]) -> Self {
        Self {
            modes: modes.iter().copied().collect(),
        }
    }

    /// Re-encodes the descriptor into its wire form.
    pub fn to_wire(&self) -> u16 {
        self.modes.iter().enumerate().fold(0, |acc, (i, mode)| {
            acc | ((mode.indirect as u16) << (2 * i)) | ((mode.relative as u16) << (2 * i + 1))
        })
    }

    pub fn modes(&self) -> &[AddressingMode] {
        &self.modes
    }

    pub fn num_operands(&self) -> usize {
        self.modes.len()
    }

    pub fn indirect_count(&self) -> u32 {
        self.modes.iter().filter(|m| m.indirect).count() as u32
    }

    pub fn relative_count(&self) -> u32 {
        self.modes.iter().filter(|m| m.relative).count() as u32
    }

    /// Resolves `offsets` into absolute addresses, preserving their order.
    ///
    /// Operands past the descriptor's length are treated as direct.
    pub fn resolve(
        &self,
        offsets: &[u32],
        memory: &Memory,
    ) -> Result<SmallVec<[u32; AVM_MAX_OPERANDS]>, AddressingError> {
        let mut cached_base: Option<u32> = None;
        let mut resolved = SmallVec::with_capacity(offsets.len());

        for (i, &offset) in offsets.iter().enumerate() {
            let mode = self.modes.get(i).copied().unwrap_or(AddressingMode::DIRECT);
            let mut addr = offset;

            if mode.relative {
                let base = match cached_base {
                    Some(base) => base,
                    None => *cached_base.insert(memory.get_as::<u32>(BASE_POINTER_ADDRESS)?),
                };
                let sum = base as u64 + offset as u64;
                if sum >= MAX_MEMORY_SIZE {
                    return Err(AddressingError::RelativeAddressOutOfRange {
                        operand: i,
                        base,
                        offset,
                    });
                }
                addr = sum as u32;
            }

            if mode.indirect {
                addr = memory.get_as::<u32>(addr)?;
            }

            resolved.push(addr);
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::memory::{MemoryCell, Tag};

    #[test]
    fn test_from_wire() {
        // Operand 0 indirect, operand 1 relative, operand 2 both.
        let addressing = Addressing::from_wire(0b11_10_01, 3);
        assert_eq!(
            addressing.modes(),
            &[
                AddressingMode {
                    indirect: true,
                    relative: false
                },
                AddressingMode {
                    indirect: false,
                    relative: true
                },
                AddressingMode {
                    indirect: true,
                    relative: true
                },
            ]
        );
        assert_eq!(addressing.indirect_count(), 2);
        assert_eq!(addressing.relative_count(), 2);
        assert_eq!(addressing.to_wire(), 0b11_10_01);
    }

    #[test]
    fn test_bits_past_operand_count_are_ignored() {
        let addressing = Addressing::from_wire(0xffff, 1);
        assert_eq!(addressing.num_operands(), 1);
        assert_eq!(addressing.to_wire(), 0b11);
    }

    #[test]
    fn test_relative() {
        let mut memory = Memory::new();
        memory.set(0, MemoryCell::U32(100));
        let addressing = Addressing::from_wire(0b10_00_10, 3);
        let resolved = addressing.resolve(&[1, 2, 3], &memory).unwrap();
        assert_eq!(resolved.as_slice(), &[101, 2, 103]);
    }

    #[test]
    fn test_relative_out_of_range() {
        let mut memory = Memory::new();
        memory.set(0, MemoryCell::U32(u32::MAX));
        let addressing = Addressing::from_wire(0b10, 1);
        assert_eq!(
            addressing.resolve(&[1], &memory),
            Err(AddressingError::RelativeAddressOutOfRange {
                operand: 0,
                base: u32::MAX,
                offset: 1
            })
        );
        // base + 0 is still addressable.
        assert_eq!(
            addressing.resolve(&[0], &memory).unwrap().as_slice(),
            &[u32::MAX]
        );
    }

    #[test]
    fn test_relative_requires_u32_base() {
        let mut memory = Memory::new();
        memory.set(0, MemoryCell::U64(100));
        let addressing = Addressing::from_wire(0b10, 1);
        assert_eq!(
            addressing.resolve(&[1], &memory),
            Err(AddressingError::Tag(TagError::TagMismatch {
                address: 0,
                expected: Tag::U32,
                found: Tag::U64
            }))
        );
    }

    #[test]
    fn test_indirect_after_relative() {
        let mut memory = Memory::new();
        memory.set(0, MemoryCell::U32(10));
        memory.set(15, MemoryCell::U32(42));
        memory.set(5, MemoryCell::U32(7));

        let both = Addressing::from_wire(0b11, 1);
        assert_eq!(both.resolve(&[5], &memory).unwrap().as_slice(), &[42]);

        let indirect = Addressing::from_wire(0b01, 1);
        assert_eq!(indirect.resolve(&[5], &memory).unwrap().as_slice(), &[7]);
    }

    #[test]
    fn test_indirect_pointer_must_be_initialized() {
        let memory = Memory::new();
        let indirect = Addressing::from_wire(0b01, 1);
        assert_eq!(
            indirect.resolve(&[5], &memory),
            Err(AddressingError::Tag(TagError::Uninitialized { address: 5 }))
        );
    }

    proptest! {
        #[test]
        fn test_direct_is_identity(
            offsets in proptest::collection::vec(any::<u32>(), 0..AVM_MAX_OPERANDS)
        ) {
            let memory = Memory::new();
            let addressing = Addressing::from_wire(0, offsets.len());
            let resolved = addressing.resolve(&offsets, &memory).unwrap();
            prop_assert_eq!(resolved.as_slice(), offsets.as_slice());
        }

        #[test]
        fn test_relative_adds_base(base in any::<u32>(), offset in any::<u32>()) {
            let mut memory = Memory::new();
            memory.set(0, MemoryCell::U32(base));
            let addressing = Addressing::from_wire(0b10, 1);
            let result = addressing.resolve(&[offset], &memory);
            if (base as u64 + offset as u64) < MAX_MEMORY_SIZE {
                let resolved = result.unwrap();
                prop_assert_eq!(resolved.as_slice(), &[base + offset]);
            } else {
                let is_out_of_range = matches!(
                    result,
                    Err(AddressingError::RelativeAddressOutOfRange { .. })
                );
                prop_assert!(is_out_of_range);
            }
        }
    }
}
