use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};

use super::Tag;

/// A typed memory cell.
///
/// Every variant carries a value that fits in its tag's domain, so the
/// `(tag, raw_value)` invariant holds by construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MemoryCell {
    #[default]
    Uninitialized,
    U1(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    Field(Fr),
}

impl MemoryCell {
    pub const fn tag(&self) -> Tag {
        match self {
            MemoryCell::Uninitialized => Tag::Uninitialized,
            MemoryCell::U1(_) => Tag::U1,
            MemoryCell::U8(_) => Tag::U8,
            MemoryCell::U16(_) => Tag::U16,
            MemoryCell::U32(_) => Tag::U32,
            MemoryCell::U64(_) => Tag::U64,
            MemoryCell::U128(_) => Tag::U128,
            MemoryCell::Field(_) => Tag::Field,
        }
    }

    pub const fn is_initialized(&self) -> bool {
        !matches!(self, MemoryCell::Uninitialized)
    }

    /// Builds a cell of the given tag, keeping only the bits the tag can hold.
    pub fn from_u128(tag: Tag, value: u128) -> Self {
        match tag {
            Tag::U1 => MemoryCell::U1(value & 1 == 1),
            Tag::U8 => MemoryCell::U8(value as u8),
            Tag::U16 => MemoryCell::U16(value as u16),
            Tag::U32 => MemoryCell::U32(value as u32),
            Tag::U64 => MemoryCell::U64(value as u64),
            Tag::U128 => MemoryCell::U128(value),
            Tag::Field => MemoryCell::Field(Fr::from(value)),
            Tag::Uninitialized => MemoryCell::Uninitialized,
        }
    }

    /// Builds a cell of the given tag from a field element. Integral tags keep
    /// the low bits of the canonical representative.
    pub fn from_field(tag: Tag, value: Fr) -> Self {
        match tag {
            Tag::Field => MemoryCell::Field(value),
            _ => Self::from_u128(tag, field_low_u128(&value)),
        }
    }

    /// Lifts an initialized cell into the field.
    pub fn to_field(&self) -> Option<Fr> {
        match self {
            MemoryCell::Uninitialized => None,
            MemoryCell::Field(value) => Some(*value),
            _ => self.to_u128().map(Fr::from),
        }
    }

    /// Returns the low 128 bits of an initialized cell.
    pub fn to_u128(&self) -> Option<u128> {
        match *self {
            MemoryCell::Uninitialized => None,
            MemoryCell::U1(v) => Some(v as u128),
            MemoryCell::U8(v) => Some(v as u128),
            MemoryCell::U16(v) => Some(v as u128),
            MemoryCell::U32(v) => Some(v as u128),
            MemoryCell::U64(v) => Some(v as u128),
            MemoryCell::U128(v) => Some(v),
            MemoryCell::Field(ref v) => Some(field_low_u128(v)),
        }
    }

    /// Returns the value of an integral cell, `None` for fields and
    /// uninitialized cells.
    pub fn integral_value(&self) -> Option<u128> {
        match self {
            MemoryCell::Uninitialized | MemoryCell::Field(_) => None,
            _ => self.to_u128(),
        }
    }
}

impl From<bool> for MemoryCell {
    fn from(value: bool) -> Self {
        MemoryCell::U1(value)
    }
}

impl From<u8> for MemoryCell {
    fn from(value: u8) -> Self {
        MemoryCell::U8(value)
    }
}

impl From<u16> for MemoryCell {
    fn from(value: u16) -> Self {
        MemoryCell::U16(value)
    }
}

impl From<u32> for MemoryCell {
    fn from(value: u32) -> Self {
        MemoryCell::U32(value)
    }
}

impl From<u64> for MemoryCell {
    fn from(value: u64) -> Self {
        MemoryCell::U64(value)
    }
}

impl From<u128> for MemoryCell {
    fn from(value: u128) -> Self {
        MemoryCell::U128(value)
    }
}

impl From<Fr> for MemoryCell {
    fn from(value: Fr) -> Self {
        MemoryCell::Field(value)
    }
}

/// Trait for values that can be read out of a cell carrying a specific tag.
pub trait FromMemoryCell: Sized {
    const TAG: Tag;

    fn from_cell(cell: &MemoryCell) -> Option<Self>;
}

macro_rules! impl_from_memory_cell {
    ($ty:ty, $variant:ident) => {
        impl FromMemoryCell for $ty {
            const TAG: Tag = Tag::$variant;

            fn from_cell(cell: &MemoryCell) -> Option<Self> {
                match cell {
                    MemoryCell::$variant(value) => Some(*value),
                    _ => None,
                }
            }
        }
    };
}

impl_from_memory_cell!(bool, U1);
impl_from_memory_cell!(u8, U8);
impl_from_memory_cell!(u16, U16);
impl_from_memory_cell!(u32, U32);
impl_from_memory_cell!(u64, U64);
impl_from_memory_cell!(u128, U128);
impl_from_memory_cell!(Fr, Field);

/// Low 128 bits of the canonical representative of a field element.
pub fn field_low_u128(value: &Fr) -> u128 {
    let limbs = value.into_bigint().0;
    (limbs[0] as u128) | ((limbs[1] as u128) << 64)
}

/// Big-endian 32-byte encoding of the canonical representative.
pub fn field_to_be_bytes(value: &Fr) -> [u8; 32] {
    let bytes = value.into_bigint().to_bytes_be();
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    out
}

#[cfg(test)]
mod tests {
    use num_traits::{One, Zero};

    use super::*;

    #[test]
    fn test_from_u128_truncates() {
        assert_eq!(MemoryCell::from_u128(Tag::U8, 0x1ff), MemoryCell::U8(0xff));
        assert_eq!(MemoryCell::from_u128(Tag::U1, 2), MemoryCell::U1(false));
        assert_eq!(
            MemoryCell::from_u128(Tag::U32, u64::MAX as u128),
            MemoryCell::U32(u32::MAX)
        );
        assert_eq!(
            MemoryCell::from_u128(Tag::Field, 7),
            MemoryCell::Field(Fr::from(7u64))
        );
    }

    #[test]
    fn test_field_low_bits() {
        let minus_one = -Fr::one();
        let cell = MemoryCell::from_field(Tag::U64, minus_one);
        // p - 1 for BN254 ends in ...f0000000.
        assert_eq!(cell, MemoryCell::U64(0x43e1f593f0000000));
        assert_eq!(field_low_u128(&Fr::zero()), 0);
    }

    #[test]
    fn test_to_field() {
        assert_eq!(MemoryCell::U1(true).to_field(), Some(Fr::one()));
        assert_eq!(MemoryCell::U32(12).to_field(), Some(Fr::from(12u64)));
        assert_eq!(MemoryCell::Uninitialized.to_field(), None);
        assert_eq!(MemoryCell::Field(Fr::from(3u64)).integral_value(), None);
    }

    #[test]
    fn test_field_be_bytes() {
        let bytes = field_to_be_bytes(&Fr::from(0x0102u64));
        assert_eq!(bytes[30..], [0x01, 0x02]);
        assert!(bytes[..30].iter().all(|b| *b == 0));
        assert_eq!(Fr::from_be_bytes_mod_order(&bytes), Fr::from(0x0102u64));
    }
}
