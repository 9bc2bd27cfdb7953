use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{Display, EnumCount, EnumIter};

use super::TagError;

/// Type discriminant attached to every memory cell.
///
/// The discriminants of the initialized tags are their wire values, as they
/// appear in the `tag` operand of `SET` and `CAST`. `Uninitialized` only ever
/// exists in memory and has no wire representation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumCount,
    EnumIter,
    TryFromPrimitive,
    IntoPrimitive,
)]
#[repr(u8)]
pub enum Tag {
    #[strum(serialize = "FIELD")]
    Field = 0,
    #[strum(serialize = "UINT1")]
    U1 = 1,
    #[strum(serialize = "UINT8")]
    U8 = 2,
    #[strum(serialize = "UINT16")]
    U16 = 3,
    #[strum(serialize = "UINT32")]
    U32 = 4,
    #[strum(serialize = "UINT64")]
    U64 = 5,
    #[strum(serialize = "UINT128")]
    U128 = 6,
    #[strum(serialize = "UNINITIALIZED")]
    Uninitialized = 7,
}

impl Tag {
    /// Highest tag value accepted on the wire.
    pub const MAX_WIRE_TAG: u8 = Tag::U128 as u8;

    /// Parses a tag operand. `Uninitialized` cannot be requested by a program.
    pub fn from_wire(byte: u8) -> Result<Self, TagError> {
        if byte > Self::MAX_WIRE_TAG {
            return Err(TagError::InvalidTag(byte));
        }
        Tag::try_from(byte).map_err(|_| TagError::InvalidTag(byte))
    }

    /// Bit-width of an integral tag, `None` for `Field` and `Uninitialized`.
    pub const fn bits(self) -> Option<u32> {
        match self {
            Tag::U1 => Some(1),
            Tag::U8 => Some(8),
            Tag::U16 => Some(16),
            Tag::U32 => Some(32),
            Tag::U64 => Some(64),
            Tag::U128 => Some(128),
            Tag::Field | Tag::Uninitialized => None,
        }
    }

    pub const fn is_integral(self) -> bool {
        self.bits().is_some()
    }

    /// Mask selecting the representable bits of an integral tag.
    pub const fn mask(self) -> Option<u128> {
        match self.bits() {
            Some(128) => Some(u128::MAX),
            Some(bits) => Some((1u128 << bits) - 1),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_wire_tags() {
        for tag in Tag::iter().filter(|t| *t != Tag::Uninitialized) {
            assert_eq!(Tag::from_wire(tag.into()).unwrap(), tag);
        }
        assert!(matches!(
            Tag::from_wire(Tag::Uninitialized as u8),
            Err(TagError::InvalidTag(7))
        ));
        assert!(matches!(Tag::from_wire(42), Err(TagError::InvalidTag(42))));
    }

    #[test]
    fn test_masks() {
        assert_eq!(Tag::U1.mask(), Some(1));
        assert_eq!(Tag::U8.mask(), Some(0xff));
        assert_eq!(Tag::U128.mask(), Some(u128::MAX));
        assert_eq!(Tag::Field.mask(), None);
        assert!(!Tag::Uninitialized.is_integral());
    }
}
