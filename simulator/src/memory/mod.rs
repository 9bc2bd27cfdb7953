mod error;
mod tag;
mod value;

use ahash::AHashMap;
pub use error::{MemoryError, TagError};
pub use tag::Tag;
pub use value::{field_low_u128, field_to_be_bytes, FromMemoryCell, MemoryCell};

/// Number of addressable cells in a frame's memory.
pub const MAX_MEMORY_SIZE: u64 = 1 << 32;

/// The tagged memory of one call frame.
///
/// Memory is sparse: only written cells are stored, every other address reads
/// as [`MemoryCell::Uninitialized`]. Addresses are `u32`, so every address is
/// in range; range checks only matter for slices and relative addressing.
#[derive(Debug, Default, Clone)]
pub struct Memory {
    cells: AHashMap<u32, MemoryCell>,
}

impl Memory {
    /// Initializes an empty memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Initializes a memory whose first cells hold the provided values.
    pub fn new_with_init_vals(values: &[MemoryCell]) -> Self {
        let mut memory = Self::default();
        for (addr, value) in values.iter().enumerate() {
            memory.set(addr as u32, *value);
        }
        memory
    }

    /// Returns the cell at `addr`.
    pub fn get(&self, addr: u32) -> MemoryCell {
        self.cells.get(&addr).copied().unwrap_or_default()
    }

    /// Returns the tag of the cell at `addr`.
    pub fn tag(&self, addr: u32) -> Tag {
        self.get(addr).tag()
    }

    /// Returns the cell at `addr`, failing if it was never written.
    pub fn get_initialized(&self, addr: u32) -> Result<MemoryCell, TagError> {
        let cell = self.get(addr);
        if !cell.is_initialized() {
            return Err(TagError::Uninitialized { address: addr });
        }
        Ok(cell)
    }

    /// Reads a value of type `T`, failing if the stored tag is not `T::TAG`.
    pub fn get_as<T: FromMemoryCell>(&self, addr: u32) -> Result<T, TagError> {
        let cell = self.get_initialized(addr)?;
        T::from_cell(&cell).ok_or(TagError::TagMismatch {
            address: addr,
            expected: T::TAG,
            found: cell.tag(),
        })
    }

    /// Reads the value of an integral cell, rejecting fields.
    pub fn get_integral(&self, addr: u32) -> Result<(Tag, u128), TagError> {
        let cell = self.get_initialized(addr)?;
        match cell.integral_value() {
            Some(value) => Ok((cell.tag(), value)),
            None => Err(TagError::NonIntegral {
                address: addr,
                found: cell.tag(),
            }),
        }
    }

    /// Writes a cell at `addr`.
    pub fn set(&mut self, addr: u32, cell: MemoryCell) {
        match cell {
            MemoryCell::Uninitialized => self.cells.remove(&addr),
            _ => self.cells.insert(addr, cell),
        };
    }

    /// Writes consecutive cells starting at `addr`.
    ///
    /// Nothing is written if the slice does not fit in the address space.
    pub fn set_slice(&mut self, addr: u32, cells: &[MemoryCell]) -> Result<(), MemoryError> {
        Self::check_range(addr, cells.len() as u64)?;
        for (i, cell) in cells.iter().enumerate() {
            self.set(addr + i as u32, *cell);
        }
        Ok(())
    }

    /// Reads `len` consecutive cells starting at `addr`.
    pub fn get_slice(&self, addr: u32, len: u32) -> Result<Vec<MemoryCell>, MemoryError> {
        Self::check_range(addr, len as u64)?;
        Ok((0..len).map(|i| self.get(addr + i)).collect())
    }

    /// Checks that `len` cells starting at `addr` are all addressable.
    pub fn check_range(addr: u32, len: u64) -> Result<(), MemoryError> {
        if addr as u64 + len > MAX_MEMORY_SIZE {
            return Err(MemoryError::SliceOutOfRange { start: addr, len });
        }
        Ok(())
    }

    /// Checks that the cell at `addr` carries the `expected` tag.
    pub fn check_tag(&self, expected: Tag, addr: u32) -> Result<(), TagError> {
        let found = self.tag(addr);
        if found == Tag::Uninitialized {
            return Err(TagError::Uninitialized { address: addr });
        }
        if found != expected {
            return Err(TagError::TagMismatch {
                address: addr,
                expected,
                found,
            });
        }
        Ok(())
    }

    /// Checks that every cell in `addrs` carries the `expected` tag.
    pub fn check_tags(&self, expected: Tag, addrs: &[u32]) -> Result<(), TagError> {
        addrs
            .iter()
            .try_for_each(|addr| self.check_tag(expected, *addr))
    }

    /// Checks that the cells at `a` and `b` carry the same tag.
    ///
    /// Returns the common tag.
    pub fn check_tags_are_same(&self, a: u32, b: u32) -> Result<Tag, TagError> {
        let tag_a = self.get_initialized(a)?.tag();
        self.check_tag(tag_a, b)?;
        Ok(tag_a)
    }

    /// Checks that `addr` holds a value usable as a memory offset.
    pub fn check_is_valid_memory_offset_tag(&self, addr: u32) -> Result<(), TagError> {
        self.check_tag(Tag::U32, addr)
    }

    /// Number of initialized cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
