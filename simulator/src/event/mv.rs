use ark_bn254::Fr;

use super::context::EventContext;
use crate::{
    execution::ExecutionError,
    memory::{MemoryCell, Tag},
};

/// Immediate operand of a SET instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SetValue {
    Integral(u128),
    Field(Fr),
}

/// Event for SET_8, SET_16, SET_32, SET_64, SET_128 and SET_FF.
///
/// Stores an immediate into memory, truncated to the requested tag.
///
/// Logic:
///   1. Check that `tag` is a valid tag.
///   2. MEM[dst] = tag(value)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetEvent {
    pub pc: u32,
    pub dst_addr: u32,
    pub value: MemoryCell,
}

impl SetEvent {
    pub(crate) fn generate(
        ctx: &mut EventContext,
        dst: u32,
        tag: u8,
        value: SetValue,
    ) -> Result<(), ExecutionError> {
        let [dst_addr] = ctx.resolve([dst])?;
        let tag = Tag::from_wire(tag)?;
        let value = match value {
            SetValue::Integral(value) => MemoryCell::from_u128(tag, value),
            SetValue::Field(value) => MemoryCell::from_field(tag, value),
        };

        ctx.memory.set(dst_addr, value);
        let pc = ctx.pc;
        ctx.incr_pc();
        ctx.record(|trace| {
            trace.set.push(Self {
                pc,
                dst_addr,
                value,
            })
        });
        Ok(())
    }
}

/// Event for MOV_8 and MOV_16.
///
/// Logic:
///   1. Check that MEM[src] is initialized.
///   2. MEM[dst] = MEM[src], tag included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovEvent {
    pub pc: u32,
    pub src_addr: u32,
    pub dst_addr: u32,
    pub value: MemoryCell,
}

impl MovEvent {
    pub(crate) fn generate(
        ctx: &mut EventContext,
        src: u32,
        dst: u32,
    ) -> Result<(), ExecutionError> {
        let [src_addr, dst_addr] = ctx.resolve([src, dst])?;
        let value = ctx.memory.get_initialized(src_addr)?;

        ctx.memory.set(dst_addr, value);
        let pc = ctx.pc;
        ctx.incr_pc();
        ctx.record(|trace| {
            trace.mov.push(Self {
                pc,
                src_addr,
                dst_addr,
                value,
            })
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        addressing::{Addressing, AddressingMode},
        event::test_utils::TestFrame,
        memory::TagError,
        Instruction,
    };

    #[test]
    fn test_set_truncates_to_tag() {
        let mut frame = TestFrame::new(&[]);
        frame
            .execute(Instruction::Set32 {
                indirect: 0,
                dst: 5,
                tag: Tag::U8.into(),
                value: 0x1ff,
            })
            .unwrap();
        assert_eq!(frame.state.memory.get(5), MemoryCell::U8(0xff));

        frame
            .execute(Instruction::Set128 {
                indirect: 0,
                dst: 6,
                tag: Tag::Field.into(),
                value: u128::MAX,
            })
            .unwrap();
        assert_eq!(frame.state.memory.get(6), MemoryCell::Field(Fr::from(u128::MAX)));

        frame
            .execute(Instruction::SetFF {
                indirect: 0,
                dst: 7,
                tag: Tag::U16.into(),
                value: Fr::from(0x1_0002u64),
            })
            .unwrap();
        assert_eq!(frame.state.memory.get(7), MemoryCell::U16(2));
        assert_eq!(frame.trace.set.len(), 3);
    }

    #[test]
    fn test_set_rejects_invalid_tag() {
        let mut frame = TestFrame::new(&[]);
        assert_eq!(
            frame.execute(Instruction::Set8 {
                indirect: 0,
                dst: 0,
                tag: 9,
                value: 1,
            }),
            Err(ExecutionError::Tag(TagError::InvalidTag(9)))
        );
    }

    #[test]
    fn test_mov_keeps_tag() {
        let mut frame = TestFrame::new(&[MemoryCell::U64(42)]);
        frame
            .execute(Instruction::Mov8 {
                indirect: 0,
                src: 0,
                dst: 3,
            })
            .unwrap();
        assert_eq!(frame.state.memory.get(3), MemoryCell::U64(42));

        assert_eq!(
            frame.execute(Instruction::Mov16 {
                indirect: 0,
                src: 100,
                dst: 4,
            }),
            Err(ExecutionError::Tag(TagError::Uninitialized { address: 100 }))
        );
    }

    #[test]
    fn test_mov_through_indirect_and_relative_operands() {
        // MEM[0] = base 10, MEM[1] = pointer to 20.
        let mut frame = TestFrame::new(&[MemoryCell::U32(10), MemoryCell::U32(20)]);
        frame.state.memory.set(12, MemoryCell::U8(7));

        let indirect = Addressing::from_modes(&[
            AddressingMode {
                indirect: false,
                relative: true,
            },
            AddressingMode {
                indirect: true,
                relative: false,
            },
        ])
        .to_wire() as u8;
        frame
            .execute(Instruction::Mov8 {
                indirect,
                src: 2,
                dst: 1,
            })
            .unwrap();
        assert_eq!(frame.state.memory.get(20), MemoryCell::U8(7));
        assert_eq!(frame.trace.mov[0].src_addr, 12);
        assert_eq!(frame.trace.mov[0].dst_addr, 20);
    }
}
