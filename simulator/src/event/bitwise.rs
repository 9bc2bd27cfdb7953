use super::context::EventContext;
use crate::{
    execution::ExecutionError,
    memory::{MemoryCell, Tag, TagError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitwiseOp {
    And,
    Or,
    Xor,
    Shl,
    Shr,
}

/// Event for AND, OR, XOR, SHL and SHR.
///
/// Both operands must share an integral tag. Shifting by the bit width or
/// more yields zero.
///
/// Logic:
///   1. Check that MEM[a] and MEM[b] carry the same integral tag.
///   2. MEM[dst] = MEM[a] op MEM[b], truncated to the tag's width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitwiseEvent {
    pub pc: u32,
    pub op: BitwiseOp,
    pub tag: Tag,
    pub a_addr: u32,
    pub b_addr: u32,
    pub dst_addr: u32,
    pub a: u128,
    pub b: u128,
    pub result: u128,
}

impl BitwiseEvent {
    pub(crate) fn generate(
        ctx: &mut EventContext,
        op: BitwiseOp,
        a: u32,
        b: u32,
        dst: u32,
    ) -> Result<(), ExecutionError> {
        let [a_addr, b_addr, dst_addr] = ctx.resolve([a, b, dst])?;
        let tag = ctx.memory.check_tags_are_same(a_addr, b_addr)?;
        let bits = tag.bits().ok_or(TagError::NonIntegral {
            address: a_addr,
            found: tag,
        })?;
        let (_, a) = ctx.memory.get_integral(a_addr)?;
        let (_, b) = ctx.memory.get_integral(b_addr)?;

        let raw = match op {
            BitwiseOp::And => a & b,
            BitwiseOp::Or => a | b,
            BitwiseOp::Xor => a ^ b,
            BitwiseOp::Shl if b >= bits as u128 => 0,
            BitwiseOp::Shl => a << b,
            BitwiseOp::Shr if b >= bits as u128 => 0,
            BitwiseOp::Shr => a >> b,
        };
        let cell = MemoryCell::from_u128(tag, raw);
        let result = cell.integral_value().unwrap_or_default();

        ctx.memory.set(dst_addr, cell);
        let pc = ctx.pc;
        ctx.incr_pc();
        ctx.record(|trace| {
            trace.bitwise.push(Self {
                pc,
                op,
                tag,
                a_addr,
                b_addr,
                dst_addr,
                a,
                b,
                result,
            })
        });
        Ok(())
    }
}

/// Event for NOT.
///
/// Logic:
///   1. Check that MEM[src] carries an integral tag.
///   2. MEM[dst] = !MEM[src], truncated to the tag's width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotEvent {
    pub pc: u32,
    pub tag: Tag,
    pub src_addr: u32,
    pub dst_addr: u32,
    pub src: u128,
    pub result: u128,
}

impl NotEvent {
    pub(crate) fn generate(
        ctx: &mut EventContext,
        src: u32,
        dst: u32,
    ) -> Result<(), ExecutionError> {
        let [src_addr, dst_addr] = ctx.resolve([src, dst])?;
        let (tag, src) = ctx.memory.get_integral(src_addr)?;
        let cell = MemoryCell::from_u128(tag, !src);
        let result = cell.integral_value().unwrap_or_default();

        ctx.memory.set(dst_addr, cell);
        let pc = ctx.pc;
        ctx.incr_pc();
        ctx.record(|trace| {
            trace.not.push(Self {
                pc,
                tag,
                src_addr,
                dst_addr,
                src,
                result,
            })
        });
        Ok(())
    }
}
