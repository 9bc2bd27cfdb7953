use super::context::EventContext;
use crate::execution::{ControlFlowError, ExecutionError};

/// Event for INTERNALRETURN.
///
/// Logic:
///   1. Pop the internal call stack.
///   2. PC = popped return address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalReturnEvent {
    pub pc: u32,
    pub call_pc: u32,
    pub return_pc: u32,
}

impl InternalReturnEvent {
    pub(crate) fn generate(ctx: &mut EventContext) -> Result<(), ExecutionError> {
        let entry = ctx
            .internal_call_stack
            .pop()
            .ok_or(ControlFlowError::StackEmpty)?;

        let pc = ctx.pc;
        ctx.jump_to(entry.return_pc);
        ctx.record(|trace| {
            trace.internal_return.push(Self {
                pc,
                call_pc: entry.call_pc,
                return_pc: entry.return_pc,
            })
        });
        Ok(())
    }
}

/// Event for RETURN, REVERT_8 and REVERT_16.
///
/// Halts the frame with MEM[offset..offset + size] as its output. The host
/// is rolled back by the interpreter once a reverted frame ends.
///
/// Logic:
///   1. Check that MEM[size] is U32.
///   2. output = MEM[offset..offset + size], every cell lifted to FIELD.
///   3. Halt, flagging a revert for REVERT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HaltEvent {
    pub pc: u32,
    pub reverted: bool,
    pub offset_addr: u32,
    pub size: u32,
}

impl HaltEvent {
    pub(crate) fn generate(
        ctx: &mut EventContext,
        size: u32,
        offset: u32,
        reverted: bool,
    ) -> Result<(), ExecutionError> {
        let [size_addr, offset_addr] = ctx.resolve([size, offset])?;
        let size = ctx.memory.get_as::<u32>(size_addr)?;
        let output = ctx.load_fields(offset_addr, size)?;

        let pc = ctx.pc;
        ctx.halt(output, reverted);
        ctx.record(|trace| {
            trace.halt.push(Self {
                pc,
                reverted,
                offset_addr,
                size,
            })
        });
        Ok(())
    }
}
