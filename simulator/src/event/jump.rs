use super::context::EventContext;
use crate::execution::ExecutionError;

/// Event for JUMP_32.
///
/// Logic:
///   1. PC = target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpEvent {
    pub pc: u32,
    pub target: u32,
}

impl JumpEvent {
    pub(crate) fn generate(ctx: &mut EventContext, target: u32) -> Result<(), ExecutionError> {
        let pc = ctx.pc;
        ctx.jump_to(target);
        ctx.record(|trace| trace.jump.push(Self { pc, target }));
        Ok(())
    }
}

/// Event for JUMPI_32.
///
/// Jumps if the condition cell is nonzero. The condition may carry any
/// integral tag.
///
/// Logic:
///   1. If MEM[cond] != 0 then PC = target, else PC = PC + 1 instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpIEvent {
    pub pc: u32,
    pub cond_addr: u32,
    pub cond: u128,
    pub target: u32,
}

impl JumpIEvent {
    pub(crate) fn generate(
        ctx: &mut EventContext,
        cond: u32,
        target: u32,
    ) -> Result<(), ExecutionError> {
        let [cond_addr] = ctx.resolve([cond])?;
        let (_, cond) = ctx.memory.get_integral(cond_addr)?;

        let pc = ctx.pc;
        if cond != 0 {
            ctx.jump_to(target);
        } else {
            ctx.incr_pc();
        }
        ctx.record(|trace| {
            trace.jumpi.push(Self {
                pc,
                cond_addr,
                cond,
                target,
            })
        });
        Ok(())
    }
}
