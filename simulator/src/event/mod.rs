//! Execution events of the AVM.
//!
//! Every executed instruction produces an event recording the values it
//! read and wrote. Each event type owns the semantics of the instructions it
//! records through its `generate` function, which validates operands, charges
//! dynamic gas, applies the instruction's effects to the frame and appends the
//! event to the frame's [`ExecutionTrace`](crate::execution::ExecutionTrace).

use context::EventContext;
use tracing::instrument;

use crate::{execution::ExecutionError, stats::cycle_counter, Instruction};

pub(crate) mod arithmetic;
pub(crate) mod bitwise;
pub(crate) mod call;
pub(crate) mod comparison;
pub(crate) mod context;
pub(crate) mod conversion;
pub(crate) mod debug_log;
pub(crate) mod environment;
pub(crate) mod jump;
pub(crate) mod mv;
pub(crate) mod ret;
pub(crate) mod world_state;

#[cfg(test)]
pub(crate) mod test_utils;

use mv::SetValue;

// Re-exports
pub use self::{
    arithmetic::{ArithmeticEvent, ArithmeticOp},
    bitwise::{BitwiseEvent, BitwiseOp, NotEvent},
    call::{ExternalCallEvent, InternalCallEvent},
    comparison::{ComparisonEvent, ComparisonOp},
    conversion::{CastEvent, ToRadixBeEvent, MAX_RADIX},
    debug_log::DebugLogEvent,
    environment::{CallResultEvent, DataCopyEvent, DataSource, GetEnvVarEvent},
    jump::{JumpEvent, JumpIEvent},
    mv::{MovEvent, SetEvent},
    ret::{HaltEvent, InternalReturnEvent},
    world_state::{
        MembershipCheckEvent, MembershipKind, SideEffectEvent, SideEffectKind, StorageEvent,
    },
};

impl Instruction {
    /// Executes this instruction against the frame held by `ctx`.
    ///
    /// The static gas of the instruction must already have been charged.
    #[instrument(level = "trace", skip(ctx), fields(pc = ctx.state.pc))]
    pub(crate) fn execute(self, ctx: &mut EventContext) -> Result<(), ExecutionError> {
        if !ctx.config.collect_stats {
            return self.dispatch(ctx);
        }
        let start = cycle_counter();
        let result = self.dispatch(ctx);
        let elapsed = cycle_counter().saturating_sub(start);
        ctx.stats.record_cycles(self.opcode(), elapsed);
        result
    }

    fn dispatch(self, ctx: &mut EventContext) -> Result<(), ExecutionError> {
        use Instruction::*;
        match self {
            Add8 { a, b, dst, .. } => {
                ArithmeticEvent::generate(ctx, ArithmeticOp::Add, a.into(), b.into(), dst.into())
            }
            Add16 { a, b, dst, .. } => {
                ArithmeticEvent::generate(ctx, ArithmeticOp::Add, a.into(), b.into(), dst.into())
            }
            Sub8 { a, b, dst, .. } => {
                ArithmeticEvent::generate(ctx, ArithmeticOp::Sub, a.into(), b.into(), dst.into())
            }
            Sub16 { a, b, dst, .. } => {
                ArithmeticEvent::generate(ctx, ArithmeticOp::Sub, a.into(), b.into(), dst.into())
            }
            Mul8 { a, b, dst, .. } => {
                ArithmeticEvent::generate(ctx, ArithmeticOp::Mul, a.into(), b.into(), dst.into())
            }
            Mul16 { a, b, dst, .. } => {
                ArithmeticEvent::generate(ctx, ArithmeticOp::Mul, a.into(), b.into(), dst.into())
            }
            Div8 { a, b, dst, .. } => {
                ArithmeticEvent::generate(ctx, ArithmeticOp::Div, a.into(), b.into(), dst.into())
            }
            Div16 { a, b, dst, .. } => {
                ArithmeticEvent::generate(ctx, ArithmeticOp::Div, a.into(), b.into(), dst.into())
            }
            FDiv8 { a, b, dst, .. } => {
                ArithmeticEvent::generate(ctx, ArithmeticOp::FDiv, a.into(), b.into(), dst.into())
            }
            FDiv16 { a, b, dst, .. } => {
                ArithmeticEvent::generate(ctx, ArithmeticOp::FDiv, a.into(), b.into(), dst.into())
            }

            Eq8 { a, b, dst, .. } => {
                ComparisonEvent::generate(ctx, ComparisonOp::Eq, a.into(), b.into(), dst.into())
            }
            Eq16 { a, b, dst, .. } => {
                ComparisonEvent::generate(ctx, ComparisonOp::Eq, a.into(), b.into(), dst.into())
            }
            Lt8 { a, b, dst, .. } => {
                ComparisonEvent::generate(ctx, ComparisonOp::Lt, a.into(), b.into(), dst.into())
            }
            Lt16 { a, b, dst, .. } => {
                ComparisonEvent::generate(ctx, ComparisonOp::Lt, a.into(), b.into(), dst.into())
            }
            Lte8 { a, b, dst, .. } => {
                ComparisonEvent::generate(ctx, ComparisonOp::Lte, a.into(), b.into(), dst.into())
            }
            Lte16 { a, b, dst, .. } => {
                ComparisonEvent::generate(ctx, ComparisonOp::Lte, a.into(), b.into(), dst.into())
            }

            And8 { a, b, dst, .. } => {
                BitwiseEvent::generate(ctx, BitwiseOp::And, a.into(), b.into(), dst.into())
            }
            And16 { a, b, dst, .. } => {
                BitwiseEvent::generate(ctx, BitwiseOp::And, a.into(), b.into(), dst.into())
            }
            Or8 { a, b, dst, .. } => {
                BitwiseEvent::generate(ctx, BitwiseOp::Or, a.into(), b.into(), dst.into())
            }
            Or16 { a, b, dst, .. } => {
                BitwiseEvent::generate(ctx, BitwiseOp::Or, a.into(), b.into(), dst.into())
            }
            Xor8 { a, b, dst, .. } => {
                BitwiseEvent::generate(ctx, BitwiseOp::Xor, a.into(), b.into(), dst.into())
            }
            Xor16 { a, b, dst, .. } => {
                BitwiseEvent::generate(ctx, BitwiseOp::Xor, a.into(), b.into(), dst.into())
            }
            Not8 { src, dst, .. } => NotEvent::generate(ctx, src.into(), dst.into()),
            Not16 { src, dst, .. } => NotEvent::generate(ctx, src.into(), dst.into()),
            Shl8 { a, b, dst, .. } => {
                BitwiseEvent::generate(ctx, BitwiseOp::Shl, a.into(), b.into(), dst.into())
            }
            Shl16 { a, b, dst, .. } => {
                BitwiseEvent::generate(ctx, BitwiseOp::Shl, a.into(), b.into(), dst.into())
            }
            Shr8 { a, b, dst, .. } => {
                BitwiseEvent::generate(ctx, BitwiseOp::Shr, a.into(), b.into(), dst.into())
            }
            Shr16 { a, b, dst, .. } => {
                BitwiseEvent::generate(ctx, BitwiseOp::Shr, a.into(), b.into(), dst.into())
            }

            Cast8 { src, dst, tag, .. } => CastEvent::generate(ctx, src.into(), dst.into(), tag),
            Cast16 { src, dst, tag, .. } => CastEvent::generate(ctx, src.into(), dst.into(), tag),

            GetEnvVar16 { dst, var, .. } => GetEnvVarEvent::generate(ctx, dst.into(), var),
            CalldataCopy {
                copy_size,
                cd_start,
                dst,
                ..
            } => DataCopyEvent::generate(
                ctx,
                DataSource::Calldata,
                copy_size.into(),
                cd_start.into(),
                dst.into(),
            ),
            SuccessCopy { dst, .. } => CallResultEvent::generate_success_copy(ctx, dst.into()),
            ReturndataSize { dst, .. } => {
                CallResultEvent::generate_returndata_size(ctx, dst.into())
            }
            ReturndataCopy {
                copy_size,
                rd_start,
                dst,
                ..
            } => DataCopyEvent::generate(
                ctx,
                DataSource::ReturnData,
                copy_size.into(),
                rd_start.into(),
                dst.into(),
            ),

            Jump32 { target } => JumpEvent::generate(ctx, target),
            JumpI32 { cond, target, .. } => JumpIEvent::generate(ctx, cond.into(), target),
            InternalCall { target } => InternalCallEvent::generate(ctx, target),
            InternalReturn {} => InternalReturnEvent::generate(ctx),

            Set8 { dst, tag, value, .. } => {
                SetEvent::generate(ctx, dst.into(), tag, SetValue::Integral(value.into()))
            }
            Set16 { dst, tag, value, .. } => {
                SetEvent::generate(ctx, dst.into(), tag, SetValue::Integral(value.into()))
            }
            Set32 { dst, tag, value, .. } => {
                SetEvent::generate(ctx, dst.into(), tag, SetValue::Integral(value.into()))
            }
            Set64 { dst, tag, value, .. } => {
                SetEvent::generate(ctx, dst.into(), tag, SetValue::Integral(value.into()))
            }
            Set128 { dst, tag, value, .. } => {
                SetEvent::generate(ctx, dst.into(), tag, SetValue::Integral(value))
            }
            SetFF { dst, tag, value, .. } => {
                SetEvent::generate(ctx, dst.into(), tag, SetValue::Field(value))
            }
            Mov8 { src, dst, .. } => MovEvent::generate(ctx, src.into(), dst.into()),
            Mov16 { src, dst, .. } => MovEvent::generate(ctx, src.into(), dst.into()),

            SLoad { slot, dst, .. } => StorageEvent::generate_load(ctx, slot.into(), dst.into()),
            SStore { src, slot, .. } => {
                StorageEvent::generate_store(ctx, src.into(), slot.into())
            }

            NoteHashExists {
                note_hash,
                leaf_index,
                dst,
                ..
            } => MembershipCheckEvent::generate(
                ctx,
                MembershipKind::NoteHash,
                note_hash.into(),
                leaf_index.into(),
                dst.into(),
            ),
            EmitNoteHash { note_hash, .. } => {
                SideEffectEvent::generate_note_hash(ctx, note_hash.into())
            }
            NullifierExists {
                nullifier,
                address,
                dst,
                ..
            } => MembershipCheckEvent::generate(
                ctx,
                MembershipKind::Nullifier,
                nullifier.into(),
                address.into(),
                dst.into(),
            ),
            EmitNullifier { nullifier, .. } => {
                SideEffectEvent::generate_nullifier(ctx, nullifier.into())
            }
            L1ToL2MsgExists {
                msg_hash,
                leaf_index,
                dst,
                ..
            } => MembershipCheckEvent::generate(
                ctx,
                MembershipKind::L1ToL2Message,
                msg_hash.into(),
                leaf_index.into(),
                dst.into(),
            ),
            EmitUnencryptedLog { log, log_size, .. } => {
                SideEffectEvent::generate_unencrypted_log(ctx, log.into(), log_size.into())
            }
            SendL2ToL1Msg {
                recipient, content, ..
            } => SideEffectEvent::generate_l2_to_l1_message(ctx, recipient.into(), content.into()),

            Call {
                l2_gas,
                da_gas,
                addr,
                args_size,
                args,
                ..
            } => ExternalCallEvent::generate(
                ctx,
                false,
                l2_gas.into(),
                da_gas.into(),
                addr.into(),
                args_size.into(),
                args.into(),
            ),
            StaticCall {
                l2_gas,
                da_gas,
                addr,
                args_size,
                args,
                ..
            } => ExternalCallEvent::generate(
                ctx,
                true,
                l2_gas.into(),
                da_gas.into(),
                addr.into(),
                args_size.into(),
                args.into(),
            ),
            Return { size, offset, .. } => {
                HaltEvent::generate(ctx, size.into(), offset.into(), false)
            }
            Revert8 { size, offset, .. } => {
                HaltEvent::generate(ctx, size.into(), offset.into(), true)
            }
            Revert16 { size, offset, .. } => {
                HaltEvent::generate(ctx, size.into(), offset.into(), true)
            }

            DebugLog {
                message,
                fields,
                fields_size,
                message_size,
                ..
            } => DebugLogEvent::generate(
                ctx,
                message.into(),
                fields.into(),
                fields_size.into(),
                message_size,
            ),

            ToRadixBE {
                src,
                radix,
                num_limbs,
                output_bits,
                dst,
                ..
            } => ToRadixBeEvent::generate(
                ctx,
                src.into(),
                radix.into(),
                num_limbs.into(),
                output_bits.into(),
                dst.into(),
            ),
        }
    }
}
