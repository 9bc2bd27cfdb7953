//! Events that reach outside the frame through the [`Host`](crate::Host).

use ark_bn254::Fr;

use super::context::EventContext;
use crate::{execution::ExecutionError, memory::MemoryCell, OpcodeFamily};

/// Event for SLOAD and SSTORE.
///
/// Storage is keyed by the frame's storage address.
///
/// Logic (SLOAD):
///   1. Check that MEM[slot] is FIELD.
///   2. MEM[dst] = storage[slot]
///
/// Logic (SSTORE):
///   1. Check that the frame is not static.
///   2. Check that MEM[src] and MEM[slot] are FIELD.
///   3. storage[slot] = MEM[src]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub pc: u32,
    pub is_write: bool,
    pub contract: Fr,
    pub slot: Fr,
    pub value: Fr,
}

impl StorageEvent {
    pub(crate) fn generate_load(
        ctx: &mut EventContext,
        slot: u32,
        dst: u32,
    ) -> Result<(), ExecutionError> {
        let [slot_addr, dst_addr] = ctx.resolve([slot, dst])?;
        let slot = ctx.memory.get_as::<Fr>(slot_addr)?;

        let contract = ctx.env.storage_address;
        let value = ctx.host.storage_read(contract, slot);
        ctx.memory.set(dst_addr, MemoryCell::Field(value));
        Self::finish(ctx, false, contract, slot, value);
        Ok(())
    }

    pub(crate) fn generate_store(
        ctx: &mut EventContext,
        src: u32,
        slot: u32,
    ) -> Result<(), ExecutionError> {
        ctx.ensure_mutable()?;
        let [src_addr, slot_addr] = ctx.resolve([src, slot])?;
        let value = ctx.memory.get_as::<Fr>(src_addr)?;
        let slot = ctx.memory.get_as::<Fr>(slot_addr)?;

        let contract = ctx.env.storage_address;
        ctx.host.storage_write(contract, slot, value);
        Self::finish(ctx, true, contract, slot, value);
        Ok(())
    }

    fn finish(ctx: &mut EventContext, is_write: bool, contract: Fr, slot: Fr, value: Fr) {
        let pc = ctx.pc;
        ctx.incr_pc();
        ctx.record(|trace| {
            trace.storage.push(Self {
                pc,
                is_write,
                contract,
                slot,
                value,
            })
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipKind {
    NoteHash,
    Nullifier,
    L1ToL2Message,
}

/// Event for NOTEHASHEXISTS, NULLIFIEREXISTS and L1TOL2MSGEXISTS.
///
/// Logic:
///   1. Check the tags: the queried value FIELD, the leaf index U64 (an
///      address FIELD for nullifiers).
///   2. MEM[dst] = U1(exists)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipCheckEvent {
    pub pc: u32,
    pub kind: MembershipKind,
    pub value: Fr,
    pub dst_addr: u32,
    pub exists: bool,
    /// Value found by the host at the queried position.
    pub leaf: Fr,
}

impl MembershipCheckEvent {
    pub(crate) fn generate(
        ctx: &mut EventContext,
        kind: MembershipKind,
        value: u32,
        position: u32,
        dst: u32,
    ) -> Result<(), ExecutionError> {
        let [value_addr, position_addr, dst_addr] = ctx.resolve([value, position, dst])?;
        let value = ctx.memory.get_as::<Fr>(value_addr)?;

        let (exists, leaf) = match kind {
            MembershipKind::NoteHash => {
                let leaf_index = ctx.memory.get_as::<u64>(position_addr)?;
                ctx.host.note_hash_exists(value, leaf_index)
            }
            MembershipKind::Nullifier => {
                let contract = ctx.memory.get_as::<Fr>(position_addr)?;
                ctx.host.nullifier_exists(contract, value)
            }
            MembershipKind::L1ToL2Message => {
                let leaf_index = ctx.memory.get_as::<u64>(position_addr)?;
                ctx.host.l1_to_l2_message_exists(value, leaf_index)
            }
        };

        ctx.memory.set(dst_addr, MemoryCell::U1(exists));
        let pc = ctx.pc;
        ctx.incr_pc();
        ctx.record(|trace| {
            trace.membership.push(Self {
                pc,
                kind,
                value,
                dst_addr,
                exists,
                leaf,
            })
        });
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffectKind {
    NoteHash,
    Nullifier,
    UnencryptedLog,
    L2ToL1Message,
}

/// Event for EMITNOTEHASH, EMITNULLIFIER, EMITUNENCRYPTEDLOG and
/// SENDL2TOL1MSG.
///
/// Side effects are attributed to the executing contract and are rejected in
/// static frames.
///
/// Logic:
///   1. Check that the frame is not static.
///   2. Check the operand tags (FIELD, U32 for the log size).
///   3. Charge the dynamic gas of a log.
///   4. Hand the side effect to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideEffectEvent {
    pub pc: u32,
    pub kind: SideEffectKind,
    pub contract: Fr,
    pub fields: Vec<Fr>,
}

impl SideEffectEvent {
    pub(crate) fn generate_note_hash(
        ctx: &mut EventContext,
        note_hash: u32,
    ) -> Result<(), ExecutionError> {
        ctx.ensure_mutable()?;
        let [note_hash_addr] = ctx.resolve([note_hash])?;
        let note_hash = ctx.memory.get_as::<Fr>(note_hash_addr)?;

        let contract = ctx.env.address;
        ctx.host.emit_note_hash(contract, note_hash);
        Self::finish(ctx, SideEffectKind::NoteHash, contract, vec![note_hash]);
        Ok(())
    }

    pub(crate) fn generate_nullifier(
        ctx: &mut EventContext,
        nullifier: u32,
    ) -> Result<(), ExecutionError> {
        ctx.ensure_mutable()?;
        let [nullifier_addr] = ctx.resolve([nullifier])?;
        let nullifier = ctx.memory.get_as::<Fr>(nullifier_addr)?;

        let contract = ctx.env.address;
        ctx.host.emit_nullifier(contract, nullifier)?;
        Self::finish(ctx, SideEffectKind::Nullifier, contract, vec![nullifier]);
        Ok(())
    }

    pub(crate) fn generate_unencrypted_log(
        ctx: &mut EventContext,
        log: u32,
        log_size: u32,
    ) -> Result<(), ExecutionError> {
        ctx.ensure_mutable()?;
        let [log_addr, log_size_addr] = ctx.resolve([log, log_size])?;
        let log_size = ctx.memory.get_as::<u32>(log_size_addr)?;
        ctx.consume_dynamic_gas(OpcodeFamily::EmitUnencryptedLog, log_size as u64)?;
        let fields = ctx.load_fields(log_addr, log_size)?;

        let contract = ctx.env.address;
        ctx.host.emit_unencrypted_log(contract, fields.clone());
        Self::finish(ctx, SideEffectKind::UnencryptedLog, contract, fields);
        Ok(())
    }

    pub(crate) fn generate_l2_to_l1_message(
        ctx: &mut EventContext,
        recipient: u32,
        content: u32,
    ) -> Result<(), ExecutionError> {
        ctx.ensure_mutable()?;
        let [recipient_addr, content_addr] = ctx.resolve([recipient, content])?;
        let recipient = ctx.memory.get_as::<Fr>(recipient_addr)?;
        let content = ctx.memory.get_as::<Fr>(content_addr)?;

        let contract = ctx.env.address;
        ctx.host.send_l2_to_l1_message(contract, recipient, content);
        Self::finish(
            ctx,
            SideEffectKind::L2ToL1Message,
            contract,
            vec![recipient, content],
        );
        Ok(())
    }

    fn finish(ctx: &mut EventContext, kind: SideEffectKind, contract: Fr, fields: Vec<Fr>) {
        let pc = ctx.pc;
        ctx.incr_pc();
        ctx.record(|trace| {
            trace.side_effect.push(Self {
                pc,
                kind,
                contract,
                fields,
            })
        });
    }
}
