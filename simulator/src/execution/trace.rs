use crate::event::{
    ArithmeticEvent, BitwiseEvent, CallResultEvent, CastEvent, ComparisonEvent, DataCopyEvent,
    DebugLogEvent, ExternalCallEvent, GetEnvVarEvent, HaltEvent, InternalCallEvent,
    InternalReturnEvent, JumpEvent, JumpIEvent, MembershipCheckEvent, MovEvent, NotEvent,
    SetEvent, SideEffectEvent, StorageEvent, ToRadixBeEvent,
};

/// Events recorded while executing a frame, grouped by kind.
///
/// Nested calls keep the trace of their callee inside the
/// [`ExternalCallEvent`] that started it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionTrace {
    pub arithmetic: Vec<ArithmeticEvent>,
    pub comparison: Vec<ComparisonEvent>,
    pub bitwise: Vec<BitwiseEvent>,
    pub not: Vec<NotEvent>,
    pub cast: Vec<CastEvent>,
    pub to_radix_be: Vec<ToRadixBeEvent>,
    pub set: Vec<SetEvent>,
    pub mov: Vec<MovEvent>,
    pub get_env_var: Vec<GetEnvVarEvent>,
    pub data_copy: Vec<DataCopyEvent>,
    pub call_result: Vec<CallResultEvent>,
    pub jump: Vec<JumpEvent>,
    pub jumpi: Vec<JumpIEvent>,
    pub internal_call: Vec<InternalCallEvent>,
    pub internal_return: Vec<InternalReturnEvent>,
    pub external_call: Vec<ExternalCallEvent>,
    pub halt: Vec<HaltEvent>,
    pub storage: Vec<StorageEvent>,
    pub membership: Vec<MembershipCheckEvent>,
    pub side_effect: Vec<SideEffectEvent>,
    pub debug_log: Vec<DebugLogEvent>,

    /// Number of instructions that completed, including disabled DEBUGLOGs.
    pub steps: u64,
}

impl ExecutionTrace {
    /// Total number of recorded events in this frame, callees excluded.
    pub fn num_events(&self) -> usize {
        self.arithmetic.len()
            + self.comparison.len()
            + self.bitwise.len()
            + self.not.len()
            + self.cast.len()
            + self.to_radix_be.len()
            + self.set.len()
            + self.mov.len()
            + self.get_env_var.len()
            + self.data_copy.len()
            + self.call_result.len()
            + self.jump.len()
            + self.jumpi.len()
            + self.internal_call.len()
            + self.internal_return.len()
            + self.external_call.len()
            + self.halt.len()
            + self.storage.len()
            + self.membership.len()
            + self.side_effect.len()
            + self.debug_log.len()
    }
}
