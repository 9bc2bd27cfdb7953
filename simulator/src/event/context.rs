use std::ops::{Deref, DerefMut};

use ark_bn254::Fr;

use crate::{
    addressing::Addressing,
    config::SimulatorConfig,
    environment::ExecutionEnvironment,
    execution::{ExecutionError, ExecutionTrace, MachineState},
    host::Host,
    memory::{Memory, TagError},
    stats::AllCycleStats,
};

/// Everything an instruction may read or modify while it executes.
pub(crate) struct EventContext<'a> {
    pub state: &'a mut MachineState,
    pub env: &'a ExecutionEnvironment,
    pub host: &'a mut dyn Host,
    pub config: &'a SimulatorConfig,
    pub trace: &'a mut ExecutionTrace,
    pub stats: &'a mut AllCycleStats,
    /// Nesting depth of the current frame, 0 for the top-level call.
    pub depth: usize,
    pub addressing: Addressing,
    /// Byte offset of the instruction following the current one.
    pub next_pc: u32,
}

impl<'a> EventContext<'a> {
    /// Resolves the instruction's memory-offset operands, in order.
    pub fn resolve<const N: usize>(&self, offsets: [u32; N]) -> Result<[u32; N], ExecutionError> {
        let resolved = self.addressing.resolve(&offsets, &self.state.memory)?;
        let mut addrs = [0u32; N];
        addrs.copy_from_slice(&resolved);
        Ok(addrs)
    }

    pub fn incr_pc(&mut self) {
        self.state.pc = self.next_pc;
    }

    pub fn jump_to(&mut self, target: u32) {
        self.state.pc = target;
    }

    /// Fails if the frame runs in a static context.
    pub fn ensure_mutable(&self) -> Result<(), ExecutionError> {
        if self.env.is_static_call {
            return Err(ExecutionError::StaticCallAlteration);
        }
        Ok(())
    }

    /// Reads `len` initialized cells starting at `addr`, each lifted into the
    /// field.
    pub fn load_fields(&self, addr: u32, len: u32) -> Result<Vec<Fr>, ExecutionError> {
        load_fields(&self.state.memory, addr, len)
    }

    /// Appends an event to the trace if tracing is enabled.
    pub fn record(&mut self, push: impl FnOnce(&mut ExecutionTrace)) {
        if self.config.collect_trace {
            push(&mut *self.trace);
        }
    }
}

pub(crate) fn load_fields(memory: &Memory, addr: u32, len: u32) -> Result<Vec<Fr>, ExecutionError> {
    Memory::check_range(addr, len as u64)?;
    (0..len)
        .map(|i| {
            let address = addr + i;
            memory
                .get(address)
                .to_field()
                .ok_or(ExecutionError::Tag(TagError::Uninitialized { address }))
        })
        .collect()
}

impl Deref for EventContext<'_> {
    type Target = MachineState;

    fn deref(&self) -> &Self::Target {
        self.state
    }
}

impl DerefMut for EventContext<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.state
    }
}
