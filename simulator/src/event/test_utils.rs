use crate::{
    addressing::Addressing,
    config::SimulatorConfig,
    environment::ExecutionEnvironment,
    execution::{ExecutionError, ExecutionTrace, MachineState},
    gas::Gas,
    host::InMemoryHost,
    memory::{Memory, MemoryCell},
    stats::AllCycleStats,
    Instruction,
};

use super::context::EventContext;

/// A single frame for exercising instructions one at a time, without a
/// program or static gas.
pub(crate) struct TestFrame {
    pub state: MachineState,
    pub env: ExecutionEnvironment,
    pub host: InMemoryHost,
    pub config: SimulatorConfig,
    pub trace: ExecutionTrace,
    pub stats: AllCycleStats,
    pub depth: usize,
}

impl TestFrame {
    /// Creates a frame whose memory starts with `init` at address 0.
    pub fn new(init: &[MemoryCell]) -> Self {
        let state = MachineState::new(Gas::new(u32::MAX, u32::MAX))
            .with_memory(Memory::new_with_init_vals(init));
        Self {
            state,
            env: ExecutionEnvironment::default(),
            host: InMemoryHost::new(),
            config: SimulatorConfig::default(),
            trace: ExecutionTrace::default(),
            stats: AllCycleStats::new(),
            depth: 0,
        }
    }

    pub fn with_env(mut self, env: ExecutionEnvironment) -> Self {
        self.env = env;
        self
    }

    pub fn with_host(mut self, host: InMemoryHost) -> Self {
        self.host = host;
        self
    }

    pub fn with_config(mut self, config: SimulatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Executes `instruction` at the current pc.
    pub fn execute(&mut self, instruction: Instruction) -> Result<(), ExecutionError> {
        let opcode = instruction.opcode();
        let next_pc = self.state.pc + instruction.size() as u32;
        let mut ctx = EventContext {
            state: &mut self.state,
            env: &self.env,
            host: &mut self.host,
            config: &self.config,
            trace: &mut self.trace,
            stats: &mut self.stats,
            depth: self.depth,
            addressing: Addressing::from_wire(
                instruction.indirect(),
                opcode.num_address_operands(),
            ),
            next_pc,
        };
        instruction.execute(&mut ctx)
    }
}
