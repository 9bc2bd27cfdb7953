use ark_bn254::Fr;
use tracing::{debug, info_span, trace};

use super::{ControlFlowError, ExecutionError, ExecutionTrace, MachineState};
use crate::{
    addressing::Addressing,
    config::SimulatorConfig,
    environment::ExecutionEnvironment,
    event::context::EventContext,
    gas::{charge, Gas},
    host::Host,
    serialization::{decode_program, CodecError, Program},
    stats::AllCycleStats,
};

/// Outcome of a frame.
///
/// A frame that faults is reported like a revert with no output that used
/// all of its gas; the fault is kept in `reverted_reason`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameResult {
    pub success: bool,
    pub reverted_reason: Option<ExecutionError>,
    pub output: Vec<Fr>,
    pub l2_gas_used: u64,
    pub da_gas_used: u64,
    pub trace: ExecutionTrace,
}

impl FrameResult {
    /// A frame that failed without running, consuming everything it was
    /// given.
    pub(crate) fn exceptional_halt(allocated: Gas) -> Self {
        Self {
            success: false,
            reverted_reason: None,
            output: Vec::new(),
            l2_gas_used: allocated.l2 as u64,
            da_gas_used: allocated.da as u64,
            trace: ExecutionTrace::default(),
        }
    }

    pub fn reverted(&self) -> bool {
        !self.success
    }
}

/// A frame in flight: the program it runs, its environment and its state.
#[derive(Debug)]
pub struct Frame<'p> {
    pub program: &'p Program,
    pub env: ExecutionEnvironment,
    pub state: MachineState,
    pub trace: ExecutionTrace,
}

impl<'p> Frame<'p> {
    pub fn new(program: &'p Program, env: ExecutionEnvironment, gas: Gas) -> Self {
        Self {
            program,
            env,
            state: MachineState::new(gas),
            trace: ExecutionTrace::default(),
        }
    }

    pub fn is_halted(&self) -> bool {
        self.state.halted
    }
}

/// Runs frames against a [`Host`].
///
/// Nested calls create a new interpreter on the same host, one level
/// deeper, and merge its statistics back once the callee returns.
pub struct Interpreter<'h> {
    host: &'h mut dyn Host,
    config: SimulatorConfig,
    depth: usize,
    stats: AllCycleStats,
}

impl<'h> Interpreter<'h> {
    pub fn new(host: &'h mut dyn Host, config: SimulatorConfig) -> Self {
        Self::nested(host, config, 0)
    }

    pub(crate) fn nested(host: &'h mut dyn Host, config: SimulatorConfig, depth: usize) -> Self {
        Self {
            host,
            config,
            depth,
            stats: AllCycleStats::new(),
        }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn stats(&self) -> &AllCycleStats {
        &self.stats
    }

    /// Decodes `bytecode` and runs it as a single frame.
    ///
    /// Only a decoding failure is returned as an error; runtime faults are
    /// part of the [`FrameResult`].
    pub fn execute(
        &mut self,
        bytecode: &[u8],
        env: ExecutionEnvironment,
        gas: Gas,
    ) -> Result<FrameResult, CodecError> {
        let program = decode_program(bytecode)?;
        Ok(self.execute_program(&program, env, gas))
    }

    /// Runs an already decoded program as a single frame.
    ///
    /// The host is rolled back to its state at entry if the frame reverts or
    /// faults.
    pub fn execute_program(
        &mut self,
        program: &Program,
        env: ExecutionEnvironment,
        gas: Gas,
    ) -> FrameResult {
        let span = info_span!(
            "frame",
            depth = self.depth,
            address = %env.address,
            is_static = env.is_static_call,
        );
        let _guard = span.enter();

        let checkpoint = self.host.checkpoint();
        let mut frame = Frame::new(program, env, gas);
        let outcome = self.run(&mut frame);

        let Frame { state, trace, .. } = frame;
        match outcome {
            Ok(()) => {
                let success = !state.reverted;
                if !success {
                    self.host.rollback(checkpoint);
                }
                let (l2_gas_left, da_gas_left) = state.gas_left();
                let l2_gas_used = gas.l2 as u64 - l2_gas_left;
                let da_gas_used = gas.da as u64 - da_gas_left;
                debug!(success, l2_gas_used, da_gas_used, steps = trace.steps, "frame halted");
                FrameResult {
                    success,
                    reverted_reason: None,
                    output: state.output,
                    l2_gas_used,
                    da_gas_used,
                    trace,
                }
            }
            Err(err) => {
                debug!(%err, pc = state.pc, steps = trace.steps, "frame faulted");
                self.host.rollback(checkpoint);
                FrameResult {
                    success: false,
                    reverted_reason: Some(err),
                    output: Vec::new(),
                    l2_gas_used: gas.l2 as u64,
                    da_gas_used: gas.da as u64,
                    trace,
                }
            }
        }
    }

    /// Steps `frame` until it halts or faults.
    pub fn run(&mut self, frame: &mut Frame) -> Result<(), ExecutionError> {
        while self.step(frame)?.is_some() {}
        Ok(())
    }

    /// Executes the instruction at the frame's pc.
    ///
    /// Returns `None` once the frame has halted.
    pub fn step(&mut self, frame: &mut Frame) -> Result<Option<()>, ExecutionError> {
        if frame.is_halted() {
            return Ok(None);
        }

        let pc = frame.state.pc;
        let instruction = *frame
            .program
            .instruction_at(pc)
            .ok_or(ControlFlowError::InvalidProgramCounter { pc })?;
        let opcode = instruction.opcode();
        let addressing =
            Addressing::from_wire(instruction.indirect(), opcode.num_address_operands());
        frame.state.consume_gas(charge(opcode, &addressing))?;
        trace!(pc, %opcode, "step");

        let mut ctx = EventContext {
            state: &mut frame.state,
            env: &frame.env,
            host: &mut *self.host,
            config: &self.config,
            trace: &mut frame.trace,
            stats: &mut self.stats,
            depth: self.depth,
            addressing,
            next_pc: pc + instruction.size() as u32,
        };
        instruction.execute(&mut ctx)?;
        frame.trace.steps += 1;

        if frame.is_halted() {
            Ok(None)
        } else {
            Ok(Some(()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{gas::base_cost, host::InMemoryHost, memory::Tag, Instruction, OpcodeFamily};

    fn set32(dst: u16, value: u32) -> Instruction {
        Instruction::Set32 {
            indirect: 0,
            dst,
            tag: Tag::U32.into(),
            value,
        }
    }

    #[test]
    fn test_gas_used_on_return() {
        let program = Program::from_instructions([
            set32(0, 0),
            Instruction::Return {
                indirect: 0,
                size: 0,
                offset: 0,
            },
        ]);
        let mut host = InMemoryHost::new();
        let mut interpreter = Interpreter::new(&mut host, SimulatorConfig::default());
        let result = interpreter.execute_program(
            &program,
            ExecutionEnvironment::default(),
            Gas::new(1000, 1000),
        );

        assert!(result.success);
        assert_eq!(result.reverted_reason, None);
        let expected = base_cost(OpcodeFamily::Set).l2 + base_cost(OpcodeFamily::Return).l2;
        assert_eq!(result.l2_gas_used, expected as u64);
        assert_eq!(result.da_gas_used, 0);
        assert_eq!(result.trace.steps, 2);
    }

    #[test]
    fn test_running_off_the_end_faults() {
        let program = Program::from_instructions([set32(0, 1)]);
        let mut host = InMemoryHost::new();
        let mut interpreter = Interpreter::new(&mut host, SimulatorConfig::default());
        let result = interpreter.execute_program(
            &program,
            ExecutionEnvironment::default(),
            Gas::new(1000, 7),
        );

        assert!(!result.success);
        assert_eq!(
            result.reverted_reason,
            Some(ExecutionError::ControlFlow(
                ControlFlowError::InvalidProgramCounter {
                    pc: set32(0, 1).size() as u32
                }
            ))
        );
        assert_eq!((result.l2_gas_used, result.da_gas_used), (1000, 7));
        assert!(result.output.is_empty());
    }

    #[test]
    fn test_step_stops_after_halt() {
        let program = Program::from_instructions([
            set32(0, 0),
            Instruction::Revert8 {
                indirect: 0,
                size: 0,
                offset: 0,
            },
        ]);
        let mut host = InMemoryHost::new();
        let mut interpreter = Interpreter::new(&mut host, SimulatorConfig::default());
        let mut frame = Frame::new(&program, ExecutionEnvironment::default(), Gas::new(1000, 0));

        assert_eq!(interpreter.step(&mut frame), Ok(Some(())));
        assert_eq!(interpreter.step(&mut frame), Ok(None));
        assert!(frame.state.reverted);
        assert_eq!(interpreter.step(&mut frame), Ok(None));
        assert_eq!(frame.trace.steps, 2);
    }

    #[test]
    fn test_execute_rejects_bad_bytecode() {
        let mut host = InMemoryHost::new();
        let mut interpreter = Interpreter::new(&mut host, SimulatorConfig::default());
        assert!(interpreter
            .execute(&[0xff], ExecutionEnvironment::default(), Gas::new(10, 10))
            .is_err());
    }

    #[test]
    fn test_stats_are_collected_when_enabled() {
        let program = Program::from_instructions([
            set32(0, 0),
            set32(1, 0),
            Instruction::Return {
                indirect: 0,
                size: 0,
                offset: 0,
            },
        ]);
        let mut host = InMemoryHost::new();
        let config = SimulatorConfig::default().with_collect_stats(true);
        let mut interpreter = Interpreter::new(&mut host, config);
        interpreter.execute_program(&program, ExecutionEnvironment::default(), Gas::new(1000, 0));

        assert_eq!(interpreter.stats().count(crate::Opcode::Set32), 2);
        assert_eq!(interpreter.stats().count(crate::Opcode::Return), 1);
    }
}
