#![allow(dead_code)]

use anyhow::Result;
use ark_bn254::Fr;
use avm_simulator::{
    encode_program, ExecutionEnvironment, FrameResult, Gas, InMemoryHost, Instruction, Interpreter,
    SimulatorConfig, Tag,
};

/// Builds bytecode one instruction at a time, tracking the byte offset of the
/// next instruction so that tests can compute jump targets.
#[derive(Debug, Default, Clone)]
pub struct ProgramBuilder {
    instructions: Vec<Instruction>,
    pc: u32,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Byte offset of the next instruction.
    pub fn pc(&self) -> u32 {
        self.pc
    }

    pub fn push(&mut self, instruction: Instruction) -> &mut Self {
        self.pc += instruction.size() as u32;
        self.instructions.push(instruction);
        self
    }

    pub fn set(&mut self, dst: u16, tag: Tag, value: u128) -> &mut Self {
        self.push(Instruction::Set128 {
            indirect: 0,
            dst,
            tag: tag.into(),
            value,
        })
    }

    pub fn set_u32(&mut self, dst: u16, value: u32) -> &mut Self {
        self.push(Instruction::Set32 {
            indirect: 0,
            dst,
            tag: Tag::U32.into(),
            value,
        })
    }

    pub fn set_field(&mut self, dst: u16, value: Fr) -> &mut Self {
        self.push(Instruction::SetFF {
            indirect: 0,
            dst,
            tag: Tag::Field.into(),
            value,
        })
    }

    /// Returns MEM[offset..offset + MEM[size]].
    pub fn ret(&mut self, size: u16, offset: u16) -> &mut Self {
        self.push(Instruction::Return {
            indirect: 0,
            size,
            offset,
        })
    }

    pub fn revert(&mut self, size: u16, offset: u16) -> &mut Self {
        self.push(Instruction::Revert16 {
            indirect: 0,
            size,
            offset,
        })
    }

    pub fn build(&self) -> Vec<u8> {
        encode_program(&self.instructions)
    }
}

pub fn fr(value: u64) -> Fr {
    Fr::from(value)
}

/// Runs `bytecode` as a top-level frame of `env.address` on `host`.
pub fn run_on(
    host: &mut InMemoryHost,
    bytecode: &[u8],
    env: ExecutionEnvironment,
    gas: Gas,
) -> Result<FrameResult> {
    let mut interpreter = Interpreter::new(host, SimulatorConfig::default());
    Ok(interpreter.execute(bytecode, env, gas)?)
}

/// Runs `bytecode` on an empty host with plenty of gas.
pub fn run(bytecode: &[u8], calldata: Vec<Fr>) -> Result<FrameResult> {
    let mut host = InMemoryHost::new();
    let env = ExecutionEnvironment::new(fr(1), fr(2), calldata);
    run_on(&mut host, bytecode, env, Gas::new(1_000_000, 1_000_000))
}
