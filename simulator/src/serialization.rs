//! Bytecode (de)serialization.
//!
//! An encoded instruction is its opcode byte followed by its operands in the
//! order of the opcode's wire format, each as a big-endian integer of the
//! operand's size. Field operands are 32 bytes wide.

use std::ops::Deref;

use ahash::AHashMap;
use ark_bn254::Fr;
use ark_ff::PrimeField;
use thiserror::Error;
use tracing::instrument;

use crate::{instruction::WIRE_FORMATS, memory::field_to_be_bytes, Instruction, Opcode};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("unknown opcode 0x{opcode:02x} at pc {pc}")]
    UnknownOpcode { opcode: u8, pc: u32 },

    #[error("truncated bytecode at pc {pc}: needed {needed} bytes, {available} available")]
    TruncatedBytecode {
        pc: u32,
        needed: usize,
        available: usize,
    },
}

/// Kind of an operand in an instruction's wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandType {
    Indirect8,
    Indirect16,
    Tag,
    U8,
    U16,
    U32,
    U64,
    U128,
    FF,
}

impl OperandType {
    pub const fn size_in_bytes(self) -> usize {
        match self {
            OperandType::Indirect8 | OperandType::Tag | OperandType::U8 => 1,
            OperandType::Indirect16 | OperandType::U16 => 2,
            OperandType::U32 => 4,
            OperandType::U64 => 8,
            OperandType::U128 => 16,
            OperandType::FF => 32,
        }
    }
}

impl Opcode {
    /// Ordered operand kinds of this opcode, excluding the opcode byte.
    pub const fn wire_format(self) -> &'static [OperandType] {
        WIRE_FORMATS[self as usize]
    }

    /// Size in bytes of an encoded instruction of this opcode.
    pub const fn instruction_size(self) -> usize {
        let format = self.wire_format();
        let mut size = 1;
        let mut i = 0;
        while i < format.len() {
            size += format[i].size_in_bytes();
            i += 1;
        }
        size
    }
}

/// Cursor over a bytecode buffer.
pub(crate) struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
    instruction_start: usize,
}

impl<'a> Reader<'a> {
    pub(crate) const fn new(bytes: &'a [u8], pos: usize) -> Self {
        Self {
            bytes,
            pos,
            instruction_start: pos,
        }
    }

    pub(crate) fn read_bytes<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let available = self.bytes.len().saturating_sub(self.pos);
        if available < N {
            return Err(CodecError::TruncatedBytecode {
                pc: self.instruction_start as u32,
                needed: N,
                available,
            });
        }
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }
}

/// A value that can appear as an instruction operand on the wire.
pub(crate) trait WireOperand: Sized {
    fn read(reader: &mut Reader<'_>) -> Result<Self, CodecError>;

    fn write(&self, out: &mut Vec<u8>);
}

macro_rules! impl_wire_operand_int {
    ($($ty:ty),*) => {
        $(
            impl WireOperand for $ty {
                fn read(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
                    Ok(<$ty>::from_be_bytes(reader.read_bytes()?))
                }

                fn write(&self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_be_bytes());
                }
            }
        )*
    };
}

impl_wire_operand_int!(u8, u16, u32, u64, u128);

impl WireOperand for Fr {
    fn read(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        let bytes: [u8; 32] = reader.read_bytes()?;
        Ok(Fr::from_be_bytes_mod_order(&bytes))
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&field_to_be_bytes(self));
    }
}

impl Instruction {
    /// Encodes this instruction into its wire form.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.opcode().instruction_size());
        out.push(self.opcode().into());
        self.encode_operands(&mut out);
        out
    }

    /// Size in bytes of the encoded instruction.
    pub const fn size(&self) -> usize {
        self.opcode().instruction_size()
    }
}

/// Decodes the instruction starting at byte offset `pos`.
pub fn decode_instruction(bytes: &[u8], pos: usize) -> Result<Instruction, CodecError> {
    let mut reader = Reader::new(bytes, pos);
    let [byte] = reader.read_bytes::<1>()?;
    let opcode = Opcode::try_from(byte).map_err(|_| CodecError::UnknownOpcode {
        opcode: byte,
        pc: pos as u32,
    })?;
    Instruction::decode_operands(opcode, &mut reader)
}

/// A decoded program: instructions keyed by the byte offset they start at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<(u32, Instruction)>,
    pc_to_index: AHashMap<u32, usize>,
    byte_len: u32,
}

impl Program {
    /// Builds a program from already-decoded instructions, laying them out
    /// back to back from pc 0.
    pub fn from_instructions(instructions: impl IntoIterator<Item = Instruction>) -> Self {
        let mut program = Program::default();
        let mut pc = 0u32;
        for instruction in instructions {
            program.push(pc, instruction);
            pc += instruction.size() as u32;
        }
        program.byte_len = pc;
        program
    }

    fn push(&mut self, pc: u32, instruction: Instruction) {
        self.pc_to_index.insert(pc, self.instructions.len());
        self.instructions.push((pc, instruction));
    }

    /// Returns the instruction starting at `pc`, if any.
    pub fn instruction_at(&self, pc: u32) -> Option<&Instruction> {
        self.pc_to_index
            .get(&pc)
            .map(|&index| &self.instructions[index].1)
    }

    /// Total encoded size in bytes.
    pub const fn byte_len(&self) -> u32 {
        self.byte_len
    }

    /// Re-encodes the program.
    pub fn encode(&self) -> Vec<u8> {
        encode_program(self.instructions.iter().map(|(_, instruction)| instruction))
    }
}

impl Deref for Program {
    type Target = [(u32, Instruction)];

    fn deref(&self) -> &Self::Target {
        &self.instructions
    }
}

/// Decodes a whole bytecode buffer.
///
/// The buffer must consist of whole instructions: an unknown opcode or a
/// trailing partial instruction rejects the entire program.
#[instrument(level = "debug", skip_all, fields(len = bytes.len()))]
pub fn decode_program(bytes: &[u8]) -> Result<Program, CodecError> {
    let mut program = Program::default();
    let mut pos = 0usize;
    while pos < bytes.len() {
        let instruction = decode_instruction(bytes, pos)?;
        program.push(pos as u32, instruction);
        pos += instruction.size();
    }
    program.byte_len = pos as u32;
    Ok(program)
}

/// Encodes a sequence of instructions back to back.
pub fn encode_program<'a>(instructions: impl IntoIterator<Item = &'a Instruction>) -> Vec<u8> {
    instructions
        .into_iter()
        .flat_map(|instruction| instruction.encode())
        .collect()
}
