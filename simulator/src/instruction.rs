//! The decoded instruction set.
//!
//! Every variant stores its operands at their exact wire width, so encoding
//! followed by decoding always yields the original instruction. Operand names
//! ending in offsets (`a`, `dst`, `slot`, ...) are memory offsets resolved
//! through the instruction's addressing bits; `tag`, `var`, `target`,
//! `value` and `message_size` are immediates.

use strum::EnumCount;

use crate::{
    serialization::{CodecError, OperandType, Reader, WireOperand},
    Opcode,
};

define_instructions! {
    // Compute - Arithmetic
    Add8 { indirect: Indirect8, a: U8, b: U8, dst: U8 },
    Add16 { indirect: Indirect8, a: U16, b: U16, dst: U16 },
    Sub8 { indirect: Indirect8, a: U8, b: U8, dst: U8 },
    Sub16 { indirect: Indirect8, a: U16, b: U16, dst: U16 },
    Mul8 { indirect: Indirect8, a: U8, b: U8, dst: U8 },
    Mul16 { indirect: Indirect8, a: U16, b: U16, dst: U16 },
    Div8 { indirect: Indirect8, a: U8, b: U8, dst: U8 },
    Div16 { indirect: Indirect8, a: U16, b: U16, dst: U16 },
    FDiv8 { indirect: Indirect8, a: U8, b: U8, dst: U8 },
    FDiv16 { indirect: Indirect8, a: U16, b: U16, dst: U16 },

    // Compute - Comparison
    Eq8 { indirect: Indirect8, a: U8, b: U8, dst: U8 },
    Eq16 { indirect: Indirect8, a: U16, b: U16, dst: U16 },
    Lt8 { indirect: Indirect8, a: U8, b: U8, dst: U8 },
    Lt16 { indirect: Indirect8, a: U16, b: U16, dst: U16 },
    Lte8 { indirect: Indirect8, a: U8, b: U8, dst: U8 },
    Lte16 { indirect: Indirect8, a: U16, b: U16, dst: U16 },

    // Compute - Bitwise
    And8 { indirect: Indirect8, a: U8, b: U8, dst: U8 },
    And16 { indirect: Indirect8, a: U16, b: U16, dst: U16 },
    Or8 { indirect: Indirect8, a: U8, b: U8, dst: U8 },
    Or16 { indirect: Indirect8, a: U16, b: U16, dst: U16 },
    Xor8 { indirect: Indirect8, a: U8, b: U8, dst: U8 },
    Xor16 { indirect: Indirect8, a: U16, b: U16, dst: U16 },
    Not8 { indirect: Indirect8, src: U8, dst: U8 },
    Not16 { indirect: Indirect8, src: U16, dst: U16 },
    Shl8 { indirect: Indirect8, a: U8, b: U8, dst: U8 },
    Shl16 { indirect: Indirect8, a: U16, b: U16, dst: U16 },
    Shr8 { indirect: Indirect8, a: U8, b: U8, dst: U8 },
    Shr16 { indirect: Indirect8, a: U16, b: U16, dst: U16 },

    // Compute - Type conversions
    Cast8 { indirect: Indirect8, src: U8, dst: U8, tag: Tag },
    Cast16 { indirect: Indirect8, src: U16, dst: U16, tag: Tag },

    // Execution environment
    GetEnvVar16 { indirect: Indirect8, dst: U16, var: U8 },
    CalldataCopy { indirect: Indirect8, copy_size: U16, cd_start: U16, dst: U16 },
    SuccessCopy { indirect: Indirect8, dst: U16 },
    ReturndataSize { indirect: Indirect8, dst: U16 },
    ReturndataCopy { indirect: Indirect8, copy_size: U16, rd_start: U16, dst: U16 },

    // Machine state - Internal control flow
    Jump32 { target: U32 },
    JumpI32 { indirect: Indirect8, cond: U16, target: U32 },
    InternalCall { target: U32 },
    InternalReturn {},

    // Machine state - Memory
    Set8 { indirect: Indirect8, dst: U8, tag: Tag, value: U8 },
    Set16 { indirect: Indirect8, dst: U16, tag: Tag, value: U16 },
    Set32 { indirect: Indirect8, dst: U16, tag: Tag, value: U32 },
    Set64 { indirect: Indirect8, dst: U16, tag: Tag, value: U64 },
    Set128 { indirect: Indirect8, dst: U16, tag: Tag, value: U128 },
    SetFF { indirect: Indirect8, dst: U16, tag: Tag, value: FF },
    Mov8 { indirect: Indirect8, src: U8, dst: U8 },
    Mov16 { indirect: Indirect8, src: U16, dst: U16 },

    // Side effects - Public storage
    SLoad { indirect: Indirect8, slot: U16, dst: U16 },
    SStore { indirect: Indirect8, src: U16, slot: U16 },

    // Side effects - Notes, nullifiers, logs, messages
    NoteHashExists { indirect: Indirect8, note_hash: U16, leaf_index: U16, dst: U16 },
    EmitNoteHash { indirect: Indirect8, note_hash: U16 },
    NullifierExists { indirect: Indirect8, nullifier: U16, address: U16, dst: U16 },
    EmitNullifier { indirect: Indirect8, nullifier: U16 },
    L1ToL2MsgExists { indirect: Indirect8, msg_hash: U16, leaf_index: U16, dst: U16 },
    EmitUnencryptedLog { indirect: Indirect8, log: U16, log_size: U16 },
    SendL2ToL1Msg { indirect: Indirect8, recipient: U16, content: U16 },

    // Control flow - Contract calls
    Call { indirect: Indirect16, l2_gas: U16, da_gas: U16, addr: U16, args_size: U16, args: U16 },
    StaticCall {
        indirect: Indirect16, l2_gas: U16, da_gas: U16, addr: U16, args_size: U16, args: U16,
    },
    Return { indirect: Indirect8, size: U16, offset: U16 },
    Revert8 { indirect: Indirect8, size: U8, offset: U8 },
    Revert16 { indirect: Indirect8, size: U16, offset: U16 },

    // Misc
    DebugLog {
        indirect: Indirect8, message: U16, fields: U16, fields_size: U16, message_size: U16,
    },

    // Gadgets - Conversion
    ToRadixBE {
        indirect: Indirect16, src: U16, radix: U16, num_limbs: U16, output_bits: U16, dst: U16,
    },
}

impl Instruction {
    /// Returns the raw `indirect` field, zero for opcodes without one.
    pub fn indirect(&self) -> u16 {
        use Instruction::*;
        match *self {
            Call { indirect, .. } | StaticCall { indirect, .. } | ToRadixBE { indirect, .. } => {
                indirect
            }
            Jump32 { .. } | InternalCall { .. } | InternalReturn {} => 0,
            Add8 { indirect, .. }
            | Add16 { indirect, .. }
            | Sub8 { indirect, .. }
            | Sub16 { indirect, .. }
            | Mul8 { indirect, .. }
            | Mul16 { indirect, .. }
            | Div8 { indirect, .. }
            | Div16 { indirect, .. }
            | FDiv8 { indirect, .. }
            | FDiv16 { indirect, .. }
            | Eq8 { indirect, .. }
            | Eq16 { indirect, .. }
            | Lt8 { indirect, .. }
            | Lt16 { indirect, .. }
            | Lte8 { indirect, .. }
            | Lte16 { indirect, .. }
            | And8 { indirect, .. }
            | And16 { indirect, .. }
            | Or8 { indirect, .. }
            | Or16 { indirect, .. }
            | Xor8 { indirect, .. }
            | Xor16 { indirect, .. }
            | Not8 { indirect, .. }
            | Not16 { indirect, .. }
            | Shl8 { indirect, .. }
            | Shl16 { indirect, .. }
            | Shr8 { indirect, .. }
            | Shr16 { indirect, .. }
            | Cast8 { indirect, .. }
            | Cast16 { indirect, .. }
            | GetEnvVar16 { indirect, .. }
            | CalldataCopy { indirect, .. }
            | SuccessCopy { indirect, .. }
            | ReturndataSize { indirect, .. }
            | ReturndataCopy { indirect, .. }
            | JumpI32 { indirect, .. }
            | Set8 { indirect, .. }
            | Set16 { indirect, .. }
            | Set32 { indirect, .. }
            | Set64 { indirect, .. }
            | Set128 { indirect, .. }
            | SetFF { indirect, .. }
            | Mov8 { indirect, .. }
            | Mov16 { indirect, .. }
            | SLoad { indirect, .. }
            | SStore { indirect, .. }
            | NoteHashExists { indirect, .. }
            | EmitNoteHash { indirect, .. }
            | NullifierExists { indirect, .. }
            | EmitNullifier { indirect, .. }
            | L1ToL2MsgExists { indirect, .. }
            | EmitUnencryptedLog { indirect, .. }
            | SendL2ToL1Msg { indirect, .. }
            | Return { indirect, .. }
            | Revert8 { indirect, .. }
            | Revert16 { indirect, .. }
            | DebugLog { indirect, .. } => indirect as u16,
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::addressing::Addressing;

    #[test]
    fn test_wide_indirect_matches_wire_format() {
        for opcode in Opcode::iter() {
            let format = opcode.wire_format();
            let wide = format.first() == Some(&OperandType::Indirect16);
            assert_eq!(wide, opcode.has_wide_indirect(), "{opcode}");
        }
    }

    #[test]
    fn test_address_operands_fit_wire_format() {
        for opcode in Opcode::iter() {
            let non_indirect = opcode
                .wire_format()
                .iter()
                .filter(|op| !matches!(op, OperandType::Indirect8 | OperandType::Indirect16))
                .count();
            assert!(opcode.num_address_operands() <= non_indirect, "{opcode}");
        }
    }

    #[test]
    fn test_indirect_accessor() {
        let call = Instruction::Call {
            indirect: 0x1234,
            l2_gas: 0,
            da_gas: 0,
            addr: 0,
            args_size: 0,
            args: 0,
        };
        assert_eq!(call.indirect(), 0x1234);
        let mov = Instruction::Mov8 {
            indirect: 0b0110,
            src: 1,
            dst: 2,
        };
        let addressing = Addressing::from_wire(mov.indirect(), mov.opcode().num_address_operands());
        assert_eq!(addressing.relative_count(), 1);
        assert_eq!(addressing.indirect_count(), 1);
    }
}
