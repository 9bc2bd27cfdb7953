use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum::EnumCount;
use strum_macros::{Display, EnumCount, EnumIter};

/// Wire opcodes of the AVM instruction set.
///
/// The discriminant is the opcode byte that prefixes every encoded
/// instruction. Bit-width variants of the same operation (`ADD_8`/`ADD_16`,
/// the `SET_*` family, ...) are distinct opcodes with distinct wire formats
/// but share an [`OpcodeFamily`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumCount,
    EnumIter,
    TryFromPrimitive,
    IntoPrimitive,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Opcode {
    // Compute - Arithmetic
    Add8 = 0x00,
    Add16 = 0x01,
    Sub8 = 0x02,
    Sub16 = 0x03,
    Mul8 = 0x04,
    Mul16 = 0x05,
    Div8 = 0x06,
    Div16 = 0x07,
    FDiv8 = 0x08,
    FDiv16 = 0x09,
    // Compute - Comparison
    Eq8 = 0x0a,
    Eq16 = 0x0b,
    Lt8 = 0x0c,
    Lt16 = 0x0d,
    Lte8 = 0x0e,
    Lte16 = 0x0f,
    // Compute - Bitwise
    And8 = 0x10,
    And16 = 0x11,
    Or8 = 0x12,
    Or16 = 0x13,
    Xor8 = 0x14,
    Xor16 = 0x15,
    Not8 = 0x16,
    Not16 = 0x17,
    Shl8 = 0x18,
    Shl16 = 0x19,
    Shr8 = 0x1a,
    Shr16 = 0x1b,
    // Compute - Type conversions
    Cast8 = 0x1c,
    Cast16 = 0x1d,
    // Execution environment
    GetEnvVar16 = 0x1e,
    CalldataCopy = 0x1f,
    SuccessCopy = 0x20,
    ReturndataSize = 0x21,
    ReturndataCopy = 0x22,
    // Machine state - Internal control flow
    Jump32 = 0x23,
    JumpI32 = 0x24,
    InternalCall = 0x25,
    InternalReturn = 0x26,
    // Machine state - Memory
    Set8 = 0x27,
    Set16 = 0x28,
    Set32 = 0x29,
    Set64 = 0x2a,
    Set128 = 0x2b,
    SetFF = 0x2c,
    Mov8 = 0x2d,
    Mov16 = 0x2e,
    // Side effects - Public storage
    SLoad = 0x2f,
    SStore = 0x30,
    // Side effects - Notes, nullifiers, logs, messages
    NoteHashExists = 0x31,
    EmitNoteHash = 0x32,
    NullifierExists = 0x33,
    EmitNullifier = 0x34,
    L1ToL2MsgExists = 0x35,
    EmitUnencryptedLog = 0x36,
    SendL2ToL1Msg = 0x37,
    // Control flow - Contract calls
    Call = 0x38,
    StaticCall = 0x39,
    Return = 0x3a,
    Revert8 = 0x3b,
    Revert16 = 0x3c,
    // Misc
    DebugLog = 0x3d,
    // Gadgets - Conversion
    ToRadixBE = 0x3e,
}

/// Semantic operation shared by all bit-width variants of an opcode.
///
/// Gas base costs and the number of memory-offset operands are keyed by
/// family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumCount, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OpcodeFamily {
    Add,
    Sub,
    Mul,
    Div,
    FDiv,
    Eq,
    Lt,
    Lte,
    And,
    Or,
    Xor,
    Not,
    Shl,
    Shr,
    Cast,
    GetEnvVar,
    CalldataCopy,
    SuccessCopy,
    ReturndataSize,
    ReturndataCopy,
    Jump,
    JumpI,
    InternalCall,
    InternalReturn,
    Set,
    Mov,
    SLoad,
    SStore,
    NoteHashExists,
    EmitNoteHash,
    NullifierExists,
    EmitNullifier,
    L1ToL2MsgExists,
    EmitUnencryptedLog,
    SendL2ToL1Msg,
    Call,
    StaticCall,
    Return,
    Revert,
    DebugLog,
    ToRadixBE,
}

/// Family of every opcode, indexed by opcode byte.
const FAMILIES: [OpcodeFamily; Opcode::COUNT] = {
    use OpcodeFamily::*;
    [
        Add, Add, Sub, Sub, Mul, Mul, Div, Div, FDiv, FDiv, // arithmetic
        Eq, Eq, Lt, Lt, Lte, Lte, // comparison
        And, And, Or, Or, Xor, Xor, Not, Not, Shl, Shl, Shr, Shr, // bitwise
        Cast, Cast, // conversion
        GetEnvVar, CalldataCopy, SuccessCopy, ReturndataSize, ReturndataCopy, // environment
        Jump, JumpI, InternalCall, InternalReturn, // control flow
        Set, Set, Set, Set, Set, Set, Mov, Mov, // memory
        SLoad, SStore, // storage
        NoteHashExists, EmitNoteHash, NullifierExists, EmitNullifier, L1ToL2MsgExists,
        EmitUnencryptedLog, SendL2ToL1Msg, // side effects
        Call, StaticCall, Return, Revert, Revert, // contract calls
        DebugLog, ToRadixBE,
    ]
};

/// Number of leading operands that are memory offsets, indexed by family.
///
/// Only these operands carry addressing bits in the `indirect` field.
const NUM_ADDRESS_OPERANDS: [u8; OpcodeFamily::COUNT] = [
    3, 3, 3, 3, 3, // add, sub, mul, div, fdiv
    3, 3, 3, // eq, lt, lte
    3, 3, 3, 2, 3, 3, // and, or, xor, not, shl, shr
    2, // cast
    1, 3, 1, 1, 3, // getenvvar, calldatacopy, successcopy, returndatasize, returndatacopy
    0, 1, 0, 0, // jump, jumpi, internalcall, internalreturn
    1, 2, // set, mov
    2, 2, // sload, sstore
    3, 1, 3, 1, 3, 2, 2, // exists/emit side effects
    5, 5, 2, 2, // call, staticcall, return, revert
    3, 5, // debuglog, toradixbe
];

impl Opcode {
    pub const fn family(self) -> OpcodeFamily {
        FAMILIES[self as usize]
    }

    /// Number of memory-offset operands this opcode resolves.
    pub const fn num_address_operands(self) -> usize {
        self.family().num_address_operands()
    }

    /// Whether this opcode's `indirect` field is 16 bits wide.
    pub const fn has_wide_indirect(self) -> bool {
        matches!(self, Opcode::Call | Opcode::StaticCall | Opcode::ToRadixBE)
    }
}

impl OpcodeFamily {
    pub const fn num_address_operands(self) -> usize {
        NUM_ADDRESS_OPERANDS[self as usize] as usize
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_opcode_bytes_are_dense() {
        for (i, opcode) in Opcode::iter().enumerate() {
            assert_eq!(u8::from(opcode) as usize, i);
            assert_eq!(Opcode::try_from(i as u8).unwrap(), opcode);
        }
        assert!(Opcode::try_from(Opcode::COUNT as u8).is_err());
    }

    #[test]
    fn test_families() {
        assert_eq!(Opcode::Add8.family(), Opcode::Add16.family());
        assert_eq!(Opcode::SetFF.family(), OpcodeFamily::Set);
        assert_eq!(Opcode::Revert16.family(), OpcodeFamily::Revert);
        assert_eq!(Opcode::ToRadixBE.family(), OpcodeFamily::ToRadixBE);
        assert_eq!(Opcode::Not8.num_address_operands(), 2);
        assert_eq!(Opcode::Jump32.num_address_operands(), 0);
        assert_eq!(Opcode::Call.num_address_operands(), 5);

        // Every family is reachable from at least one opcode.
        for family in OpcodeFamily::iter() {
            assert!(Opcode::iter().any(|op| op.family() == family));
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Opcode::InternalReturn.to_string(), "INTERNAL_RETURN");
        assert_eq!(OpcodeFamily::InternalCall.to_string(), "INTERNAL_CALL");
    }
}
