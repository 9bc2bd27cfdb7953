//! Gas metering.
//!
//! Every instruction is charged in two independent dimensions: L2 gas for
//! computation and DA gas for data availability. The cost of an instruction
//! is the sum of
//!   - a base cost keyed by its [`OpcodeFamily`];
//!   - an addressing cost for every indirect or relative operand;
//!   - a dynamic cost per unit of work, for the families whose work depends
//!     on a size read from memory.
//!
//! The base and addressing parts are known from the instruction alone and are
//! charged before it executes. The dynamic part is charged once the size has
//! been read, before any effect is applied.

use strum::EnumCount;
use thiserror::Error;

use crate::{addressing::Addressing, addressing::AVM_MAX_OPERANDS, Opcode, OpcodeFamily};

/// Flat addressing cost charged whenever any operand is not direct.
pub const AVM_ADDRESSING_BASE_L2_GAS: u32 = 3;
/// Additional cost per indirect operand.
pub const AVM_ADDRESSING_INDIRECT_L2_GAS: u32 = 3;
/// Additional cost per relative operand.
pub const AVM_ADDRESSING_RELATIVE_L2_GAS: u32 = 3;

/// An amount of gas in both dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Gas {
    pub l2: u32,
    pub da: u32,
}

impl Gas {
    pub const ZERO: Gas = Gas { l2: 0, da: 0 };

    pub const fn new(l2: u32, da: u32) -> Self {
        Self { l2, da }
    }

    pub const fn is_zero(&self) -> bool {
        self.l2 == 0 && self.da == 0
    }

    pub const fn checked_add(self, other: Gas) -> Option<Gas> {
        match (self.l2.checked_add(other.l2), self.da.checked_add(other.da)) {
            (Some(l2), Some(da)) => Some(Gas { l2, da }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OutOfGasError {
    #[error("out of L2 gas: required {required}, available {available}")]
    L2 { required: u64, available: u64 },

    #[error("out of DA gas: required {required}, available {available}")]
    DA { required: u64, available: u64 },
}

const fn g(l2: u32, da: u32) -> Gas {
    Gas::new(l2, da)
}

/// Base cost of every family, indexed by [`OpcodeFamily`].
const BASE_GAS: [Gas; OpcodeFamily::COUNT] = [
    g(27, 0),     // ADD
    g(27, 0),     // SUB
    g(27, 0),     // MUL
    g(27, 0),     // DIV
    g(27, 0),     // FDIV
    g(27, 0),     // EQ
    g(42, 0),     // LT
    g(42, 0),     // LTE
    g(27, 0),     // AND
    g(27, 0),     // OR
    g(27, 0),     // XOR
    g(27, 0),     // NOT
    g(27, 0),     // SHL
    g(27, 0),     // SHR
    g(27, 0),     // CAST
    g(9, 0),      // GETENVVAR
    g(27, 0),     // CALLDATACOPY
    g(9, 0),      // SUCCESSCOPY
    g(9, 0),      // RETURNDATASIZE
    g(27, 0),     // RETURNDATACOPY
    g(9, 0),      // JUMP
    g(9, 0),      // JUMPI
    g(9, 0),      // INTERNALCALL
    g(9, 0),      // INTERNALRETURN
    g(9, 0),      // SET
    g(9, 0),      // MOV
    g(129, 0),    // SLOAD
    g(1657, 512), // SSTORE
    g(126, 0),    // NOTEHASHEXISTS
    g(1285, 512), // EMITNOTEHASH
    g(132, 0),    // NULLIFIEREXISTS
    g(1540, 512), // EMITNULLIFIER
    g(108, 0),    // L1TOL2MSGEXISTS
    g(15, 0),     // EMITUNENCRYPTEDLOG
    g(209, 512),  // SENDL2TOL1MSG
    g(3312, 0),   // CALL
    g(3312, 0),   // STATICCALL
    g(28, 0),     // RETURN
    g(28, 0),     // REVERT
    g(9, 0),      // DEBUGLOG
    g(24, 0),     // TORADIXBE
];

/// Per-unit dynamic cost of every family, indexed by [`OpcodeFamily`].
const DYNAMIC_GAS: [Gas; OpcodeFamily::COUNT] = {
    let mut table = [Gas::ZERO; OpcodeFamily::COUNT];
    table[OpcodeFamily::CalldataCopy as usize] = g(3, 0);
    table[OpcodeFamily::ReturndataCopy as usize] = g(3, 0);
    table[OpcodeFamily::EmitUnencryptedLog as usize] = g(3, 32);
    table[OpcodeFamily::ToRadixBE as usize] = g(20, 0);
    table[OpcodeFamily::Call as usize] = g(3, 0);
    table[OpcodeFamily::StaticCall as usize] = g(3, 0);
    table
};

pub const fn base_cost(family: OpcodeFamily) -> Gas {
    BASE_GAS[family as usize]
}

/// Cost per unit of runtime work; zero for families without dynamic cost.
pub const fn dynamic_cost(family: OpcodeFamily) -> Gas {
    DYNAMIC_GAS[family as usize]
}

pub fn addressing_cost(addressing: &Addressing) -> Gas {
    let indirect = addressing.indirect_count();
    let relative = addressing.relative_count();
    if indirect == 0 && relative == 0 {
        return Gas::ZERO;
    }
    Gas::new(
        AVM_ADDRESSING_BASE_L2_GAS
            + indirect * AVM_ADDRESSING_INDIRECT_L2_GAS
            + relative * AVM_ADDRESSING_RELATIVE_L2_GAS,
        0,
    )
}

/// Highest addressing cost any instruction can incur.
pub const fn max_addressing_cost() -> Gas {
    let per_operand = AVM_ADDRESSING_INDIRECT_L2_GAS + AVM_ADDRESSING_RELATIVE_L2_GAS;
    Gas::new(
        AVM_ADDRESSING_BASE_L2_GAS + AVM_MAX_OPERANDS as u32 * per_operand,
        0,
    )
}

/// Static cost of an instruction: its family's base cost plus its addressing
/// cost.
pub fn charge(opcode: Opcode, addressing: &Addressing) -> Gas {
    let base = base_cost(opcode.family());
    let addressing = addressing_cost(addressing);
    // Both parts are bounded so that their sum fits in u32, see the tests.
    Gas::new(base.l2 + addressing.l2, base.da + addressing.da)
}

/// Dynamic cost of `units` of work, widened to avoid overflow.
pub fn dynamic_charge(family: OpcodeFamily, units: u64) -> (u64, u64) {
    let per_unit = dynamic_cost(family);
    (
        (per_unit.l2 as u64).saturating_mul(units),
        (per_unit.da as u64).saturating_mul(units),
    )
}
