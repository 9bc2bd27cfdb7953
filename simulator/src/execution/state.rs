use ark_bn254::Fr;

use crate::{
    gas::{dynamic_charge, Gas, OutOfGasError},
    memory::Memory,
    OpcodeFamily,
};

/// Return address pushed by `INTERNALCALL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InternalCallEntry {
    pub call_pc: u32,
    pub return_pc: u32,
}

/// Mutable state of a single frame.
#[derive(Debug, Clone, Default)]
pub struct MachineState {
    pub pc: u32,
    pub internal_call_stack: Vec<InternalCallEntry>,
    pub l2_gas_left: u64,
    pub da_gas_left: u64,
    pub memory: Memory,
    pub halted: bool,
    pub reverted: bool,
    /// Data returned by `RETURN` or `REVERT`.
    pub output: Vec<Fr>,
    /// Output of the last nested call.
    pub last_return_data: Vec<Fr>,
    /// Whether the last nested call succeeded.
    pub last_success: bool,
}

impl MachineState {
    pub fn new(gas: Gas) -> Self {
        Self {
            l2_gas_left: gas.l2 as u64,
            da_gas_left: gas.da as u64,
            ..Default::default()
        }
    }

    pub fn with_memory(mut self, memory: Memory) -> Self {
        self.memory = memory;
        self
    }

    pub fn gas_left(&self) -> (u64, u64) {
        (self.l2_gas_left, self.da_gas_left)
    }

    /// Deducts `gas` from both counters.
    ///
    /// L2 is checked first; on failure neither counter is modified.
    pub fn consume_gas(&mut self, gas: Gas) -> Result<(), OutOfGasError> {
        self.consume(gas.l2 as u64, gas.da as u64)
    }

    /// Deducts the dynamic cost of `units` of work of `family`.
    pub fn consume_dynamic_gas(
        &mut self,
        family: OpcodeFamily,
        units: u64,
    ) -> Result<(), OutOfGasError> {
        // Saturation leaves the cost above any counter, so an overflowing
        // charge always fails.
        let (l2, da) = dynamic_charge(family, units);
        self.consume(l2, da)
    }

    pub(crate) fn consume(&mut self, l2: u64, da: u64) -> Result<(), OutOfGasError> {
        if l2 > self.l2_gas_left {
            return Err(OutOfGasError::L2 {
                required: l2,
                available: self.l2_gas_left,
            });
        }
        if da > self.da_gas_left {
            return Err(OutOfGasError::DA {
                required: da,
                available: self.da_gas_left,
            });
        }
        self.l2_gas_left -= l2;
        self.da_gas_left -= da;
        Ok(())
    }

    pub(crate) fn halt(&mut self, output: Vec<Fr>, reverted: bool) {
        self.halted = true;
        self.reverted = reverted;
        self.output = output;
    }
}
