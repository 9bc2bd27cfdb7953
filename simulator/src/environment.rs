//! Per-call execution environment.

use ark_bn254::Fr;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use num_traits::Zero;
use strum_macros::{Display, EnumCount, EnumIter};

use crate::memory::Tag;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GasFees {
    pub fee_per_l2_gas: u128,
    pub fee_per_da_gas: u128,
}

/// Block-level values shared by every call of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalVariables {
    pub chain_id: Fr,
    pub version: Fr,
    pub block_number: u32,
    pub timestamp: u64,
    pub gas_fees: GasFees,
}

impl Default for GlobalVariables {
    fn default() -> Self {
        Self {
            chain_id: Fr::zero(),
            version: Fr::zero(),
            block_number: 0,
            timestamp: 0,
            gas_fees: GasFees::default(),
        }
    }
}

/// Immutable context of a single frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionEnvironment {
    pub address: Fr,
    pub sender: Fr,
    pub storage_address: Fr,
    pub calldata: Vec<Fr>,
    pub is_static_call: bool,
    pub is_delegate_call: bool,
    pub transaction_fee: Fr,
    pub function_selector: Fr,
    pub global_variables: GlobalVariables,
}

impl Default for ExecutionEnvironment {
    fn default() -> Self {
        Self {
            address: Fr::zero(),
            sender: Fr::zero(),
            storage_address: Fr::zero(),
            calldata: Vec::new(),
            is_static_call: false,
            is_delegate_call: false,
            transaction_fee: Fr::zero(),
            function_selector: Fr::zero(),
            global_variables: GlobalVariables::default(),
        }
    }
}

impl ExecutionEnvironment {
    /// Environment for a top-level call of `address`, which also owns the
    /// storage being accessed.
    pub fn new(address: Fr, sender: Fr, calldata: Vec<Fr>) -> Self {
        Self {
            address,
            sender,
            storage_address: address,
            calldata,
            ..Default::default()
        }
    }

    pub fn with_global_variables(mut self, global_variables: GlobalVariables) -> Self {
        self.global_variables = global_variables;
        self
    }

    pub fn with_transaction_fee(mut self, transaction_fee: Fr) -> Self {
        self.transaction_fee = transaction_fee;
        self
    }

    pub fn with_static_call(mut self, is_static_call: bool) -> Self {
        self.is_static_call = is_static_call;
        self
    }

    /// Environment of a nested call to `address` made from this frame.
    ///
    /// The callee runs on its own storage and sees the caller as sender. A
    /// static caller can only spawn static callees.
    pub fn derive_nested_call(&self, address: Fr, calldata: Vec<Fr>, is_static_call: bool) -> Self {
        let function_selector = calldata.first().copied().unwrap_or_else(Fr::zero);
        Self {
            address,
            sender: self.address,
            storage_address: address,
            calldata,
            is_static_call: is_static_call || self.is_static_call,
            is_delegate_call: false,
            transaction_fee: self.transaction_fee,
            function_selector,
            global_variables: self.global_variables,
        }
    }
}

/// Variables readable through `GETENVVAR`, keyed by their wire index.
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
pub enum EnvironmentVariable {
    Address = 0,
    Sender = 1,
    TransactionFee = 2,
    ChainId = 3,
    Version = 4,
    BlockNumber = 5,
    Timestamp = 6,
    FeePerL2Gas = 7,
    FeePerDaGas = 8,
    IsStaticCall = 9,
    L2GasLeft = 10,
    DaGasLeft = 11,
}

impl EnvironmentVariable {
    /// Tag of the cell `GETENVVAR` writes for this variable.
    pub const fn tag(self) -> Tag {
        use EnvironmentVariable::*;
        match self {
            Address | Sender | TransactionFee | ChainId | Version => Tag::Field,
            BlockNumber => Tag::U32,
            Timestamp => Tag::U64,
            FeePerL2Gas | FeePerDaGas => Tag::U128,
            IsStaticCall => Tag::U1,
            L2GasLeft | DaGasLeft => Tag::U32,
        }
    }
}
