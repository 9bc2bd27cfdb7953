use ark_bn254::Fr;
use num_traits::Zero;

use super::context::EventContext;
use crate::{
    environment::EnvironmentVariable,
    execution::ExecutionError,
    memory::{Memory, MemoryCell},
    OpcodeFamily,
};

/// Event for GETENVVAR_16.
///
/// Logic:
///   1. Check that `var` names an environment variable.
///   2. MEM[dst] = value of `var`, tagged by variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetEnvVarEvent {
    pub pc: u32,
    pub var: EnvironmentVariable,
    pub dst_addr: u32,
    pub value: MemoryCell,
}

impl GetEnvVarEvent {
    pub(crate) fn generate(
        ctx: &mut EventContext,
        dst: u32,
        var: u8,
    ) -> Result<(), ExecutionError> {
        let [dst_addr] = ctx.resolve([dst])?;
        let var = EnvironmentVariable::try_from(var)
            .map_err(|_| ExecutionError::InvalidEnvironmentVariable(var))?;

        let env = ctx.env;
        let globals = &env.global_variables;
        let raw = match var {
            EnvironmentVariable::Address => env.address,
            EnvironmentVariable::Sender => env.sender,
            EnvironmentVariable::TransactionFee => env.transaction_fee,
            EnvironmentVariable::ChainId => globals.chain_id,
            EnvironmentVariable::Version => globals.version,
            EnvironmentVariable::BlockNumber => Fr::from(globals.block_number),
            EnvironmentVariable::Timestamp => Fr::from(globals.timestamp),
            EnvironmentVariable::FeePerL2Gas => Fr::from(globals.gas_fees.fee_per_l2_gas),
            EnvironmentVariable::FeePerDaGas => Fr::from(globals.gas_fees.fee_per_da_gas),
            EnvironmentVariable::IsStaticCall => Fr::from(env.is_static_call),
            EnvironmentVariable::L2GasLeft => Fr::from(saturate_u32(ctx.l2_gas_left)),
            EnvironmentVariable::DaGasLeft => Fr::from(saturate_u32(ctx.da_gas_left)),
        };
        let value = MemoryCell::from_field(var.tag(), raw);

        ctx.memory.set(dst_addr, value);
        let pc = ctx.pc;
        ctx.incr_pc();
        ctx.record(|trace| {
            trace.get_env_var.push(Self {
                pc,
                var,
                dst_addr,
                value,
            })
        });
        Ok(())
    }
}

fn saturate_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Calldata,
    ReturnData,
}

/// Event for CALLDATACOPY and RETURNDATACOPY.
///
/// Copies a window of the calldata, or of the last nested call's output,
/// into memory as FIELD cells. Positions past the end of the source read as
/// zero.
///
/// Logic:
///   1. Check that MEM[copy_size] and MEM[start] are U32.
///   2. Charge the dynamic gas for `copy_size` elements.
///   3. MEM[dst..dst + copy_size] = source[start..start + copy_size]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataCopyEvent {
    pub pc: u32,
    pub source: DataSource,
    pub start: u32,
    pub size: u32,
    pub dst_addr: u32,
}

impl DataCopyEvent {
    pub(crate) fn generate(
        ctx: &mut EventContext,
        source: DataSource,
        copy_size: u32,
        start: u32,
        dst: u32,
    ) -> Result<(), ExecutionError> {
        let [size_addr, start_addr, dst_addr] = ctx.resolve([copy_size, start, dst])?;
        let size = ctx.memory.get_as::<u32>(size_addr)?;
        let start = ctx.memory.get_as::<u32>(start_addr)?;

        let family = match source {
            DataSource::Calldata => OpcodeFamily::CalldataCopy,
            DataSource::ReturnData => OpcodeFamily::ReturndataCopy,
        };
        ctx.consume_dynamic_gas(family, size as u64)?;

        Memory::check_range(dst_addr, size as u64)?;
        let state = &mut *ctx.state;
        let data = match source {
            DataSource::Calldata => &ctx.env.calldata,
            DataSource::ReturnData => &state.last_return_data,
        };
        for i in 0..size {
            let value = data
                .get(start as usize + i as usize)
                .copied()
                .unwrap_or_else(Fr::zero);
            state.memory.set(dst_addr + i, MemoryCell::Field(value));
        }

        let pc = ctx.pc;
        ctx.incr_pc();
        ctx.record(|trace| {
            trace.data_copy.push(Self {
                pc,
                source,
                start,
                size,
                dst_addr,
            })
        });
        Ok(())
    }
}

/// Event for SUCCESSCOPY and RETURNDATASIZE.
///
/// Logic:
///   1. MEM[dst] = U1(last call succeeded), or U32(length of its output).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallResultEvent {
    pub pc: u32,
    pub dst_addr: u32,
    pub value: MemoryCell,
}

impl CallResultEvent {
    pub(crate) fn generate_success_copy(
        ctx: &mut EventContext,
        dst: u32,
    ) -> Result<(), ExecutionError> {
        let value = MemoryCell::U1(ctx.last_success);
        Self::generate(ctx, dst, value)
    }

    pub(crate) fn generate_returndata_size(
        ctx: &mut EventContext,
        dst: u32,
    ) -> Result<(), ExecutionError> {
        let value = MemoryCell::U32(saturate_u32(ctx.last_return_data.len() as u64));
        Self::generate(ctx, dst, value)
    }

    fn generate(ctx: &mut EventContext, dst: u32, value: MemoryCell) -> Result<(), ExecutionError> {
        let [dst_addr] = ctx.resolve([dst])?;

        ctx.memory.set(dst_addr, value);
        let pc = ctx.pc;
        ctx.incr_pc();
        ctx.record(|trace| {
            trace.call_result.push(Self {
                pc,
                dst_addr,
                value,
            })
        });
        Ok(())
    }
}
