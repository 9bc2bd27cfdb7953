use ark_bn254::Fr;
use num_traits::Zero;
use tracing::debug;

use super::context::EventContext;
use crate::{
    execution::{
        ControlFlowError, ExecutionError, ExecutionTrace, FrameResult, InternalCallEntry,
        Interpreter,
    },
    gas::Gas,
    serialization::decode_program,
    OpcodeFamily,
};

/// Event for INTERNALCALL.
///
/// Logic:
///   1. Push (PC, PC + 1 instruction) on the internal call stack.
///   2. PC = target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalCallEvent {
    pub pc: u32,
    pub return_pc: u32,
    pub target: u32,
    /// Stack depth after the push.
    pub depth: usize,
}

impl InternalCallEvent {
    pub(crate) fn generate(ctx: &mut EventContext, target: u32) -> Result<(), ExecutionError> {
        let depth = ctx.internal_call_stack.len();
        if depth >= ctx.config.max_internal_call_depth {
            return Err(ControlFlowError::StackOverflow { depth }.into());
        }

        let pc = ctx.pc;
        let return_pc = ctx.next_pc;
        ctx.internal_call_stack.push(InternalCallEntry {
            call_pc: pc,
            return_pc,
        });
        ctx.jump_to(target);
        ctx.record(|trace| {
            trace.internal_call.push(Self {
                pc,
                return_pc,
                target,
                depth: depth + 1,
            })
        });
        Ok(())
    }
}

/// Event for CALL and STATICCALL.
///
/// Runs another contract in a nested frame with its own memory. The callee
/// gets at most the gas requested, and the caller pays for what it used.
/// A callee that fails, has no bytecode or cannot be decoded does not fault
/// the caller; its outcome is only visible through SUCCESSCOPY.
///
/// Logic:
///   1. Check the tags: l2_gas and da_gas U32, addr FIELD, args_size U32.
///   2. Charge the dynamic gas for `args_size` arguments.
///   3. Run the callee on MEM[args..args + args_size] with
///      min(requested, left) gas in each dimension.
///   4. Deduct the callee's used gas and record its success and output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCallEvent {
    pub pc: u32,
    pub is_static: bool,
    pub address: Fr,
    pub args_size: u32,
    pub allocated: Gas,
    pub l2_gas_used: u64,
    pub da_gas_used: u64,
    pub success: bool,
    /// Trace of the callee's frame, empty if it never started.
    pub callee_trace: ExecutionTrace,
}

impl ExternalCallEvent {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn generate(
        ctx: &mut EventContext,
        is_static: bool,
        l2_gas: u32,
        da_gas: u32,
        addr: u32,
        args_size: u32,
        args: u32,
    ) -> Result<(), ExecutionError> {
        let [l2_gas_addr, da_gas_addr, addr_addr, args_size_addr, args_addr] =
            ctx.resolve([l2_gas, da_gas, addr, args_size, args])?;

        let l2_gas = ctx.memory.get_as::<u32>(l2_gas_addr)?;
        let da_gas = ctx.memory.get_as::<u32>(da_gas_addr)?;
        let address = ctx.memory.get_as::<Fr>(addr_addr)?;
        let args_size = ctx.memory.get_as::<u32>(args_size_addr)?;

        let family = if is_static {
            OpcodeFamily::StaticCall
        } else {
            OpcodeFamily::Call
        };
        ctx.consume_dynamic_gas(family, args_size as u64)?;
        let calldata = ctx.load_fields(args_addr, args_size)?;

        let callee_depth = ctx.depth + 1;
        if callee_depth > ctx.config.max_call_depth {
            return Err(ExecutionError::CallDepthExceeded {
                depth: callee_depth,
                max: ctx.config.max_call_depth,
            });
        }

        // Both counters are bounded by the requested u32 amounts.
        let allocated = Gas::new(
            ctx.l2_gas_left.min(l2_gas as u64) as u32,
            ctx.da_gas_left.min(da_gas as u64) as u32,
        );
        let selector = calldata.first().copied().unwrap_or_else(Fr::zero);
        let env = ctx.env.derive_nested_call(address, calldata, is_static);

        let result = match ctx.host.get_bytecode(address, selector) {
            None => {
                debug!(%address, "call to a contract without bytecode");
                FrameResult::exceptional_halt(allocated)
            }
            Some(bytecode) => match decode_program(&bytecode) {
                Err(err) => {
                    debug!(%address, %err, "callee bytecode failed to decode");
                    FrameResult::exceptional_halt(allocated)
                }
                Ok(program) => {
                    let mut callee = Interpreter::nested(&mut *ctx.host, *ctx.config, callee_depth);
                    let result = callee.execute_program(&program, env, allocated);
                    ctx.stats.merge(callee.stats());
                    result
                }
            },
        };

        ctx.state.consume(result.l2_gas_used, result.da_gas_used)?;
        ctx.state.last_success = result.success;
        ctx.state.last_return_data = result.output;

        let pc = ctx.pc;
        ctx.incr_pc();
        ctx.record(|trace| {
            trace.external_call.push(Self {
                pc,
                is_static,
                address,
                args_size,
                allocated,
                l2_gas_used: result.l2_gas_used,
                da_gas_used: result.da_gas_used,
                success: result.success,
                callee_trace: result.trace,
            })
        });
        Ok(())
    }
}
