use ark_ff::PrimeField;

use super::context::EventContext;
use crate::{
    execution::{ConversionError, ExecutionError},
    memory::{Memory, MemoryCell, Tag},
    OpcodeFamily,
};

/// Event for CAST.
///
/// Converts a cell of any initialized tag to the requested tag. Integral
/// destinations keep the low bits of the source (of its canonical value for a
/// FIELD source), a FIELD destination lifts the source into the field.
///
/// Logic:
///   1. Check that `tag` is a valid tag and MEM[src] is initialized.
///   2. MEM[dst] = cast(MEM[src], tag)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastEvent {
    pub pc: u32,
    pub src_addr: u32,
    pub dst_addr: u32,
    pub src: MemoryCell,
    pub result: MemoryCell,
}

impl CastEvent {
    pub(crate) fn generate(
        ctx: &mut EventContext,
        src: u32,
        dst: u32,
        tag: u8,
    ) -> Result<(), ExecutionError> {
        let [src_addr, dst_addr] = ctx.resolve([src, dst])?;
        let tag = Tag::from_wire(tag)?;
        let src = ctx.memory.get_initialized(src_addr)?;

        let result = match src {
            MemoryCell::Field(value) => MemoryCell::from_field(tag, value),
            _ => MemoryCell::from_u128(tag, src.to_u128().unwrap_or_default()),
        };

        ctx.memory.set(dst_addr, result);
        let pc = ctx.pc;
        ctx.incr_pc();
        ctx.record(|trace| {
            trace.cast.push(Self {
                pc,
                src_addr,
                dst_addr,
                src,
                result,
            })
        });
        Ok(())
    }
}

/// Event for TORADIXBE.
///
/// Decomposes a field element into `num_limbs` big-endian limbs of the given
/// radix. With `output_bits` set the radix must be 2 and the limbs are
/// written as U1, otherwise as U8.
///
/// Logic:
///   1. Check the tags: src FIELD, radix U32, num_limbs U32, output_bits U1.
///   2. Check that 2 <= radix <= 256.
///   3. Charge the dynamic gas for `num_limbs` limbs.
///   4. MEM[dst..dst + num_limbs] = limbs of MEM[src], most significant first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToRadixBeEvent {
    pub pc: u32,
    pub src_addr: u32,
    pub dst_addr: u32,
    pub radix: u32,
    pub num_limbs: u32,
    pub output_bits: bool,
}

/// Largest radix whose limbs fit in a U8 cell.
pub const MAX_RADIX: u32 = 256;

impl ToRadixBeEvent {
    pub(crate) fn generate(
        ctx: &mut EventContext,
        src: u32,
        radix: u32,
        num_limbs: u32,
        output_bits: u32,
        dst: u32,
    ) -> Result<(), ExecutionError> {
        let [src_addr, radix_addr, num_limbs_addr, output_bits_addr, dst_addr] =
            ctx.resolve([src, radix, num_limbs, output_bits, dst])?;

        let value = ctx.memory.get_as::<ark_bn254::Fr>(src_addr)?;
        let radix = ctx.memory.get_as::<u32>(radix_addr)?;
        let num_limbs = ctx.memory.get_as::<u32>(num_limbs_addr)?;
        let output_bits = ctx.memory.get_as::<bool>(output_bits_addr)?;

        if !(2..=MAX_RADIX).contains(&radix) || (output_bits && radix != 2) {
            return Err(ConversionError::InvalidRadix { radix }.into());
        }

        ctx.consume_dynamic_gas(OpcodeFamily::ToRadixBE, num_limbs as u64)?;
        Memory::check_range(dst_addr, num_limbs as u64)?;

        let limbs = to_radix_le(value.into_bigint().0, radix, num_limbs)?;
        // Big-endian output: limbs past the significant ones are zero.
        for i in 0..num_limbs {
            let limb = limbs.get((num_limbs - 1 - i) as usize).copied().unwrap_or(0);
            let cell = if output_bits {
                MemoryCell::U1(limb == 1)
            } else {
                MemoryCell::U8(limb)
            };
            ctx.memory.set(dst_addr + i, cell);
        }

        let pc = ctx.pc;
        ctx.incr_pc();
        ctx.record(|trace| {
            trace.to_radix_be.push(Self {
                pc,
                src_addr,
                dst_addr,
                radix,
                num_limbs,
                output_bits,
            })
        });
        Ok(())
    }
}

/// Significant little-endian limbs of the 256-bit integer `words` (least
/// significant word first), failing if they need more than `num_limbs`.
fn to_radix_le(
    mut words: [u64; 4],
    radix: u32,
    num_limbs: u32,
) -> Result<Vec<u8>, ConversionError> {
    let mut limbs = Vec::new();
    for _ in 0..num_limbs {
        if words.iter().all(|word| *word == 0) {
            break;
        }
        limbs.push(div_rem(&mut words, radix as u64) as u8);
    }
    if words.iter().any(|word| *word != 0) {
        return Err(ConversionError::InsufficientLimbs { radix, num_limbs });
    }
    Ok(limbs)
}

/// Divides `words` in place by `divisor`, returning the remainder.
fn div_rem(words: &mut [u64; 4], divisor: u64) -> u64 {
    let divisor = divisor as u128;
    let mut rem = 0u128;
    for word in words.iter_mut().rev() {
        let current = (rem << 64) | *word as u128;
        *word = (current / divisor) as u64;
        rem = current % divisor;
    }
    rem as u64
}
