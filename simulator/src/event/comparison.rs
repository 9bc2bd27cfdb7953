use std::cmp::Ordering;

use ark_ff::PrimeField;

use super::context::EventContext;
use crate::{
    execution::ExecutionError,
    memory::{MemoryCell, Tag},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    Lt,
    Lte,
}

/// Event for EQ, LT and LTE.
///
/// Compares two cells of the same tag and writes the outcome as a U1. FIELD
/// values are ordered by their canonical representative.
///
/// Logic:
///   1. Check that MEM[a] and MEM[b] carry the same tag.
///   2. MEM[dst] = U1(MEM[a] op MEM[b])
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonEvent {
    pub pc: u32,
    pub op: ComparisonOp,
    pub tag: Tag,
    pub a_addr: u32,
    pub b_addr: u32,
    pub dst_addr: u32,
    pub a: MemoryCell,
    pub b: MemoryCell,
    pub result: bool,
}

impl ComparisonEvent {
    pub(crate) fn generate(
        ctx: &mut EventContext,
        op: ComparisonOp,
        a: u32,
        b: u32,
        dst: u32,
    ) -> Result<(), ExecutionError> {
        let [a_addr, b_addr, dst_addr] = ctx.resolve([a, b, dst])?;
        let tag = ctx.memory.check_tags_are_same(a_addr, b_addr)?;
        let a = ctx.memory.get(a_addr);
        let b = ctx.memory.get(b_addr);

        let ordering = match (a, b) {
            (MemoryCell::Field(x), MemoryCell::Field(y)) => x.into_bigint().cmp(&y.into_bigint()),
            _ => {
                let (_, x) = ctx.memory.get_integral(a_addr)?;
                let (_, y) = ctx.memory.get_integral(b_addr)?;
                x.cmp(&y)
            }
        };
        let result = match op {
            ComparisonOp::Eq => ordering == Ordering::Equal,
            ComparisonOp::Lt => ordering == Ordering::Less,
            ComparisonOp::Lte => ordering != Ordering::Greater,
        };

        ctx.memory.set(dst_addr, MemoryCell::U1(result));
        let pc = ctx.pc;
        ctx.incr_pc();
        ctx.record(|trace| {
            trace.comparison.push(Self {
                pc,
                op,
                tag,
                a_addr,
                b_addr,
                dst_addr,
                a,
                b,
                result,
            })
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ark_bn254::Fr;
    use num_traits::One;

    use super::*;
    use crate::{event::test_utils::TestFrame, Instruction};

    fn run(op: fn(u8, u8, u8) -> Instruction, a: MemoryCell, b: MemoryCell) -> MemoryCell {
        let mut frame = TestFrame::new(&[a, b]);
        frame.execute(op(0, 1, 2)).unwrap();
        frame.state.memory.get(2)
    }

    fn lt(a: u8, b: u8, dst: u8) -> Instruction {
        Instruction::Lt8 {
            indirect: 0,
            a,
            b,
            dst,
        }
    }

    fn lte(a: u8, b: u8, dst: u8) -> Instruction {
        Instruction::Lte8 {
            indirect: 0,
            a,
            b,
            dst,
        }
    }

    fn eq(a: u8, b: u8, dst: u8) -> Instruction {
        Instruction::Eq8 {
            indirect: 0,
            a,
            b,
            dst,
        }
    }

    #[test]
    fn test_integral_comparisons() {
        let (three, five) = (MemoryCell::U32(3), MemoryCell::U32(5));
        assert_eq!(run(lt, three, five), MemoryCell::U1(true));
        assert_eq!(run(lt, five, three), MemoryCell::U1(false));
        assert_eq!(run(lt, five, five), MemoryCell::U1(false));
        assert_eq!(run(lte, five, five), MemoryCell::U1(true));
        assert_eq!(run(eq, five, five), MemoryCell::U1(true));
        assert_eq!(run(eq, three, five), MemoryCell::U1(false));
    }

    #[test]
    fn test_field_ordering_is_canonical() {
        // p - 1 is the largest field element, not a negative one.
        let minus_one = MemoryCell::Field(-Fr::one());
        let one = MemoryCell::Field(Fr::one());
        assert_eq!(run(lt, one, minus_one), MemoryCell::U1(true));
        assert_eq!(run(lte, minus_one, one), MemoryCell::U1(false));
        assert_eq!(run(eq, minus_one, minus_one), MemoryCell::U1(true));
    }

    #[test]
    fn test_mismatched_tags() {
        let mut frame = TestFrame::new(&[MemoryCell::U32(3), MemoryCell::U64(3)]);
        assert!(frame.execute(eq(0, 1, 2)).is_err());
        assert!(!frame.state.memory.get(2).is_initialized());
    }
}
