use ark_bn254::Fr;
use ark_ff::Field;
use num_traits::Zero;

use super::context::EventContext;
use crate::{
    execution::{ArithmeticError, ExecutionError},
    memory::{MemoryCell, Tag, TagError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
    FDiv,
}

/// Event for ADD, SUB, MUL, DIV and FDIV.
///
/// Performs an arithmetic operation between two cells of the same tag.
/// Integral tags wrap modulo `2^bits`, FIELD uses field arithmetic.
///
/// Logic:
///   1. Check that MEM[a] and MEM[b] carry the same tag, integral for DIV and
///      FIELD for FDIV.
///   2. MEM[dst] = MEM[a] op MEM[b], tagged like the operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArithmeticEvent {
    pub pc: u32,
    pub op: ArithmeticOp,
    pub tag: Tag,
    pub a_addr: u32,
    pub b_addr: u32,
    pub dst_addr: u32,
    pub a: MemoryCell,
    pub b: MemoryCell,
    pub result: MemoryCell,
}

impl ArithmeticEvent {
    pub(crate) fn generate(
        ctx: &mut EventContext,
        op: ArithmeticOp,
        a: u32,
        b: u32,
        dst: u32,
    ) -> Result<(), ExecutionError> {
        let [a_addr, b_addr, dst_addr] = ctx.resolve([a, b, dst])?;
        let tag = ctx.memory.check_tags_are_same(a_addr, b_addr)?;
        let a = ctx.memory.get(a_addr);
        let b = ctx.memory.get(b_addr);

        let result = match (a, b) {
            (MemoryCell::Field(x), MemoryCell::Field(y)) => {
                if op == ArithmeticOp::Div {
                    return Err(TagError::NonIntegral {
                        address: a_addr,
                        found: tag,
                    }
                    .into());
                }
                MemoryCell::Field(field_op(op, x, y)?)
            }
            _ => {
                if op == ArithmeticOp::FDiv {
                    return Err(TagError::TagMismatch {
                        address: a_addr,
                        expected: Tag::Field,
                        found: tag,
                    }
                    .into());
                }
                let (_, x) = ctx.memory.get_integral(a_addr)?;
                let (_, y) = ctx.memory.get_integral(b_addr)?;
                MemoryCell::from_u128(tag, integral_op(op, x, y)?)
            }
        };

        ctx.memory.set(dst_addr, result);
        let pc = ctx.pc;
        ctx.incr_pc();
        ctx.record(|trace| {
            trace.arithmetic.push(Self {
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

fn field_op(op: ArithmeticOp, x: Fr, y: Fr) -> Result<Fr, ArithmeticError> {
    Ok(match op {
        ArithmeticOp::Add => x + y,
        ArithmeticOp::Sub => x - y,
        ArithmeticOp::Mul => x * y,
        ArithmeticOp::Div | ArithmeticOp::FDiv => {
            x * y.inverse().ok_or(ArithmeticError::DivisionByZero)?
        }
    })
}

/// Computes on the full 128 bits; the caller truncates to the tag's width,
/// which yields the result modulo `2^bits`.
fn integral_op(op: ArithmeticOp, x: u128, y: u128) -> Result<u128, ArithmeticError> {
    Ok(match op {
        ArithmeticOp::Add => x.wrapping_add(y),
        ArithmeticOp::Sub => x.wrapping_sub(y),
        ArithmeticOp::Mul => x.wrapping_mul(y),
        ArithmeticOp::Div | ArithmeticOp::FDiv => {
            if y.is_zero() {
                return Err(ArithmeticError::DivisionByZero);
            }
            x / y
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{event::test_utils::TestFrame, Instruction};

    fn add8(a: u8, b: u8, dst: u8) -> Instruction {
        Instruction::Add8 {
            indirect: 0,
            a,
            b,
            dst,
        }
    }

    #[test]
    fn test_integral_wrapping() {
        let cases = [
            (MemoryCell::U8(250), MemoryCell::U8(10), MemoryCell::U8(4)),
            (MemoryCell::U1(true), MemoryCell::U1(true), MemoryCell::U1(false)),
            (
                MemoryCell::U128(u128::MAX),
                MemoryCell::U128(2),
                MemoryCell::U128(1),
            ),
        ];
        for (a, b, expected) in cases {
            let mut frame = TestFrame::new(&[a, b]);
            frame.execute(add8(0, 1, 2)).unwrap();
            assert_eq!(frame.state.memory.get(2), expected);
            assert_eq!(frame.trace.arithmetic.len(), 1);
        }

        let mut frame = TestFrame::new(&[MemoryCell::U16(1), MemoryCell::U16(2)]);
        frame
            .execute(Instruction::Sub16 {
                indirect: 0,
                a: 0,
                b: 1,
                dst: 2,
            })
            .unwrap();
        assert_eq!(frame.state.memory.get(2), MemoryCell::U16(u16::MAX));

        let mut frame = TestFrame::new(&[MemoryCell::U32(1 << 20), MemoryCell::U32(1 << 20)]);
        frame
            .execute(Instruction::Mul8 {
                indirect: 0,
                a: 0,
                b: 1,
                dst: 2,
            })
            .unwrap();
        assert_eq!(frame.state.memory.get(2), MemoryCell::U32(0));
    }

    #[test]
    fn test_field_arithmetic() {
        let a = Fr::from(7u64);
        let b = Fr::from(3u64);
        let mut frame = TestFrame::new(&[a.into(), b.into()]);
        frame
            .execute(Instruction::Sub8 {
                indirect: 0,
                a: 1,
                b: 0,
                dst: 2,
            })
            .unwrap();
        assert_eq!(frame.state.memory.get(2), MemoryCell::Field(b - a));

        frame
            .execute(Instruction::FDiv8 {
                indirect: 0,
                a: 0,
                b: 1,
                dst: 3,
            })
            .unwrap();
        let quotient = frame.state.memory.get_as::<Fr>(3).unwrap();
        assert_eq!(quotient * b, a);
    }

    #[test]
    fn test_division() {
        let mut frame = TestFrame::new(&[MemoryCell::U64(17), MemoryCell::U64(5)]);
        frame
            .execute(Instruction::Div8 {
                indirect: 0,
                a: 0,
                b: 1,
                dst: 2,
            })
            .unwrap();
        assert_eq!(frame.state.memory.get(2), MemoryCell::U64(3));

        let mut frame = TestFrame::new(&[MemoryCell::U64(17), MemoryCell::U64(0)]);
        let err = frame
            .execute(Instruction::Div8 {
                indirect: 0,
                a: 0,
                b: 1,
                dst: 2,
            })
            .unwrap_err();
        assert_eq!(
            err,
            ExecutionError::Arithmetic(ArithmeticError::DivisionByZero)
        );
        assert!(!frame.state.memory.get(2).is_initialized());

        let mut frame = TestFrame::new(&[Fr::from(4u64).into(), Fr::from(2u64).into()]);
        assert!(matches!(
            frame.execute(Instruction::Div8 {
                indirect: 0,
                a: 0,
                b: 1,
                dst: 2,
            }),
            Err(ExecutionError::Tag(TagError::NonIntegral { .. }))
        ));

        let mut frame = TestFrame::new(&[Fr::from(4u64).into(), Fr::zero().into()]);
        assert_eq!(
            frame.execute(Instruction::FDiv8 {
                indirect: 0,
                a: 0,
                b: 1,
                dst: 2,
            }),
            Err(ExecutionError::Arithmetic(ArithmeticError::DivisionByZero))
        );
    }

    #[test]
    fn test_tag_mismatch_writes_nothing() {
        let mut frame = TestFrame::new(&[MemoryCell::U8(1), MemoryCell::U16(2)]);
        let err = frame.execute(add8(0, 1, 2)).unwrap_err();
        assert_eq!(
            err,
            ExecutionError::Tag(TagError::TagMismatch {
                address: 1,
                expected: Tag::U8,
                found: Tag::U16
            })
        );
        assert_eq!(frame.state.memory.get(2), MemoryCell::Uninitialized);
        assert_eq!(frame.state.pc, 0);
        assert!(frame.trace.arithmetic.is_empty());
    }
}
