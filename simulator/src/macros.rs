/// Maps a wire operand kind to the Rust type holding it.
macro_rules! operand_ty {
    (Indirect8) => { u8 };
    (Indirect16) => { u16 };
    (Tag) => { u8 };
    (U8) => { u8 };
    (U16) => { u16 };
    (U32) => { u32 };
    (U64) => { u64 };
    (U128) => { u128 };
    (FF) => { ark_bn254::Fr };
}

/// Defines the [`Instruction`](crate::Instruction) enum from its wire layouts.
///
/// Each entry names an [`Opcode`](crate::Opcode) variant and its ordered
/// operands with their wire kinds. The macro generates:
///   - the `Instruction` enum, one variant per opcode, fields typed by width;
///   - `opcode()`, `zeroed()` and the operand codec;
///   - `WIRE_FORMATS`, the const wire-format table indexed by opcode byte.
///
/// Entries must be listed in opcode byte order.
macro_rules! define_instructions {
    (
        $(
            $(#[$attr:meta])*
            $variant:ident { $( $field:ident : $kind:ident ),* $(,)? }
        ),* $(,)?
    ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum Instruction {
            $(
                $(#[$attr])*
                $variant { $( $field: operand_ty!($kind) ),* },
            )*
        }

        impl Instruction {
            /// Returns the opcode of this instruction.
            pub const fn opcode(&self) -> Opcode {
                match self {
                    $( Instruction::$variant { .. } => Opcode::$variant, )*
                }
            }

            /// Returns an instruction of the given opcode with all operands
            /// set to zero.
            pub fn zeroed(opcode: Opcode) -> Self {
                match opcode {
                    $(
                        Opcode::$variant => Instruction::$variant {
                            $( $field: Default::default() ),*
                        },
                    )*
                }
            }

            pub(crate) fn decode_operands(
                opcode: Opcode,
                reader: &mut Reader<'_>,
            ) -> Result<Self, CodecError> {
                Ok(match opcode {
                    $(
                        Opcode::$variant => Instruction::$variant {
                            $( $field: WireOperand::read(reader)? ),*
                        },
                    )*
                })
            }

            pub(crate) fn encode_operands(&self, out: &mut Vec<u8>) {
                match self {
                    $(
                        #[allow(unused_variables)]
                        Instruction::$variant { $( $field ),* } => {
                            $( WireOperand::write($field, out); )*
                        }
                    )*
                }
            }
        }

        /// Wire format of every opcode, indexed by opcode byte.
        pub const WIRE_FORMATS: [&[OperandType]; Opcode::COUNT] = [
            $( &[ $( OperandType::$kind ),* ], )*
        ];
    };
}
