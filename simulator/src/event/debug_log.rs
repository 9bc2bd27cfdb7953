use std::fmt::Write;

use ark_bn254::Fr;
use tracing::debug;

use super::context::EventContext;
use crate::{execution::ExecutionError, memory::Memory};

/// Event for DEBUGLOG.
///
/// Does nothing unless debug logging is enabled in the configuration. When
/// it is, the message is read as U8 character codes and every `{i}` in it is
/// replaced by the i-th field before the result is logged.
///
/// Logic:
///   1. Check that MEM[message..message + message_size] are U8 and
///      MEM[fields_size] is U32.
///   2. Log format(message, MEM[fields..fields + fields_size]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugLogEvent {
    pub pc: u32,
    pub message: String,
    pub fields: Vec<Fr>,
}

impl DebugLogEvent {
    pub(crate) fn generate(
        ctx: &mut EventContext,
        message: u32,
        fields: u32,
        fields_size: u32,
        message_size: u16,
    ) -> Result<(), ExecutionError> {
        if !ctx.config.debug_logging {
            ctx.incr_pc();
            return Ok(());
        }

        let [message_addr, fields_addr, fields_size_addr] =
            ctx.resolve([message, fields, fields_size])?;
        Memory::check_range(message_addr, message_size as u64)?;
        let template = (0..message_size as u32)
            .map(|i| ctx.memory.get_as::<u8>(message_addr + i).map(char::from))
            .collect::<Result<String, _>>()?;
        let fields_size = ctx.memory.get_as::<u32>(fields_size_addr)?;
        let fields = ctx.load_fields(fields_addr, fields_size)?;

        let message = format_message(&template, &fields);
        debug!(target: "avm::debuglog", address = %ctx.env.address, "{message}");

        let pc = ctx.pc;
        ctx.incr_pc();
        ctx.record(|trace| {
            trace.debug_log.push(Self {
                pc,
                message,
                fields,
            })
        });
        Ok(())
    }
}

/// Replaces every `{i}` in `template` with `fields[i]`. Placeholders with no
/// matching field are kept as written.
fn format_message(template: &str, fields: &[Fr]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let field = after.find('}').and_then(|close| {
            let index: usize = after[..close].parse().ok()?;
            fields.get(index).map(|field| (close, field))
        });
        match field {
            Some((close, field)) => {
                let _ = write!(out, "{field}");
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::SimulatorConfig,
        event::test_utils::TestFrame,
        memory::{MemoryCell, Tag, TagError},
        Instruction,
    };

    fn debug_log(message_size: u16) -> Instruction {
        Instruction::DebugLog {
            indirect: 0,
            message: 10,
            fields: 0,
            fields_size: 2,
            message_size,
        }
    }

    fn frame_with_message(message: &str) -> TestFrame {
        let mut frame = TestFrame::new(&[
            Fr::from(5u64).into(),
            Fr::from(6u64).into(),
            MemoryCell::U32(2),
        ]);
        for (i, byte) in message.bytes().enumerate() {
            frame.state.memory.set(10 + i as u32, MemoryCell::U8(byte));
        }
        frame
    }

    #[test]
    fn test_format_message() {
        let fields = [Fr::from(5u64), Fr::from(6u64)];
        assert_eq!(format_message("a={0} b={1}", &fields), "a=5 b=6");
        assert_eq!(format_message("{1}{0}{1}", &fields), "656");
        assert_eq!(format_message("{2} {x} {", &fields), "{2} {x} {");
    }

    #[test]
    fn test_debug_log_disabled_is_noop() {
        let mut frame = TestFrame::new(&[]);
        frame.execute(debug_log(4)).unwrap();
        assert_eq!(frame.state.pc, debug_log(4).size() as u32);
        assert!(frame.trace.debug_log.is_empty());
    }

    #[test]
    fn test_debug_log_enabled() {
        let mut frame = frame_with_message("x={1}")
            .with_config(SimulatorConfig::default().with_debug_logging(true));
        frame.execute(debug_log(5)).unwrap();
        assert_eq!(frame.trace.debug_log.len(), 1);
        assert_eq!(frame.trace.debug_log[0].message, "x=6");
        assert_eq!(
            frame.trace.debug_log[0].fields,
            vec![Fr::from(5u64), Fr::from(6u64)]
        );
    }

    #[test]
    fn test_debug_log_checks_message_tags() {
        let mut frame = frame_with_message("ab")
            .with_config(SimulatorConfig::default().with_debug_logging(true));
        frame.state.memory.set(11, MemoryCell::U16(98));
        assert_eq!(
            frame.execute(debug_log(2)),
            Err(ExecutionError::Tag(TagError::TagMismatch {
                address: 11,
                expected: Tag::U8,
                found: Tag::U16
            }))
        );
    }
}
