use std::{env, str::FromStr};

use tracing::warn;

/// Runtime knobs of the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatorConfig {
    /// Maximum depth of the internal call stack of a single frame.
    pub max_internal_call_depth: usize,
    /// Maximum nesting of contract calls, the top-level frame being depth 0.
    pub max_call_depth: usize,
    /// Whether `DEBUGLOG` instructions emit their message.
    pub debug_logging: bool,
    /// Whether executed instructions are recorded in the frame's trace.
    pub collect_trace: bool,
    /// Whether per-opcode cycle counts are collected.
    pub collect_stats: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            max_internal_call_depth: 1024,
            max_call_depth: 8,
            debug_logging: false,
            collect_trace: true,
            collect_stats: false,
        }
    }
}

impl SimulatorConfig {
    /// Default configuration, overridden by `AVM_DEBUG_LOGGING`,
    /// `AVM_MAX_CALL_DEPTH` and `AVM_MAX_INTERNAL_CALL_DEPTH` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(debug_logging) = read_env_flag("AVM_DEBUG_LOGGING") {
            config.debug_logging = debug_logging;
        }
        if let Some(depth) = read_env("AVM_MAX_CALL_DEPTH") {
            config.max_call_depth = depth;
        }
        if let Some(depth) = read_env("AVM_MAX_INTERNAL_CALL_DEPTH") {
            config.max_internal_call_depth = depth;
        }
        config
    }

    pub const fn with_max_internal_call_depth(mut self, depth: usize) -> Self {
        self.max_internal_call_depth = depth;
        self
    }

    pub const fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub const fn with_debug_logging(mut self, enabled: bool) -> Self {
        self.debug_logging = enabled;
        self
    }

    pub const fn with_collect_trace(mut self, enabled: bool) -> Self {
        self.collect_trace = enabled;
        self
    }

    pub const fn with_collect_stats(mut self, enabled: bool) -> Self {
        self.collect_stats = enabled;
        self
    }
}

fn read_env<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable environment override");
            None
        }
    }
}

fn read_env_flag(key: &str) -> Option<bool> {
    let raw = env::var(key).ok()?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => {
            warn!(key, value = %raw, "ignoring unparsable environment flag");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let config = SimulatorConfig::default()
            .with_max_call_depth(2)
            .with_max_internal_call_depth(4)
            .with_debug_logging(true)
            .with_collect_trace(false)
            .with_collect_stats(true);
        assert_eq!(
            config,
            SimulatorConfig {
                max_internal_call_depth: 4,
                max_call_depth: 2,
                debug_logging: true,
                collect_trace: false,
                collect_stats: true,
            }
        );
    }

    #[test]
    fn test_from_env() {
        // Keys are unique to this test so that parallel tests never observe
        // them through `from_env`.
        env::set_var("AVM_TEST_CONFIG_DEPTH", "17");
        env::set_var("AVM_TEST_CONFIG_BAD_DEPTH", "seventeen");
        env::set_var("AVM_TEST_CONFIG_FLAG", "True");

        assert_eq!(read_env::<usize>("AVM_TEST_CONFIG_DEPTH"), Some(17));
        assert_eq!(read_env::<usize>("AVM_TEST_CONFIG_BAD_DEPTH"), None);
        assert_eq!(read_env::<usize>("AVM_TEST_CONFIG_MISSING"), None);
        assert_eq!(read_env_flag("AVM_TEST_CONFIG_FLAG"), Some(true));
    }
}
