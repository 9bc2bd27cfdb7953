#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::_rdtsc;

use strum::{EnumCount, IntoEnumIterator};
use tracing::info;

use crate::Opcode;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct CycleStats {
    total_cycles: u64,
    count: u64,
}

impl CycleStats {
    fn record_time(&mut self, time: u64) {
        self.total_cycles = self.total_cycles.saturating_add(time);
        self.count += 1;
    }

    fn average_cycles(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_cycles as f64 / self.count as f64
        }
    }
}

/// Per-opcode cycle counts, collected when
/// [`SimulatorConfig::collect_stats`](crate::SimulatorConfig) is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllCycleStats {
    stats: [CycleStats; Opcode::COUNT],
}

impl Default for AllCycleStats {
    fn default() -> Self {
        Self::new()
    }
}

impl AllCycleStats {
    pub fn new() -> Self {
        AllCycleStats {
            stats: [CycleStats::default(); Opcode::COUNT],
        }
    }

    pub(crate) fn record_cycles(&mut self, opcode: Opcode, cycles: u64) {
        self.stats[opcode as usize].record_time(cycles);
    }

    /// Adds the counts of a nested frame.
    pub(crate) fn merge(&mut self, other: &AllCycleStats) {
        for (mine, theirs) in self.stats.iter_mut().zip(other.stats.iter()) {
            mine.total_cycles = mine.total_cycles.saturating_add(theirs.total_cycles);
            mine.count += theirs.count;
        }
    }

    /// Number of executions recorded for `opcode`.
    pub fn count(&self, opcode: Opcode) -> u64 {
        self.stats[opcode as usize].count
    }

    pub fn average_cycles(&self, opcode: Opcode) -> f64 {
        self.stats[opcode as usize].average_cycles()
    }

    /// Logs the average cycle count of every opcode that was executed.
    pub fn report(&self) {
        for opcode in Opcode::iter() {
            let stats = &self.stats[opcode as usize];
            if stats.count == 0 {
                continue;
            }
            info!(
                %opcode,
                count = stats.count,
                "average cycles: {:.2}",
                stats.average_cycles()
            );
        }
    }
}

/// Current value of the CPU timestamp counter, 0 where there is none.
#[cfg(target_arch = "x86_64")]
pub(crate) fn cycle_counter() -> u64 {
    // SAFETY: `rdtsc` is available on every x86_64 CPU.
    unsafe { _rdtsc() }
}

#[cfg(not(target_arch = "x86_64"))]
pub(crate) fn cycle_counter() -> u64 {
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_merge() {
        let mut parent = AllCycleStats::new();
        parent.record_cycles(Opcode::Add8, 10);
        parent.record_cycles(Opcode::Add8, 20);

        let mut child = AllCycleStats::new();
        child.record_cycles(Opcode::Add8, 30);
        child.record_cycles(Opcode::Call, 5);

        parent.merge(&child);
        assert_eq!(parent.count(Opcode::Add8), 3);
        assert_eq!(parent.count(Opcode::Call), 1);
        assert_eq!(parent.count(Opcode::Sub8), 0);
        assert_eq!(parent.average_cycles(Opcode::Add8), 20.0);
        assert_eq!(parent.average_cycles(Opcode::Sub8), 0.0);
    }
}
