//! Schedule log model.
//!
//! The schedule log records one entry per completed occupancy. It is
//! append-only during an episode and is never read back by the simulator;
//! it exists for Gantt rendering and utilization reporting.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{MachineId, OrderId};

/// One completed occupancy: an order held a machine during `[start, finish)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleLogEntry {
    pub order_id: OrderId,
    pub machine: MachineId,
    pub start_time: i64,
    pub finish_time: i64,
}

impl ScheduleLogEntry {
    /// Creates a log entry.
    pub fn new(
        order_id: impl Into<OrderId>,
        machine: impl Into<MachineId>,
        start_time: i64,
        finish_time: i64,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            machine: machine.into(),
            start_time,
            finish_time,
        }
    }

    /// Occupancy length (finish - start).
    #[inline]
    pub fn duration(&self) -> i64 {
        self.finish_time - self.start_time
    }
}

/// Append-only log of completed occupancies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleLog {
    entries: Vec<ScheduleLogEntry>,
}

impl ScheduleLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, entry: ScheduleLogEntry) {
        self.entries.push(entry);
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries in completion order.
    pub fn entries(&self) -> &[ScheduleLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Makespan: latest finish time (0 if empty).
    pub fn makespan(&self) -> i64 {
        self.entries.iter().map(|e| e.finish_time).max().unwrap_or(0)
    }

    /// All entries for a given order, in completion order.
    pub fn entries_for_order(&self, order_id: &str) -> Vec<&ScheduleLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.order_id == order_id)
            .collect()
    }

    /// All entries for a given machine, in completion order.
    pub fn entries_for_machine(&self, machine: &str) -> Vec<&ScheduleLogEntry> {
        self.entries.iter().filter(|e| e.machine == machine).collect()
    }

    /// Completion time of an order's last logged occupancy.
    pub fn order_completion_time(&self, order_id: &str) -> Option<i64> {
        self.entries_for_order(order_id)
            .iter()
            .map(|e| e.finish_time)
            .max()
    }

    /// Busy time per machine, keyed by machine id.
    pub fn busy_time_by_machine(&self) -> BTreeMap<MachineId, i64> {
        let mut busy = BTreeMap::new();
        for e in &self.entries {
            *busy.entry(e.machine.clone()).or_insert(0) += e.duration();
        }
        busy
    }
}
