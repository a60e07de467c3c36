//! Mutable simulation state.
//!
//! Everything that changes during an episode lives here, separate from the
//! immutable catalog and configuration. Independent simulations use
//! independent states.

use super::queue::MachineQueue;
use crate::models::{Machine, MachineId, ScheduleLog};

/// Where an order currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderLocation {
    /// Waiting in the queue of the machine at this index.
    Queued(usize),
    /// Occupying the machine at this index.
    Running(usize),
    /// Route finished.
    Completed,
}

/// Clock, machines, queues, completed set and schedule log of one episode.
#[derive(Debug, Clone, Default)]
pub struct SimState {
    pub(crate) clock: i64,
    pub(crate) machines: Vec<Machine>,
    pub(crate) queues: Vec<MachineQueue>,
    pub(crate) completed: Vec<bool>,
    pub(crate) completion_order: Vec<usize>,
    pub(crate) log: ScheduleLog,
    pub(crate) steps: u64,
}

impl SimState {
    /// Clears everything and sizes the state for the given machines/orders.
    pub(crate) fn clear(&mut self, machines: &[MachineId], order_count: usize) {
        self.clock = 0;
        self.steps = 0;
        self.machines = machines.iter().map(|m| Machine::new(m.clone())).collect();
        self.queues = vec![MachineQueue::new(); machines.len()];
        self.completed = vec![false; order_count];
        self.completion_order.clear();
        self.log.clear();
    }

    pub(crate) fn mark_completed(&mut self, order: usize) {
        if !self.completed[order] {
            self.completed[order] = true;
            self.completion_order.push(order);
        }
    }

    /// Current simulation time.
    pub fn clock(&self) -> i64 {
        self.clock
    }

    /// Number of `step` calls since the last reset.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Machines in observation order.
    pub fn machines(&self) -> &[Machine] {
        &self.machines
    }

    /// Queue of the machine at `machine_idx`.
    pub fn queue(&self, machine_idx: usize) -> Option<&MachineQueue> {
        self.queues.get(machine_idx)
    }

    /// All queues in observation order.
    pub fn queues(&self) -> &[MachineQueue] {
        &self.queues
    }

    pub fn completed_count(&self) -> usize {
        self.completion_order.len()
    }

    /// Catalog indices of completed orders, in completion order.
    pub fn completed_orders(&self) -> &[usize] {
        &self.completion_order
    }

    pub fn is_completed(&self, order: usize) -> bool {
        self.completed.get(order).copied().unwrap_or(false)
    }

    /// Whether every order has completed.
    pub fn is_done(&self) -> bool {
        !self.completed.is_empty() && self.completion_order.len() == self.completed.len()
    }

    /// Completed occupancies since the last reset.
    pub fn schedule_log(&self) -> &ScheduleLog {
        &self.log
    }

    /// Every place the order appears.
    ///
    /// A consistent state yields exactly one location per order.
    pub fn locations(&self, order: usize) -> Vec<OrderLocation> {
        let mut found = Vec::new();
        for (i, q) in self.queues.iter().enumerate() {
            found.extend(q.iter().filter(|&o| o == order).map(|_| OrderLocation::Queued(i)));
        }
        for (i, m) in self.machines.iter().enumerate() {
            if m.current_order() == Some(order) {
                found.push(OrderLocation::Running(i));
            }
        }
        if self.is_completed(order) {
            found.push(OrderLocation::Completed);
        }
        found
    }
}
