//! Per-machine waiting queues.
//!
//! Orders arrive at the back. Selection is index-addressable: a dispatch may
//! take any position, not only the head.

use std::collections::VecDeque;

/// Ordered backlog of one machine, holding catalog indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MachineQueue {
    orders: VecDeque<usize>,
}

impl MachineQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an arriving order.
    pub fn push(&mut self, order: usize) {
        self.orders.push_back(order);
    }

    /// Removes and returns the order at `index`.
    pub fn take(&mut self, index: usize) -> Option<usize> {
        self.orders.remove(index)
    }

    /// Order at `index` without removing it.
    pub fn get(&self, index: usize) -> Option<usize> {
        self.orders.get(index).copied()
    }

    pub fn contains(&self, order: usize) -> bool {
        self.orders.contains(&order)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Waiting orders, head first.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.orders.iter().copied()
    }

    pub fn clear(&mut self) {
        self.orders.clear();
    }
}
