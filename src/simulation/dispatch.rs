//! Dispatch resolution.
//!
//! Interprets one component of the action vector against one machine and
//! its queue.
//!
//! # Selection Policy
//!
//! | Machine | Queue | Selection `v` | Effect |
//! |---------|-------|---------------|--------|
//! | Busy | any | any | ignored |
//! | Idle | empty | any | no-op |
//! | Idle | non-empty | 0 | start head (as `v = 1`) |
//! | Idle | non-empty | `v ≥ 1` | start index `v - 1`, clamped to the tail |
//!
//! An idle machine with waiting work always starts something: the
//! decision-maker picks *which* order, never *whether*.

use serde::{Deserialize, Serialize};

use super::queue::MachineQueue;
use crate::catalog::OrderCatalog;
use crate::error::{Result, SimError};
use crate::models::{Machine, OrderId};

/// What a dispatch decision did to one machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchOutcome {
    /// The machine was busy; the selection was ignored.
    Ignored,
    /// Nothing was waiting.
    EmptyQueue,
    /// An order was taken from `index` and started.
    Started { order_id: OrderId, index: usize },
}

impl DispatchOutcome {
    pub fn is_start(&self) -> bool {
        matches!(self, DispatchOutcome::Started { .. })
    }
}

/// Maps a selection value to a queue index.
///
/// Returns `None` for an empty queue. Zero selects the head; values past
/// the end select the tail.
pub fn resolve_selection(selection: usize, queue_len: usize) -> Option<usize> {
    if queue_len == 0 {
        return None;
    }
    Some((selection.max(1) - 1).min(queue_len - 1))
}

/// Applies one selection to an idle machine.
///
/// The chosen order leaves the queue and occupies the machine for its
/// setup + processing time on that machine, starting at `now`.
///
/// # Errors
/// `RouteConsistency` if the chosen order has no timing on this machine.
/// The queue and machine are left untouched in that case.
pub fn dispatch(
    machine: &mut Machine,
    queue: &mut MachineQueue,
    selection: usize,
    catalog: &OrderCatalog,
    now: i64,
) -> Result<DispatchOutcome> {
    if machine.is_busy() {
        return Ok(DispatchOutcome::Ignored);
    }
    let Some(index) = resolve_selection(selection, queue.len()) else {
        return Ok(DispatchOutcome::EmptyQueue);
    };
    let Some(order_idx) = queue.get(index) else {
        return Ok(DispatchOutcome::EmptyQueue);
    };

    let order = catalog.order(order_idx);
    let total = order
        .occupancy_on(&machine.id)
        .ok_or_else(|| SimError::RouteConsistency {
            order_id: order.id.clone(),
            machine: machine.id.clone(),
        })?;

    machine.start(order_idx, &order.id, total, now)?;
    queue.take(index);

    Ok(DispatchOutcome::Started {
        order_id: order.id.clone(),
        index,
    })
}
