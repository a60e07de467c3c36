//! Machine state machine.
//!
//! A machine is either `Idle` or `Busy` with exactly one order. It becomes
//! Idle in the same tick its remaining time is decremented to zero or below.
//!
//! Orders are referenced by their catalog index so the hot path never
//! touches string ids.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::models::MachineId;

/// Machine occupancy status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineStatus {
    /// No order on the machine.
    Idle,
    /// Processing an order.
    Busy,
}

/// An occupancy that ended during `advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinishedOccupancy {
    /// Catalog index of the finished order.
    pub order: usize,
    /// Tick at which the occupancy began.
    pub start_time: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Occupancy {
    order: usize,
    remaining: i64,
    start_time: i64,
}

/// A single-capacity machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    /// Machine identifier.
    pub id: MachineId,
    occupancy: Option<Occupancy>,
}

impl Machine {
    /// Creates an idle machine.
    pub fn new(id: impl Into<MachineId>) -> Self {
        Self {
            id: id.into(),
            occupancy: None,
        }
    }

    pub fn status(&self) -> MachineStatus {
        if self.occupancy.is_some() {
            MachineStatus::Busy
        } else {
            MachineStatus::Idle
        }
    }

    #[inline]
    pub fn is_busy(&self) -> bool {
        self.occupancy.is_some()
    }

    /// Catalog index of the current order, while Busy.
    pub fn current_order(&self) -> Option<usize> {
        self.occupancy.as_ref().map(|o| o.order)
    }

    /// Ticks until completion; 0 while Idle.
    pub fn remaining_time(&self) -> i64 {
        self.occupancy.as_ref().map_or(0, |o| o.remaining)
    }

    /// Tick at which the current occupancy began, while Busy.
    pub fn start_time(&self) -> Option<i64> {
        self.occupancy.as_ref().map(|o| o.start_time)
    }

    /// Starts an order (Idle → Busy).
    ///
    /// `order_label` is only used for the error message.
    ///
    /// # Errors
    /// `MachineBusy` if the machine is already occupied. Callers are expected
    /// to check `is_busy` first; this is a contract violation, not a no-op.
    pub fn start(
        &mut self,
        order: usize,
        order_label: &str,
        total_time: i64,
        now: i64,
    ) -> Result<()> {
        if self.is_busy() {
            return Err(SimError::MachineBusy {
                machine: self.id.clone(),
                order_id: order_label.to_string(),
            });
        }
        self.occupancy = Some(Occupancy {
            order,
            remaining: total_time.max(1),
            start_time: now,
        });
        Ok(())
    }

    /// Whether the current occupancy ends on the next `advance(tick_size)`.
    pub fn finishes_within(&self, tick_size: i64) -> bool {
        self.occupancy
            .as_ref()
            .is_some_and(|o| o.remaining - tick_size <= 0)
    }

    /// Advances one tick (Busy → Idle when the remaining time runs out).
    ///
    /// Returns the finished occupancy, if any. Idle machines are unaffected.
    pub fn advance(&mut self, tick_size: i64) -> Option<FinishedOccupancy> {
        let occupancy = self.occupancy.as_mut()?;
        occupancy.remaining -= tick_size;
        if occupancy.remaining > 0 {
            return None;
        }
        self.occupancy.take().map(|o| FinishedOccupancy {
            order: o.order,
            start_time: o.start_time,
        })
    }

    /// Returns the machine to Idle.
    pub fn reset(&mut self) {
        self.occupancy = None;
    }
}
