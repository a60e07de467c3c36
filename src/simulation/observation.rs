//! Observation and step result types.

use serde::{Deserialize, Serialize};

use super::dispatch::DispatchOutcome;
use crate::models::OrderId;

/// Fixed-layout view of the simulation handed to the decision-maker.
///
/// Flattened layout: remaining time per machine, queue length per machine,
/// then the clock (`2 * machines + 1` values).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Ticks until the current occupancy ends, 0 when idle.
    pub remaining_times: Vec<i64>,
    /// Waiting orders per machine.
    pub queue_lengths: Vec<usize>,
    /// Simulation time.
    pub clock: i64,
}

impl Observation {
    /// Flattened vector length.
    pub fn len(&self) -> usize {
        self.remaining_times.len() + self.queue_lengths.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flattened numeric vector, in the layout policies are trained on.
    pub fn to_vec(&self) -> Vec<f32> {
        self.remaining_times
            .iter()
            .map(|&t| t as f32)
            .chain(self.queue_lengths.iter().map(|&q| q as f32))
            .chain(std::iter::once(self.clock as f32))
            .collect()
    }
}

/// Outcome of one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub observation: Observation,
    pub reward: f64,
    /// Every order has completed.
    pub done: bool,
    /// Orders whose route finished during this tick.
    pub completed_this_tick: Vec<OrderId>,
    /// One entry per machine, in observation order.
    pub dispatches: Vec<DispatchOutcome>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_layout() {
        let obs = Observation {
            remaining_times: vec![3, 0, 7],
            queue_lengths: vec![1, 4, 0],
            clock: 12,
        };
        assert_eq!(obs.len(), 7);
        assert_eq!(obs.to_vec(), vec![3.0, 0.0, 7.0, 1.0, 4.0, 0.0, 12.0]);
    }
}
