//! Read-only views handed to policies and rules.

use crate::models::Order;
use crate::simulation::{Observation, ShopFloor, SimState};

/// Per-candidate scheduling context passed to dispatching rules.
#[derive(Debug, Clone, Copy)]
pub struct DispatchContext<'a> {
    /// Current simulation time.
    pub current_time: i64,
    /// Machine the order would start on.
    pub machine: &'a str,
    /// Position of the order in the machine's queue (0 = head).
    pub position: usize,
    /// Occupancy ticks on this machine.
    pub occupancy: i64,
    /// Occupancy ticks from this machine to the end of the route.
    pub remaining_work: i64,
    /// Queue length at the next machine of the route, if any.
    pub next_queue_length: Option<usize>,
}

/// A waiting order together with its dispatch context.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub order: &'a Order,
    pub context: DispatchContext<'a>,
}

/// Read-only view of a simulation for decision-makers.
#[derive(Debug, Clone, Copy)]
pub struct PolicyView<'a> {
    floor: &'a ShopFloor,
    state: &'a SimState,
}

impl<'a> PolicyView<'a> {
    pub fn new(floor: &'a ShopFloor, state: &'a SimState) -> Self {
        Self { floor, state }
    }

    pub fn floor(&self) -> &'a ShopFloor {
        self.floor
    }

    pub fn state(&self) -> &'a SimState {
        self.state
    }

    /// The observation vector a learned policy would receive.
    pub fn observation(&self) -> Observation {
        self.floor.observe(self.state)
    }

    pub fn machine_count(&self) -> usize {
        self.floor.machine_count()
    }

    /// Largest selection value an action component may carry.
    pub fn max_selection(&self) -> usize {
        self.floor.config().max_queue_size
    }

    /// Whether the machine at `machine_idx` can take work this tick.
    pub fn is_idle(&self, machine_idx: usize) -> bool {
        self.state
            .machines()
            .get(machine_idx)
            .is_some_and(|m| !m.is_busy())
    }

    /// Addressable waiting orders of a machine.
    ///
    /// Only the first `max_queue_size` positions can be selected by an
    /// action, so later positions are not offered.
    pub fn candidates(&self, machine_idx: usize) -> Vec<Candidate<'a>> {
        let catalog = self.floor.catalog();
        let Some(machine) = catalog.machines().get(machine_idx) else {
            return Vec::new();
        };
        let Some(queue) = self.state.queue(machine_idx) else {
            return Vec::new();
        };
        queue
            .iter()
            .take(self.max_selection())
            .enumerate()
            .map(|(position, order_idx)| {
                let order = catalog.order(order_idx);
                let next_queue_length = order
                    .next_machine_after(machine)
                    .and_then(|next| catalog.machine_index(next))
                    .and_then(|i| self.state.queue(i))
                    .map(|q| q.len());
                Candidate {
                    order,
                    context: DispatchContext {
                        current_time: self.state.clock(),
                        machine: machine.as_str(),
                        position,
                        occupancy: order.occupancy_on(machine).unwrap_or(0),
                        remaining_work: order.remaining_occupancy_from(machine),
                        next_queue_length,
                    },
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::OrderCatalog;
    use crate::simulation::SimConfig;

    fn floor(max_queue: usize) -> ShopFloor {
        let catalog = OrderCatalog::new(vec![
            Order::new("A")
                .with_operation("M1", 1.0, 2.0)
                .with_operation("M2", 0.0, 4.0),
            Order::new("B").with_operation("M1", 0.0, 5.0),
            Order::new("C").with_operation("M2", 0.0, 1.0),
            Order::new("D").with_operation("M1", 0.0, 1.0),
        ])
        .unwrap();
        ShopFloor::new(catalog, SimConfig::new(max_queue, 1)).unwrap()
    }

    #[test]
    fn test_candidates_context() {
        let floor = floor(5);
        let state = floor.new_state();
        let view = PolicyView::new(&floor, &state);

        let cands = view.candidates(0);
        assert_eq!(cands.len(), 3);
        let a = &cands[0];
        assert_eq!(a.order.id, "A");
        assert_eq!(a.context.machine, "M1");
        assert_eq!(a.context.position, 0);
        assert_eq!(a.context.occupancy, 3);
        assert_eq!(a.context.remaining_work, 7);
        assert_eq!(a.context.next_queue_length, Some(1));
        assert_eq!(cands[1].context.next_queue_length, None);
    }

    #[test]
    fn test_candidates_limited_to_addressable_window() {
        let floor = floor(2);
        let state = floor.new_state();
        let view = PolicyView::new(&floor, &state);
        let ids: Vec<&str> = view
            .candidates(0)
            .iter()
            .map(|c| c.order.id.as_str())
            .collect();
        assert_eq!(ids, vec!["A", "B"]);
    }

    #[test]
    fn test_view_accessors() {
        let floor = floor(5);
        let state = floor.new_state();
        let view = PolicyView::new(&floor, &state);
        assert_eq!(view.machine_count(), 2);
        assert!(view.is_idle(0));
        assert!(!view.is_idle(9));
        assert!(view.candidates(9).is_empty());
        assert_eq!(view.observation().queue_lengths, vec![3, 1]);
    }
}
