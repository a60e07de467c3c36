//! Uniform random policy.
//!
//! Samples every action component from `[0, max_queue_size]`, the same
//! distribution as an untrained agent sampling its action space. Useful as
//! a lower baseline and for fuzzing the simulator.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{DispatchPolicy, PolicyView};

/// Seeded uniform random policy.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    /// Creates a policy with a fixed seed (reproducible episodes).
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl DispatchPolicy for RandomPolicy {
    fn name(&self) -> &str {
        "RANDOM"
    }

    fn select(&mut self, view: &PolicyView<'_>) -> Vec<usize> {
        let max = view.max_selection();
        (0..view.machine_count())
            .map(|_| self.rng.random_range(0..=max))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::OrderCatalog;
    use crate::models::Order;
    use crate::simulation::{ShopFloor, SimConfig};

    fn floor() -> ShopFloor {
        let catalog = OrderCatalog::new(vec![
            Order::new("A").with_operation("M1", 0.0, 2.0),
            Order::new("B").with_operation("M2", 0.0, 3.0),
        ])
        .unwrap();
        ShopFloor::new(catalog, SimConfig::new(3, 1)).unwrap()
    }

    #[test]
    fn test_actions_within_range() {
        let floor = floor();
        let state = floor.new_state();
        let view = PolicyView::new(&floor, &state);
        let mut policy = RandomPolicy::seeded(7);
        for _ in 0..100 {
            let action = policy.select(&view);
            assert_eq!(action.len(), 2);
            assert!(action.iter().all(|&a| a <= 3));
        }
    }

    #[test]
    fn test_same_seed_same_actions() {
        let floor = floor();
        let state = floor.new_state();
        let view = PolicyView::new(&floor, &state);
        let mut a = RandomPolicy::seeded(42);
        let mut b = RandomPolicy::seeded(42);
        for _ in 0..20 {
            assert_eq!(a.select(&view), b.select(&view));
        }
    }
}
