//! Tick engine.
//!
//! # Algorithm (one `step`)
//!
//! 1. Advance every busy machine. Each occupancy that ends is logged with
//!    `finish_time = clock` and its order is routed: appended to the next
//!    machine's queue, or marked completed.
//! 2. Apply the dispatch resolver to every machine with its action component.
//! 3. Advance the clock by `tick_size`.
//! 4. Project reward and observation.
//!
//! Routing runs before dispatch, so an order leaving machine A is already
//! dispatchable on its next machine B in the same tick, and can never
//! re-enter A within that tick.
//!
//! # Atomicity
//! `step` validates the state and the action, and resolves where every
//! finishing occupancy goes, before any mutation. A rejected step leaves
//! the state as it was. Dispatch lookups cannot fail for orders the engine
//! queued itself: validation guarantees a timing for every route machine.

use std::fmt::Write as _;

use tracing::{debug, info, trace};

use super::config::{CompletionBonus, MachineRewardMode, SimConfig};
use super::dispatch::{dispatch, DispatchOutcome};
use super::observation::{Observation, StepResult};
use super::routing::{next_step, RouteStep};
use super::state::SimState;
use crate::catalog::OrderCatalog;
use crate::error::{Result, SimError};
use crate::models::ScheduleLogEntry;

/// Where a finishing order is routed.
#[derive(Debug, Clone, Copy)]
enum Resolved {
    Enqueue(usize),
    Complete,
}

/// Immutable shop floor: order catalog plus simulation parameters.
///
/// Holds no episode state; pass a [`SimState`] to `reset`/`step`. One
/// `ShopFloor` can drive any number of independent states.
///
/// # Example
///
/// ```
/// use u_shopsim::catalog::OrderCatalog;
/// use u_shopsim::models::Order;
/// use u_shopsim::simulation::{ShopFloor, SimConfig};
///
/// let catalog = OrderCatalog::new(vec![
///     Order::new("A1").with_operation("M1", 2.0, 3.0),
/// ]).unwrap();
/// let floor = ShopFloor::new(catalog, SimConfig::new(5, 1)).unwrap();
///
/// let mut state = floor.new_state();
/// let mut result = floor.step(&mut state, &[1]).unwrap();
/// while !result.done {
///     result = floor.step(&mut state, &[0]).unwrap();
/// }
/// assert_eq!(state.schedule_log().makespan(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct ShopFloor {
    catalog: OrderCatalog,
    config: SimConfig,
}

impl ShopFloor {
    /// Creates a shop floor.
    ///
    /// # Errors
    /// `InvalidConfig` if the configuration fails validation.
    pub fn new(catalog: OrderCatalog, config: SimConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { catalog, config })
    }

    pub fn catalog(&self) -> &OrderCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn machine_count(&self) -> usize {
        self.catalog.machine_count()
    }

    /// Observation vector length (`2 * machines + 1`).
    pub fn observation_len(&self) -> usize {
        2 * self.machine_count() + 1
    }

    /// Number of choices per action component (`max_queue_size + 1` each).
    pub fn action_space(&self) -> Vec<usize> {
        vec![self.config.max_queue_size + 1; self.machine_count()]
    }

    /// Creates a state that is already reset.
    pub fn new_state(&self) -> SimState {
        let mut state = SimState::default();
        self.reset(&mut state);
        state
    }

    /// Reinitialises the state: clock 0, idle machines, empty log, and every
    /// order waiting at the first machine of its route (catalog order).
    pub fn reset(&self, state: &mut SimState) -> Observation {
        state.clear(self.catalog.machines(), self.catalog.len());
        for (idx, order) in self.catalog.orders().iter().enumerate() {
            let first = order
                .first_machine()
                .and_then(|m| self.catalog.machine_index(m));
            if let Some(machine_idx) = first {
                state.queues[machine_idx].push(idx);
            }
        }
        info!(
            orders = self.catalog.len(),
            machines = self.machine_count(),
            "simulation reset"
        );
        self.observe(state)
    }

    /// Advances the simulation by one tick.
    ///
    /// # Errors
    /// - `EpisodeFinished` if every order already completed.
    /// - `InvalidAction` if `action.len()` differs from the machine count.
    /// - `StateMismatch` if `state` was not sized by this floor's `reset`.
    /// - `RouteConsistency` if a finishing order's machine is not on its
    ///   route.
    pub fn step(&self, state: &mut SimState, action: &[usize]) -> Result<StepResult> {
        self.check_state(state)?;
        if state.is_done() {
            return Err(SimError::EpisodeFinished { clock: state.clock });
        }
        if action.len() != self.machine_count() {
            return Err(SimError::InvalidAction {
                expected: self.machine_count(),
                actual: action.len(),
            });
        }

        let tick = self.config.tick_size;
        let now = state.clock;
        let routes = self.resolve_finishing(state)?;

        // 1. Completions and routing
        let mut completed_this_tick = Vec::new();
        let mut finished_operations = 0;
        for (i, resolved) in routes.into_iter().enumerate() {
            let finished = state.machines[i].advance(tick);
            debug_assert_eq!(
                finished.is_some(),
                resolved.is_some(),
                "machine {i} finished differently than resolve_finishing predicted"
            );
            let (Some(finished), Some(resolved)) = (finished, resolved) else {
                continue;
            };
            finished_operations += 1;
            let order = self.catalog.order(finished.order);
            let machine_id = &self.catalog.machines()[i];
            state.log.push(ScheduleLogEntry::new(
                order.id.clone(),
                machine_id.clone(),
                finished.start_time,
                now,
            ));
            match resolved {
                Resolved::Enqueue(next) => {
                    debug!(
                        order = %order.id,
                        from = %machine_id,
                        to = %self.catalog.machines()[next],
                        t = now,
                        "operation finished"
                    );
                    state.queues[next].push(finished.order);
                }
                Resolved::Complete => {
                    debug!(order = %order.id, machine = %machine_id, t = now, "order completed");
                    state.mark_completed(finished.order);
                    completed_this_tick.push(order.id.clone());
                }
            }
        }

        // 2. Dispatch
        let mut dispatches = Vec::with_capacity(action.len());
        for (i, &selection) in action.iter().enumerate() {
            let machine = &mut state.machines[i];
            let queue = &mut state.queues[i];
            let outcome = dispatch(machine, queue, selection, &self.catalog, now)?;
            if let DispatchOutcome::Started { order_id, index } = &outcome {
                debug!(order = %order_id, machine = %machine.id, index, t = now, "order started");
            }
            dispatches.push(outcome);
        }

        // 3. Clock
        state.clock += tick;
        state.steps += 1;

        // 4. Reward and observation
        let bonus_count = match self.config.reward.completion_mode {
            CompletionBonus::PerOrder => completed_this_tick.len(),
            CompletionBonus::PerOperation => finished_operations,
        };
        let reward = self.reward(state, bonus_count);
        let done = state.is_done();
        trace!(t = state.clock, reward, completed = state.completed_count(), "tick");
        if done {
            info!(
                t = state.clock,
                steps = state.steps,
                makespan = state.log.makespan(),
                "all orders completed"
            );
        }

        Ok(StepResult {
            observation: self.observe(state),
            reward,
            done,
            completed_this_tick,
            dispatches,
        })
    }

    /// Rejects states sized for a different catalog or never reset.
    fn check_state(&self, state: &SimState) -> Result<()> {
        let machines = self.machine_count();
        let orders = self.catalog.len();
        if state.machines.len() != machines
            || state.queues.len() != machines
            || state.completed.len() != orders
        {
            return Err(SimError::StateMismatch {
                expected_machines: machines,
                machines: state.machines.len(),
                expected_orders: orders,
                orders: state.completed.len(),
            });
        }
        Ok(())
    }

    /// Resolves, without mutating, where each order finishing this tick goes.
    fn resolve_finishing(&self, state: &SimState) -> Result<Vec<Option<Resolved>>> {
        let tick = self.config.tick_size;
        state
            .machines
            .iter()
            .map(|machine| {
                if !machine.finishes_within(tick) {
                    return Ok(None);
                }
                let Some(order_idx) = machine.current_order() else {
                    return Ok(None);
                };
                let order = self.catalog.order(order_idx);
                let resolved = match next_step(order, &machine.id)? {
                    RouteStep::Complete => Resolved::Complete,
                    RouteStep::Next(next) => Resolved::Enqueue(
                        self.catalog.machine_index(next).ok_or_else(|| {
                            SimError::RouteConsistency {
                                order_id: order.id.clone(),
                                machine: next.to_string(),
                            }
                        })?,
                    ),
                };
                Ok(Some(resolved))
            })
            .collect()
    }

    /// Reward for the tick that just ran, evaluated on the post-dispatch
    /// state. `finished_now` is what earns the completion bonus.
    fn reward(&self, state: &SimState, finished_now: usize) -> f64 {
        let weights = &self.config.reward;
        let open = (self.catalog.len() - state.completed_count()) as f64;
        let mut reward = -weights.unfinished_penalty * open;
        reward += weights.completion_bonus * finished_now as f64;

        let term = |busy: bool| {
            if busy {
                weights.busy_bonus
            } else {
                -weights.idle_penalty
            }
        };
        reward += match weights.machine_mode {
            MachineRewardMode::PerMachine => {
                state.machines.iter().map(|m| term(m.is_busy())).sum::<f64>()
            }
            MachineRewardMode::LastMachine => state
                .machines
                .last()
                .map_or(0.0, |m| term(m.is_busy()) * state.machines.len() as f64),
        };
        reward
    }

    /// Projects the current state into an observation.
    pub fn observe(&self, state: &SimState) -> Observation {
        Observation {
            remaining_times: state.machines.iter().map(|m| m.remaining_time()).collect(),
            queue_lengths: state.queues.iter().map(|q| q.len()).collect(),
            clock: state.clock,
        }
    }

    /// Text snapshot of clock, machines, queues and progress.
    pub fn render(&self, state: &SimState) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Time={}", state.clock);
        for (machine, queue) in state.machines.iter().zip(&state.queues) {
            let current = machine
                .current_order()
                .map_or("-", |o| self.catalog.order(o).id.as_str());
            let waiting: Vec<&str> = queue
                .iter()
                .map(|o| self.catalog.order(o).id.as_str())
                .collect();
            let _ = writeln!(
                out,
                "  {}: busy={}, order={}, time_remaining={}, queue=[{}]",
                machine.id,
                machine.is_busy(),
                current,
                machine.remaining_time(),
                waiting.join(", ")
            );
        }
        let _ = write!(
            out,
            "  Completed orders: {}/{}",
            state.completed_count(),
            self.catalog.len()
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Order;
    use crate::simulation::RewardConfig;

    fn floor(orders: Vec<Order>, max_queue: usize, tick: i64) -> ShopFloor {
        ShopFloor::new(OrderCatalog::new(orders).unwrap(), SimConfig::new(max_queue, tick)).unwrap()
    }

    fn three_machine_floor() -> ShopFloor {
        floor(
            vec![
                Order::new("A1")
                    .with_operation("M1", 1.0, 2.0)
                    .with_operation("M2", 0.0, 2.0)
                    .with_operation("M3", 1.0, 1.0),
                Order::new("A2")
                    .with_operation("M2", 0.0, 4.0)
                    .with_operation("M3", 0.0, 1.0),
                Order::new("A3").with_operation("M1", 0.0, 1.0),
            ],
            5,
            1,
        )
    }

    #[test]
    fn test_single_order_scenario() {
        let floor = floor(vec![Order::new("A1").with_operation("M1", 2.0, 3.0)], 5, 1);
        let mut state = floor.new_state();
        assert_eq!(state.queue(0).unwrap().len(), 1);

        let r = floor.step(&mut state, &[1]).unwrap();
        assert_eq!(state.machines()[0].start_time(), Some(0));
        assert_eq!(r.observation.remaining_times, vec![5]);
        assert!(!r.done);

        for t in 1..=4 {
            let r = floor.step(&mut state, &[0]).unwrap();
            assert!(r.completed_this_tick.is_empty(), "completion at tick {t}");
            assert!(!r.done);
        }

        let r = floor.step(&mut state, &[0]).unwrap();
        assert!(r.done);
        assert_eq!(r.completed_this_tick, vec!["A1".to_string()]);
        assert_eq!(
            state.schedule_log().entries(),
            &[ScheduleLogEntry::new("A1", "M1", 0, 5)]
        );
        assert_eq!(state.clock(), 6);
    }

    #[test]
    fn test_routed_order_dispatchable_same_tick() {
        let floor = floor(
            vec![Order::new("A1")
                .with_operation("M1", 0.0, 2.0)
                .with_operation("M2", 0.0, 3.0)],
            5,
            1,
        );
        let mut state = floor.new_state();
        floor.step(&mut state, &[1, 0]).unwrap(); // t=0 start on M1
        floor.step(&mut state, &[0, 0]).unwrap(); // t=1
        let r = floor.step(&mut state, &[0, 1]).unwrap(); // t=2 finish M1, start M2

        assert_eq!(
            r.dispatches[1],
            DispatchOutcome::Started {
                order_id: "A1".into(),
                index: 0
            }
        );
        assert_eq!(state.machines()[1].start_time(), Some(2));
        assert!(!state.machines()[0].is_busy());
        assert_eq!(
            state.schedule_log().entries(),
            &[ScheduleLogEntry::new("A1", "M1", 0, 2)]
        );
    }

    #[test]
    fn test_reset_places_orders_at_first_machine() {
        let floor = three_machine_floor();
        let state = floor.new_state();
        let lens: Vec<usize> = state.queues().iter().map(|q| q.len()).collect();
        assert_eq!(lens, vec![2, 1, 0]);
        assert_eq!(state.queue(0).unwrap().iter().collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let floor = three_machine_floor();
        let mut state = floor.new_state();
        floor.step(&mut state, &[1, 1, 1]).unwrap();
        floor.step(&mut state, &[1, 1, 1]).unwrap();
        floor.step(&mut state, &[1, 1, 1]).unwrap();

        let first = floor.reset(&mut state);
        assert!(state.schedule_log().is_empty());
        let second = floor.reset(&mut state);
        assert!(state.schedule_log().is_empty());
        assert_eq!(first, second);
        assert_eq!(first.to_vec(), vec![0.0, 0.0, 0.0, 2.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_wrong_action_length_rejected_without_mutation() {
        let floor = three_machine_floor();
        let mut state = floor.new_state();
        let before = floor.observe(&state);

        let err = floor.step(&mut state, &[1, 1]).unwrap_err();
        assert_eq!(
            err,
            SimError::InvalidAction {
                expected: 3,
                actual: 2
            }
        );
        assert_eq!(floor.observe(&state), before);
        assert_eq!(state.steps(), 0);
    }

    #[test]
    fn test_step_after_done_rejected() {
        let floor = floor(vec![Order::new("A1").with_operation("M1", 0.0, 1.0)], 5, 1);
        let mut state = floor.new_state();
        floor.step(&mut state, &[1]).unwrap();
        let r = floor.step(&mut state, &[1]).unwrap();
        assert!(r.done);

        let err = floor.step(&mut state, &[1]).unwrap_err();
        assert_eq!(err, SimError::EpisodeFinished { clock: 2 });
        assert_eq!(state.clock(), 2);
    }

    #[test]
    fn test_reward_per_machine() {
        let floor = three_machine_floor();
        let mut state = floor.new_state();
        // M1 and M2 start, M3 idle: -3 open + 100 + 100 - 100
        let r = floor.step(&mut state, &[1, 1, 1]).unwrap();
        assert_eq!(r.reward, -3.0 + 100.0);
    }

    #[test]
    fn test_reward_last_machine_mode() {
        let catalog = three_machine_floor().catalog().clone();
        let config = SimConfig::new(5, 1).with_reward(
            RewardConfig::default().with_machine_mode(MachineRewardMode::LastMachine),
        );
        let floor = ShopFloor::new(catalog, config).unwrap();
        let mut state = floor.new_state();
        // M3 idle, counted once per machine: -3 - 300
        let r = floor.step(&mut state, &[1, 1, 1]).unwrap();
        assert_eq!(r.reward, -3.0 - 300.0);
    }

    #[test]
    fn test_completion_bonus() {
        let floor = floor(vec![Order::new("A1").with_operation("M1", 0.0, 1.0)], 5, 1);
        let mut state = floor.new_state();
        floor.step(&mut state, &[1]).unwrap();
        // Completed: 0 open, +10 bonus, M1 idle -100
        let r = floor.step(&mut state, &[0]).unwrap();
        assert_eq!(r.reward, 10.0 - 100.0);
    }

    fn two_step_route_floor(reward: RewardConfig) -> ShopFloor {
        let catalog = OrderCatalog::new(vec![Order::new("A1")
            .with_operation("M1", 0.0, 1.0)
            .with_operation("M2", 0.0, 1.0)])
        .unwrap();
        ShopFloor::new(catalog, SimConfig::new(5, 1).with_reward(reward)).unwrap()
    }

    #[test]
    fn test_source_parity_pays_bonus_per_operation() {
        let floor = two_step_route_floor(RewardConfig::source_parity());
        let mut state = floor.new_state();
        // M2 (last) idle, counted for both machines: -1 - 200
        let r = floor.step(&mut state, &[1, 0]).unwrap();
        assert_eq!(r.reward, -201.0);

        // M1 finishes and hands A1 to M2: -1 open + 10 + 2 * 100
        let r = floor.step(&mut state, &[0, 1]).unwrap();
        assert!(r.completed_this_tick.is_empty());
        assert_eq!(r.reward, 209.0);
    }

    #[test]
    fn test_default_bonus_ignores_routed_operations() {
        let floor = two_step_route_floor(RewardConfig::default());
        let mut state = floor.new_state();
        floor.step(&mut state, &[1, 0]).unwrap();
        // -1 open, M1 idle -100, M2 busy +100
        let r = floor.step(&mut state, &[0, 1]).unwrap();
        assert_eq!(r.reward, -1.0);

        let r = floor.step(&mut state, &[0, 0]).unwrap();
        assert!(r.done);
        assert_eq!(r.reward, 10.0 - 200.0);
    }

    #[test]
    fn test_unreset_state_rejected() {
        let floor = floor(vec![Order::new("A1").with_operation("M1", 0.0, 1.0)], 5, 1);
        let mut state = SimState::default();
        let err = floor.step(&mut state, &[1]).unwrap_err();
        assert_eq!(
            err,
            SimError::StateMismatch {
                expected_machines: 1,
                machines: 0,
                expected_orders: 1,
                orders: 0,
            }
        );
        assert_eq!(state.steps(), 0);

        floor.reset(&mut state);
        assert!(floor.step(&mut state, &[1]).is_ok());
    }

    #[test]
    fn test_state_from_other_floor_rejected() {
        let small = floor(vec![Order::new("A1").with_operation("M1", 0.0, 1.0)], 5, 1);
        let large = floor(
            vec![
                Order::new("A1").with_operation("M1", 0.0, 1.0),
                Order::new("A2").with_operation("M1", 0.0, 1.0),
            ],
            5,
            1,
        );
        let mut state = large.new_state();
        large.step(&mut state, &[2]).unwrap();
        let before = large.observe(&state);

        let err = small.step(&mut state, &[1]).unwrap_err();
        assert!(matches!(
            err,
            SimError::StateMismatch {
                expected_orders: 1,
                orders: 2,
                ..
            }
        ));
        assert_eq!(large.observe(&state), before);
    }

    #[test]
    fn test_tick_size_larger_than_one() {
        let floor = floor(vec![Order::new("A1").with_operation("M1", 1.0, 4.0)], 5, 2);
        let mut state = floor.new_state();
        floor.step(&mut state, &[1]).unwrap(); // t=0 start, remaining 5
        floor.step(&mut state, &[0]).unwrap(); // t=2 remaining 3
        floor.step(&mut state, &[0]).unwrap(); // t=4 remaining 1
        let r = floor.step(&mut state, &[0]).unwrap(); // t=6 finish
        assert!(r.done);
        assert_eq!(state.schedule_log().entries()[0].finish_time, 6);
        assert_eq!(state.clock(), 8);
    }

    #[test]
    fn test_action_space_and_observation_len() {
        let floor = three_machine_floor();
        assert_eq!(floor.action_space(), vec![6, 6, 6]);
        assert_eq!(floor.observation_len(), 7);
        assert_eq!(floor.observe(&floor.new_state()).len(), 7);
    }

    #[test]
    fn test_independent_states() {
        let floor = three_machine_floor();
        let mut a = floor.new_state();
        let b = floor.new_state();
        floor.step(&mut a, &[1, 1, 1]).unwrap();
        assert_eq!(b.clock(), 0);
        assert!(b.machines().iter().all(|m| !m.is_busy()));
    }

    #[test]
    fn test_render() {
        let floor = three_machine_floor();
        let mut state = floor.new_state();
        floor.step(&mut state, &[2, 0, 0]).unwrap();
        let text = floor.render(&state);
        assert!(text.starts_with("Time=1"));
        assert!(text.contains("M1: busy=true, order=A3, time_remaining=1, queue=[A1]"));
        assert!(text.contains("M3: busy=false, order=-, time_remaining=0, queue=[]"));
        assert!(text.ends_with("Completed orders: 0/3"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let catalog = three_machine_floor().catalog().clone();
        assert!(matches!(
            ShopFloor::new(catalog, SimConfig::new(5, 0)),
            Err(SimError::InvalidConfig(_))
        ));
    }
}
