//! Episode driver.
//!
//! Runs the observe → act → step loop until every order has completed.

use tracing::info;

use crate::error::{Result, SimError};
use crate::models::ScheduleLog;
use crate::policy::{DispatchPolicy, PolicyView};
use crate::report::ShopKpi;
use crate::simulation::{ShopFloor, SimState};

/// Result of a completed episode.
#[derive(Debug, Clone)]
pub struct EpisodeSummary {
    pub policy: String,
    pub steps: usize,
    pub total_reward: f64,
    /// Clock value when the episode ended.
    pub final_time: i64,
    pub log: ScheduleLog,
    pub kpi: ShopKpi,
}

/// Resets `state` and drives it to completion with `policy`.
///
/// # Errors
/// - `StepLimitExceeded` if `max_steps` ticks pass without completion.
/// - Any error from [`ShopFloor::step`].
pub fn run_episode_with_state(
    floor: &ShopFloor,
    state: &mut SimState,
    policy: &mut dyn DispatchPolicy,
    max_steps: usize,
) -> Result<EpisodeSummary> {
    floor.reset(state);
    let mut total_reward = 0.0;

    for step in 1..=max_steps {
        let action = policy.select(&PolicyView::new(floor, state));
        let result = floor.step(state, &action)?;
        total_reward += result.reward;

        if result.done {
            let log = state.schedule_log().clone();
            let kpi = ShopKpi::calculate(&log, floor.catalog());
            info!(
                policy = policy.name(),
                steps = step,
                makespan = kpi.makespan,
                late = kpi.late_count(),
                total_reward,
                "episode finished"
            );
            return Ok(EpisodeSummary {
                policy: policy.name().to_string(),
                steps: step,
                total_reward,
                final_time: state.clock(),
                log,
                kpi,
            });
        }
    }

    Err(SimError::StepLimitExceeded { max_steps })
}

/// Runs one episode on a fresh state.
pub fn run_episode(
    floor: &ShopFloor,
    policy: &mut dyn DispatchPolicy,
    max_steps: usize,
) -> Result<EpisodeSummary> {
    let mut state = floor.new_state();
    run_episode_with_state(floor, &mut state, policy, max_steps)
}
