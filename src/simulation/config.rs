//! Simulation parameters.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// How the per-machine busy/idle reward term is evaluated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineRewardMode {
    /// Each machine contributes according to its own status.
    #[default]
    PerMachine,
    /// Every machine contributes according to the status of the last
    /// machine in the machine set.
    LastMachine,
}

/// What earns the completion bonus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionBonus {
    /// Once per order whose whole route finished this tick.
    #[default]
    PerOrder,
    /// Once per occupancy that ended this tick, including ones routed on to
    /// another machine.
    PerOperation,
}

/// Reward weights.
///
/// Per tick: `-unfinished_penalty * open_orders + completion_bonus * finished_now`
/// plus `busy_bonus` per busy machine and `-idle_penalty` per idle machine.
/// `completion_mode` decides whether `finished_now` counts orders or
/// operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    pub unfinished_penalty: f64,
    pub completion_bonus: f64,
    pub busy_bonus: f64,
    pub idle_penalty: f64,
    pub machine_mode: MachineRewardMode,
    pub completion_mode: CompletionBonus,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            unfinished_penalty: 1.0,
            completion_bonus: 10.0,
            busy_bonus: 100.0,
            idle_penalty: 100.0,
            machine_mode: MachineRewardMode::PerMachine,
            completion_mode: CompletionBonus::PerOrder,
        }
    }
}

impl RewardConfig {
    pub fn with_unfinished_penalty(mut self, penalty: f64) -> Self {
        self.unfinished_penalty = penalty;
        self
    }

    pub fn with_completion_bonus(mut self, bonus: f64) -> Self {
        self.completion_bonus = bonus;
        self
    }

    /// Sets the busy bonus and the idle penalty to the same magnitude.
    pub fn with_utilization_weight(mut self, weight: f64) -> Self {
        self.busy_bonus = weight;
        self.idle_penalty = weight;
        self
    }

    pub fn with_machine_mode(mut self, mode: MachineRewardMode) -> Self {
        self.machine_mode = mode;
        self
    }

    pub fn with_completion_mode(mut self, mode: CompletionBonus) -> Self {
        self.completion_mode = mode;
        self
    }

    /// Default weights with the machine term read from the last machine and
    /// the bonus paid per finished operation. Reproduces the reward signal
    /// that existing trained policies were fitted against.
    pub fn source_parity() -> Self {
        Self::default()
            .with_machine_mode(MachineRewardMode::LastMachine)
            .with_completion_mode(CompletionBonus::PerOperation)
    }
}

/// Simulation configuration.
///
/// `max_queue_size` bounds the selection range `[0, max_queue_size]` of each
/// action component; `tick_size` is the time advanced per step. Neither has
/// a default: the driver supplies both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub max_queue_size: usize,
    pub tick_size: i64,
    #[serde(default)]
    pub reward: RewardConfig,
}

impl SimConfig {
    /// Creates a configuration with default reward weights.
    pub fn new(max_queue_size: usize, tick_size: i64) -> Self {
        Self {
            max_queue_size,
            tick_size,
            reward: RewardConfig::default(),
        }
    }

    /// Sets the reward weights.
    pub fn with_reward(mut self, reward: RewardConfig) -> Self {
        self.reward = reward;
        self
    }

    /// Checks the parameters.
    ///
    /// # Errors
    /// `InvalidConfig` when `tick_size < 1` or `max_queue_size == 0`.
    pub fn validate(&self) -> Result<()> {
        if self.tick_size < 1 {
            return Err(SimError::InvalidConfig(format!(
                "tick_size must be at least 1, got {}",
                self.tick_size
            )));
        }
        if self.max_queue_size == 0 {
            return Err(SimError::InvalidConfig(
                "max_queue_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
