//! Error taxonomy for catalog construction and simulation stepping.
//!
//! Construction-time errors (`InvalidOrderDefinition`, `InvalidConfig`) abort
//! setup. Runtime contract violations (`RouteConsistency`, `MachineBusy`) are
//! surfaced immediately and never retried. Ordinary no-op outcomes such as
//! dispatching against an empty queue are not errors.

use thiserror::Error;

use crate::validation::ValidationIssue;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors raised by the catalog, the simulator and the episode driver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Malformed or incomplete order route/timing data.
    #[error("invalid order definition: {}", summarize(.issues))]
    InvalidOrderDefinition { issues: Vec<ValidationIssue> },

    /// The vacated machine is not part of the order's own route.
    #[error("route consistency violated: order '{order_id}' left machine '{machine}' which is not on its route")]
    RouteConsistency { order_id: String, machine: String },

    /// The action vector does not have one component per machine.
    #[error("invalid action: expected {expected} components, got {actual}")]
    InvalidAction { expected: usize, actual: usize },

    /// A start was requested on a machine that is still occupied.
    #[error("machine '{machine}' is busy with order '{order_id}'")]
    MachineBusy { machine: String, order_id: String },

    /// Unusable simulation parameters.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// `step` was called after every order completed.
    #[error("episode already finished at t={clock}")]
    EpisodeFinished { clock: i64 },

    /// The state was not sized by this shop floor's `reset`.
    #[error("state holds {machines} machines and {orders} orders, expected {expected_machines} and {expected_orders}; reset it first")]
    StateMismatch {
        expected_machines: usize,
        machines: usize,
        expected_orders: usize,
        orders: usize,
    },

    /// Catalog lookup for an id that was never registered.
    #[error("unknown order '{0}'")]
    UnknownOrder(String),

    /// The episode driver ran out of steps before all orders completed.
    #[error("episode did not finish within {max_steps} steps")]
    StepLimitExceeded { max_steps: usize },
}

fn summarize(issues: &[ValidationIssue]) -> String {
    match issues {
        [] => "no details".to_string(),
        [only] => only.message.clone(),
        [first, rest @ ..] => format!("{} (and {} more)", first.message, rest.len()),
    }
}
