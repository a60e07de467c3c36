//! Decision-makers that produce dispatch actions.
//!
//! The simulator only interprets actions; choosing them is the job of a
//! [`DispatchPolicy`]. A trained agent is one such policy. This module ships
//! baseline policies: priority dispatching rules combined by a
//! [`RuleEngine`], and a uniformly random [`RandomPolicy`].
//!
//! # Usage
//!
//! ```
//! use u_shopsim::policy::{rules, RuleEngine};
//!
//! let policy = RuleEngine::new()
//!     .with_rule(rules::Edd)
//!     .with_tie_breaker(rules::Spt);
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

mod context;
mod engine;
mod random;
pub mod rules;

pub use context::{Candidate, DispatchContext, PolicyView};
pub use engine::{EvaluationMode, RuleEngine, TieBreaker};
pub use random::RandomPolicy;

use crate::models::Order;
use std::fmt::Debug;

/// Score returned by a dispatching rule.
///
/// Lower scores = higher priority (dispatched first).
pub type RuleScore = f64;

/// Produces one selection per machine from the current view.
///
/// Each component should lie in `[0, max_queue_size]`: `0` lets the
/// simulator pick the head, `k` picks the `k`-th waiting order.
pub trait DispatchPolicy {
    /// Policy name for logs and reports.
    fn name(&self) -> &str;

    /// Chooses the action for the next tick.
    fn select(&mut self, view: &PolicyView<'_>) -> Vec<usize>;
}

/// A dispatching rule that scores a waiting order for one machine.
///
/// # Score Convention
/// **Lower score = higher priority.**
pub trait DispatchingRule: Send + Sync + Debug {
    /// Rule name (e.g., "SPT", "EDD").
    fn name(&self) -> &'static str;

    /// Scores a waiting order given where and when it would start.
    fn evaluate(&self, order: &Order, context: &DispatchContext<'_>) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
