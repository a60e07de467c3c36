//! Built-in dispatching rules.
//!
//! # Categories
//!
//! - **Time-based**: SPT, LPT, LWKR, MWKR
//! - **Due-date**: EDD, MST
//! - **Queue/Load**: FIFO, WINQ
//!
//! # Score Convention
//! All rules return lower scores for higher priority orders.
//!
//! # References
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use super::{DispatchContext, DispatchingRule, RuleScore};
use crate::models::Order;

// ======================== Time-based rules ========================

/// Shortest Processing Time.
///
/// Prioritizes orders with the shortest occupancy on this machine.
/// Minimizes average flow time and WIP.
///
/// # Reference
/// Smith (1956), optimal for minimizing mean flow time on single machine.
#[derive(Debug, Clone, Copy)]
pub struct Spt;

impl DispatchingRule for Spt {
    fn name(&self) -> &'static str {
        "SPT"
    }

    fn evaluate(&self, _order: &Order, context: &DispatchContext<'_>) -> RuleScore {
        context.occupancy as f64
    }

    fn description(&self) -> &'static str {
        "Shortest Processing Time"
    }
}

/// Longest Processing Time.
#[derive(Debug, Clone, Copy)]
pub struct Lpt;

impl DispatchingRule for Lpt {
    fn name(&self) -> &'static str {
        "LPT"
    }

    fn evaluate(&self, _order: &Order, context: &DispatchContext<'_>) -> RuleScore {
        -(context.occupancy as f64)
    }

    fn description(&self) -> &'static str {
        "Longest Processing Time"
    }
}

/// Least Work Remaining.
///
/// Prioritizes orders closest to finishing their route.
#[derive(Debug, Clone, Copy)]
pub struct Lwkr;

impl DispatchingRule for Lwkr {
    fn name(&self) -> &'static str {
        "LWKR"
    }

    fn evaluate(&self, _order: &Order, context: &DispatchContext<'_>) -> RuleScore {
        context.remaining_work as f64
    }

    fn description(&self) -> &'static str {
        "Least Work Remaining"
    }
}

/// Most Work Remaining.
///
/// Prevents starvation of long routes.
#[derive(Debug, Clone, Copy)]
pub struct Mwkr;

impl DispatchingRule for Mwkr {
    fn name(&self) -> &'static str {
        "MWKR"
    }

    fn evaluate(&self, _order: &Order, context: &DispatchContext<'_>) -> RuleScore {
        -(context.remaining_work as f64)
    }

    fn description(&self) -> &'static str {
        "Most Work Remaining"
    }
}

// ======================== Due-date rules ========================

/// Earliest Due Date.
///
/// Orders without deadlines are assigned lowest priority.
///
/// # Reference
/// Jackson (1955), optimal for minimizing maximum lateness on single machine.
#[derive(Debug, Clone, Copy)]
pub struct Edd;

impl DispatchingRule for Edd {
    fn name(&self) -> &'static str {
        "EDD"
    }

    fn evaluate(&self, order: &Order, _context: &DispatchContext<'_>) -> RuleScore {
        order.deadline.unwrap_or(f64::MAX)
    }

    fn description(&self) -> &'static str {
        "Earliest Due Date"
    }
}

/// Minimum Slack Time.
///
/// Slack = (deadline - current_time) - remaining_work.
/// Orders without deadlines get maximum slack.
#[derive(Debug, Clone, Copy)]
pub struct Mst;

impl DispatchingRule for Mst {
    fn name(&self) -> &'static str {
        "MST"
    }

    fn evaluate(&self, order: &Order, context: &DispatchContext<'_>) -> RuleScore {
        match order.deadline {
            Some(deadline) => {
                deadline - context.current_time as f64 - context.remaining_work as f64
            }
            None => f64::MAX,
        }
    }

    fn description(&self) -> &'static str {
        "Minimum Slack Time"
    }
}

// ======================== Queue/Load rules ========================

/// First In, First Out.
///
/// Earlier queue position first.
#[derive(Debug, Clone, Copy)]
pub struct Fifo;

impl DispatchingRule for Fifo {
    fn name(&self) -> &'static str {
        "FIFO"
    }

    fn evaluate(&self, _order: &Order, context: &DispatchContext<'_>) -> RuleScore {
        context.position as f64
    }

    fn description(&self) -> &'static str {
        "First In, First Out"
    }
}

/// Work In Next Queue.
///
/// Prefers orders whose next machine has the shortest queue. Orders on
/// their last step score 0 (nothing downstream to congest).
#[derive(Debug, Clone, Copy)]
pub struct Winq;

impl DispatchingRule for Winq {
    fn name(&self) -> &'static str {
        "WINQ"
    }

    fn evaluate(&self, _order: &Order, context: &DispatchContext<'_>) -> RuleScore {
        context.next_queue_length.unwrap_or(0) as f64
    }

    fn description(&self) -> &'static str {
        "Work In Next Queue"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(position: usize, occupancy: i64, remaining: i64) -> DispatchContext<'static> {
        DispatchContext {
            current_time: 100,
            machine: "M1",
            position,
            occupancy,
            remaining_work: remaining,
            next_queue_length: None,
        }
    }

    fn order(deadline: Option<f64>) -> Order {
        let order = Order::new("A").with_operation("M1", 0.0, 1.0);
        match deadline {
            Some(d) => order.with_deadline(d),
            None => order,
        }
    }

    #[test]
    fn test_time_rules() {
        let o = order(None);
        let ctx = context(0, 4, 10);
        assert_eq!(Spt.evaluate(&o, &ctx), 4.0);
        assert_eq!(Lpt.evaluate(&o, &ctx), -4.0);
        assert_eq!(Lwkr.evaluate(&o, &ctx), 10.0);
        assert_eq!(Mwkr.evaluate(&o, &ctx), -10.0);
    }

    #[test]
    fn test_edd_without_deadline_last() {
        let ctx = context(0, 1, 1);
        assert!(Edd.evaluate(&order(Some(500.0)), &ctx) < Edd.evaluate(&order(None), &ctx));
    }

    #[test]
    fn test_slack() {
        // 300 - 100 - 50 = 150
        let ctx = context(0, 5, 50);
        assert_eq!(Mst.evaluate(&order(Some(300.0)), &ctx), 150.0);
        assert_eq!(Mst.evaluate(&order(None), &ctx), f64::MAX);
    }

    #[test]
    fn test_queue_rules() {
        let o = order(None);
        assert_eq!(Fifo.evaluate(&o, &context(3, 1, 1)), 3.0);

        let mut ctx = context(0, 1, 1);
        assert_eq!(Winq.evaluate(&o, &ctx), 0.0);
        ctx.next_queue_length = Some(6);
        assert_eq!(Winq.evaluate(&o, &ctx), 6.0);
    }

    #[test]
    fn test_names() {
        assert_eq!(Spt.name(), "SPT");
        assert_eq!(Edd.description(), "Earliest Due Date");
        assert_eq!(Winq.description(), "Work In Next Queue");
    }
}
