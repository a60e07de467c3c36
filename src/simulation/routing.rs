//! Route resolution after an occupancy ends.
//!
//! A pure function of the static order data and the machine just vacated.

use crate::error::{Result, SimError};
use crate::models::Order;

/// Where an order goes after leaving a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteStep<'a> {
    /// Enqueue at the next machine of the route.
    Next(&'a str),
    /// The route is exhausted.
    Complete,
}

/// Resolves the step that follows `vacated` on the order's route.
///
/// # Errors
/// `RouteConsistency` if `vacated` is not on the route, which means the
/// order was placed on a machine it never visits.
pub fn next_step<'a>(order: &'a Order, vacated: &str) -> Result<RouteStep<'a>> {
    let position = order
        .route
        .iter()
        .position(|m| m == vacated)
        .ok_or_else(|| SimError::RouteConsistency {
            order_id: order.id.clone(),
            machine: vacated.to_string(),
        })?;

    Ok(match order.route.get(position + 1) {
        Some(next) => RouteStep::Next(next.as_str()),
        None => RouteStep::Complete,
    })
}
