//! Input validation for order catalogs.
//!
//! Checks structural integrity of orders before a simulation is built.
//! Detects:
//! - Duplicate order IDs
//! - Empty routes and blank machine IDs
//! - Machines visited twice in one route
//! - Route machines without setup/processing times
//! - Negative or non-finite durations and deadlines
//! - Route machines outside an explicit machine set
//!
//! All issues are collected so a malformed sheet can be fixed in one pass.

use crate::models::{MachineId, Order};
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationIssue>>;

/// A validation issue.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    /// Issue category.
    pub kind: ValidationIssueKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationIssueKind {
    /// No orders at all.
    EmptyCatalog,
    /// Two orders share the same ID.
    DuplicateId,
    /// An order has no route.
    EmptyRoute,
    /// A route step has a blank machine ID.
    BlankMachine,
    /// A machine appears more than once in a route.
    RepeatedMachine,
    /// A route machine has no setup/processing time.
    MissingTiming,
    /// A duration is negative, NaN or infinite.
    InvalidDuration,
    /// A deadline is negative, NaN or infinite.
    InvalidDeadline,
    /// A route references a machine outside the configured machine set.
    UnknownMachine,
}

impl ValidationIssue {
    pub(crate) fn new(kind: ValidationIssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a set of orders.
///
/// When `machines` is given, every route machine must belong to it.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(issues)` with every detected issue.
pub fn validate_orders(orders: &[Order], machines: Option<&[MachineId]>) -> ValidationResult {
    let mut issues = Vec::new();

    if orders.is_empty() {
        issues.push(ValidationIssue::new(
            ValidationIssueKind::EmptyCatalog,
            "Catalog contains no orders",
        ));
    }

    let known: Option<HashSet<&str>> =
        machines.map(|ms| ms.iter().map(String::as_str).collect());
    let mut order_ids = HashSet::new();

    for order in orders {
        if !order_ids.insert(order.id.as_str()) {
            issues.push(ValidationIssue::new(
                ValidationIssueKind::DuplicateId,
                format!("Duplicate order ID: {}", order.id),
            ));
        }

        if order.route.is_empty() {
            issues.push(ValidationIssue::new(
                ValidationIssueKind::EmptyRoute,
                format!("Order '{}' has no route", order.id),
            ));
        }

        let mut visited = HashSet::new();
        for machine in &order.route {
            if machine.is_empty() {
                issues.push(ValidationIssue::new(
                    ValidationIssueKind::BlankMachine,
                    format!("Order '{}' has a blank machine in its route", order.id),
                ));
                continue;
            }
            if !visited.insert(machine.as_str()) {
                issues.push(ValidationIssue::new(
                    ValidationIssueKind::RepeatedMachine,
                    format!("Order '{}' visits machine '{}' twice", order.id, machine),
                ));
            }
            if let Some(known) = &known {
                if !known.contains(machine.as_str()) {
                    issues.push(ValidationIssue::new(
                        ValidationIssueKind::UnknownMachine,
                        format!("Order '{}' references unknown machine '{}'", order.id, machine),
                    ));
                }
            }
            match order.timing(machine) {
                None => issues.push(ValidationIssue::new(
                    ValidationIssueKind::MissingTiming,
                    format!(
                        "Order '{}' has no setup/processing time for machine '{}'",
                        order.id, machine
                    ),
                )),
                Some(t) => {
                    if !is_valid_duration(t.setup) || !is_valid_duration(t.process) {
                        issues.push(ValidationIssue::new(
                            ValidationIssueKind::InvalidDuration,
                            format!(
                                "Order '{}' has invalid duration on '{}' (setup={}, process={})",
                                order.id, machine, t.setup, t.process
                            ),
                        ));
                    }
                }
            }
        }

        if let Some(deadline) = order.deadline {
            if !is_valid_duration(deadline) {
                issues.push(ValidationIssue::new(
                    ValidationIssueKind::InvalidDeadline,
                    format!("Order '{}' has invalid deadline {}", order.id, deadline),
                ));
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

#[inline]
fn is_valid_duration(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
