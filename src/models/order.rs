//! Order (job) model.
//!
//! An order is a unit of work that visits machines in a fixed route. Each
//! visited machine has its own setup and processing time; the machine is
//! occupied for their sum.
//!
//! # Time Representation
//! All times are in simulation time units (one unit = one tick of size 1).
//! Durations may be fractional in the source data; they are truncated to
//! whole ticks when an occupancy starts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Order identifier.
pub type OrderId = String;

/// Machine identifier (e.g. `"M1"`).
pub type MachineId = String;

/// Separator between machines in a tabular operation sequence.
pub const ROUTE_SEPARATOR: &str = "->";

/// Time units in one working day, used to scale day-based deadlines.
pub const DEFAULT_DAY_LENGTH: f64 = 480.0;

/// Setup and processing time of one order on one machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperationTiming {
    /// Preparation time before processing.
    pub setup: f64,
    /// Core processing time.
    pub process: f64,
}

impl OperationTiming {
    /// Creates a timing.
    pub fn new(setup: f64, process: f64) -> Self {
        Self { setup, process }
    }

    /// Total occupancy (setup + process).
    #[inline]
    pub fn total(&self) -> f64 {
        self.setup + self.process
    }

    /// Occupancy in whole ticks.
    ///
    /// Truncates toward zero; a total below one tick still occupies the
    /// machine for a single tick.
    pub fn occupancy_ticks(&self) -> i64 {
        (self.total() as i64).max(1)
    }
}

/// An order to be simulated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// Machines in visiting order.
    pub route: Vec<MachineId>,
    /// Timing per visited machine.
    pub timings: BTreeMap<MachineId, OperationTiming>,
    /// Due time in simulation time units. Reporting only.
    pub deadline: Option<f64>,
}

impl Order {
    /// Creates an order with an empty route.
    pub fn new(id: impl Into<OrderId>) -> Self {
        Self {
            id: id.into(),
            route: Vec::new(),
            timings: BTreeMap::new(),
            deadline: None,
        }
    }

    /// Appends a route step with its timing.
    pub fn with_operation(
        mut self,
        machine: impl Into<MachineId>,
        setup: f64,
        process: f64,
    ) -> Self {
        let machine = machine.into();
        self.timings
            .insert(machine.clone(), OperationTiming::new(setup, process));
        self.route.push(machine);
        self
    }

    /// Sets the deadline (simulation time units).
    pub fn with_deadline(mut self, deadline: f64) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// First machine of the route.
    pub fn first_machine(&self) -> Option<&str> {
        self.route.first().map(String::as_str)
    }

    /// Timing on a given machine.
    pub fn timing(&self, machine: &str) -> Option<&OperationTiming> {
        self.timings.get(machine)
    }

    /// Occupancy ticks on a given machine.
    pub fn occupancy_on(&self, machine: &str) -> Option<i64> {
        self.timing(machine).map(OperationTiming::occupancy_ticks)
    }

    /// Sum of whole-tick occupancies over the route.
    pub fn total_occupancy(&self) -> i64 {
        self.route
            .iter()
            .filter_map(|m| self.occupancy_on(m))
            .sum()
    }

    /// Machine that follows `machine` on the route.
    pub fn next_machine_after(&self, machine: &str) -> Option<&str> {
        let pos = self.route.iter().position(|m| m == machine)?;
        self.route.get(pos + 1).map(String::as_str)
    }

    /// Occupancy ticks from `machine` (inclusive) to the end of the route.
    ///
    /// Returns 0 if `machine` is not on the route.
    pub fn remaining_occupancy_from(&self, machine: &str) -> i64 {
        match self.route.iter().position(|m| m == machine) {
            Some(pos) => self.route[pos..]
                .iter()
                .filter_map(|m| self.occupancy_on(m))
                .sum(),
            None => 0,
        }
    }

    /// Number of route steps.
    pub fn route_len(&self) -> usize {
        self.route.len()
    }
}

/// One row of a tabular order definition.
///
/// Mirrors the column layout of the order sheets: an operation sequence
/// such as `"M1->M2->M3"`, per-machine setup and processing columns, and a
/// deadline in working days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: OrderId,
    pub operation_sequence: String,
    #[serde(default)]
    pub setup: BTreeMap<MachineId, f64>,
    #[serde(default)]
    pub process: BTreeMap<MachineId, f64>,
    #[serde(default)]
    pub deadline_days: Option<f64>,
}

impl OrderRecord {
    /// Parses the operation sequence into machine ids.
    ///
    /// Segments are trimmed but not filtered, so `"M1->->M2"` yields an
    /// empty machine id that validation reports.
    pub fn route(&self) -> Vec<MachineId> {
        if self.operation_sequence.trim().is_empty() {
            return Vec::new();
        }
        self.operation_sequence
            .split(ROUTE_SEPARATOR)
            .map(|s| s.trim().to_string())
            .collect()
    }

    /// Converts the row into an order, scaling the deadline by `day_length`.
    ///
    /// Machines missing either a setup or a processing column are left
    /// without timing; validation reports them.
    pub fn into_order(self, day_length: f64) -> Order {
        let route = self.route();
        let mut timings = BTreeMap::new();
        for machine in &route {
            if let (Some(&setup), Some(&process)) =
                (self.setup.get(machine), self.process.get(machine))
            {
                timings.insert(machine.clone(), OperationTiming::new(setup, process));
            }
        }
        Order {
            id: self.order_id,
            route,
            timings,
            deadline: self.deadline_days.map(|d| d * day_length),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_builder() {
        let order = Order::new("A1")
            .with_operation("M1", 2.0, 3.0)
            .with_operation("M3", 1.0, 4.5)
            .with_deadline(960.0);

        assert_eq!(order.id, "A1");
        assert_eq!(order.route, vec!["M1", "M3"]);
        assert_eq!(order.first_machine(), Some("M1"));
        assert_eq!(order.occupancy_on("M1"), Some(5));
        assert_eq!(order.occupancy_on("M3"), Some(5)); // 5.5 truncated
        assert_eq!(order.occupancy_on("M2"), None);
        assert_eq!(order.total_occupancy(), 10);
        assert_eq!(order.deadline, Some(960.0));
    }

    #[test]
    fn test_route_navigation() {
        let order = Order::new("A1")
            .with_operation("M2", 0.0, 3.0)
            .with_operation("M1", 1.0, 1.0)
            .with_operation("M3", 0.0, 4.0);

        assert_eq!(order.next_machine_after("M2"), Some("M1"));
        assert_eq!(order.next_machine_after("M3"), None);
        assert_eq!(order.next_machine_after("M9"), None);
        assert_eq!(order.remaining_occupancy_from("M2"), 9);
        assert_eq!(order.remaining_occupancy_from("M1"), 6);
        assert_eq!(order.remaining_occupancy_from("M9"), 0);
    }

    #[test]
    fn test_zero_occupancy_takes_one_tick() {
        assert_eq!(OperationTiming::new(0.0, 0.0).occupancy_ticks(), 1);
        assert_eq!(OperationTiming::new(0.2, 0.3).occupancy_ticks(), 1);
        assert_eq!(OperationTiming::new(1.0, 0.9).occupancy_ticks(), 1);
    }

    #[test]
    fn test_record_route_parsing() {
        let record = OrderRecord {
            order_id: "A1".into(),
            operation_sequence: "M1 -> M2->M3".into(),
            setup: BTreeMap::new(),
            process: BTreeMap::new(),
            deadline_days: None,
        };
        assert_eq!(record.route(), vec!["M1", "M2", "M3"]);
    }

    #[test]
    fn test_record_into_order() {
        let record = OrderRecord {
            order_id: "A1".into(),
            operation_sequence: "M2->M1".into(),
            setup: BTreeMap::from([("M1".into(), 1.0), ("M2".into(), 2.0)]),
            process: BTreeMap::from([("M1".into(), 10.0), ("M2".into(), 20.0)]),
            deadline_days: Some(2.0),
        };
        let order = record.into_order(DEFAULT_DAY_LENGTH);

        assert_eq!(order.route, vec!["M2", "M1"]);
        assert_eq!(order.occupancy_on("M2"), Some(22));
        assert_eq!(order.occupancy_on("M1"), Some(11));
        assert_eq!(order.deadline, Some(960.0));
    }

    #[test]
    fn test_record_missing_column_leaves_gap() {
        let record = OrderRecord {
            order_id: "A1".into(),
            operation_sequence: "M1->M2".into(),
            setup: BTreeMap::from([("M1".into(), 1.0), ("M2".into(), 2.0)]),
            process: BTreeMap::from([("M1".into(), 10.0)]),
            deadline_days: None,
        };
        let order = record.into_order(DEFAULT_DAY_LENGTH);
        assert!(order.timing("M1").is_some());
        assert!(order.timing("M2").is_none());
    }

    #[test]
    fn test_record_from_json() {
        let json = r#"{
            "order_id": "A7",
            "operation_sequence": "M1->M3",
            "setup": {"M1": 5, "M3": 0.5},
            "process": {"M1": 30, "M3": 12},
            "deadline_days": 1.5
        }"#;
        let record: OrderRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.route(), vec!["M1", "M3"]);
        let order = record.into_order(DEFAULT_DAY_LENGTH);
        assert_eq!(order.occupancy_on("M3"), Some(12));
        assert_eq!(order.deadline, Some(720.0));
    }

    #[test]
    fn test_serialized_timings_sorted_by_machine() {
        let order = Order::new("A1")
            .with_operation("M3", 0.0, 1.0)
            .with_operation("M1", 0.0, 2.0)
            .with_operation("M2", 0.0, 3.0);
        let json = serde_json::to_string(&order).unwrap();

        let m1 = json.find("\"M1\":{").unwrap();
        let m2 = json.find("\"M2\":{").unwrap();
        let m3 = json.find("\"M3\":{").unwrap();
        assert!(m1 < m2 && m2 < m3, "{json}");
        assert_eq!(json, serde_json::to_string(&order.clone()).unwrap());
    }
}
