//! Order catalog.
//!
//! An immutable, validated view of the orders of one run, with the machine
//! set derived from their routes. Lookups by id go through an index built
//! once at construction.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::{Result, SimError};
use crate::models::{MachineId, Order, OrderRecord, DEFAULT_DAY_LENGTH};
use crate::validation::validate_orders;

/// Validated, read-only order definitions.
#[derive(Debug, Clone)]
pub struct OrderCatalog {
    orders: Vec<Order>,
    index: HashMap<String, usize>,
    machines: Vec<MachineId>,
    machine_index: HashMap<MachineId, usize>,
}

impl OrderCatalog {
    /// Builds a catalog, deriving the machine set from the routes.
    ///
    /// Machines are ordered naturally (`M2` before `M10`).
    ///
    /// # Errors
    /// `InvalidOrderDefinition` with every detected issue.
    pub fn new(orders: Vec<Order>) -> Result<Self> {
        validate_orders(&orders, None)
            .map_err(|issues| SimError::InvalidOrderDefinition { issues })?;

        let mut machines: Vec<MachineId> = orders
            .iter()
            .flat_map(|o| o.route.iter().cloned())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        machines.sort_by(|a, b| natural_cmp(a, b));

        Ok(Self::assemble(orders, machines))
    }

    /// Builds a catalog over an explicit machine set.
    ///
    /// The observation layout follows the given order. Machines that no
    /// route visits stay idle for the whole run.
    ///
    /// # Errors
    /// `InvalidOrderDefinition` if a route leaves the machine set or any
    /// other check fails.
    pub fn with_machines(orders: Vec<Order>, machines: Vec<MachineId>) -> Result<Self> {
        validate_orders(&orders, Some(&machines))
            .map_err(|issues| SimError::InvalidOrderDefinition { issues })?;
        let mut seen = HashSet::new();
        let machines = machines
            .into_iter()
            .filter(|m| seen.insert(m.clone()))
            .collect();
        Ok(Self::assemble(orders, machines))
    }

    /// Builds a catalog from tabular rows, scaling day deadlines by
    /// [`DEFAULT_DAY_LENGTH`].
    pub fn from_records(records: Vec<OrderRecord>) -> Result<Self> {
        Self::from_records_with_day_length(records, DEFAULT_DAY_LENGTH)
    }

    /// Builds a catalog from tabular rows with a custom day length.
    pub fn from_records_with_day_length(
        records: Vec<OrderRecord>,
        day_length: f64,
    ) -> Result<Self> {
        let orders = records
            .into_iter()
            .map(|r| r.into_order(day_length))
            .collect();
        Self::new(orders)
    }

    fn assemble(orders: Vec<Order>, machines: Vec<MachineId>) -> Self {
        let index = orders
            .iter()
            .enumerate()
            .map(|(i, o)| (o.id.clone(), i))
            .collect();
        let machine_index = machines
            .iter()
            .enumerate()
            .map(|(i, m)| (m.clone(), i))
            .collect();
        debug!(orders = orders.len(), machines = ?machines, "order catalog built");
        Self {
            orders,
            index,
            machines,
            machine_index,
        }
    }

    /// Looks up an order by id.
    pub fn get(&self, order_id: &str) -> Result<&Order> {
        self.index
            .get(order_id)
            .map(|&i| &self.orders[i])
            .ok_or_else(|| SimError::UnknownOrder(order_id.to_string()))
    }

    /// Catalog index of an order id.
    pub fn index_of(&self, order_id: &str) -> Option<usize> {
        self.index.get(order_id).copied()
    }

    /// Order at a catalog index.
    ///
    /// # Panics
    /// If `idx` is out of range. Indices come from this catalog.
    #[inline]
    pub fn order(&self, idx: usize) -> &Order {
        &self.orders[idx]
    }

    /// All orders in definition order.
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Machine set in observation order.
    pub fn machines(&self) -> &[MachineId] {
        &self.machines
    }

    pub fn machine_count(&self) -> usize {
        self.machines.len()
    }

    /// Position of a machine in the machine set.
    pub fn machine_index(&self, machine: &str) -> Option<usize> {
        self.machine_index.get(machine).copied()
    }

    /// Longest route in the catalog.
    pub fn max_route_len(&self) -> usize {
        self.orders.iter().map(Order::route_len).max().unwrap_or(0)
    }

    /// Longest single occupancy in the catalog (ticks).
    pub fn max_occupancy(&self) -> i64 {
        self.orders
            .iter()
            .flat_map(|o| o.route.iter().filter_map(|m| o.occupancy_on(m)))
            .max()
            .unwrap_or(0)
    }
}

/// Compares ids so embedded numbers sort by value: `M2 < M10`.
fn natural_cmp(a: &str, b: &str) -> Ordering {
    let split = |s: &str| {
        let digits_at = s
            .rfind(|c: char| !c.is_ascii_digit())
            .map_or(0, |i| i + 1);
        let (prefix, digits) = s.split_at(digits_at);
        (prefix.to_string(), digits.parse::<u64>().ok())
    };
    let (pa, na) = split(a);
    let (pb, nb) = split(b);
    pa.cmp(&pb).then(na.cmp(&nb)).then_with(|| a.cmp(b))
}
