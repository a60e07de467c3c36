//! Schedule quality metrics (KPIs).
//!
//! Computes performance indicators from a finished episode's schedule log
//! and its order catalog.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Makespan (C_max) | Latest finish time |
//! | Machine Utilization | Busy time / (last finish - first start), per machine |
//! | Late Orders | Orders completing after their deadline |
//! | Total Tardiness | Sum of max(0, completion - deadline) |
//! | On-Time Rate | Fraction meeting deadlines |
//! | Avg Flow Time | Mean completion time (all orders released at t=0) |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::OrderCatalog;
use crate::models::{MachineId, OrderId, ScheduleLog};

/// Busy time of one machine over its active window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineUtilization {
    /// Sum of logged occupancies.
    pub processing_time: i64,
    /// Last finish minus first start on this machine.
    pub available_time: i64,
    /// `processing_time / available_time * 100` (0 for an empty window).
    pub utilization_percentage: f64,
}

/// Schedule performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopKpi {
    pub makespan: i64,
    /// Per-machine utilization, for machines that appear in the log.
    pub utilization_by_machine: BTreeMap<MachineId, MachineUtilization>,
    /// Mean utilization percentage over logged machines.
    pub avg_utilization_percentage: f64,
    /// Completed orders that finished after their deadline, catalog order.
    pub late_orders: Vec<OrderId>,
    pub total_tardiness: f64,
    pub max_tardiness: f64,
    /// Fraction of completed orders on time (1.0 if none completed).
    pub on_time_rate: f64,
    pub avg_flow_time: f64,
}

impl ShopKpi {
    /// Computes KPIs from a schedule log and its catalog.
    ///
    /// Only orders with at least one logged occupancy are counted; an
    /// order's completion time is its last logged finish.
    pub fn calculate(log: &ScheduleLog, catalog: &OrderCatalog) -> Self {
        let mut late_orders = Vec::new();
        let mut total_tardiness = 0.0;
        let mut max_tardiness: f64 = 0.0;
        let mut on_time_count = 0usize;
        let mut counted = 0usize;
        let mut total_flow_time = 0.0;

        for order in catalog.orders() {
            let Some(completion) = log.order_completion_time(&order.id) else {
                continue;
            };
            counted += 1;
            total_flow_time += completion as f64;

            match order.deadline {
                Some(deadline) if completion as f64 > deadline => {
                    let tardiness = completion as f64 - deadline;
                    total_tardiness += tardiness;
                    max_tardiness = max_tardiness.max(tardiness);
                    late_orders.push(order.id.clone());
                }
                // No deadline → considered on-time
                _ => on_time_count += 1,
            }
        }

        let utilization_by_machine = machine_utilization(log);
        let avg_utilization_percentage = if utilization_by_machine.is_empty() {
            0.0
        } else {
            let sum: f64 = utilization_by_machine
                .values()
                .map(|u| u.utilization_percentage)
                .sum();
            sum / utilization_by_machine.len() as f64
        };

        Self {
            makespan: log.makespan(),
            utilization_by_machine,
            avg_utilization_percentage,
            late_orders,
            total_tardiness,
            max_tardiness,
            on_time_rate: if counted == 0 {
                1.0
            } else {
                on_time_count as f64 / counted as f64
            },
            avg_flow_time: if counted == 0 {
                0.0
            } else {
                total_flow_time / counted as f64
            },
        }
    }

    /// Number of late orders.
    pub fn late_count(&self) -> usize {
        self.late_orders.len()
    }
}

fn machine_utilization(log: &ScheduleLog) -> BTreeMap<MachineId, MachineUtilization> {
    let mut windows: BTreeMap<&str, (i64, i64, i64)> = BTreeMap::new();
    for e in log.entries() {
        let w = windows
            .entry(e.machine.as_str())
            .or_insert((0, e.start_time, e.finish_time));
        w.0 += e.duration();
        w.1 = w.1.min(e.start_time);
        w.2 = w.2.max(e.finish_time);
    }

    windows
        .into_iter()
        .map(|(machine, (busy, first, last))| {
            let available = last - first;
            let pct = if available > 0 {
                busy as f64 / available as f64 * 100.0
            } else {
                0.0
            };
            (
                machine.to_string(),
                MachineUtilization {
                    processing_time: busy,
                    available_time: available,
                    utilization_percentage: pct,
                },
            )
        })
        .collect()
}
