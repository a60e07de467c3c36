//! Discrete-time job-shop simulator for dispatch policies.
//!
//! Simulates a production floor of fixed machines processing orders that
//! each follow their own machine route. An external decision-maker (a
//! reinforcement-learning agent or any dispatching heuristic) observes the
//! floor every tick and picks which waiting order each idle machine starts;
//! the simulator advances time, resolves completions, routes finished work
//! and reports observation, reward and termination.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Order`, `OrderRecord`, `Machine`,
//!   `ScheduleLog`
//! - **`validation`**: Order integrity checks (routes, timings, duplicates)
//! - **`catalog`**: Immutable, indexed order catalog and machine set
//! - **`simulation`**: `ShopFloor` tick engine, `SimState`, dispatch and routing
//! - **`policy`**: `DispatchPolicy` trait, rule engine, baseline rules
//! - **`runner`**: Episode driver
//! - **`report`**: Makespan, utilization and tardiness KPIs
//!
//! # Architecture
//!
//! Configuration and catalog are immutable and shareable; all episode data
//! lives in a `SimState` passed explicitly to `reset`/`step`, so parallel
//! simulations need no locking.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

pub mod catalog;
pub mod error;
pub mod models;
pub mod policy;
pub mod report;
pub mod runner;
pub mod simulation;
pub mod validation;

pub use error::{Result, SimError};
