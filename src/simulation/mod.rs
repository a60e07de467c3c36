//! Discrete-time shop-floor simulation.
//!
//! [`ShopFloor`] pairs an immutable [`OrderCatalog`](crate::catalog::OrderCatalog)
//! with a [`SimConfig`]; all episode data lives in a separate [`SimState`].
//! An external decision-maker reads an [`Observation`] and answers with one
//! selection per machine; `step` applies it as one atomic tick.
//!
//! # Usage
//!
//! ```
//! use u_shopsim::catalog::OrderCatalog;
//! use u_shopsim::models::Order;
//! use u_shopsim::simulation::{ShopFloor, SimConfig};
//!
//! let catalog = OrderCatalog::new(vec![
//!     Order::new("A1").with_operation("M1", 1.0, 2.0).with_operation("M2", 0.0, 2.0),
//!     Order::new("A2").with_operation("M2", 0.0, 1.0),
//! ]).unwrap();
//! let floor = ShopFloor::new(catalog, SimConfig::new(10, 1)).unwrap();
//! let mut state = floor.new_state();
//!
//! let result = floor.step(&mut state, &[1, 1]).unwrap();
//! assert_eq!(result.observation.to_vec().len(), 5);
//! ```

mod config;
mod dispatch;
mod engine;
mod observation;
mod queue;
mod routing;
mod state;

pub use config::{CompletionBonus, MachineRewardMode, RewardConfig, SimConfig};
pub use dispatch::{dispatch, resolve_selection, DispatchOutcome};
pub use engine::ShopFloor;
pub use observation::{Observation, StepResult};
pub use queue::MachineQueue;
pub use routing::{next_step, RouteStep};
pub use state::{OrderLocation, SimState};
