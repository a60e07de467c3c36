//! Shop-floor domain models.
//!
//! Provides the data types shared by the catalog and the simulator.
//!
//! # Domain Mappings
//!
//! | u-shopsim | Manufacturing | Logistics |
//! |-----------|--------------|-----------|
//! | Order | Job/Work Order | Shipment |
//! | Route | Operation Sequence | Hub Sequence |
//! | Machine | Workstation | Dock |
//! | ScheduleLog | Gantt Data | Dock Log |

mod machine;
mod order;
mod schedule;

pub use machine::{FinishedOccupancy, Machine, MachineStatus};
pub use order::{
    MachineId, OperationTiming, Order, OrderId, OrderRecord, DEFAULT_DAY_LENGTH, ROUTE_SEPARATOR,
};
pub use schedule::{ScheduleLog, ScheduleLogEntry};
