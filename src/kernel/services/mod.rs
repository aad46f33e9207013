//! Services layer (ports + adapters).
//!
//! - `ports`: pure contracts/types used across the grid core.
//! - `adapters`: OS/runtime specific implementations (IO/async).

pub mod adapters;
pub mod bus;
pub mod host;
pub mod ports;

pub use bus::{
    task_bus, ContextClosed, Outcome, TaskBusReceiver, TaskBusSender, TaskId, TaskMessage,
};
pub use host::InteractiveContext;
