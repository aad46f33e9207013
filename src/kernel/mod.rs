//! Headless grid core (state/action/effect).

pub mod action;
pub mod effect;
pub mod paging;
pub mod services;
pub mod session;
pub mod state;
pub mod store;
pub mod task;
pub mod viewport;

pub use action::Action;
pub use effect::Effect;
pub use paging::{NavState, PageChanged, PagingCoordinator};
pub use session::GridSession;
pub use state::GridState;
pub use store::{DispatchResult, Store};
pub use task::{AsyncTask, TaskError, TaskHandle, TaskState};
pub use viewport::{
    CellRef, ColumnLayout, ColumnSlot, DualViewportController, Surface, SurfaceKind, SyncState,
};
