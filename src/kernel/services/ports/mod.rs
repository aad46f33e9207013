//! Service ports: traits + data contracts.

pub mod collaborator;
pub mod runtime;
pub mod settings;

pub use collaborator::{ChangeSink, CollaboratorError, PageData, PageSource};
pub use runtime::{Job, TaskExecutor};
pub use settings::{Delimiter, ExportSettings, GridSettings, ResizeMode, RuntimeSettings, Settings};
