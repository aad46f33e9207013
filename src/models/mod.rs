//! 数据模型层

pub mod change_set;
pub mod error;
pub mod grid_model;
pub mod header;
pub mod row;
pub mod value;

pub use change_set::{ChangeSet, Fields, RowUpdate};
pub use error::{GridError, Result};
pub use grid_model::GridModel;
pub use header::Header;
pub use row::{GridRow, Record, RowIdentity, SourceKey, SourceRow};
pub use value::CellValue;
