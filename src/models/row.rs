//! 行身份与行数据
//!
//! - `SourceRow`: 最近一次拉取的只读数据
//! - `GridRow`: 视图中的可编辑行（Bound 覆盖层 / New）

use compact_str::CompactString;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::value::CellValue;

/// One fetched row as a name → value mapping.
pub type Record = FxHashMap<CompactString, CellValue>;

/// Stable identity of a source row, assigned at fetch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceKey {
    /// Position in the last fetched page.
    Position(usize),
    /// Value of the host-configured natural key column.
    Natural(CellValue),
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKey::Position(idx) => write!(f, "#{}", idx),
            SourceKey::Natural(value) => write!(f, "{}", value),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    pub key: SourceKey,
    values: Record,
}

impl SourceRow {
    pub fn new(key: SourceKey, values: Record) -> Self {
        Self { key, values }
    }

    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.values.get(name)
    }

    pub fn values(&self) -> &Record {
        &self.values
    }
}

/// Identity of a displayed row. Fixed when the row is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowIdentity {
    New,
    /// Index into the model's source rows.
    Bound(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    identity: RowIdentity,
    /// Bound: only cells differing from the source. New: every entered cell.
    cells: FxHashMap<CompactString, CellValue>,
}

impl GridRow {
    pub fn bound(source: usize) -> Self {
        Self {
            identity: RowIdentity::Bound(source),
            cells: FxHashMap::default(),
        }
    }

    pub fn new_row() -> Self {
        Self {
            identity: RowIdentity::New,
            cells: FxHashMap::default(),
        }
    }

    pub fn identity(&self) -> RowIdentity {
        self.identity
    }

    pub fn is_new(&self) -> bool {
        self.identity == RowIdentity::New
    }

    pub fn cells(&self) -> &FxHashMap<CompactString, CellValue> {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut FxHashMap<CompactString, CellValue> {
        &mut self.cells
    }
}
