use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::row::SourceKey;
use super::value::CellValue;

/// Ordered field payload so that serialized change sets are stable.
pub type Fields = BTreeMap<String, CellValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowUpdate {
    pub key: SourceKey,
    pub fields: Fields,
}

/// Delta between the displayed rows and the last loaded source rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChangeSet {
    pub creates: Vec<Fields>,
    pub updates: Vec<RowUpdate>,
    pub deletes: Vec<SourceKey>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.creates.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.creates.len() + self.updates.len() + self.deletes.len()
    }
}
