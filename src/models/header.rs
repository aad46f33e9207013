use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Column metadata. `name` is the unique key; `label` falls back to `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: CompactString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub pinned: bool,
}

impl Header {
    pub fn new(name: &str) -> Self {
        Self {
            name: CompactString::from(name),
            label: None,
            hidden: false,
            pinned: false,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn text(&self) -> &str {
        match self.label.as_deref() {
            Some(label) if !label.is_empty() => label,
            _ => self.name.as_str(),
        }
    }
}
