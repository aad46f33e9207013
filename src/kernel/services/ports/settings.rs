use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub grid: GridSettings,
    #[serde(default)]
    pub export: ExportSettings,
    #[serde(default)]
    pub runtime: RuntimeSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResizeMode {
    Fixed,
    #[default]
    Contents,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natural_key: Option<String>,
    #[serde(default)]
    pub pinned: Vec<String>,
    #[serde(default)]
    pub hidden: Vec<String>,
    #[serde(default)]
    pub resize_mode: ResizeMode,
    #[serde(default = "default_column_width")]
    pub default_column_width: u32,
    #[serde(default = "default_char_width")]
    pub char_width: u32,
    #[serde(default = "default_true")]
    pub refresh_after_save: bool,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            natural_key: None,
            pinned: Vec::new(),
            hidden: Vec::new(),
            resize_mode: ResizeMode::default(),
            default_column_width: default_column_width(),
            char_width: default_char_width(),
            refresh_after_save: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Delimiter {
    #[default]
    Tab,
    Comma,
}

impl Delimiter {
    pub fn as_byte(self) -> u8 {
        match self {
            Delimiter::Tab => b'\t',
            Delimiter::Comma => b',',
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    #[serde(default)]
    pub delimiter: Delimiter,
    #[serde(default)]
    pub include_hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeSettings {
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            worker_threads: default_worker_threads(),
        }
    }
}

fn default_column_width() -> u32 {
    100
}

fn default_char_width() -> u32 {
    8
}

fn default_worker_threads() -> usize {
    2
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/settings.rs"]
mod tests;
