//! Host-supplied collaborators: page fetch and change submission.

use serde::{Deserialize, Serialize};

use crate::models::{ChangeSet, Header, Record};

/// One fetched page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageData {
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub rows: Vec<Record>,
    #[serde(default = "default_total_pages")]
    pub total_pages: u32,
}

fn default_total_pages() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollaboratorError {
    pub message: String,
}

impl CollaboratorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for CollaboratorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CollaboratorError {}

pub trait PageSource: Send + Sync {
    fn fetch(&self, page: u32) -> Result<PageData, CollaboratorError>;
}

pub trait ChangeSink: Send + Sync {
    fn submit(&self, changes: &ChangeSet) -> Result<(), CollaboratorError>;
}

impl<F> PageSource for F
where
    F: Fn(u32) -> Result<PageData, CollaboratorError> + Send + Sync,
{
    fn fetch(&self, page: u32) -> Result<PageData, CollaboratorError> {
        self(page)
    }
}

impl<F> ChangeSink for F
where
    F: Fn(&ChangeSet) -> Result<(), CollaboratorError> + Send + Sync,
{
    fn submit(&self, changes: &ChangeSet) -> Result<(), CollaboratorError> {
        self(changes)
    }
}
