//! JSON-file collaborators used by the reference host.
//!
//! `JsonPageSource` serves pages from a JSON array of `PageData` objects;
//! `JsonChangeLog` appends every submitted change set to a JSON array file.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::kernel::services::ports::{ChangeSink, CollaboratorError, PageData, PageSource};
use crate::models::ChangeSet;

#[derive(Debug, Clone)]
pub struct JsonPageSource {
    pages: Vec<PageData>,
}

impl JsonPageSource {
    pub fn new(pages: Vec<PageData>) -> Self {
        Self { pages }
    }

    pub fn from_path(path: &Path) -> Result<Self, CollaboratorError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| CollaboratorError::new(format!("{}: {}", path.display(), e)))?;
        let pages: Vec<PageData> = serde_json::from_str(&data)
            .map_err(|e| CollaboratorError::new(format!("{}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), pages = pages.len(), "page fixture loaded");
        Ok(Self::new(pages))
    }

    pub fn page_count(&self) -> u32 {
        u32::try_from(self.pages.len()).unwrap_or(u32::MAX).max(1)
    }
}

impl PageSource for JsonPageSource {
    fn fetch(&self, page: u32) -> Result<PageData, CollaboratorError> {
        let index = page
            .checked_sub(1)
            .and_then(|i| usize::try_from(i).ok())
            .ok_or_else(|| CollaboratorError::new(format!("invalid page {}", page)))?;
        let mut data = self
            .pages
            .get(index)
            .cloned()
            .ok_or_else(|| CollaboratorError::new(format!("page {} not found", page)))?;
        data.total_pages = self.page_count();
        Ok(data)
    }
}

pub struct JsonChangeLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonChangeLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every change set written so far, oldest first.
    pub fn entries(&self) -> Result<Vec<ChangeSet>, CollaboratorError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = std::fs::read_to_string(&self.path).map_err(|e| self.error(e))?;
        serde_json::from_str(&data).map_err(|e| self.error(e))
    }

    fn error(&self, e: impl std::fmt::Display) -> CollaboratorError {
        CollaboratorError::new(format!("{}: {}", self.path.display(), e))
    }
}

impl ChangeSink for JsonChangeLog {
    fn submit(&self, changes: &ChangeSet) -> Result<(), CollaboratorError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| CollaboratorError::new("change log lock poisoned"))?;
        let mut entries = self.entries()?;
        entries.push(changes.clone());
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| self.error(e))?;
            }
        }
        let content = serde_json::to_string_pretty(&entries).map_err(|e| self.error(e))?;
        std::fs::write(&self.path, content).map_err(|e| self.error(e))?;
        tracing::info!(path = %self.path.display(), changes = changes.len(), "change set written");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/fixture.rs"]
mod tests;
