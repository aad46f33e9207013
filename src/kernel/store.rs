use super::{Action, Effect, GridState};
use crate::kernel::paging::PageChanged;
use crate::kernel::viewport::SurfaceKind;
use crate::models::{GridError, Result};

pub struct DispatchResult {
    pub effects: Vec<Effect>,
    pub state_changed: bool,
}

impl DispatchResult {
    fn unchanged() -> Self {
        Self {
            effects: Vec::new(),
            state_changed: false,
        }
    }

    fn changed(state_changed: bool) -> Self {
        Self {
            effects: Vec::new(),
            state_changed,
        }
    }

    fn fetch(page: Option<PageChanged>) -> Self {
        match page {
            Some(PageChanged { page }) => Self {
                effects: vec![Effect::FetchPage(page)],
                state_changed: true,
            },
            None => Self::unchanged(),
        }
    }
}

pub struct Store {
    state: GridState,
}

impl Store {
    pub fn new(state: GridState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &GridState {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) -> Result<DispatchResult> {
        if !self.state.enabled && !action.is_lifecycle() {
            tracing::debug!(?action, "interaction rejected while busy");
            return Err(GridError::Busy);
        }

        let result = match action {
            Action::AddRow => {
                let index = self.state.model.add_row();
                self.state
                    .viewports
                    .set_row_count(self.state.model.row_count());
                tracing::debug!(index, "row added");
                DispatchResult::changed(true)
            }
            Action::RemoveRows(indices) => self.remove_rows(&indices)?,
            Action::DeleteSelected => {
                let rows = self.state.viewports.main().selected_rows();
                if rows.is_empty() {
                    tracing::info!("delete requested without a selection");
                    DispatchResult::unchanged()
                } else {
                    self.remove_rows(&rows)?
                }
            }
            Action::SetCell { row, column, value } => {
                let changed = self.state.model.set_cell(row, &column, value)?;
                DispatchResult::changed(changed)
            }
            Action::ReorderColumns(names) => {
                let names: Vec<&str> = names.iter().map(String::as_str).collect();
                self.state.model.reorder_columns(&names)?;
                self.state.viewports.apply_model(&self.state.model);
                DispatchResult::changed(true)
            }
            Action::SetPinned(names) => {
                let names: Vec<&str> = names.iter().map(String::as_str).collect();
                self.state.model.set_pinned(&names)?;
                self.state.viewports.apply_model(&self.state.model);
                DispatchResult::changed(true)
            }
            Action::SetHidden(names) => {
                let names: Vec<&str> = names.iter().map(String::as_str).collect();
                self.state.model.set_hidden(&names)?;
                self.state.viewports.apply_model(&self.state.model);
                DispatchResult::changed(true)
            }
            Action::GoTo(page) => DispatchResult::fetch(self.state.paging.go_to(page)),
            Action::FirstPage => DispatchResult::fetch(self.state.paging.first()),
            Action::PrevPage => DispatchResult::fetch(self.state.paging.prev()),
            Action::NextPage => DispatchResult::fetch(self.state.paging.next()),
            Action::LastPage => DispatchResult::fetch(self.state.paging.last()),
            Action::Refresh => DispatchResult::fetch(self.state.paging.refresh()),
            Action::Save => {
                let changes = self.state.model.diff();
                if changes.is_empty() {
                    tracing::info!("save requested with no changes");
                    DispatchResult::unchanged()
                } else {
                    tracing::info!(
                        creates = changes.creates.len(),
                        updates = changes.updates.len(),
                        deletes = changes.deletes.len(),
                        "submitting changes"
                    );
                    DispatchResult {
                        effects: vec![Effect::SubmitChanges(changes)],
                        state_changed: false,
                    }
                }
            }
            Action::Scroll { surface, row } => {
                let before = self.state.viewports.surface(surface).scroll_row();
                let after = self.state.viewports.scroll_to(surface, row);
                DispatchResult::changed(before != after)
            }
            Action::ResizeColumn { column, width } => {
                self.state.viewports.resize_column(&column, width)?;
                DispatchResult::changed(true)
            }
            Action::Select { surface, cells } => {
                self.state.viewports.select(surface, cells)?;
                DispatchResult::changed(true)
            }
            Action::SelectRows(rows) => {
                self.state.viewports.select_rows(&rows)?;
                DispatchResult::changed(true)
            }
            Action::TaskStarted => {
                self.state.enabled = false;
                self.state.tasks_started += 1;
                DispatchResult::changed(true)
            }
            Action::TaskFinished => {
                self.state.enabled = true;
                self.state.tasks_finished += 1;
                let mut result = DispatchResult::changed(true);
                if std::mem::take(&mut self.state.pending_refresh) {
                    if let Some(PageChanged { page }) = self.state.paging.refresh() {
                        tracing::debug!(page, "refreshing after save");
                        result.effects.push(Effect::FetchPage(page));
                    }
                }
                result
            }
            Action::PageLoaded { page, data } => {
                tracing::info!(page, rows = data.rows.len(), "page loaded");
                self.state.paging.set_total_pages(data.total_pages);
                self.state.model.load(data.rows, data.headers);
                self.state.viewports.apply_model(&self.state.model);
                self.state.loaded_page = page;
                self.state.last_error = None;
                DispatchResult::changed(true)
            }
            Action::FetchFailed(message) => {
                tracing::warn!(error = %message, "page fetch failed");
                // The rows on screen still belong to the previous page.
                self.state.paging.restore(self.state.loaded_page);
                self.state.last_error = Some(GridError::FetchFailed(message));
                DispatchResult::changed(true)
            }
            Action::SaveSucceeded => {
                self.state.model.commit();
                self.state
                    .viewports
                    .set_row_count(self.state.model.row_count());
                self.state.last_error = None;
                self.state.pending_refresh = self.state.refresh_after_save;
                tracing::info!("changes saved");
                DispatchResult::changed(true)
            }
            Action::SaveFailed(message) => {
                tracing::warn!(error = %message, "change submission failed");
                self.state.last_error = Some(GridError::SubmitFailed(message));
                DispatchResult::changed(true)
            }
        };
        Ok(result)
    }

    fn remove_rows(&mut self, rows: &[usize]) -> Result<DispatchResult> {
        let removed = self.state.model.remove_rows(rows)?;
        self.state.viewports.clear_selection(SurfaceKind::Main);
        self.state
            .viewports
            .set_row_count(self.state.model.row_count());
        tracing::debug!(removed, "rows removed");
        Ok(DispatchResult::changed(removed > 0))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/store.rs"]
mod tests;
