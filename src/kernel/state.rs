use crate::kernel::paging::PagingCoordinator;
use crate::kernel::services::ports::GridSettings;
use crate::kernel::services::InteractiveContext;
use crate::kernel::viewport::{ColumnLayout, DualViewportController};
use crate::models::{GridError, GridModel};

pub struct GridState {
    pub model: GridModel,
    pub viewports: DualViewportController,
    pub paging: PagingCoordinator,
    /// Cleared while a task is outstanding; interaction is rejected meanwhile.
    pub enabled: bool,
    pub last_error: Option<GridError>,
    /// Page currently shown, 0 before the first successful fetch.
    pub loaded_page: u32,
    pub pending_refresh: bool,
    pub refresh_after_save: bool,
    pub tasks_started: usize,
    pub tasks_finished: usize,
}

impl GridState {
    pub fn new(ctx: &InteractiveContext, settings: &GridSettings) -> Self {
        let mut model = GridModel::new().with_preferences(&settings.pinned, &settings.hidden);
        if let Some(key) = settings.natural_key.as_deref() {
            model = model.with_natural_key(key);
        }
        let mut viewports =
            DualViewportController::new(ctx, ColumnLayout::from_settings(settings));
        viewports.apply_model(&model);
        Self {
            model,
            viewports,
            paging: PagingCoordinator::new(),
            enabled: true,
            last_error: None,
            loaded_page: 0,
            pending_refresh: false,
            refresh_after_save: settings.refresh_after_save,
            tasks_started: 0,
            tasks_finished: 0,
        }
    }

    pub fn is_busy(&self) -> bool {
        !self.enabled
    }
}
