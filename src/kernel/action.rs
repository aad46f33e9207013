use crate::kernel::services::ports::PageData;
use crate::kernel::viewport::{CellRef, SurfaceKind};
use crate::models::CellValue;

#[derive(Debug, Clone)]
pub enum Action {
    AddRow,
    RemoveRows(Vec<usize>),
    DeleteSelected,
    SetCell {
        row: usize,
        column: String,
        value: CellValue,
    },
    ReorderColumns(Vec<String>),
    SetPinned(Vec<String>),
    SetHidden(Vec<String>),
    GoTo(u32),
    FirstPage,
    PrevPage,
    NextPage,
    LastPage,
    Refresh,
    Save,
    Scroll {
        surface: SurfaceKind,
        row: usize,
    },
    ResizeColumn {
        column: String,
        width: u32,
    },
    Select {
        surface: SurfaceKind,
        cells: Vec<CellRef>,
    },
    SelectRows(Vec<usize>),
    TaskStarted,
    TaskFinished,
    PageLoaded {
        page: u32,
        data: PageData,
    },
    FetchFailed(String),
    SaveSucceeded,
    SaveFailed(String),
}

impl Action {
    /// Task lifecycle actions are accepted while the view is disabled;
    /// everything else is user interaction.
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            Action::TaskStarted
                | Action::TaskFinished
                | Action::PageLoaded { .. }
                | Action::FetchFailed(_)
                | Action::SaveSucceeded
                | Action::SaveFailed(_)
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::AddRow => "AddRow",
            Action::RemoveRows(_) => "RemoveRows",
            Action::DeleteSelected => "DeleteSelected",
            Action::SetCell { .. } => "SetCell",
            Action::ReorderColumns(_) => "ReorderColumns",
            Action::SetPinned(_) => "SetPinned",
            Action::SetHidden(_) => "SetHidden",
            Action::GoTo(_) => "GoTo",
            Action::FirstPage => "FirstPage",
            Action::PrevPage => "PrevPage",
            Action::NextPage => "NextPage",
            Action::LastPage => "LastPage",
            Action::Refresh => "Refresh",
            Action::Save => "Save",
            Action::Scroll { .. } => "Scroll",
            Action::ResizeColumn { .. } => "ResizeColumn",
            Action::Select { .. } => "Select",
            Action::SelectRows(_) => "SelectRows",
            Action::TaskStarted => "TaskStarted",
            Action::TaskFinished => "TaskFinished",
            Action::PageLoaded { .. } => "PageLoaded",
            Action::FetchFailed(_) => "FetchFailed",
            Action::SaveSucceeded => "SaveSucceeded",
            Action::SaveFailed(_) => "SaveFailed",
        }
    }
}
