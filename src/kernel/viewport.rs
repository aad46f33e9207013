//! 冻结列双视图
//!
//! `main` 显示全部可见列，`frozen` 只显示固定列。两个视图的纵向滚动、
//! 固定列宽度和选区保持一致。选区同步只从 main 镜像到 frozen；frozen 上的
//! 选择只会清空 main 的选区。

use compact_str::CompactString;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;
use std::thread::ThreadId;
use unicode_width::UnicodeWidthStr;

use crate::kernel::services::ports::{GridSettings, ResizeMode};
use crate::kernel::services::InteractiveContext;
use crate::models::{GridError, GridModel, Result};

const CELL_PADDING: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    Main,
    Frozen,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    pub row: usize,
    pub column: CompactString,
}

impl CellRef {
    pub fn new(row: usize, column: &str) -> Self {
        Self {
            row,
            column: CompactString::from(column),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSlot {
    pub name: CompactString,
    pub label: String,
    pub visible: bool,
    pub width: u32,
}

/// One view surface: columns in display order, selection and scroll offset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Surface {
    columns: Vec<ColumnSlot>,
    selection: BTreeSet<CellRef>,
    scroll_row: usize,
    row_count: usize,
}

impl Surface {
    pub fn columns(&self) -> &[ColumnSlot] {
        &self.columns
    }

    pub fn visible_columns(&self) -> impl Iterator<Item = &ColumnSlot> {
        self.columns.iter().filter(|c| c.visible)
    }

    pub fn visible_names(&self) -> Vec<&str> {
        self.visible_columns().map(|c| c.name.as_str()).collect()
    }

    pub fn is_visible(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.visible && c.name == name)
    }

    pub fn column_width(&self, name: &str) -> Option<u32> {
        self.columns.iter().find(|c| c.name == name).map(|c| c.width)
    }

    /// Total width of visible columns.
    pub fn width(&self) -> u32 {
        self.visible_columns().map(|c| c.width).sum()
    }

    pub fn selection(&self) -> &BTreeSet<CellRef> {
        &self.selection
    }

    pub fn selected_rows(&self) -> Vec<usize> {
        let rows: BTreeSet<usize> = self.selection.iter().map(|c| c.row).collect();
        rows.into_iter().collect()
    }

    pub fn scroll_row(&self) -> usize {
        self.scroll_row
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    SyncingFromMain,
    SyncingFromFrozen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub mode: ResizeMode,
    pub default_width: u32,
    pub char_width: u32,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self::from_settings(&GridSettings::default())
    }
}

impl ColumnLayout {
    pub fn from_settings(settings: &GridSettings) -> Self {
        Self {
            mode: settings.resize_mode,
            default_width: settings.default_column_width,
            char_width: settings.char_width.max(1),
        }
    }

    fn measure(&self, model: &GridModel, name: &str, label: &str) -> u32 {
        match self.mode {
            ResizeMode::Fixed => self.default_width,
            ResizeMode::Contents => {
                let widest = (0..model.row_count())
                    .filter_map(|row| model.value(row, name).ok())
                    .map(|v| UnicodeWidthStr::width(v.display().as_ref()))
                    .fold(UnicodeWidthStr::width(label), usize::max);
                (widest as u32 + CELL_PADDING) * self.char_width
            }
        }
    }
}

pub struct DualViewportController {
    thread: ThreadId,
    main: Surface,
    frozen: Surface,
    pinned: FxHashSet<CompactString>,
    /// Widths set by the user, kept across reloads.
    width_overrides: FxHashMap<CompactString, u32>,
    layout: ColumnLayout,
    sync: SyncState,
}

impl DualViewportController {
    pub fn new(ctx: &InteractiveContext, layout: ColumnLayout) -> Self {
        Self {
            thread: ctx.owner_thread(),
            main: Surface::default(),
            frozen: Surface::default(),
            pinned: FxHashSet::default(),
            width_overrides: FxHashMap::default(),
            layout,
            sync: SyncState::Idle,
        }
    }

    fn assert_thread(&self) {
        debug_assert_eq!(
            std::thread::current().id(),
            self.thread,
            "viewport mutated off the interactive thread"
        );
    }

    pub fn main(&self) -> &Surface {
        &self.main
    }

    pub fn frozen(&self) -> &Surface {
        &self.frozen
    }

    pub fn surface(&self, kind: SurfaceKind) -> &Surface {
        match kind {
            SurfaceKind::Main => &self.main,
            SurfaceKind::Frozen => &self.frozen,
        }
    }

    fn surface_mut(&mut self, kind: SurfaceKind) -> &mut Surface {
        match kind {
            SurfaceKind::Main => &mut self.main,
            SurfaceKind::Frozen => &mut self.frozen,
        }
    }

    pub fn sync_state(&self) -> SyncState {
        self.sync
    }

    pub fn layout(&self) -> ColumnLayout {
        self.layout
    }

    /// Rebuild both surfaces from the model. Both are computed first and swapped
    /// in together, so the frozen surface is never stale relative to main.
    pub fn apply_model(&mut self, model: &GridModel) {
        self.assert_thread();
        let rows = model.row_count();
        let scroll_row = self.main.scroll_row.min(rows.saturating_sub(1));

        let mut main_columns = Vec::new();
        let mut frozen_columns = Vec::new();
        let mut pinned = FxHashSet::default();
        for header in model.display_columns() {
            let width = self
                .width_overrides
                .get(&header.name)
                .copied()
                .unwrap_or_else(|| self.layout.measure(model, &header.name, header.text()));
            let slot = ColumnSlot {
                name: header.name.clone(),
                label: header.text().to_string(),
                visible: !header.hidden,
                width,
            };
            let frozen_visible = header.pinned && !header.hidden;
            if frozen_visible {
                pinned.insert(header.name.clone());
            }
            frozen_columns.push(ColumnSlot {
                visible: frozen_visible,
                ..slot.clone()
            });
            main_columns.push(slot);
        }

        let main = Surface {
            columns: main_columns,
            selection: BTreeSet::new(),
            scroll_row,
            row_count: rows,
        };
        let frozen = Surface {
            columns: frozen_columns,
            selection: BTreeSet::new(),
            scroll_row,
            row_count: rows,
        };
        self.main = main;
        self.frozen = frozen;
        self.pinned = pinned;
        self.sync = SyncState::Idle;
        tracing::debug!(
            rows,
            main_width = self.main.width(),
            frozen_width = self.frozen.width(),
            "viewports applied"
        );
    }

    /// Row count changed without a column change. Selections past the new
    /// end are dropped and scroll is clamped on both surfaces.
    pub fn set_row_count(&mut self, rows: usize) {
        self.assert_thread();
        let scroll_row = self.main.scroll_row.min(rows.saturating_sub(1));
        for surface in [&mut self.main, &mut self.frozen] {
            surface.row_count = rows;
            surface.scroll_row = scroll_row;
            surface.selection.retain(|c| c.row < rows);
        }
    }

    /// Scroll either surface; the other follows to the same row.
    pub fn scroll_to(&mut self, _origin: SurfaceKind, row: usize) -> usize {
        self.assert_thread();
        let row = row.min(self.main.row_count.saturating_sub(1));
        self.main.scroll_row = row;
        self.frozen.scroll_row = row;
        row
    }

    pub fn scroll_by(&mut self, origin: SurfaceKind, delta: isize) -> usize {
        let current = self.surface(origin).scroll_row;
        let target = current.saturating_add_signed(delta);
        self.scroll_to(origin, target)
    }

    /// Resize a main surface column; pinned widths are mirrored to frozen.
    pub fn resize_column(&mut self, name: &str, width: u32) -> Result<()> {
        self.assert_thread();
        let slot = self
            .main
            .columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| GridError::UnknownColumn(name.to_string()))?;
        slot.width = width;
        self.width_overrides
            .insert(CompactString::from(name), width);
        if self.pinned.contains(name) {
            if let Some(frozen) = self.frozen.columns.iter_mut().find(|c| c.name == name) {
                frozen.width = width;
            }
        }
        Ok(())
    }

    /// Replace a surface's selection, as a user click/drag would, and raise
    /// its selection-changed event.
    pub fn select(
        &mut self,
        origin: SurfaceKind,
        cells: impl IntoIterator<Item = CellRef>,
    ) -> Result<()> {
        self.assert_thread();
        let cells: BTreeSet<CellRef> = cells.into_iter().collect();
        let surface = self.surface(origin);
        for cell in &cells {
            if cell.row >= surface.row_count {
                return Err(GridError::OutOfRange {
                    index: cell.row,
                    len: surface.row_count,
                });
            }
            if !surface.is_visible(&cell.column) {
                return Err(GridError::UnknownColumn(cell.column.to_string()));
            }
        }
        self.replace_selection(origin, cells);
        Ok(())
    }

    /// Select whole rows on the main surface.
    pub fn select_rows(&mut self, rows: &[usize]) -> Result<()> {
        let names: Vec<CompactString> = self
            .main
            .visible_columns()
            .map(|c| c.name.clone())
            .collect();
        let cells = rows.iter().flat_map(|&row| {
            names.iter().map(move |name| CellRef {
                row,
                column: name.clone(),
            })
        });
        self.select(SurfaceKind::Main, cells.collect::<Vec<_>>())
    }

    pub fn clear_selection(&mut self, origin: SurfaceKind) {
        self.replace_selection(origin, BTreeSet::new());
    }

    fn replace_selection(&mut self, kind: SurfaceKind, cells: BTreeSet<CellRef>) {
        self.surface_mut(kind).selection = cells;
        self.selection_changed(kind);
    }

    /// Selection-changed handler for both surfaces. Events raised while a sync
    /// is in progress (the nested ones caused by the sync itself) are ignored.
    pub fn selection_changed(&mut self, origin: SurfaceKind) {
        if self.sync != SyncState::Idle {
            tracing::trace!(?origin, state = ?self.sync, "nested selection event ignored");
            return;
        }
        match origin {
            SurfaceKind::Main => {
                self.sync = SyncState::SyncingFromMain;
                self.replace_selection(SurfaceKind::Frozen, BTreeSet::new());
                let mirrored: BTreeSet<CellRef> = self
                    .main
                    .selection
                    .iter()
                    .filter(|c| self.pinned.contains(&c.column))
                    .cloned()
                    .collect();
                if !mirrored.is_empty() {
                    tracing::debug!(cells = mirrored.len(), "selection mirrored to frozen surface");
                    self.replace_selection(SurfaceKind::Frozen, mirrored);
                }
            }
            SurfaceKind::Frozen => {
                self.sync = SyncState::SyncingFromFrozen;
                self.replace_selection(SurfaceKind::Main, BTreeSet::new());
            }
        }
        self.sync = SyncState::Idle;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/viewport.rs"]
mod tests;
