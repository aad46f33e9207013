//! 带变更跟踪的表格数据模型
//!
//! 拉取的数据保存在 `sources`（只读），视图行保存在 `rows`。
//! Bound 行只记录与源数据不同的单元格，`diff()` 据此计算新增/更新/删除。

use compact_str::CompactString;
use rustc_hash::FxHashSet;
use std::borrow::Cow;

use super::change_set::{ChangeSet, Fields, RowUpdate};
use super::error::{GridError, Result};
use super::header::Header;
use super::row::{GridRow, Record, RowIdentity, SourceKey, SourceRow};
use super::value::CellValue;

#[derive(Debug, Clone, Default)]
pub struct GridModel {
    headers: Vec<Header>,
    sources: Vec<SourceRow>,
    rows: Vec<GridRow>,
    /// Pin preference, in pinned display order. Survives reloads.
    pinned: Vec<CompactString>,
    hidden: FxHashSet<CompactString>,
    /// Column order chosen by the user, applied to every load.
    column_order: Option<Vec<CompactString>>,
    natural_key: Option<CompactString>,
}

impl GridModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given column as source identity instead of the fetch position.
    pub fn with_natural_key(mut self, column: &str) -> Self {
        self.natural_key = Some(CompactString::from(column));
        self
    }

    /// Seed pin/hide preferences by name. Names that are not loaded yet are kept
    /// and take effect once a page carrying them arrives.
    pub fn with_preferences(mut self, pinned: &[String], hidden: &[String]) -> Self {
        for name in pinned {
            if !self.pinned.iter().any(|p| p == name) {
                self.pinned.push(CompactString::from(name.as_str()));
            }
        }
        self.hidden
            .extend(hidden.iter().map(|n| CompactString::from(n.as_str())));
        self
    }

    pub fn natural_key(&self) -> Option<&str> {
        self.natural_key.as_deref()
    }

    /// Replace everything with fresh Bound rows, one per fetched record.
    pub fn load(&mut self, records: Vec<Record>, headers: Vec<Header>) {
        let mut seen: FxHashSet<CompactString> = FxHashSet::default();
        let mut unique = Vec::with_capacity(headers.len());
        for header in headers {
            if !seen.insert(header.name.clone()) {
                tracing::warn!(column = %header.name, "duplicate header dropped on load");
                continue;
            }
            if header.pinned && !self.pinned.contains(&header.name) {
                self.pinned.push(header.name.clone());
            }
            if header.hidden {
                self.hidden.insert(header.name.clone());
            }
            unique.push(header);
        }
        self.headers = unique;
        self.apply_column_order();
        self.sync_header_flags();
        self.install(records);
        tracing::debug!(
            rows = self.rows.len(),
            columns = self.headers.len(),
            "grid model loaded"
        );
    }

    fn install(&mut self, records: Vec<Record>) {
        let mut used: Vec<CellValue> = Vec::new();
        let sources: Vec<SourceRow> = records
            .into_iter()
            .enumerate()
            .map(|(idx, values)| {
                let key = self.assign_key(idx, &values, &mut used);
                SourceRow::new(key, values)
            })
            .collect();
        self.sources = sources;
        self.rows = (0..self.sources.len()).map(GridRow::bound).collect();
    }

    fn assign_key(&self, idx: usize, values: &Record, used: &mut Vec<CellValue>) -> SourceKey {
        let Some(column) = self.natural_key.as_deref() else {
            return SourceKey::Position(idx);
        };
        match values.get(column) {
            Some(value) if !value.is_null() && !used.iter().any(|u| u == value) => {
                used.push(value.clone());
                SourceKey::Natural(value.clone())
            }
            _ => {
                tracing::warn!(
                    row = idx,
                    column,
                    "natural key missing or duplicated, falling back to position"
                );
                SourceKey::Position(idx)
            }
        }
    }

    fn apply_column_order(&mut self) {
        let Some(order) = self.column_order.as_ref() else {
            return;
        };
        let mut ordered = Vec::with_capacity(self.headers.len());
        for name in order {
            if let Some(pos) = self.headers.iter().position(|h| &h.name == name) {
                ordered.push(self.headers.remove(pos));
            }
        }
        ordered.append(&mut self.headers);
        self.headers = ordered;
    }

    fn sync_header_flags(&mut self) {
        for header in &mut self.headers {
            header.pinned = self.pinned.contains(&header.name);
            header.hidden = self.hidden.contains(&header.name);
        }
    }

    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&Header> {
        self.headers.iter().find(|h| h.name == name)
    }

    fn ensure_column(&self, name: &str) -> Result<()> {
        if self.header(name).is_some() {
            Ok(())
        } else {
            Err(GridError::UnknownColumn(name.to_string()))
        }
    }

    /// Pinned columns in pinned order, then the rest in stored order.
    /// Hidden columns are included; see `visible_columns`.
    pub fn display_columns(&self) -> Vec<&Header> {
        let mut out: Vec<&Header> = self
            .pinned
            .iter()
            .filter_map(|name| self.header(name))
            .collect();
        out.extend(self.headers.iter().filter(|h| !h.pinned));
        out
    }

    pub fn visible_columns(&self) -> Vec<&Header> {
        self.display_columns()
            .into_iter()
            .filter(|h| !h.hidden)
            .collect()
    }

    /// Visible pinned columns, i.e. what the frozen surface shows.
    pub fn frozen_columns(&self) -> Vec<&Header> {
        self.display_columns()
            .into_iter()
            .filter(|h| h.pinned && !h.hidden)
            .collect()
    }

    /// Display position of a column, looked up by name first, then by label.
    pub fn column_index(&self, name_or_label: &str) -> Option<usize> {
        let columns = self.display_columns();
        columns
            .iter()
            .position(|h| h.name == name_or_label)
            .or_else(|| columns.iter().position(|h| h.text() == name_or_label))
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    pub fn sources(&self) -> &[SourceRow] {
        &self.sources
    }

    fn check_row(&self, index: usize) -> Result<()> {
        if index < self.rows.len() {
            Ok(())
        } else {
            Err(GridError::OutOfRange {
                index,
                len: self.rows.len(),
            })
        }
    }

    /// Current value of a cell: overlay first, then the source row.
    pub fn value(&self, index: usize, name: &str) -> Result<Cow<'_, CellValue>> {
        self.check_row(index)?;
        self.ensure_column(name)?;
        let row = &self.rows[index];
        if let Some(value) = row.cells().get(name) {
            return Ok(Cow::Borrowed(value));
        }
        let value = match row.identity() {
            RowIdentity::Bound(src) => self.sources[src].get(name),
            RowIdentity::New => None,
        };
        Ok(value.map_or(Cow::Owned(CellValue::Null), Cow::Borrowed))
    }

    pub fn add_row(&mut self) -> usize {
        self.rows.push(GridRow::new_row());
        self.rows.len() - 1
    }

    pub fn remove_row(&mut self, index: usize) -> Result<()> {
        self.check_row(index)?;
        let row = self.rows.remove(index);
        tracing::debug!(index, identity = ?row.identity(), "row removed");
        Ok(())
    }

    /// Remove several display rows at once. All indices are validated before
    /// anything is removed.
    pub fn remove_rows(&mut self, indices: &[usize]) -> Result<usize> {
        for &index in indices {
            self.check_row(index)?;
        }
        let mut sorted: Vec<usize> = indices.to_vec();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        sorted.dedup();
        for &index in &sorted {
            self.rows.remove(index);
        }
        Ok(sorted.len())
    }

    /// Write a cell. Returns whether the displayed value changed.
    ///
    /// On Bound rows a value equal (as a string) to the source value drops the
    /// overlay entry, so reverting an edit is the same as never editing.
    pub fn set_cell(
        &mut self,
        index: usize,
        name: &str,
        value: impl Into<CellValue>,
    ) -> Result<bool> {
        self.check_row(index)?;
        self.ensure_column(name)?;
        let value = value.into();
        let before = self.value(index, name)?.into_owned();
        let source = match self.rows[index].identity() {
            RowIdentity::Bound(src) => {
                Some(self.sources[src].get(name).cloned().unwrap_or_default())
            }
            RowIdentity::New => None,
        };
        let cells = self.rows[index].cells_mut();
        match source {
            Some(original) if original.same_display(&value) => {
                cells.remove(name);
            }
            _ => {
                cells.insert(CompactString::from(name), value.clone());
            }
        }
        let changed = !before.same_display(&value);
        tracing::debug!(index, column = name, changed, "cell set");
        Ok(changed)
    }

    pub fn is_dirty(&self) -> bool {
        self.rows.len() != self.sources.len()
            || self
                .rows
                .iter()
                .enumerate()
                .any(|(i, r)| r.identity() != RowIdentity::Bound(i) || !r.cells().is_empty())
    }

    /// Compute the change set against the last loaded source rows.
    pub fn diff(&self) -> ChangeSet {
        let mut changes = ChangeSet::default();
        let mut referenced = vec![false; self.sources.len()];

        for row in &self.rows {
            match row.identity() {
                RowIdentity::New => {
                    let fields = self.ordered_fields(row, |v| !v.is_empty());
                    if !fields.is_empty() {
                        changes.creates.push(fields);
                    }
                }
                RowIdentity::Bound(src) => {
                    referenced[src] = true;
                    if !row.cells().is_empty() {
                        changes.updates.push(RowUpdate {
                            key: self.sources[src].key.clone(),
                            fields: self.ordered_fields(row, |_| true),
                        });
                    }
                }
            }
        }

        changes.deletes = self
            .sources
            .iter()
            .zip(referenced)
            .filter(|(_, kept)| !kept)
            .map(|(src, _)| src.key.clone())
            .collect();
        changes
    }

    fn ordered_fields(&self, row: &GridRow, keep: impl Fn(&CellValue) -> bool) -> Fields {
        row.cells()
            .iter()
            .filter(|(_, v)| keep(v))
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    /// Make the displayed rows the new baseline after a successful save.
    pub fn commit(&mut self) {
        let records: Vec<Record> = (0..self.rows.len())
            .map(|i| self.merged_record(i))
            .collect();
        self.install(records);
        tracing::debug!(rows = self.rows.len(), "grid model committed");
    }

    fn merged_record(&self, index: usize) -> Record {
        let row = &self.rows[index];
        let mut record = match row.identity() {
            RowIdentity::Bound(src) => self.sources[src].values().clone(),
            RowIdentity::New => Record::default(),
        };
        for (name, value) in row.cells() {
            record.insert(name.clone(), value.clone());
        }
        record
    }

    /// Move columns to `new_order`. Columns not named keep their relative order
    /// after the named ones.
    pub fn reorder_columns(&mut self, new_order: &[&str]) -> Result<()> {
        let names = self.validate_names(new_order)?;
        let mut order = names;
        for header in &self.headers {
            if !order.contains(&header.name) {
                order.push(header.name.clone());
            }
        }
        self.column_order = Some(order);
        self.apply_column_order();
        Ok(())
    }

    pub fn set_pinned(&mut self, names: &[&str]) -> Result<()> {
        self.pinned = self.validate_names(names)?;
        self.sync_header_flags();
        Ok(())
    }

    pub fn set_hidden(&mut self, names: &[&str]) -> Result<()> {
        self.hidden = self.validate_names(names)?.into_iter().collect();
        self.sync_header_flags();
        Ok(())
    }

    fn validate_names(&self, names: &[&str]) -> Result<Vec<CompactString>> {
        let mut out: Vec<CompactString> = Vec::with_capacity(names.len());
        for &name in names {
            self.ensure_column(name)?;
            if out.iter().any(|n| n == name) {
                return Err(GridError::DuplicateColumn(name.to_string()));
            }
            out.push(CompactString::from(name));
        }
        Ok(out)
    }

    /// Header labels followed by every row's display strings, in display order.
    pub fn export_rows(&self, include_hidden: bool) -> Vec<Vec<String>> {
        let columns: Vec<&Header> = if include_hidden {
            self.display_columns()
        } else {
            self.visible_columns()
        };
        let mut out = Vec::with_capacity(self.rows.len() + 1);
        out.push(columns.iter().map(|h| h.text().to_string()).collect());
        for index in 0..self.rows.len() {
            out.push(
                columns
                    .iter()
                    .map(|h| {
                        self.value(index, &h.name)
                            .map(|v| v.display().into_owned())
                            .unwrap_or_default()
                    })
                    .collect(),
            );
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/grid_model.rs"]
mod tests;
