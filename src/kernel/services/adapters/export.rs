//! Delimited text export of grid rows.

use std::io::Write;
use std::path::Path;

use crate::kernel::services::ports::Delimiter;

/// Write `rows` (header row first) to `out`.
pub fn write_rows<W: Write>(rows: &[Vec<String>], delimiter: Delimiter, out: W) -> csv::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter.as_byte())
        .from_writer(out);
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export_to_path(rows: &[Vec<String>], delimiter: Delimiter, path: &Path) -> csv::Result<()> {
    let file = std::fs::File::create(path)?;
    write_rows(rows, delimiter, file)?;
    tracing::info!(path = %path.display(), rows = rows.len().saturating_sub(1), "grid exported");
    Ok(())
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/export.rs"]
mod tests;
