// CSV export of normalized rows

use crate::data::CellValue;
use crate::normalize::NormalizedRow;
use anyhow::{anyhow, Context, Result};
use csv::{QuoteStyle, Terminator, WriterBuilder};

/// A CSV document plus the filename a caller should save it under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub content: Vec<u8>,
}

/// Columns exported for a row set: the source columns of the first row.
/// Reserved columns are already gone after normalization and the derived
/// `name`/`value`/`color` fields are display-only, so neither appear unless
/// the source data itself had such a column.
pub fn export_columns(rows: &[NormalizedRow]) -> Vec<String> {
    rows.first()
        .map(|row| row.fields.keys().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Render rows as CSV: an unquoted header line, then one line per row where
/// numbers are written as-is and text is always double-quoted. Lines are
/// joined by `\n` with no trailing newline.
pub fn to_csv(rows: &[NormalizedRow]) -> Result<Vec<u8>> {
    let columns = export_columns(rows);
    if columns.is_empty() {
        return Ok(Vec::new());
    }

    // Quoting is decided per cell type below, so the writer must not add its own
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(&columns).context("Failed to write CSV header")?;
    for (i, row) in rows.iter().enumerate() {
        let record: Vec<String> = columns
            .iter()
            .map(|col| row.fields.get(col).map(csv_field).unwrap_or_default())
            .collect();
        writer
            .write_record(&record)
            .with_context(|| format!("Failed to write CSV row {}", i))?;
    }

    let mut bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush CSV writer: {}", e.error()))?;
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
    }
    Ok(bytes)
}

fn csv_field(cell: &CellValue) -> String {
    match cell {
        CellValue::Number(_) => cell.to_string(),
        CellValue::Text(s) => format!("\"{}\"", s.replace('"', "\"\"")),
        CellValue::Null => String::new(),
    }
}

/// Lowercase the title and turn whitespace runs into hyphens
pub fn suggested_filename(title: &str) -> String {
    let stem = title
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    if stem.is_empty() {
        "export.csv".to_string()
    } else {
        format!("{}.csv", stem)
    }
}

pub fn export_csv(rows: &[NormalizedRow], title: &str) -> Result<CsvExport> {
    Ok(CsvExport {
        filename: suggested_filename(title),
        content: to_csv(rows)?,
    })
}
