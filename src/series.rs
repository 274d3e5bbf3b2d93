// Multi-series detection for bar/line charts

use crate::data::CellValue;
use crate::normalize::{NormalizedRow, DERIVED_KEYS};
use crate::palette::ColorPalette;
use serde::Serialize;

/// One plotted numeric measure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesDescriptor {
    pub column_key: String,
    pub display_color: String,
}

/// Every numeric column of `sample` other than the category axis and the
/// derived keys, in the sample row's column order.
pub fn detect_numeric_series(sample: &NormalizedRow, x_key: Option<&str>) -> Vec<String> {
    sample
        .fields
        .iter()
        .filter(|(k, v)| v.is_number() && Some(*k) != x_key && !DERIVED_KEYS.contains(k))
        .map(|(k, _)| k.to_string())
        .collect()
}

/// True if the column holds a number in every sampled row that has a
/// non-null value for it, and at least one sampled row does.
pub fn is_numeric_column(rows: &[NormalizedRow], key: &str, sample_size: usize) -> bool {
    let mut seen = false;
    for row in rows.iter().take(sample_size.max(1)) {
        match row.fields.get(key) {
            Some(CellValue::Number(_)) => seen = true,
            Some(CellValue::Null) | None => {}
            Some(CellValue::Text(_)) => return false,
        }
    }
    seen
}

/// Detect series from the first row, keep the ones that stay numeric across
/// the sampled rows, and color them by series position.
pub fn describe_series(
    rows: &[NormalizedRow],
    x_key: Option<&str>,
    palette: &ColorPalette,
    sample_size: usize,
) -> Vec<SeriesDescriptor> {
    let Some(sample) = rows.first() else {
        return Vec::new();
    };

    let keys: Vec<String> = detect_numeric_series(sample, x_key)
        .into_iter()
        .filter(|k| is_numeric_column(rows, k, sample_size))
        .collect();

    palette
        .assign_colors(&keys)
        .into_iter()
        .map(|(key, color)| SeriesDescriptor {
            column_key: key.to_string(),
            display_color: color,
        })
        .collect()
}
