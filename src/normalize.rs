// Row normalization: copy, round, filter internal fields, derive display fields

use crate::config::{EngineOptions, VisualizationConfig};
use crate::data::{CellValue, Row};
use crate::key::resolve_column;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Keys the normalizer derives. Any source column with one of these names is
/// shadowed by the derived value when rendering.
pub const DERIVED_KEYS: [&str; 3] = ["color", "name", "value"];

/// Conventional single-column label fields, tried in order
const LABEL_FIELDS: [&str; 5] = ["employeeName", "employee_name", "name", "label", "id"];

/// First/last name column pairs combined into one label
const NAME_PAIRS: [(&str, &str); 2] = [("firstName", "lastName"), ("first_name", "last_name")];

/// A row ready for rendering.
///
/// `fields` holds the source columns after rounding and with reserved columns
/// removed. `name`, `value` and `color` are derived per row.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    pub fields: Row,
    pub name: String,
    pub value: f64,
    pub color: String,
}

impl NormalizedRow {
    /// Look up a column as the renderer sees it: derived keys win over
    /// source columns of the same name.
    pub fn get(&self, key: &str) -> Option<CellValue> {
        match key {
            "name" => Some(CellValue::Text(self.name.clone())),
            "value" => Some(CellValue::Number(self.value)),
            "color" => Some(CellValue::Text(self.color.clone())),
            _ => self.fields.get(key).cloned(),
        }
    }

    /// Numeric value of a column, if it holds a number
    pub fn number(&self, key: &str) -> Option<f64> {
        match key {
            "value" => Some(self.value),
            "name" | "color" => None,
            _ => self.fields.get(key).and_then(CellValue::as_number),
        }
    }
}

impl Serialize for NormalizedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (k, v) in self.fields.iter().filter(|(k, _)| !DERIVED_KEYS.contains(k)) {
            map.serialize_entry(k, v)?;
        }
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("value", &self.value)?;
        map.serialize_entry("color", &self.color)?;
        map.end()
    }
}

/// Round to `places` decimals, half away from zero. Non-finite values are
/// returned unchanged.
pub fn round_to(value: f64, places: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(places as i32);
    let scaled = value * factor;
    // Nudge a few ULPs so decimals like 150.005 (stored as 150.00499..) round up
    let nudged = scaled + scaled.signum() * scaled.abs() * f64::EPSILON * 4.0;
    let rounded = nudged.round() / factor;
    if rounded.is_finite() {
        rounded
    } else {
        value
    }
}

/// Normalize every row. Output has the same length and order as the input,
/// and colors depend only on row position.
pub fn normalize_rows(
    rows: &[Row],
    x_key: Option<&str>,
    y_key: Option<&str>,
    options: &EngineOptions,
) -> Vec<NormalizedRow> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| normalize_row(i, row, x_key, y_key, options))
        .collect()
}

/// Normalize rows using a config's axes, resolved against the first row
pub fn normalize_for_config(
    rows: &[Row],
    config: &VisualizationConfig,
    options: &EngineOptions,
) -> Vec<NormalizedRow> {
    let sample = rows.first();
    let x_key = resolve_column(config.axes.x.as_deref(), sample);
    let y_key = resolve_column(config.axes.y.as_deref(), sample);
    normalize_rows(rows, x_key.as_deref(), y_key.as_deref(), options)
}

fn normalize_row(
    index: usize,
    row: &Row,
    x_key: Option<&str>,
    y_key: Option<&str>,
    options: &EngineOptions,
) -> NormalizedRow {
    let fields: Row = row
        .iter()
        .filter(|(k, _)| !options.is_reserved(k))
        .map(|(k, v)| {
            let cell = match v {
                CellValue::Number(n) => CellValue::Number(round_to(*n, options.precision)),
                other => other.clone(),
            };
            (k.to_string(), cell)
        })
        .collect();

    let name = resolve_name(&fields, x_key, index);
    let value = resolve_value(&fields, y_key);

    NormalizedRow {
        fields,
        name,
        value,
        color: options.palette.color_at(index).to_string(),
    }
}

/// Label chain: x-axis column, first/last name pair, conventional label
/// fields, then a placeholder.
fn resolve_name(fields: &Row, x_key: Option<&str>, index: usize) -> String {
    if let Some(label) = x_key.and_then(|k| fields.get(k)).and_then(label_of) {
        return label;
    }

    for (first, last) in NAME_PAIRS {
        let first = fields.get(first).and_then(label_of);
        let last = fields.get(last).and_then(label_of);
        if let (Some(first), Some(last)) = (first, last) {
            return format!("{} {}", first, last);
        }
    }

    if let Some(label) = LABEL_FIELDS.iter().find_map(|k| fields.get(k).and_then(label_of)) {
        return label;
    }

    match x_key {
        Some(_) => "N/A".to_string(),
        None => format!("Category {}", index + 1),
    }
}

fn label_of(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Text(s) if !s.trim().is_empty() => Some(s.clone()),
        CellValue::Number(n) if n.is_finite() => Some(cell.to_string()),
        _ => None,
    }
}

/// Single scalar: y-axis column, then `value`, then `percentage`, then 0
fn resolve_value(fields: &Row, y_key: Option<&str>) -> f64 {
    y_key
        .into_iter()
        .chain(["value", "percentage"])
        .find_map(|k| fields.get(k).and_then(CellValue::as_number).filter(|n| n.is_finite()))
        .unwrap_or(0.0)
}
