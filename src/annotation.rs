// Annotation engine: reference lines and points overlaid on a chart

use crate::data::CellValue;
use crate::normalize::NormalizedRow;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Map, Value};
use tracing::debug;

/// Visual style of an annotation. Field names follow SVG attribute naming so
/// adapters can pass them straight through.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnnotationStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_dasharray: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    /// Marker radius for point annotations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r: Option<f64>,
}

impl AnnotationStyle {
    /// Fill every unset field from `defaults`
    pub fn or(self, defaults: AnnotationStyle) -> AnnotationStyle {
        AnnotationStyle {
            stroke: self.stroke.or(defaults.stroke),
            stroke_width: self.stroke_width.or(defaults.stroke_width),
            stroke_dasharray: self.stroke_dasharray.or(defaults.stroke_dasharray),
            fill: self.fill.or(defaults.fill),
            r: self.r.or(defaults.r),
        }
    }

    fn line(stroke: &str, dash: &str) -> Self {
        AnnotationStyle {
            stroke: Some(stroke.to_string()),
            stroke_width: Some(1.0),
            stroke_dasharray: Some(dash.to_string()),
            ..Default::default()
        }
    }

    fn marker() -> Self {
        AnnotationStyle {
            stroke: Some("none".to_string()),
            fill: Some("#ff4d4f".to_string()),
            r: Some(5.0),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationKind {
    /// Horizontal line at the mean of the y column
    Average,
    /// Horizontal line from the trend estimator
    Trend { regression: bool },
    /// Horizontal line at a literal value
    ReferenceLine { y: f64 },
    /// Point at a literal coordinate; skipped unless both are present
    ReferencePoint { x: Option<CellValue>, y: Option<f64> },
    /// Anything else; carries the declared type for logging
    Unrecognized(String),
}

/// One declarative annotation from a visualization config.
///
/// Deserializes from any JSON value: shapes the engine does not understand
/// are kept as `Unrecognized` and skipped at evaluation time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct AnnotationSpec {
    pub kind: AnnotationKind,
    pub label: Option<String>,
    pub style: AnnotationStyle,
    raw: Value,
}

impl AnnotationSpec {
    pub fn new(kind: AnnotationKind) -> Self {
        Self {
            kind,
            label: None,
            style: AnnotationStyle::default(),
            raw: Value::Null,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn with_style(mut self, style: AnnotationStyle) -> Self {
        self.style = style;
        self
    }
}

impl From<Value> for AnnotationSpec {
    fn from(raw: Value) -> Self {
        let kind = parse_kind(&raw);
        let label = raw.get("label").and_then(Value::as_str).map(str::to_string);
        let style = match raw.get("style") {
            Some(style) => serde_json::from_value(style.clone()).unwrap_or_else(|err| {
                debug!(%err, "ignoring malformed annotation style");
                AnnotationStyle::default()
            }),
            None => AnnotationStyle::default(),
        };

        Self { kind, label, style, raw }
    }
}

impl AnnotationSpec {
    /// JSON form of the spec. Keys the engine does not interpret are kept
    /// from the parsed input; the typed fields always win.
    pub fn to_json(&self) -> Value {
        let mut obj = match (&self.raw, &self.kind) {
            (Value::Object(obj), _) => obj.clone(),
            (raw, AnnotationKind::Unrecognized(_)) if !raw.is_null() => return raw.clone(),
            _ => Map::new(),
        };

        match &self.kind {
            AnnotationKind::Average => set_line_mode(&mut obj, "average"),
            AnnotationKind::Trend { regression: false } => set_line_mode(&mut obj, "trend"),
            AnnotationKind::Trend { regression: true } => set_line_mode(&mut obj, "regression"),
            AnnotationKind::ReferenceLine { y } => {
                obj.insert("type".to_string(), json!("line"));
                obj.remove("mode");
                obj.insert("y".to_string(), json!(y));
            }
            AnnotationKind::ReferencePoint { x, y } => {
                obj.insert("type".to_string(), json!("dot"));
                match x {
                    Some(x) => obj.insert("x".to_string(), x.to_json()),
                    None => obj.remove("x"),
                };
                match y {
                    Some(y) => obj.insert("y".to_string(), json!(y)),
                    None => obj.remove("y"),
                };
            }
            AnnotationKind::Unrecognized(declared) => {
                if !declared.is_empty() {
                    obj.entry("type").or_insert_with(|| json!(declared));
                }
            }
        }

        match &self.label {
            Some(label) => obj.insert("label".to_string(), json!(label)),
            None => obj.remove("label"),
        };
        if self.style != AnnotationStyle::default() {
            if let Ok(style) = serde_json::to_value(&self.style) {
                obj.insert("style".to_string(), style);
            }
        }

        Value::Object(obj)
    }
}

fn set_line_mode(obj: &mut Map<String, Value>, mode: &str) {
    obj.insert("type".to_string(), json!("line"));
    obj.insert("mode".to_string(), json!(mode));
}

impl Serialize for AnnotationSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

fn parse_kind(raw: &Value) -> AnnotationKind {
    let declared = raw.get("type").and_then(Value::as_str).unwrap_or("");
    match declared {
        "line" => {
            let mode = raw.get("mode").and_then(Value::as_str);
            match mode {
                Some("average") => AnnotationKind::Average,
                Some("trend") => AnnotationKind::Trend { regression: false },
                Some("regression") => AnnotationKind::Trend { regression: true },
                _ => match raw.get("y").and_then(Value::as_f64) {
                    Some(y) => AnnotationKind::ReferenceLine { y },
                    None => AnnotationKind::Unrecognized(format!("line/{}", mode.unwrap_or("?"))),
                },
            }
        }
        "dot" => AnnotationKind::ReferencePoint {
            x: raw.get("x").map(CellValue::from_json).filter(|x| !x.is_null()),
            y: raw.get("y").and_then(Value::as_f64),
        },
        other => AnnotationKind::Unrecognized(other.to_string()),
    }
}

/// Renderer-agnostic annotation output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AnnotationResult {
    HorizontalLine {
        value: f64,
        label: Option<String>,
        style: AnnotationStyle,
    },
    Point {
        x: CellValue,
        y: f64,
        label: Option<String>,
        style: AnnotationStyle,
    },
}

/// Computes the y position of a trend annotation.
///
/// The default implementation is a placeholder; a fitted regression can be
/// plugged in through `compute_annotations_with`.
pub trait TrendEstimator {
    fn estimate(&self, rows: &[NormalizedRow], y_key: Option<&str>) -> f64;
}

/// Draws the "trend" at the largest observed y value. Missing or non-numeric
/// values count as 0; no rows gives 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxValueTrend;

impl TrendEstimator for MaxValueTrend {
    fn estimate(&self, rows: &[NormalizedRow], y_key: Option<&str>) -> f64 {
        rows.iter()
            .map(|row| y_of(row, y_key))
            .reduce(f64::max)
            .unwrap_or(0.0)
    }
}

/// Mean of the y column over all rows; missing values count as 0 and an empty
/// row set averages to 0.
pub fn average(rows: &[NormalizedRow], y_key: Option<&str>) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    let sum: f64 = rows.iter().map(|row| y_of(row, y_key)).sum();
    sum / rows.len() as f64
}

fn y_of(row: &NormalizedRow, y_key: Option<&str>) -> f64 {
    y_key
        .and_then(|k| row.number(k))
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

/// Evaluate every spec in order with the default trend estimator
pub fn compute_annotations(
    rows: &[NormalizedRow],
    specs: &[AnnotationSpec],
    y_key: Option<&str>,
) -> Vec<AnnotationResult> {
    compute_annotations_with(rows, specs, y_key, &MaxValueTrend)
}

/// Evaluate every spec in order. Duplicates produce duplicate results;
/// incomplete or unrecognized specs produce nothing.
pub fn compute_annotations_with(
    rows: &[NormalizedRow],
    specs: &[AnnotationSpec],
    y_key: Option<&str>,
    trend: &dyn TrendEstimator,
) -> Vec<AnnotationResult> {
    specs
        .iter()
        .filter_map(|spec| evaluate(rows, spec, y_key, trend))
        .collect()
}

fn evaluate(
    rows: &[NormalizedRow],
    spec: &AnnotationSpec,
    y_key: Option<&str>,
    trend: &dyn TrendEstimator,
) -> Option<AnnotationResult> {
    let style = spec.style.clone();
    match &spec.kind {
        AnnotationKind::Average => Some(AnnotationResult::HorizontalLine {
            value: average(rows, y_key),
            label: Some(spec.label.clone().unwrap_or_else(|| "Average".to_string())),
            style: style.or(AnnotationStyle::line("#666", "3 3")),
        }),
        AnnotationKind::Trend { regression } => {
            let default_label = if *regression { "Regression" } else { "Trend" };
            Some(AnnotationResult::HorizontalLine {
                value: trend.estimate(rows, y_key),
                label: Some(spec.label.clone().unwrap_or_else(|| default_label.to_string())),
                style: style.or(AnnotationStyle::line("#ff7300", "5 5")),
            })
        }
        AnnotationKind::ReferenceLine { y } => Some(AnnotationResult::HorizontalLine {
            value: *y,
            label: spec.label.clone(),
            style: style.or(AnnotationStyle::line("#ff4d4f", "4 4")),
        }),
        AnnotationKind::ReferencePoint { x: Some(x), y: Some(y) } => Some(AnnotationResult::Point {
            x: x.clone(),
            y: *y,
            label: spec.label.clone(),
            style: style.or(AnnotationStyle::marker()),
        }),
        AnnotationKind::ReferencePoint { .. } => {
            debug!("skipping dot annotation without both coordinates");
            None
        }
        AnnotationKind::Unrecognized(declared) => {
            debug!(annotation = %declared, "skipping unrecognized annotation");
            None
        }
    }
}
