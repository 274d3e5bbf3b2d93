// Visualization configuration and engine options

use crate::annotation::AnnotationSpec;
use crate::palette::ColorPalette;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

/// Field deserializer that never fails: null or a value of the wrong shape
/// falls back to the field's default.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(value).unwrap_or_else(|err| {
        debug!(%err, "ignoring malformed config field");
        T::default()
    }))
}

/// Chart type requested by a visualization config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Line,
    Area,
    Pie,
    Scatter,
    #[default]
    Table,
    #[serde(other)]
    Unknown,
}

impl ChartType {
    pub fn is_recognized(&self) -> bool {
        !matches!(self, ChartType::Unknown)
    }
}

/// Raw axis references. Values may still carry sort suffixes or aliases.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Axes {
    #[serde(deserialize_with = "lenient")]
    pub x: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub y: Option<String>,
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    #[default]
    Monotone,
    Step,
    Basis,
    Natural,
    Cardinal,
    // Unrecognized curve names render as straight segments
    #[serde(other)]
    Linear,
}

/// Open option set. The typed fields are the ones the engine and adapters
/// interpret; everything else is carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    #[serde(deserialize_with = "lenient")]
    pub donut: bool,
    #[serde(deserialize_with = "lenient")]
    pub show_points: bool,
    #[serde(deserialize_with = "lenient")]
    pub interpolation: Interpolation,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Settings {
    /// Read a boolean option, typed or not. Missing or non-boolean is false.
    pub fn flag(&self, name: &str) -> bool {
        match name {
            "donut" => self.donut,
            "showPoints" => self.show_points,
            _ => self.extra.get(name).and_then(Value::as_bool).unwrap_or(false),
        }
    }

    pub fn set_flag(&mut self, name: &str, value: bool) {
        match name {
            "donut" => self.donut = value,
            "showPoints" => self.show_points = value,
            _ => {
                self.extra.insert(name.to_string(), Value::Bool(value));
            }
        }
    }
}

/// Declarative description of one chart. Supplied whole per render and never
/// mutated by the engine.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct VisualizationConfig {
    #[serde(rename = "type", deserialize_with = "lenient")]
    pub chart_type: ChartType,
    #[serde(deserialize_with = "lenient")]
    pub axes: Axes,
    #[serde(deserialize_with = "lenient")]
    pub settings: Settings,
    #[serde(deserialize_with = "lenient")]
    pub annotations: Vec<AnnotationSpec>,
}

impl VisualizationConfig {
    pub fn new(chart_type: ChartType) -> Self {
        Self {
            chart_type,
            ..Default::default()
        }
    }

    pub fn with_axes(mut self, x: Option<&str>, y: Option<&str>) -> Self {
        self.axes.x = x.map(str::to_string);
        self.axes.y = y.map(str::to_string);
        self
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).context("Failed to parse visualization config")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json_str(&content)
    }
}

/// Engine-wide knobs, passed explicitly instead of living in globals
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    pub palette: ColorPalette,
    /// Decimal places numeric fields are rounded to
    pub precision: u32,
    /// Columns starting with this prefix are internal and never displayed
    pub reserved_prefix: String,
    /// Rows inspected when deciding whether a column is numeric
    pub series_sample_size: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            palette: ColorPalette::default(),
            precision: 2,
            reserved_prefix: "_".to_string(),
            series_sample_size: 1,
        }
    }
}

impl EngineOptions {
    pub fn with_palette(mut self, palette: ColorPalette) -> Self {
        self.palette = palette;
        self
    }

    pub fn is_reserved(&self, key: &str) -> bool {
        !self.reserved_prefix.is_empty() && key.starts_with(&self.reserved_prefix)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read options file {}", path.display()))?;
        let mut options: Self = serde_json::from_str(&content).context("Failed to parse engine options")?;
        if options.palette.is_empty() {
            options.palette = ColorPalette::default();
        }
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = VisualizationConfig::from_json_str(
            r#"{
                "type": "line",
                "axes": {"x": "month", "y": "revenue DESC"},
                "settings": {"showPoints": true, "interpolation": "step", "grid": true},
                "annotations": [{"type": "line", "mode": "average"}]
            }"#,
        )
        .unwrap();
        assert_eq!(config.chart_type, ChartType::Line);
        assert_eq!(config.axes.y.as_deref(), Some("revenue DESC"));
        assert!(config.settings.show_points);
        assert_eq!(config.settings.interpolation, Interpolation::Step);
        assert!(config.settings.flag("grid"));
        assert_eq!(config.annotations.len(), 1);
    }

    #[test]
    fn test_missing_fields_default() {
        let config = VisualizationConfig::from_json_str("{}").unwrap();
        assert_eq!(config.chart_type, ChartType::Table);
        assert_eq!(config.axes, Axes::default());
        assert!(config.annotations.is_empty());
    }

    #[test]
    fn test_unknown_type_is_captured() {
        let config = VisualizationConfig::from_json_str(r#"{"type": "heatmap"}"#).unwrap();
        assert_eq!(config.chart_type, ChartType::Unknown);
        assert!(!config.chart_type.is_recognized());
    }

    #[test]
    fn test_unknown_interpolation_is_linear() {
        let settings: Settings = serde_json::from_str(r#"{"interpolation": "wiggly"}"#).unwrap();
        assert_eq!(settings.interpolation, Interpolation::Linear);
    }

    #[test]
    fn test_null_axes() {
        let config = VisualizationConfig::from_json_str(r#"{"type": "bar", "axes": {"x": null, "y": "total"}}"#).unwrap();
        assert_eq!(config.axes.x, None);
        assert_eq!(config.axes.y.as_deref(), Some("total"));
    }

    #[test]
    fn test_null_sections_default() {
        let config = VisualizationConfig::from_json_str(
            r#"{"type": "bar", "axes": null, "settings": null, "annotations": null}"#,
        )
        .unwrap();
        assert_eq!(config.chart_type, ChartType::Bar);
        assert_eq!(config.axes, Axes::default());
        assert_eq!(config.settings, Settings::default());
        assert!(config.annotations.is_empty());
    }

    #[test]
    fn test_null_type_is_table() {
        let config = VisualizationConfig::from_json_str(r#"{"type": null, "axes": {"x": "a"}}"#).unwrap();
        assert_eq!(config.chart_type, ChartType::Table);
        assert_eq!(config.axes.x.as_deref(), Some("a"));
    }

    #[test]
    fn test_wrong_types_default() {
        let config = VisualizationConfig::from_json_str(
            r#"{
                "type": 3,
                "axes": {"x": 5, "y": "total"},
                "settings": {"donut": "yes", "showPoints": true, "interpolation": 1, "grid": "maybe"},
                "annotations": {"type": "line"}
            }"#,
        )
        .unwrap();
        assert_eq!(config.chart_type, ChartType::Table);
        assert_eq!(config.axes.x, None);
        assert_eq!(config.axes.y.as_deref(), Some("total"));
        assert!(!config.settings.donut);
        assert!(config.settings.show_points);
        assert_eq!(config.settings.interpolation, Interpolation::Monotone);
        assert!(!config.settings.flag("grid"));
        assert!(config.annotations.is_empty());
    }

    #[test]
    fn test_settings_wrong_shape_defaults() {
        let config = VisualizationConfig::from_json_str(r#"{"type": "pie", "settings": [1, 2]}"#).unwrap();
        assert_eq!(config.chart_type, ChartType::Pie);
        assert_eq!(config.settings, Settings::default());
    }

    #[test]
    fn test_engine_options_defaults() {
        let options: EngineOptions = serde_json::from_str(r#"{"precision": 3}"#).unwrap();
        assert_eq!(options.precision, 3);
        assert_eq!(options.reserved_prefix, "_");
        assert!(options.is_reserved("_rowid"));
        assert!(!options.is_reserved("rowid"));
    }
}
