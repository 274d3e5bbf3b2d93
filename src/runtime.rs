// Runtime executor: raw rows + visualization config -> render-ready chart data

use crate::annotation::{compute_annotations_with, AnnotationResult, MaxValueTrend, TrendEstimator};
use crate::config::{EngineOptions, Settings, VisualizationConfig};
use crate::data::Row;
use crate::dispatch::{select_adapter, Adapter};
use crate::export::{export_csv, CsvExport};
use crate::key::resolve_column;
use crate::normalize::{normalize_rows, NormalizedRow};
use crate::series::{describe_series, SeriesDescriptor};
use anyhow::Result;
use serde::Serialize;
use tracing::debug;

/// Degraded states the surrounding UI shows as an inert message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Notice {
    NoData,
    UnsupportedType,
}

/// Everything a rendering adapter needs, independent of any chart library
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub adapter: Adapter,
    pub x_key: Option<String>,
    pub y_key: Option<String>,
    pub rows: Vec<NormalizedRow>,
    pub series: Vec<SeriesDescriptor>,
    pub annotations: Vec<AnnotationResult>,
    pub settings: Settings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// CSV projection of the normalized rows
    pub fn export(&self, title: &str) -> Result<CsvExport> {
        export_csv(&self.rows, title)
    }
}

/// Run the whole pipeline with the placeholder trend estimator
pub fn prepare_chart(rows: &[Row], config: &VisualizationConfig, options: &EngineOptions) -> ChartData {
    prepare_chart_with(rows, config, options, &MaxValueTrend)
}

/// Run the whole pipeline. Never fails: missing axes, empty data and bad
/// annotations all degrade to defined fallbacks.
pub fn prepare_chart_with(
    rows: &[Row],
    config: &VisualizationConfig,
    options: &EngineOptions,
    trend: &dyn TrendEstimator,
) -> ChartData {
    // 1. Resolve axis references against the data's columns
    let sample = rows.first();
    let x_key = resolve_column(config.axes.x.as_deref(), sample);
    let y_key = resolve_column(config.axes.y.as_deref(), sample);
    debug!(?x_key, ?y_key, rows = rows.len(), "resolved axes");

    // 2. Normalize rows
    let normalized = normalize_rows(rows, x_key.as_deref(), y_key.as_deref(), options);

    // 3. Pick the adapter
    let adapter = select_adapter(config.chart_type);

    // 4. Series (multi-series adapters only)
    let series = if adapter.is_multi_series() {
        describe_series(&normalized, x_key.as_deref(), &options.palette, options.series_sample_size)
    } else {
        Vec::new()
    };

    // 5. Annotations
    let annotations = compute_annotations_with(&normalized, &config.annotations, y_key.as_deref(), trend);

    let notice = if !config.chart_type.is_recognized() {
        Some(Notice::UnsupportedType)
    } else if normalized.is_empty() {
        Some(Notice::NoData)
    } else {
        None
    };

    ChartData {
        adapter,
        x_key,
        y_key,
        rows: normalized,
        series,
        annotations,
        settings: config.settings.clone(),
        notice,
    }
}
