// Chart type dispatch: the one place chart-type-specific behavior branches

use crate::config::ChartType;
use serde::Serialize;
use tracing::warn;

/// Rendering path that receives the engine's output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Adapter {
    Bar,
    Line,
    Pie,
    Scatter,
    Table,
}

impl Adapter {
    /// Bar and line adapters plot every detected numeric series
    pub fn is_multi_series(&self) -> bool {
        matches!(self, Adapter::Bar | Adapter::Line)
    }
}

/// Map a chart type to its adapter; anything unrecognized renders as a table
pub fn select_adapter(chart_type: ChartType) -> Adapter {
    match chart_type {
        ChartType::Bar => Adapter::Bar,
        ChartType::Line | ChartType::Area => Adapter::Line,
        ChartType::Pie => Adapter::Pie,
        ChartType::Scatter => Adapter::Scatter,
        ChartType::Table => Adapter::Table,
        ChartType::Unknown => {
            warn!("unsupported visualization type, falling back to table");
            Adapter::Table
        }
    }
}
