// Query-service envelope: the JSON the chat backend returns for one question

use crate::config::{lenient, EngineOptions, VisualizationConfig};
use crate::data::RowSet;
use crate::runtime::{prepare_chart, ChartData};
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QueryResponse {
    #[serde(deserialize_with = "lenient")]
    pub sql_query: Option<String>,
    pub results: Value,
    #[serde(deserialize_with = "lenient")]
    pub visualization: Option<VisualizationConfig>,
    #[serde(deserialize_with = "lenient")]
    pub context_id: Option<String>,
}

impl QueryResponse {
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).context("Failed to parse query response")
    }

    pub fn rows(&self) -> Result<RowSet> {
        RowSet::from_json(&self.results).context("Invalid `results` in query response")
    }

    /// Feed `results` and `visualization` into the engine. A response without
    /// a visualization renders as a table.
    pub fn prepare(&self, options: &EngineOptions) -> Result<ChartData> {
        self.prepare_with(None, options)
    }

    /// Like `prepare`, but `config` replaces the response's own visualization
    pub fn prepare_with(&self, config: Option<&VisualizationConfig>, options: &EngineOptions) -> Result<ChartData> {
        let rows = self.rows()?;
        let config = config
            .or(self.visualization.as_ref())
            .cloned()
            .unwrap_or_default();
        info!(
            context_id = self.context_id.as_deref().unwrap_or("-"),
            rows = rows.len(),
            chart_type = ?config.chart_type,
            "preparing chart"
        );
        Ok(prepare_chart(&rows.rows, &config, options))
    }
}

/// True if a JSON document looks like a query-service envelope rather than a
/// bare row array
pub fn is_envelope(value: &Value) -> bool {
    value
        .as_object()
        .map(|obj| obj.contains_key("results") || obj.contains_key("visualization"))
        .unwrap_or(false)
}
