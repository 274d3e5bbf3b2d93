// Visualization suggestions for a natural-language question and its SQL

use crate::annotation::AnnotationSpec;
use crate::config::{Axes, ChartType, Interpolation, Settings, VisualizationConfig};
use crate::parser::select_items;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

/// Candidate visualizations, table first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualizationOptions {
    pub options: Vec<VisualizationConfig>,
}

const TIME_WORDS: [&str; 3] = ["date", "time", "timestamp"];
const TREND_PHRASES: [&[&str]; 4] = [&["trend"], &["over", "time"], &["evolution"], &["growth"]];
const DISTRIBUTION_WORDS: [&str; 5] = ["distribution", "breakdown", "proportion", "percentage", "ratio"];
const COMPARISON_WORDS: [&str; 5] = ["compare", "versus", "vs", "difference", "between"];
const CORRELATION_WORDS: [&str; 4] = ["correlation", "relationship", "scatter", "plot"];

const X_AXIS_TERMS: [&str; 4] = ["date", "time", "year", "month"];
const Y_AXIS_TERMS: [&str; 5] = ["count", "sum", "avg", "amount", "total"];
const GROUP_TERMS: [&str; 4] = ["category", "type", "status", "group"];

/// Suggest every visualization that fits the question. A table is always
/// offered; chart types follow in a fixed order.
pub fn suggest_visualizations(question: &str, sql: &str) -> VisualizationOptions {
    let words = tokenize(question);
    let mut options = vec![table_config()];

    let intents = [
        (is_time_series(&words), ChartType::Line),
        (contains_any(&words, &DISTRIBUTION_WORDS), ChartType::Pie),
        (contains_any(&words, &COMPARISON_WORDS), ChartType::Bar),
        (contains_any(&words, &CORRELATION_WORDS), ChartType::Scatter),
    ];

    for (matched, chart_type) in intents {
        if !matched {
            continue;
        }
        let mut config = VisualizationConfig::new(chart_type);
        config.settings = default_settings(chart_type);
        config.axes = detect_axes(sql);
        config.annotations = default_annotations(chart_type, &words);
        debug!(?chart_type, "added visualization option");
        options.push(config);
    }

    VisualizationOptions { options }
}

/// Classify select items into x / y / group roles by name. Later items win.
pub fn detect_axes(sql: &str) -> Axes {
    let mut axes = Axes::default();
    for item in select_items(sql) {
        let lower = item.to_lowercase();
        if X_AXIS_TERMS.iter().any(|t| lower.contains(t)) {
            axes.x = Some(item);
        } else if Y_AXIS_TERMS.iter().any(|t| lower.contains(t)) {
            axes.y = Some(item);
        } else if GROUP_TERMS.iter().any(|t| lower.contains(t)) {
            axes.group = Some(item);
        }
    }
    axes
}

fn table_config() -> VisualizationConfig {
    let mut config = VisualizationConfig::new(ChartType::Table);
    for flag in ["pagination", "sortable", "searchable"] {
        config.settings.set_flag(flag, true);
    }
    config
}

fn default_settings(chart_type: ChartType) -> Settings {
    let mut settings = Settings::default();
    let flags: &[(&str, bool)] = match chart_type {
        ChartType::Line => &[("showPoints", true), ("grid", true), ("animations", true)],
        ChartType::Pie => &[("donut", true), ("showLabels", true), ("showLegend", true), ("gradients", true)],
        ChartType::Bar => &[("grouped", true), ("horizontal", false), ("showValues", true), ("animations", true)],
        ChartType::Scatter => &[("showTrendline", true), ("showPoints", true), ("regressionLine", true)],
        _ => &[],
    };
    for (name, value) in flags {
        settings.set_flag(name, *value);
    }
    if chart_type == ChartType::Line {
        settings.interpolation = Interpolation::Monotone;
    }
    settings
}

fn default_annotations(chart_type: ChartType, words: &[String]) -> Vec<AnnotationSpec> {
    let mut specs = Vec::new();
    match chart_type {
        ChartType::Line => specs.push(AnnotationSpec::from(json!({
            "type": "line",
            "mode": "trend",
            "style": {"stroke": "rgba(255, 0, 0, 0.5)", "strokeWidth": 2, "strokeDasharray": "5,5"}
        }))),
        ChartType::Bar => specs.push(AnnotationSpec::from(json!({
            "type": "line",
            "mode": "average",
            "label": "Average",
            "style": {"stroke": "#666", "strokeWidth": 1}
        }))),
        ChartType::Scatter => specs.push(AnnotationSpec::from(json!({
            "type": "line",
            "mode": "regression",
            "label": "Regression Line",
            "style": {"stroke": "rgba(0, 0, 255, 0.5)", "strokeWidth": 2, "strokeDasharray": "3,3"}
        }))),
        _ => {}
    }

    // Threshold detection is not implemented; the region is a placeholder
    if words.iter().any(|w| w == "threshold") {
        specs.push(AnnotationSpec::from(json!({
            "type": "region",
            "start": 0,
            "style": {"fill": "rgba(255, 0, 0, 0.1)"}
        })));
    }
    specs
}

/// Lowercased alphanumeric words
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn contains_any(words: &[String], candidates: &[&str]) -> bool {
    words.iter().any(|w| candidates.contains(&w.as_str()))
}

/// A time word followed, somewhere later, by a trend phrase
fn is_time_series(words: &[String]) -> bool {
    let Some(first_time) = words.iter().position(|w| TIME_WORDS.contains(&w.as_str())) else {
        return false;
    };
    (first_time + 1..words.len()).any(|start| {
        TREND_PHRASES.iter().any(|phrase| {
            words.len() >= start + phrase.len()
                && words[start..start + phrase.len()].iter().zip(phrase.iter()).all(|(w, p)| w == p)
        })
    })
}
