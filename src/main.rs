use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use querychart::response::is_envelope;
use querychart::{
    prepare_chart, suggest_visualizations, EngineOptions, QueryResponse, RowSet, VisualizationConfig,
};
use serde::Serialize;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InputFormat {
    Json,
    Csv,
}

/// Parsed input: bare rows, or a full query-service response
enum Source {
    Rows(RowSet),
    Response(QueryResponse),
}

#[derive(Parser, Debug)]
#[command(name = "querychart")]
#[command(about = "Turn query results and a visualization config into render-ready chart data", long_about = None)]
struct Args {
    /// Input file: a JSON row array, a query-service response, or CSV. Reads stdin if omitted
    input: Option<PathBuf>,

    /// Format of the input rows
    #[arg(long, value_enum, default_value_t = InputFormat::Json)]
    format: InputFormat,

    /// Visualization config JSON (overrides the one in a query-service response)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Engine options JSON (palette, precision, reserved prefix)
    #[arg(long)]
    options: Option<PathBuf>,

    /// Write the CSV export for this title instead of chart data
    #[arg(long, value_name = "TITLE")]
    export: Option<String>,

    /// Print visualization suggestions for this question instead of chart data
    #[arg(long, value_name = "QUESTION")]
    suggest: Option<String>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "querychart=info".into()))
        .init();

    let args = Args::parse();

    let input = read_input(args.input.as_ref()).context("Failed to read input")?;
    let options = match &args.options {
        Some(path) => EngineOptions::from_file(path)?,
        None => EngineOptions::default(),
    };
    let override_config = args
        .config
        .as_ref()
        .map(|path| VisualizationConfig::from_file(path))
        .transpose()?;

    let source = match args.format {
        InputFormat::Csv => {
            Source::Rows(RowSet::from_csv_reader(input.as_bytes()).context("Failed to parse CSV input")?)
        }
        InputFormat::Json => {
            let value: serde_json::Value = serde_json::from_str(&input).context("Input is not valid JSON")?;
            if is_envelope(&value) {
                Source::Response(serde_json::from_value(value).context("Failed to parse query response")?)
            } else {
                Source::Rows(RowSet::from_json(&value)?)
            }
        }
    };

    if let Some(question) = &args.suggest {
        let sql = match &source {
            Source::Response(response) => response.sql_query.as_deref(),
            Source::Rows(_) => None,
        };
        let suggestions = suggest_visualizations(question, sql.unwrap_or(""));
        return write_json(&suggestions, args.pretty);
    }

    let chart = match &source {
        Source::Response(response) => response.prepare_with(override_config.as_ref(), &options)?,
        Source::Rows(rows) => prepare_chart(&rows.rows, &override_config.unwrap_or_default(), &options),
    };

    if let Some(title) = &args.export {
        let export = chart.export(title).context("Failed to export CSV")?;
        info!(filename = %export.filename, rows = chart.rows.len(), "exported CSV");
        return write_stdout(&export.content);
    }

    write_json(&chart, args.pretty)
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).context("Failed to read stdin")?;
            Ok(buffer)
        }
    }
}

fn write_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let mut bytes = if pretty {
        serde_json::to_vec_pretty(value)
    } else {
        serde_json::to_vec(value)
    }
    .context("Failed to serialize output")?;
    bytes.push(b'\n');
    write_stdout(&bytes)
}

fn write_stdout(bytes: &[u8]) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(bytes).context("Failed to write to stdout")?;
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}
