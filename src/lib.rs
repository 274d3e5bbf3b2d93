// Library exports for querychart

pub mod annotation;
pub mod config;
pub mod data;
pub mod dispatch;
pub mod export;
pub mod key;
pub mod normalize;
pub mod palette;
pub mod parser;
pub mod response;
pub mod runtime;
pub mod series;
pub mod suggest;

pub use annotation::{compute_annotations, AnnotationResult, AnnotationSpec, TrendEstimator};
pub use config::{ChartType, EngineOptions, VisualizationConfig};
pub use data::{CellValue, Row, RowSet};
pub use dispatch::{select_adapter, Adapter};
pub use export::{export_csv, suggested_filename, to_csv, CsvExport};
pub use key::normalize_key;
pub use normalize::{normalize_for_config, normalize_rows, NormalizedRow};
pub use palette::ColorPalette;
pub use response::QueryResponse;
pub use runtime::{prepare_chart, ChartData, Notice};
pub use series::{detect_numeric_series, SeriesDescriptor};
pub use suggest::suggest_visualizations;
