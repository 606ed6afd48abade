mod load;
mod parse;
mod record;

use thiserror::Error;

pub use load::load_dataset;
pub use record::{CountryRecord, Dataset, METRIC_COUNT, Metric, format_metric};

#[derive(Debug, Error)]
pub enum DataError {
    #[error("unsupported dataset format: {0} (expected .csv or .json)")]
    UnsupportedFormat(String),

    #[error("invalid JSON dataset: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid CSV dataset: {0}")]
    Csv(#[from] csv::Error),

    #[error("unexpected dataset shape: {0}")]
    Shape(&'static str),

    #[error("dataset contains no usable rows")]
    Empty,
}
