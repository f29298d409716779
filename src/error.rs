use std::path::PathBuf;

use smartcore::error::Failed;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HeartError>;

#[derive(Error, Debug)]
pub enum HeartError {
    #[error("cannot read model artifact {path:?}: {source}")]
    ModelRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed model artifact {path:?}: {source}")]
    ModelFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{label:?} is not a valid {field} value")]
    KeyNotFound { field: &'static str, label: String },
    #[error("{field} must be within {min}..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("prediction failed: {0}")]
    Prediction(String),
    #[error("row {row}: {source}")]
    BatchRow {
        row: usize,
        #[source]
        source: Box<HeartError>,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<Failed> for HeartError {
    fn from(e: Failed) -> Self {
        HeartError::Prediction(e.to_string())
    }
}

impl HeartError {
    /// True for errors caused by the submitted values rather than the system.
    pub fn is_input_error(&self) -> bool {
        match self {
            HeartError::KeyNotFound { .. } | HeartError::OutOfRange { .. } => true,
            HeartError::BatchRow { source, .. } => source.is_input_error(),
            _ => false,
        }
    }
}
