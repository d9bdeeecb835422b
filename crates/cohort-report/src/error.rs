use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to build report table {report}: {source}")]
    Frame {
        report: &'static str,
        #[source]
        source: PolarsError,
    },

    #[error("failed to render {file} as CSV: {source}")]
    Render {
        file: String,
        #[source]
        source: PolarsError,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ReportError>;
