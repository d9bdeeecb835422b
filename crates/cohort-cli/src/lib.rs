//! Library side of the `cohort-psm` CLI: configuration, logging, the run
//! manifest and the pipeline entry point.

pub mod config;
pub mod logging;
pub mod manifest;
pub mod pipeline;
pub mod types;

pub use config::{ConfigError, PipelineConfig};
pub use pipeline::run_pipeline;
pub use types::RunResult;
