// signflow/src/pipeline/mod.rs

//! Launching and supervising pipeline runs.

pub mod config;
pub mod executor;
pub mod run;

pub use config::PipelineConfig;
pub use executor::PipelineExecutor;
pub use run::{Feed, PipelineRun, RunSummary, StageReport};
