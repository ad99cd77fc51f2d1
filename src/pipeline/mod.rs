// Data processing pipeline: ingestion, processing, and export

pub mod export;
pub mod ingestion;
pub mod pipeline;
pub mod processing;

pub use pipeline::{Pipeline, PipelineConfig, PipelineResult};
