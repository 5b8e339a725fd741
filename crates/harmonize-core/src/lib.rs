//! Batch orchestration for schema harmonization.

pub mod error;
pub mod pipeline;
mod rows;

pub use error::PipelineError;
pub use pipeline::{HarmonizationPipeline, PipelineBuilder};
