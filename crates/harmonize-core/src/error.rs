use harmonize_map::ClassifierError;
use harmonize_transform::TransformError;
use thiserror::Error;

/// Failures while assembling a pipeline. Batch-level failures are reported
/// through a failed `HarmonizationReport` instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("classifier setup failed: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("transformer setup failed: {0}")]
    Transform(#[from] TransformError),
}
