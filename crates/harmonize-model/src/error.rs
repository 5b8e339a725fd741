use thiserror::Error;

/// Failures that abort a whole batch.
///
/// Column- and cell-level problems never surface here: classification failures
/// degrade to "no match" and transformation failures degrade to policy defaults.
#[derive(Debug, Error)]
pub enum HarmonizeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid batch: {0}")]
    InvalidBatch(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, HarmonizeError>;
