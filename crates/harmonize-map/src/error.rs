//! Error types for the external capabilities used during mapping.
//!
//! None of these are fatal to a batch: the guarded call sites degrade
//! classifier failures to "no classification" and translator failures to
//! plain normalization.

use std::time::Duration;

/// Failure of a classifier backend.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("classifier timed out after {0:?}")]
    Timeout(Duration),

    #[error("classifier request failed: {message}")]
    Transport { message: String },

    #[error("classifier returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("classifier response could not be parsed: {message}")]
    MalformedResponse { message: String },

    #[error("classifier proposed unknown field '{field}'")]
    UnknownField { field: String },

    #[error("classifier is not configured: {message}")]
    NotConfigured { message: String },
}

/// Failure of a translation backend.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("translation timed out after {0:?}")]
    Timeout(Duration),

    #[error("translation failed: {message}")]
    Backend { message: String },
}
