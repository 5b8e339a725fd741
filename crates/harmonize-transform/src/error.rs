use thiserror::Error;

/// Failures inside a single field transformation.
///
/// These never leave the transformer: `Unparseable` maps to the numeric
/// policy default, everything else degrades to a pass-through outcome.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("'{value}' is not a number")]
    Unparseable { value: String },

    #[error("'{value}' is not a finite number")]
    NonFinite { value: String },

    #[error("'{value}' is outside the integer range")]
    OutOfRange { value: String },

    #[error("invalid validation pattern: {0}")]
    Pattern(#[from] regex::Error),
}
