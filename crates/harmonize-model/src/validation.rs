use serde::{Deserialize, Serialize};
use std::fmt;

/// Result class of a per-field transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    /// Value accepted as-is (possibly trimmed).
    Valid,
    /// Value rewritten into the canonical form, or replaced by a policy default.
    Fixed,
    /// Value derived heuristically for a field with no source column.
    Enriched,
    /// Value kept but failed validation.
    Error,
}

impl OutcomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeStatus::Valid => "valid",
            OutcomeStatus::Fixed => "fixed",
            OutcomeStatus::Enriched => "enriched",
            OutcomeStatus::Error => "error",
        }
    }

    /// Statuses counted as usable by the quality score.
    pub fn is_usable(&self) -> bool {
        !matches!(self, OutcomeStatus::Error)
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to one field of one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub field: String,
    pub status: OutcomeStatus,
    pub original_value: String,
    pub final_value: String,
    pub action_taken: String,
}

impl ValidationOutcome {
    pub fn new(
        field: impl Into<String>,
        status: OutcomeStatus,
        original_value: impl Into<String>,
        final_value: impl Into<String>,
        action_taken: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            status,
            original_value: original_value.into(),
            final_value: final_value.into(),
            action_taken: action_taken.into(),
        }
    }
}
