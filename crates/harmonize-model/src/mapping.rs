//! Column mapping types: candidates, classifier guesses and resolved decisions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::schema::TransformationKind;
use crate::value::CellValue;

/// Target field recorded on decisions that did not win a field.
pub const UNMAPPED: &str = "unmapped";

/// Sentinel a classifier returns when no schema field fits.
pub const NO_MATCH: &str = "no_match";

/// One source column as seen by the mapping stage. Built once per batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnCandidate {
    /// Header exactly as authored in the source.
    pub source_column: String,
    /// Lowercase normalized (and possibly translated) header text.
    pub normalized_text: String,
    /// A representative value from the column.
    pub sample_value: CellValue,
}

impl ColumnCandidate {
    pub fn new(
        source_column: impl Into<String>,
        normalized_text: impl Into<String>,
        sample_value: CellValue,
    ) -> Self {
        Self {
            source_column: source_column.into(),
            normalized_text: normalized_text.into(),
            sample_value,
        }
    }
}

/// A classifier's best guess for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// A schema field name or [`NO_MATCH`].
    pub target_field: String,
    /// Self-reported certainty in `[0, 1]`.
    pub confidence: f32,
    pub reasoning: Option<String>,
}

impl Classification {
    pub fn new(target_field: impl Into<String>, confidence: f32) -> Self {
        Self {
            target_field: target_field.into(),
            confidence: confidence.clamp(0.0, 1.0),
            reasoning: None,
        }
    }

    pub fn no_match() -> Self {
        Self::new(NO_MATCH, 0.0)
    }

    #[must_use]
    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }

    pub fn is_match(&self) -> bool {
        self.target_field != NO_MATCH
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingStatus {
    Mapped,
    Rejected,
}

/// Which signal produced the decision's confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchBasis {
    Lexical,
    Classifier,
    None,
}

impl MatchBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchBasis::Lexical => "lexical",
            MatchBasis::Classifier => "classifier",
            MatchBasis::None => "none",
        }
    }
}

/// Why a column was not mapped. Always human-readable through `Display`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectionReason {
    /// Neither the lexical scorer nor the classifier proposed a field.
    NoSuitableTarget,
    /// The best proposal did not clear the acceptance threshold.
    BelowThreshold { confidence: f32, threshold: f32 },
    /// Another column won the same target field.
    DuplicateMapping { winner: String },
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::NoSuitableTarget => f.write_str("no suitable target field"),
            RejectionReason::BelowThreshold {
                confidence,
                threshold,
            } => write!(
                f,
                "confidence below threshold ({confidence:.2} <= {threshold:.2})"
            ),
            RejectionReason::DuplicateMapping { winner } => write!(
                f,
                "duplicate mapping conflict - '{winner}' has higher confidence"
            ),
        }
    }
}

/// The resolved outcome for one source column.
///
/// `rejection_reason` is set exactly when `status` is [`MappingStatus::Rejected`];
/// build decisions through [`MappingDecision::mapped`] and [`MappingDecision::rejected`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingDecision {
    pub source_column: String,
    /// Winning field, or [`UNMAPPED`] for rejected columns.
    pub target_field: String,
    /// Best field proposed for the column, kept for audit on rejections.
    pub proposed_field: Option<String>,
    pub confidence: f32,
    pub status: MappingStatus,
    pub rejection_reason: Option<RejectionReason>,
    pub transformation_kind: TransformationKind,
    pub basis: MatchBasis,
    pub reasoning: Option<String>,
}

impl MappingDecision {
    pub fn mapped(
        source_column: impl Into<String>,
        target_field: impl Into<String>,
        confidence: f32,
        transformation_kind: TransformationKind,
        basis: MatchBasis,
    ) -> Self {
        let target_field = target_field.into();
        Self {
            source_column: source_column.into(),
            proposed_field: Some(target_field.clone()),
            target_field,
            confidence,
            status: MappingStatus::Mapped,
            rejection_reason: None,
            transformation_kind,
            basis,
            reasoning: None,
        }
    }

    pub fn rejected(
        source_column: impl Into<String>,
        proposed_field: Option<String>,
        confidence: f32,
        reason: RejectionReason,
        basis: MatchBasis,
    ) -> Self {
        Self {
            source_column: source_column.into(),
            target_field: UNMAPPED.to_string(),
            proposed_field,
            confidence,
            status: MappingStatus::Rejected,
            rejection_reason: Some(reason),
            transformation_kind: TransformationKind::None,
            basis,
            reasoning: None,
        }
    }

    #[must_use]
    pub fn with_reasoning(mut self, reasoning: Option<String>) -> Self {
        self.reasoning = reasoning;
        self
    }

    pub fn is_mapped(&self) -> bool {
        self.status == MappingStatus::Mapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_clamps_confidence() {
        assert_eq!(Classification::new("price", 1.7).confidence, 1.0);
        assert_eq!(Classification::new("price", -0.2).confidence, 0.0);
        assert!(!Classification::no_match().is_match());
    }

    #[test]
    fn rejected_decisions_carry_reason() {
        let decision = MappingDecision::rejected(
            "precio",
            Some("unit_price".to_string()),
            0.9,
            RejectionReason::DuplicateMapping {
                winner: "price_unit".to_string(),
            },
            MatchBasis::Classifier,
        );
        assert_eq!(decision.target_field, UNMAPPED);
        assert!(!decision.is_mapped());
        let reason = decision.rejection_reason.map(|r| r.to_string());
        assert_eq!(
            reason.as_deref(),
            Some("duplicate mapping conflict - 'price_unit' has higher confidence")
        );
    }

    #[test]
    fn mapped_decisions_have_no_reason() {
        let decision = MappingDecision::mapped(
            "cantidad",
            "quantity",
            1.0,
            TransformationKind::ConvertToInteger,
            MatchBasis::Lexical,
        );
        assert!(decision.is_mapped());
        assert!(decision.rejection_reason.is_none());
        assert_eq!(decision.proposed_field.as_deref(), Some("quantity"));
    }
}
