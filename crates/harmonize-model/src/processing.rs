use serde::{Deserialize, Serialize};

use crate::mapping::MappingDecision;
use crate::table::HarmonizedRecord;
use crate::validation::{OutcomeStatus, ValidationOutcome};

/// Per-status counts of validation outcomes across a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeTally {
    pub valid: usize,
    pub fixed: usize,
    pub enriched: usize,
    pub error: usize,
}

impl OutcomeTally {
    pub fn record(&mut self, status: OutcomeStatus) {
        match status {
            OutcomeStatus::Valid => self.valid += 1,
            OutcomeStatus::Fixed => self.fixed += 1,
            OutcomeStatus::Enriched => self.enriched += 1,
            OutcomeStatus::Error => self.error += 1,
        }
    }

    pub fn merge(&mut self, other: &OutcomeTally) {
        self.valid += other.valid;
        self.fixed += other.fixed;
        self.enriched += other.enriched;
        self.error += other.error;
    }

    pub fn total(&self) -> usize {
        self.valid + self.fixed + self.enriched + self.error
    }

    pub fn usable(&self) -> usize {
        self.valid + self.fixed + self.enriched
    }
}

impl<'a> FromIterator<&'a ValidationOutcome> for OutcomeTally {
    fn from_iter<I: IntoIterator<Item = &'a ValidationOutcome>>(iter: I) -> Self {
        let mut tally = OutcomeTally::default();
        for outcome in iter {
            tally.record(outcome.status);
        }
        tally
    }
}

/// Terminal artifact of one batch. Never mutated after the pipeline returns it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarmonizationReport {
    pub success: bool,
    pub error: Option<String>,
    pub source: Option<String>,
    pub digest: Option<String>,
    pub total_records: usize,
    /// One decision per source column, in header order.
    pub decisions: Vec<MappingDecision>,
    pub enhanced_rows: Vec<HarmonizedRecord>,
    /// Schema fields no source column won, before enrichment, in schema order.
    pub missing_fields: Vec<String>,
    /// Missing fields that an enricher filled on every row.
    pub enriched_fields: Vec<String>,
    pub rejected_count: usize,
    pub quality_score: f64,
    pub tally: OutcomeTally,
}

impl HarmonizationReport {
    /// A batch-level failure: no rows, no decisions, explicit message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn mapped_count(&self) -> usize {
        self.decisions.iter().filter(|d| d.is_mapped()).count()
    }

    pub fn is_missing(&self, field: &str) -> bool {
        self.missing_fields.iter().any(|f| f == field)
    }

    pub fn summary(&self) -> ProcessingSummary {
        ProcessingSummary {
            total_records: self.total_records,
            fields_mapped: self.mapped_count(),
            fields_rejected: self.rejected_count,
            fields_enriched: self.enriched_fields.len(),
            quality_score: self.quality_score,
            outcome_count: self.tally.total(),
        }
    }
}

/// Headline numbers printed after a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessingSummary {
    pub total_records: usize,
    pub fields_mapped: usize,
    pub fields_rejected: usize,
    pub fields_enriched: usize,
    pub quality_score: f64,
    pub outcome_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_report_has_no_rows() {
        let report = HarmonizationReport::failed("missing header row");
        assert!(!report.success);
        assert_eq!(report.error.as_deref(), Some("missing header row"));
        assert!(report.enhanced_rows.is_empty());
        assert_eq!(report.summary().fields_mapped, 0);
    }

    #[test]
    fn tally_counts_usable_statuses() {
        let outcomes = [
            ValidationOutcome::new("quantity", OutcomeStatus::Valid, "2", "2", "none"),
            ValidationOutcome::new("email", OutcomeStatus::Error, "x", "x", "invalid email"),
            ValidationOutcome::new("country", OutcomeStatus::Enriched, "", "Spain", "inferred"),
        ];
        let tally: OutcomeTally = outcomes.iter().collect();
        assert_eq!(tally.total(), 3);
        assert_eq!(tally.usable(), 2);
    }
}
