use harmonize_model::{OutcomeTally, ValidationOutcome};

/// Fraction of outcomes that are usable (`valid`, `fixed` or `enriched`).
#[derive(Debug, Clone, Copy, Default)]
pub struct QualityScorer;

impl QualityScorer {
    /// `0.0` for an empty sequence.
    pub fn score(outcomes: &[ValidationOutcome]) -> f64 {
        let tally: OutcomeTally = outcomes.iter().collect();
        Self::score_tally(&tally)
    }

    pub fn score_tally(tally: &OutcomeTally) -> f64 {
        match tally.total() {
            0 => 0.0,
            total => tally.usable() as f64 / total as f64,
        }
    }
}
