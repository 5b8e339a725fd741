//! Mapping resolution: lexical scoring, classifier escalation, acceptance
//! and conflict resolution into a partial injective column-to-field mapping.

use std::collections::BTreeMap;
use std::sync::Arc;

use harmonize_model::{
    Classification, ColumnCandidate, MappingDecision, MatchBasis, RejectionReason, TargetSchema,
    TransformationKind,
};
use harmonize_standards::Thresholds;
use serde::{Deserialize, Serialize};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::classify::GuardedClassifier;
use crate::score::{LexicalMatch, LexicalScorer};

/// The best field proposed for one column before acceptance and conflicts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub source_column: String,
    pub field: Option<String>,
    pub confidence: f32,
    pub basis: MatchBasis,
    pub reasoning: Option<String>,
}

impl Proposal {
    pub fn new(source_column: impl Into<String>, field: impl Into<String>, confidence: f32) -> Self {
        Self {
            source_column: source_column.into(),
            field: Some(field.into()),
            confidence,
            basis: MatchBasis::Lexical,
            reasoning: None,
        }
    }

    pub fn none(source_column: impl Into<String>) -> Self {
        Self {
            source_column: source_column.into(),
            field: None,
            confidence: 0.0,
            basis: MatchBasis::None,
            reasoning: None,
        }
    }

    /// Combines the lexical match with an optional classifier proposal; the
    /// classifier wins only with strictly higher confidence.
    pub fn combine(
        source_column: &str,
        lexical: Option<&LexicalMatch>,
        classified: Option<Classification>,
    ) -> Self {
        let lexical_score = lexical.map_or(0.0, |m| m.score);
        if let Some(c) = classified
            && (lexical.is_none() || c.confidence > lexical_score)
        {
            return Self {
                source_column: source_column.to_string(),
                field: Some(c.target_field),
                confidence: c.confidence,
                basis: MatchBasis::Classifier,
                reasoning: c.reasoning,
            };
        }
        match lexical {
            Some(m) => Self {
                source_column: source_column.to_string(),
                field: Some(m.field.clone()),
                confidence: m.score,
                basis: MatchBasis::Lexical,
                reasoning: Some(format!("matched keyword '{}'", m.keyword)),
            },
            None => Self::none(source_column),
        }
    }
}

/// Decisions for one batch plus the schema fields nobody won.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub decisions: Vec<MappingDecision>,
    pub missing_fields: Vec<String>,
}

impl Resolution {
    pub fn mapped(&self) -> impl Iterator<Item = &MappingDecision> {
        self.decisions.iter().filter(|d| d.is_mapped())
    }

    pub fn rejected_count(&self) -> usize {
        self.decisions.iter().filter(|d| !d.is_mapped()).count()
    }
}

pub struct MappingResolver {
    schema: Arc<TargetSchema>,
    scorer: LexicalScorer,
    thresholds: Thresholds,
    classifier: Option<GuardedClassifier>,
}

impl MappingResolver {
    pub fn new(schema: Arc<TargetSchema>, scorer: LexicalScorer, thresholds: Thresholds) -> Self {
        Self {
            schema,
            scorer,
            thresholds,
            classifier: None,
        }
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: GuardedClassifier) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn schema(&self) -> &TargetSchema {
        &self.schema
    }

    /// One decision per candidate, in input order.
    pub async fn resolve(&self, candidates: &[ColumnCandidate]) -> Resolution {
        let span = info_span!("resolve", columns = candidates.len());
        async {
            let lexical: Vec<Option<LexicalMatch>> = candidates
                .iter()
                .map(|c| self.scorer.best_match(&c.normalized_text))
                .collect();
            let classified = self.escalate(candidates, &lexical).await;

            let proposals: Vec<Proposal> = candidates
                .iter()
                .zip(lexical.iter())
                .zip(classified)
                .map(|((candidate, lex), cls)| {
                    Proposal::combine(&candidate.source_column, lex.as_ref(), cls)
                })
                .collect();

            let decisions = resolve_conflicts(&proposals, &self.schema, self.thresholds.acceptance);
            let missing_fields = missing_fields(&self.schema, &decisions);
            for decision in &decisions {
                debug!(
                    source_column = %decision.source_column,
                    target_field = %decision.target_field,
                    confidence = decision.confidence,
                    status = ?decision.status,
                    "mapping decision"
                );
            }
            let resolution = Resolution {
                decisions,
                missing_fields,
            };
            info!(
                mapped = resolution.mapped().count(),
                rejected = resolution.rejected_count(),
                missing = resolution.missing_fields.len(),
                "mapping resolved"
            );
            resolution
        }
        .instrument(span)
        .await
    }

    /// Consults the classifier for weak lexical matches. Calls run
    /// concurrently under the guard's limits and are collected in input order.
    async fn escalate(
        &self,
        candidates: &[ColumnCandidate],
        lexical: &[Option<LexicalMatch>],
    ) -> Vec<Option<Classification>> {
        let mut results = vec![None; candidates.len()];
        let Some(classifier) = &self.classifier else {
            return results;
        };

        let mut handles = Vec::new();
        for (idx, (candidate, lex)) in candidates.iter().zip(lexical).enumerate() {
            let score = lex.as_ref().map_or(0.0, |m| m.score);
            if score >= self.thresholds.escalation {
                continue;
            }
            debug!(
                source_column = %candidate.source_column,
                lexical_score = score,
                backend = classifier.backend(),
                "escalating to classifier"
            );
            let classifier = classifier.clone();
            let schema = Arc::clone(&self.schema);
            let candidate = candidate.clone();
            handles.push((
                idx,
                tokio::spawn(async move { classifier.classify(&candidate, &schema).await }),
            ));
        }

        for (idx, handle) in handles {
            match handle.await {
                Ok(classification) => results[idx] = classification,
                Err(error) => warn!(
                    source_column = %candidates[idx].source_column,
                    %error,
                    "classifier task failed, treating as no match"
                ),
            }
        }
        results
    }
}

/// Applies the acceptance threshold and resolves contention for a field.
///
/// Within a field, the strictly highest confidence wins and ties go to the
/// earliest proposal. Output order matches `proposals`.
pub fn resolve_conflicts(
    proposals: &[Proposal],
    schema: &TargetSchema,
    acceptance: f32,
) -> Vec<MappingDecision> {
    let accepted: Vec<bool> = proposals
        .iter()
        .map(|p| {
            p.field.as_deref().is_some_and(|f| schema.contains(f)) && p.confidence > acceptance
        })
        .collect();

    let mut winners: BTreeMap<&str, usize> = BTreeMap::new();
    for (idx, proposal) in proposals.iter().enumerate() {
        if !accepted[idx] {
            continue;
        }
        let Some(field) = proposal.field.as_deref() else {
            continue;
        };
        match winners.get(field) {
            Some(&current) if proposals[current].confidence >= proposal.confidence => {}
            _ => {
                winners.insert(field, idx);
            }
        }
    }

    proposals
        .iter()
        .enumerate()
        .map(|(idx, p)| {
            let field = p.field.as_deref().filter(|f| schema.contains(f));
            let decision = match field {
                None => MappingDecision::rejected(
                    &p.source_column,
                    None,
                    p.confidence,
                    RejectionReason::NoSuitableTarget,
                    p.basis,
                ),
                Some(field) if !accepted[idx] => MappingDecision::rejected(
                    &p.source_column,
                    Some(field.to_string()),
                    p.confidence,
                    RejectionReason::BelowThreshold {
                        confidence: p.confidence,
                        threshold: acceptance,
                    },
                    p.basis,
                ),
                Some(field) => match winners.get(field) {
                    Some(&winner) if winner == idx => {
                        let transformation = schema
                            .field(field)
                            .map_or(TransformationKind::None, |f| f.transformation);
                        MappingDecision::mapped(
                            &p.source_column,
                            field,
                            p.confidence,
                            transformation,
                            p.basis,
                        )
                    }
                    // Every accepted field has a winner.
                    winner => MappingDecision::rejected(
                        &p.source_column,
                        Some(field.to_string()),
                        p.confidence,
                        RejectionReason::DuplicateMapping {
                            winner: winner
                                .map(|&w| proposals[w].source_column.clone())
                                .unwrap_or_default(),
                        },
                        p.basis,
                    ),
                },
            };
            decision.with_reasoning(p.reasoning.clone())
        })
        .collect()
}

/// Schema fields without a mapped decision, in schema order.
pub fn missing_fields(schema: &TargetSchema, decisions: &[MappingDecision]) -> Vec<String> {
    schema
        .names()
        .filter(|name| {
            !decisions
                .iter()
                .any(|d| d.is_mapped() && d.target_field == *name)
        })
        .map(str::to_string)
        .collect()
}
