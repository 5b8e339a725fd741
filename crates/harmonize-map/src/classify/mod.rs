//! The classifier capability and its backends.
//!
//! A classifier looks at one column (normalized header plus a sample value)
//! and proposes a target field with a confidence. Backends may fail; only
//! [`GuardedClassifier`] is used by the resolver, and it turns every failure
//! into "no classification".

mod cache;
mod remote;
mod shape;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use harmonize_model::{Classification, ColumnCandidate, TargetSchema};
use harmonize_standards::{ClassifierKind, HarmonizerConfig};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::error::ClassifierError;

pub use cache::CachedClassifier;
pub use remote::RemoteClassifier;
pub use shape::ValueShapeClassifier;

#[async_trait]
pub trait Classifier: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Returns a schema field or the no-match sentinel.
    async fn classify(
        &self,
        candidate: &ColumnCandidate,
        schema: &TargetSchema,
    ) -> Result<Classification, ClassifierError>;
}

/// Lexical-only deployments: never proposes a field.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMatchClassifier;

#[async_trait]
impl Classifier for NoMatchClassifier {
    fn name(&self) -> &'static str {
        "none"
    }

    async fn classify(
        &self,
        _candidate: &ColumnCandidate,
        _schema: &TargetSchema,
    ) -> Result<Classification, ClassifierError> {
        Ok(Classification::no_match())
    }
}

/// Builds the backend selected by the config, wrapped in a cache when enabled.
pub fn build_classifier(config: &HarmonizerConfig) -> Result<Arc<dyn Classifier>, ClassifierError> {
    let classifier: Arc<dyn Classifier> = match config.classifier.kind {
        ClassifierKind::None => return Ok(Arc::new(NoMatchClassifier)),
        ClassifierKind::Shape => {
            if config.classifier.cache {
                Arc::new(CachedClassifier::new(ValueShapeClassifier::new()))
            } else {
                Arc::new(ValueShapeClassifier::new())
            }
        }
        ClassifierKind::Remote => {
            let remote = RemoteClassifier::from_config(&config.classifier)?;
            if config.classifier.cache {
                Arc::new(CachedClassifier::new(remote))
            } else {
                Arc::new(remote)
            }
        }
    };
    Ok(classifier)
}

/// Bounded, time-limited, validated access to a classifier.
#[derive(Clone)]
pub struct GuardedClassifier {
    inner: Arc<dyn Classifier>,
    permits: Arc<Semaphore>,
    timeout: Duration,
}

impl GuardedClassifier {
    pub fn new(inner: Arc<dyn Classifier>, permits: Arc<Semaphore>, timeout: Duration) -> Self {
        Self {
            inner,
            permits,
            timeout,
        }
    }

    pub fn backend(&self) -> &'static str {
        self.inner.name()
    }

    /// Classifies one column. Timeouts, backend errors, out-of-schema fields
    /// and the no-match sentinel all yield `None`.
    pub async fn classify(
        &self,
        candidate: &ColumnCandidate,
        schema: &TargetSchema,
    ) -> Option<Classification> {
        match self.try_classify(candidate, schema).await {
            Ok(Some(classification)) => {
                debug!(
                    backend = self.inner.name(),
                    source_column = %candidate.source_column,
                    target_field = %classification.target_field,
                    confidence = classification.confidence,
                    "classifier proposal"
                );
                Some(classification)
            }
            Ok(None) => None,
            Err(error) => {
                warn!(
                    backend = self.inner.name(),
                    source_column = %candidate.source_column,
                    %error,
                    "classification failed, treating as no match"
                );
                None
            }
        }
    }

    async fn try_classify(
        &self,
        candidate: &ColumnCandidate,
        schema: &TargetSchema,
    ) -> Result<Option<Classification>, ClassifierError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| ClassifierError::NotConfigured {
                message: "classifier permits closed".to_string(),
            })?;
        let classification =
            tokio::time::timeout(self.timeout, self.inner.classify(candidate, schema))
                .await
                .map_err(|_| ClassifierError::Timeout(self.timeout))??;
        validate(classification, schema)
    }
}

fn validate(
    classification: Classification,
    schema: &TargetSchema,
) -> Result<Option<Classification>, ClassifierError> {
    if !classification.is_match() {
        return Ok(None);
    }
    if !schema.contains(&classification.target_field) {
        return Err(ClassifierError::UnknownField {
            field: classification.target_field,
        });
    }
    if classification.confidence.is_nan() {
        return Err(ClassifierError::MalformedResponse {
            message: "confidence is not a number".to_string(),
        });
    }
    let Classification {
        target_field,
        confidence,
        reasoning,
    } = classification;
    Ok(Some(Classification {
        target_field,
        confidence: confidence.clamp(0.0, 1.0),
        reasoning,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use harmonize_model::{CellValue, FieldType, TargetField};

    struct Fixed(Classification);

    #[async_trait]
    impl Classifier for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn classify(
            &self,
            _candidate: &ColumnCandidate,
            _schema: &TargetSchema,
        ) -> Result<Classification, ClassifierError> {
            Ok(self.0.clone())
        }
    }

    struct Failing;

    #[async_trait]
    impl Classifier for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn classify(
            &self,
            _candidate: &ColumnCandidate,
            _schema: &TargetSchema,
        ) -> Result<Classification, ClassifierError> {
            Err(ClassifierError::Transport {
                message: "connection refused".to_string(),
            })
        }
    }

    fn guarded(inner: Arc<dyn Classifier>) -> GuardedClassifier {
        GuardedClassifier::new(inner, Arc::new(Semaphore::new(2)), Duration::from_secs(1))
    }

    fn schema() -> TargetSchema {
        TargetSchema::new(vec![TargetField::new("unit_price", FieldType::Decimal)])
    }

    fn candidate() -> ColumnCandidate {
        ColumnCandidate::new("precio", "price", CellValue::text("19,99"))
    }

    #[tokio::test]
    async fn out_of_schema_field_is_dropped() {
        let g = guarded(Arc::new(Fixed(Classification::new("discount", 0.9))));
        assert!(g.classify(&candidate(), &schema()).await.is_none());
    }

    #[tokio::test]
    async fn backend_errors_become_none() {
        let g = guarded(Arc::new(Failing));
        assert!(g.classify(&candidate(), &schema()).await.is_none());
    }

    #[tokio::test]
    async fn no_match_sentinel_becomes_none() {
        let g = guarded(Arc::new(NoMatchClassifier));
        assert!(g.classify(&candidate(), &schema()).await.is_none());
    }

    #[tokio::test]
    async fn valid_proposal_passes_through() {
        let g = guarded(Arc::new(Fixed(Classification::new("unit_price", 0.8))));
        let c = g.classify(&candidate(), &schema()).await.expect("classification");
        assert_eq!(c.target_field, "unit_price");
        assert_eq!(c.confidence, 0.8);
    }
}
