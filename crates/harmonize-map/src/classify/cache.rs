use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use harmonize_model::{Classification, ColumnCandidate, TargetSchema};
use tracing::trace;

use super::Classifier;
use crate::error::ClassifierError;

/// Memoizes successful classifications by everything the backend sees of a
/// column: its normalized text and its sample value.
pub struct CachedClassifier<C> {
    inner: C,
    entries: Mutex<HashMap<(String, String), Classification>>,
}

impl<C: Classifier> CachedClassifier<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl<C: Classifier> Classifier for CachedClassifier<C> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn classify(
        &self,
        candidate: &ColumnCandidate,
        schema: &TargetSchema,
    ) -> Result<Classification, ClassifierError> {
        let key = (
            candidate.normalized_text.clone(),
            candidate.sample_value.to_string(),
        );
        let cached = self.entries.lock().ok().and_then(|e| e.get(&key).cloned());
        if let Some(hit) = cached {
            trace!(normalized_text = %key.0, "classifier cache hit");
            return Ok(hit);
        }
        let classification = self.inner.classify(candidate, schema).await?;
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key, classification.clone());
        }
        Ok(classification)
    }
}
