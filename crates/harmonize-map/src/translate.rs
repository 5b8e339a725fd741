//! Header normalization and translation.
//!
//! The engine only consumes the normalized text; the language tag feeds the
//! country enricher's fallback.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use harmonize_standards::GlossaryEntry;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::warn;

use crate::error::TranslateError;
use crate::utils::normalize_text;

/// Result of translating one raw header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub normalized_text: String,
    pub language: Option<String>,
    pub confidence: f32,
}

impl Translation {
    /// Normalization only: no language, no confidence.
    pub fn untranslated(raw: &str) -> Self {
        Self {
            normalized_text: normalize_text(raw),
            language: None,
            confidence: 0.0,
        }
    }
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, raw: &str) -> Result<Translation, TranslateError>;
}

/// Normalizes without translating.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughTranslator;

#[async_trait]
impl Translator for PassthroughTranslator {
    async fn translate(&self, raw: &str) -> Result<Translation, TranslateError> {
        Ok(Translation::untranslated(raw))
    }
}

/// Deterministic glossary lookup: whole phrase first, then token by token.
#[derive(Debug, Clone, Default)]
pub struct GlossaryTranslator {
    entries: HashMap<String, (String, String)>,
}

impl GlossaryTranslator {
    /// Builds the lookup table; the first entry for a repeated term wins.
    pub fn new(glossary: &[GlossaryEntry]) -> Self {
        let mut entries = HashMap::new();
        for entry in glossary {
            entries
                .entry(normalize_text(&entry.term))
                .or_insert_with(|| (normalize_text(&entry.english), entry.language.clone()));
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, raw: &str) -> Translation {
        let normalized = normalize_text(raw);
        if let Some((english, language)) = self.entries.get(&normalized) {
            return Translation {
                normalized_text: english.clone(),
                language: Some(language.clone()),
                confidence: 1.0,
            };
        }

        let tokens: Vec<&str> = normalized.split(' ').filter(|t| !t.is_empty()).collect();
        if tokens.is_empty() {
            return Translation::untranslated(raw);
        }
        let mut language = None;
        let mut hits = 0usize;
        let mut out = Vec::with_capacity(tokens.len());
        for &token in &tokens {
            match self.entries.get(token) {
                Some((english, lang)) => {
                    hits += 1;
                    language.get_or_insert_with(|| lang.clone());
                    out.push(english.as_str());
                }
                None => out.push(token),
            }
        }
        Translation {
            normalized_text: out.join(" "),
            language,
            confidence: hits as f32 / tokens.len() as f32,
        }
    }
}

#[async_trait]
impl Translator for GlossaryTranslator {
    async fn translate(&self, raw: &str) -> Result<Translation, TranslateError> {
        Ok(self.lookup(raw))
    }
}

/// Bounded, time-limited access to a translator.
///
/// Failures and timeouts fall back to plain normalization so a flaky backend
/// never stalls or fails the batch.
#[derive(Clone)]
pub struct GuardedTranslator {
    inner: Arc<dyn Translator>,
    permits: Arc<Semaphore>,
    timeout: Duration,
}

impl GuardedTranslator {
    pub fn new(inner: Arc<dyn Translator>, permits: Arc<Semaphore>, timeout: Duration) -> Self {
        Self {
            inner,
            permits,
            timeout,
        }
    }

    pub async fn translate(&self, raw: &str) -> Translation {
        let result = match self.permits.acquire().await {
            Ok(_permit) => match tokio::time::timeout(self.timeout, self.inner.translate(raw)).await
            {
                Ok(result) => result,
                Err(_) => Err(TranslateError::Timeout(self.timeout)),
            },
            Err(_) => Err(TranslateError::Backend {
                message: "translation permits closed".to_string(),
            }),
        };
        result.unwrap_or_else(|error| {
            warn!(header = %raw, %error, "translation failed, using normalized header");
            Translation::untranslated(raw)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glossary() -> GlossaryTranslator {
        let entry = |term: &str, english: &str, language: &str| GlossaryEntry {
            term: term.to_string(),
            english: english.to_string(),
            language: language.to_string(),
        };
        GlossaryTranslator::new(&[
            entry("precio unitario", "unit price", "es"),
            entry("precio", "price", "es"),
            entry("fecha", "date", "es"),
            entry("prix", "price", "fr"),
        ])
    }

    #[test]
    fn phrase_hit_wins_with_full_confidence() {
        let t = glossary().lookup("Precio_Unitario");
        assert_eq!(t.normalized_text, "unit price");
        assert_eq!(t.language.as_deref(), Some("es"));
        assert_eq!(t.confidence, 1.0);
    }

    #[test]
    fn token_hits_are_partial() {
        let t = glossary().lookup("fecha_entrega");
        assert_eq!(t.normalized_text, "date entrega");
        assert_eq!(t.language.as_deref(), Some("es"));
        assert_eq!(t.confidence, 0.5);
    }

    #[test]
    fn no_hit_means_no_language() {
        let t = glossary().lookup("Customer Name");
        assert_eq!(t.normalized_text, "customer name");
        assert_eq!(t.language, None);
        assert_eq!(t.confidence, 0.0);
    }

    struct Slow;

    #[async_trait]
    impl Translator for Slow {
        async fn translate(&self, raw: &str) -> Result<Translation, TranslateError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Translation::untranslated(raw))
        }
    }

    #[tokio::test]
    async fn guarded_translator_falls_back_on_timeout() {
        let guarded = GuardedTranslator::new(
            Arc::new(Slow),
            Arc::new(Semaphore::new(1)),
            Duration::from_millis(10),
        );
        let t = guarded.translate("Fecha_Venta").await;
        assert_eq!(t.normalized_text, "fecha venta");
        assert_eq!(t.language, None);
    }
}
