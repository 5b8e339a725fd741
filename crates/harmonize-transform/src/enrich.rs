//! Heuristic enrichment of target fields that no source column provides.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use harmonize_model::{CellValue, OutcomeStatus, RowView, ValidationOutcome};
use harmonize_standards::{CountryTables, EnrichKind, HarmonizerConfig};

use crate::transformer::Transformed;

pub const COUNTRY_ACTION: &str = "inferred from name patterns and language";

/// Derives a value for a missing field from the rest of the row.
pub trait Enricher: Send + Sync {
    fn kind(&self) -> EnrichKind;

    /// `language_hints` holds one detected language tag per source column,
    /// in header order.
    fn enrich(
        &self,
        field: &str,
        row: RowView<'_>,
        language_hints: &[Option<String>],
    ) -> Transformed;
}

/// Infers a country from first names found anywhere in the row, falling back
/// to the detected language of the headers.
#[derive(Debug, Clone)]
pub struct CountryInferencer {
    patterns: Vec<(String, HashSet<String>)>,
    languages: BTreeMap<String, String>,
    unknown: String,
}

impl CountryInferencer {
    pub fn new(tables: &CountryTables) -> Self {
        let patterns = tables
            .patterns
            .iter()
            .map(|p| {
                let names = p.names.iter().map(|n| n.trim().to_lowercase()).collect();
                (p.country.clone(), names)
            })
            .collect();
        let languages = tables
            .languages
            .iter()
            .map(|(tag, country)| (tag.to_lowercase(), country.clone()))
            .collect();
        Self {
            patterns,
            languages,
            unknown: tables.unknown.clone(),
        }
    }

    /// First match wins: text cells in header order, countries in configured
    /// order, then language hints in header order, then the unknown label.
    pub fn infer(&self, row: RowView<'_>, language_hints: &[Option<String>]) -> &str {
        for (_, cell) in row.iter() {
            let CellValue::Text(text) = cell else {
                continue;
            };
            let lowered = text.to_lowercase();
            let tokens: Vec<&str> = word_tokens(&lowered).collect();
            if tokens.is_empty() {
                continue;
            }
            for (country, names) in &self.patterns {
                if tokens.iter().any(|t| names.contains(*t)) {
                    return country;
                }
            }
        }
        language_hints
            .iter()
            .flatten()
            .find_map(|tag| self.languages.get(&tag.to_lowercase()))
            .map_or(self.unknown.as_str(), String::as_str)
    }
}

impl Enricher for CountryInferencer {
    fn kind(&self) -> EnrichKind {
        EnrichKind::Country
    }

    fn enrich(
        &self,
        field: &str,
        row: RowView<'_>,
        language_hints: &[Option<String>],
    ) -> Transformed {
        let country = self.infer(row, language_hints).to_string();
        Transformed {
            outcome: ValidationOutcome::new(
                field,
                OutcomeStatus::Enriched,
                "",
                country.as_str(),
                COUNTRY_ACTION,
            ),
            value: CellValue::Text(country),
        }
    }
}

fn word_tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
}

/// One enricher per field that declares `enrich`, in schema order.
#[derive(Clone, Default)]
pub struct EnricherRegistry {
    entries: Vec<(String, Arc<dyn Enricher>)>,
}

impl EnricherRegistry {
    pub fn from_config(config: &HarmonizerConfig) -> Self {
        let entries = config
            .enrichers()
            .into_iter()
            .map(|(field, kind)| {
                let enricher: Arc<dyn Enricher> = match kind {
                    EnrichKind::Country => {
                        Arc::new(CountryInferencer::new(&config.enrichment.country))
                    }
                };
                (field.to_string(), enricher)
            })
            .collect();
        Self { entries }
    }

    #[must_use]
    pub fn with_enricher(mut self, field: impl Into<String>, enricher: Arc<dyn Enricher>) -> Self {
        self.entries.push((field.into(), enricher));
        self
    }

    pub fn get(&self, field: &str) -> Option<&Arc<dyn Enricher>> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, enricher)| enricher)
    }

    /// Enrichers for the given missing fields, in the order of `missing`.
    pub fn for_missing<'a>(
        &'a self,
        missing: &'a [String],
    ) -> Vec<(&'a str, &'a Arc<dyn Enricher>)> {
        missing
            .iter()
            .filter_map(|field| self.get(field).map(|e| (field.as_str(), e)))
            .collect()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for EnricherRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.fields()).finish()
    }
}
