#![deny(unsafe_code)]

use crate::config::{ClassifierKind, HarmonizerConfig};

/// Readiness summary of a loaded config, printed by `harmonize check`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DoctorReport {
    pub name: String,
    pub origin: String,
    pub acceptance: f32,
    pub escalation: f32,
    pub classifier: ClassifierKind,
    pub counts: DoctorCounts,
    /// Problems that do not stop a run but degrade it.
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct DoctorCounts {
    pub fields: usize,
    pub synonyms: usize,
    pub glossary_entries: usize,
    pub enrichers: usize,
    pub country_patterns: usize,
    pub vocabulary_entries: usize,
}

impl DoctorReport {
    /// `api_key_present` reports whether the remote classifier's key variable is set.
    pub fn from_config(config: &HarmonizerConfig, origin: &str, api_key_present: bool) -> Self {
        let mut warnings = Vec::new();
        if config.classifier.kind == ClassifierKind::Remote && !api_key_present {
            warnings.push(format!(
                "remote classifier selected but {} is not set; columns below the escalation threshold will not be classified",
                config.classifier.api_key_env
            ));
        }
        for field in &config.fields {
            if field.synonyms.is_empty() {
                warnings.push(format!(
                    "field '{}' has no synonyms; only its own name is matched",
                    field.name
                ));
            }
        }
        if !config.enrichers().is_empty() && config.enrichment.country.patterns.is_empty() {
            warnings.push("country enrichment has no name patterns".to_string());
        }
        if config.thresholds.escalation < config.thresholds.acceptance {
            warnings.push(
                "escalation is below acceptance; weak lexical matches are rejected without consulting the classifier"
                    .to_string(),
            );
        }

        let vocab = &config.vocabularies;
        Self {
            name: config.name.clone(),
            origin: origin.to_string(),
            acceptance: config.thresholds.acceptance,
            escalation: config.thresholds.escalation,
            classifier: config.classifier.kind,
            counts: DoctorCounts {
                fields: config.fields.len(),
                synonyms: config.fields.iter().map(|f| f.synonyms.len()).sum(),
                glossary_entries: config.glossary.len(),
                enrichers: config.enrichers().len(),
                country_patterns: config.enrichment.country.patterns.len(),
                vocabulary_entries: vocab.fuel_types.len()
                    + vocab.lead_sources.len()
                    + vocab.countries.len(),
            },
            warnings,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}
