#![deny(unsafe_code)]

//! Harmonizer configuration as deserialized from a TOML profile.
//!
//! Everything the engine treats as policy lives here: the target schema,
//! keyword synonyms, thresholds, enrichment tables, value vocabularies and
//! the classifier backend selection. Core algorithms take these structures
//! by reference and never hard-code their contents.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use harmonize_model::{FieldType, TargetField, TargetSchema, TransformationKind};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarmonizerConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    pub fields: Vec<FieldConfig>,
    #[serde(default)]
    pub glossary: Vec<GlossaryEntry>,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    #[serde(default)]
    pub vocabularies: Vocabularies,
}

/// Acceptance and escalation policy for the mapping resolver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// A proposal is tentatively mapped only when its score is strictly above this.
    pub acceptance: f32,
    /// The classifier is consulted when the best lexical score is strictly below this.
    pub escalation: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            acceptance: 0.6,
            escalation: 0.6,
        }
    }
}

impl Thresholds {
    pub fn strict() -> Self {
        Self {
            acceptance: 0.7,
            escalation: 0.7,
        }
    }

    pub fn relaxed() -> Self {
        Self {
            acceptance: 0.3,
            escalation: 0.6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Maximum number of row chunks transformed at once.
    pub workers: usize,
    /// Rows per worker chunk.
    pub chunk_size: usize,
    /// Concurrent calls into the translator or classifier.
    pub max_external_calls: usize,
    /// Per-call timeout for external capabilities.
    pub call_timeout_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            chunk_size: 256,
            max_external_calls: 4,
            call_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    /// Lexical matching only.
    None,
    /// Local heuristic over sample value shapes.
    #[default]
    Shape,
    /// OpenAI-compatible chat completions endpoint.
    Remote,
}

impl ClassifierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassifierKind::None => "none",
            ClassifierKind::Shape => "shape",
            ClassifierKind::Remote => "remote",
        }
    }
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassifierKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "off" => Ok(ClassifierKind::None),
            "shape" | "local" => Ok(ClassifierKind::Shape),
            "remote" | "openai" => Ok(ClassifierKind::Remote),
            other => Err(format!("unknown classifier: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub kind: ClassifierKind,
    /// Base URL of the OpenAI-compatible API.
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Memoize classifications by column text and sample value.
    pub cache: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            kind: ClassifierKind::default(),
            endpoint: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            cache: true,
        }
    }
}

/// Enricher attached to a target field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrichKind {
    Country,
}

impl EnrichKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrichKind::Country => "country",
        }
    }
}

impl fmt::Display for EnrichKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Overrides the type's default transformation.
    #[serde(default)]
    pub transformation: Option<TransformationKind>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub enrich: Option<EnrichKind>,
}

impl FieldConfig {
    pub fn transformation(&self) -> TransformationKind {
        self.transformation
            .unwrap_or_else(|| TransformationKind::default_for(self.field_type))
    }

    pub fn to_target_field(&self) -> TargetField {
        let field = TargetField::new(&self.name, self.field_type)
            .with_transformation(self.transformation());
        match &self.description {
            Some(description) => field.with_description(description),
            None => field,
        }
    }
}

/// One glossary line: a source-language term and its English rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub term: String,
    pub english: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub country: CountryTables,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountryTables {
    /// Value returned when no heuristic matches.
    pub unknown: String,
    /// Checked in order; the first country with a matching name wins.
    pub patterns: Vec<CountryPattern>,
    /// Language tag to country name.
    pub languages: BTreeMap<String, String>,
}

impl Default for CountryTables {
    fn default() -> Self {
        Self {
            unknown: "Unknown".to_string(),
            patterns: Vec::new(),
            languages: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryPattern {
    pub country: String,
    pub names: Vec<String>,
}

/// Canonical value and the spellings that normalize to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub canonical: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Vocabularies {
    pub fuel_types: Vec<VocabularyEntry>,
    pub lead_sources: Vec<VocabularyEntry>,
    pub countries: Vec<VocabularyEntry>,
}

impl HarmonizerConfig {
    /// The ordered target schema described by `fields`.
    pub fn schema(&self) -> TargetSchema {
        TargetSchema::new(self.fields.iter().map(FieldConfig::to_target_field).collect())
    }

    pub fn field(&self, name: &str) -> Option<&FieldConfig> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Keyword synonyms per field, in schema order.
    pub fn synonyms(&self) -> Vec<(String, Vec<String>)> {
        self.fields
            .iter()
            .map(|f| (f.name.clone(), f.synonyms.clone()))
            .collect()
    }

    /// Fields that declare an enricher, in schema order.
    pub fn enrichers(&self) -> Vec<(&str, EnrichKind)> {
        self.fields
            .iter()
            .filter_map(|f| f.enrich.map(|kind| (f.name.as_str(), kind)))
            .collect()
    }

    /// Applies command-line overrides on top of the loaded profile.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(acceptance) = overrides.acceptance {
            self.thresholds.acceptance = acceptance;
        }
        if let Some(escalation) = overrides.escalation {
            self.thresholds.escalation = escalation;
        }
        if let Some(workers) = overrides.workers {
            self.runtime.workers = workers;
        }
        if let Some(kind) = overrides.classifier {
            self.classifier.kind = kind;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit("thresholds.acceptance", self.thresholds.acceptance)?;
        check_unit("thresholds.escalation", self.thresholds.escalation)?;
        if self.fields.is_empty() {
            return Err(ConfigError::invalid("at least one field is required"));
        }
        let mut seen = BTreeSet::new();
        for field in &self.fields {
            let name = field.name.trim();
            if name.is_empty() {
                return Err(ConfigError::invalid("field name must not be empty"));
            }
            if !seen.insert(name.to_string()) {
                return Err(ConfigError::invalid(format!("duplicate field: {name}")));
            }
        }
        if self.runtime.workers == 0 {
            return Err(ConfigError::invalid("runtime.workers must be at least 1"));
        }
        if self.runtime.chunk_size == 0 {
            return Err(ConfigError::invalid("runtime.chunk_size must be at least 1"));
        }
        if self.runtime.max_external_calls == 0 {
            return Err(ConfigError::invalid(
                "runtime.max_external_calls must be at least 1",
            ));
        }
        if self.runtime.call_timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "runtime.call_timeout_ms must be positive",
            ));
        }
        for entry in &self.glossary {
            if entry.term.trim().is_empty() || entry.english.trim().is_empty() {
                return Err(ConfigError::invalid(
                    "glossary entries need a term and an english rendering",
                ));
            }
        }
        if self.classifier.kind == ClassifierKind::Remote
            && self.classifier.api_key_env.trim().is_empty()
        {
            return Err(ConfigError::invalid(
                "classifier.api_key_env is required for the remote classifier",
            ));
        }
        Ok(())
    }
}

fn check_unit(name: &str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(format!(
            "{name} must be within [0, 1], got {value}"
        )))
    }
}

/// Values supplied on the command line that take precedence over the profile.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConfigOverrides {
    pub acceptance: Option<f32>,
    pub escalation: Option<f32>,
    pub workers: Option<usize>,
    pub classifier: Option<ClassifierKind>,
}
