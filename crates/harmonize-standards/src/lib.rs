#![deny(unsafe_code)]

pub mod config;
pub mod doctor;
pub mod error;
pub mod loader;

pub use crate::config::{
    ClassifierConfig, ClassifierKind, ConfigOverrides, CountryPattern, CountryTables, EnrichKind,
    EnrichmentConfig, FieldConfig, GlossaryEntry, HarmonizerConfig, RuntimeConfig, Thresholds,
    Vocabularies, VocabularyEntry,
};
pub use crate::doctor::DoctorReport;
pub use crate::error::ConfigError;
pub use crate::loader::{
    CONFIG_ENV_VAR, ConfigSource, Profile, load_config_file, load_profile, parse_config,
};
