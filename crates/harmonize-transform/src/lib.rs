//! Value-level harmonization.
//!
//! - **transformer**: coerces mapped cells into their target field's canonical form
//! - **enrich**: heuristic values for target fields no source column provides
//! - **quality**: aggregate score over per-field outcomes
//! - **normalization**: numeric, date, contact and vocabulary primitives

pub mod enrich;
pub mod error;
pub mod normalization;
pub mod quality;
pub mod transformer;

pub use enrich::{COUNTRY_ACTION, CountryInferencer, Enricher, EnricherRegistry};
pub use error::TransformError;
pub use quality::QualityScorer;
pub use transformer::{FieldTransformer, Transformed};
