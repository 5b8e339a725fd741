//! Per-field value transformation.
//!
//! Every call yields a [`ValidationOutcome`]; failures never escape. Numeric
//! fields that cannot be parsed get a zero default with `fixed` status,
//! unrecognized dates are kept as-is with `valid` status, and any other
//! internal failure degrades to the stringified original with `valid` status.

use harmonize_model::{CellValue, OutcomeStatus, RowView, TransformationKind, ValidationOutcome};
use harmonize_standards::HarmonizerConfig;
use tracing::trace;

use crate::enrich::{COUNTRY_ACTION, CountryInferencer};
use crate::error::TransformError;
use crate::normalization::{
    EmailValidator, Vocabulary, normalize_date, normalize_phone, parse_decimal, parse_integer,
    title_case,
};

const NONE_ACTION: &str = "none";
const EMPTY_ACTION: &str = "empty value";

/// The harmonized value for one field and the record of how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct Transformed {
    pub value: CellValue,
    pub outcome: ValidationOutcome,
}

impl Transformed {
    fn new(
        field: &str,
        status: OutcomeStatus,
        original: &str,
        value: CellValue,
        action: &str,
    ) -> Self {
        let outcome = ValidationOutcome::new(field, status, original, value.to_string(), action);
        Self { value, outcome }
    }

    /// `fixed` with `action` when the rendered value differs from the input,
    /// `valid` otherwise.
    fn compared(field: &str, original: &str, value: CellValue, action: &str) -> Self {
        if value.to_string() == original {
            Self::new(field, OutcomeStatus::Valid, original, value, NONE_ACTION)
        } else {
            Self::new(field, OutcomeStatus::Fixed, original, value, action)
        }
    }
}

/// Converts raw cells into the canonical representation of their target field.
///
/// Built once per batch from configuration and shared read-only across
/// row workers.
#[derive(Debug, Clone)]
pub struct FieldTransformer {
    email: EmailValidator,
    fuel_types: Vocabulary,
    lead_sources: Vocabulary,
    countries: Vocabulary,
    country_inferencer: CountryInferencer,
}

impl FieldTransformer {
    pub fn new(config: &HarmonizerConfig) -> Result<Self, TransformError> {
        Ok(Self {
            email: EmailValidator::new()?,
            fuel_types: Vocabulary::new(&config.vocabularies.fuel_types),
            lead_sources: Vocabulary::new(&config.vocabularies.lead_sources),
            countries: Vocabulary::new(&config.vocabularies.countries),
            country_inferencer: CountryInferencer::new(&config.enrichment.country),
        })
    }

    /// Transforms `raw` for `field` according to `kind`.
    ///
    /// `row` and `language_hints` (one per header) are consulted only when a
    /// mapped country column is blank, exactly as for a missing country field.
    pub fn transform(
        &self,
        raw: &CellValue,
        field: &str,
        kind: TransformationKind,
        row: RowView<'_>,
        language_hints: &[Option<String>],
    ) -> Transformed {
        let original = raw.to_string();
        match self.try_transform(raw, &original, field, kind, (row, language_hints)) {
            Ok(transformed) => transformed,
            Err(error) => {
                trace!(field, %error, "transformation failed, passing value through");
                Transformed::new(
                    field,
                    OutcomeStatus::Valid,
                    &original,
                    CellValue::Text(original.clone()),
                    NONE_ACTION,
                )
            }
        }
    }

    fn try_transform(
        &self,
        raw: &CellValue,
        original: &str,
        field: &str,
        kind: TransformationKind,
        context: (RowView<'_>, &[Option<String>]),
    ) -> Result<Transformed, TransformError> {
        let trimmed = original.trim();
        Ok(match kind {
            TransformationKind::ConvertToInteger => integer(raw, original, field)?,
            TransformationKind::ConvertToDecimal => decimal(raw, original, field)?,
            TransformationKind::ParseDate => match normalize_date(trimmed) {
                Some(iso) => Transformed::compared(
                    field,
                    original,
                    CellValue::Text(iso),
                    "standardized date format",
                ),
                None if trimmed.is_empty() => blank(field, original),
                None => Transformed::new(
                    field,
                    OutcomeStatus::Valid,
                    original,
                    CellValue::text(trimmed),
                    "unrecognized date format, kept as-is",
                ),
            },
            TransformationKind::NormalizeFuelType => {
                vocabulary(&self.fuel_types, field, original, trimmed)
            }
            TransformationKind::ValidateLeadSource => {
                vocabulary(&self.lead_sources, field, original, trimmed)
            }
            TransformationKind::InferCountry => {
                let (row, hints) = context;
                self.country(field, original, trimmed, row, hints)
            }
            TransformationKind::ValidateEmail => match self.email.normalize(trimmed) {
                _ if trimmed.is_empty() => blank(field, original),
                Some(email) => Transformed::compared(
                    field,
                    original,
                    CellValue::Text(email),
                    "normalized email address",
                ),
                None => Transformed::new(
                    field,
                    OutcomeStatus::Error,
                    original,
                    CellValue::text(trimmed),
                    "invalid email address",
                ),
            },
            TransformationKind::NormalizePhone => match normalize_phone(trimmed) {
                _ if trimmed.is_empty() => blank(field, original),
                Some(phone) => Transformed::compared(
                    field,
                    original,
                    CellValue::Text(phone),
                    "normalized phone number",
                ),
                None => Transformed::new(
                    field,
                    OutcomeStatus::Error,
                    original,
                    CellValue::text(trimmed),
                    "invalid phone number",
                ),
            },
            TransformationKind::None => Transformed::new(
                field,
                OutcomeStatus::Valid,
                original,
                CellValue::text(trimmed),
                NONE_ACTION,
            ),
        })
    }

    fn country(
        &self,
        field: &str,
        original: &str,
        trimmed: &str,
        row: RowView<'_>,
        language_hints: &[Option<String>],
    ) -> Transformed {
        if trimmed.is_empty() {
            let country = self.country_inferencer.infer(row, language_hints);
            return Transformed::new(
                field,
                OutcomeStatus::Enriched,
                original,
                CellValue::text(country),
                COUNTRY_ACTION,
            );
        }
        let canonical = self
            .countries
            .lookup(trimmed)
            .map_or_else(|| title_case(trimmed), str::to_string);
        Transformed::compared(
            field,
            original,
            CellValue::Text(canonical),
            "canonicalized country name",
        )
    }
}

fn integer(raw: &CellValue, original: &str, field: &str) -> Result<Transformed, TransformError> {
    let parsed = match raw {
        CellValue::Integer(v) => Ok(*v),
        _ => parse_integer(original),
    };
    match parsed {
        Ok(value) => Ok(Transformed::compared(
            field,
            original,
            CellValue::Integer(value),
            "converted to integer",
        )),
        Err(TransformError::Unparseable { .. } | TransformError::OutOfRange { .. }) => {
            Ok(Transformed::new(
                field,
                OutcomeStatus::Fixed,
                original,
                CellValue::Integer(0),
                "set to 0 (invalid number)",
            ))
        }
        Err(error) => Err(error),
    }
}

fn decimal(raw: &CellValue, original: &str, field: &str) -> Result<Transformed, TransformError> {
    let parsed = match raw {
        CellValue::Decimal(v) if v.is_finite() => Ok(*v),
        CellValue::Integer(v) => Ok(*v as f64),
        _ => parse_decimal(original),
    };
    match parsed {
        Ok(value) => Ok(Transformed::compared(
            field,
            original,
            CellValue::Decimal(value),
            "converted to decimal",
        )),
        Err(TransformError::Unparseable { .. }) => Ok(Transformed::new(
            field,
            OutcomeStatus::Fixed,
            original,
            CellValue::Decimal(0.0),
            "set to 0.0 (invalid decimal)",
        )),
        Err(error) => Err(error),
    }
}

fn vocabulary(vocab: &Vocabulary, field: &str, original: &str, trimmed: &str) -> Transformed {
    match vocab.lookup(trimmed) {
        Some(canonical) => Transformed::compared(
            field,
            original,
            CellValue::text(canonical),
            "normalized to canonical value",
        ),
        None if trimmed.is_empty() => blank(field, original),
        None => Transformed::new(
            field,
            OutcomeStatus::Valid,
            original,
            CellValue::text(trimmed),
            "not in vocabulary, kept as-is",
        ),
    }
}

fn blank(field: &str, original: &str) -> Transformed {
    Transformed::new(
        field,
        OutcomeStatus::Valid,
        original,
        CellValue::text(""),
        EMPTY_ACTION,
    )
}
