//! Target schema definitions.
//!
//! The target schema is the fixed, ordered set of canonical output fields.
//! It is built once per deployment and never mutated during a run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Calendar patterns accepted for `date` fields, tried in order.
pub const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d.%m.%Y", "%d-%m-%Y"];

/// Primitive type tag of a target field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Decimal,
    Date,
    Email,
    Phone,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Decimal => "decimal",
            FieldType::Date => "date",
            FieldType::Email => "email",
            FieldType::Phone => "phone",
        }
    }

    /// Returns true for types whose harmonized value is a number.
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Integer | FieldType::Decimal)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "string" | "text" => Ok(FieldType::String),
            "integer" | "int" => Ok(FieldType::Integer),
            "decimal" | "float" | "number" => Ok(FieldType::Decimal),
            "date" => Ok(FieldType::Date),
            "email" => Ok(FieldType::Email),
            "phone" => Ok(FieldType::Phone),
            other => Err(format!("unknown field type: {other}")),
        }
    }
}

/// Transformation applied to a cell value mapped onto a target field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformationKind {
    None,
    ConvertToInteger,
    ConvertToDecimal,
    ParseDate,
    NormalizeFuelType,
    InferCountry,
    ValidateEmail,
    NormalizePhone,
    ValidateLeadSource,
}

impl TransformationKind {
    /// Default transformation for a field type when the schema does not name one.
    pub fn default_for(field_type: FieldType) -> Self {
        match field_type {
            FieldType::String => TransformationKind::None,
            FieldType::Integer => TransformationKind::ConvertToInteger,
            FieldType::Decimal => TransformationKind::ConvertToDecimal,
            FieldType::Date => TransformationKind::ParseDate,
            FieldType::Email => TransformationKind::ValidateEmail,
            FieldType::Phone => TransformationKind::NormalizePhone,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransformationKind::None => "none",
            TransformationKind::ConvertToInteger => "convert_to_integer",
            TransformationKind::ConvertToDecimal => "convert_to_decimal",
            TransformationKind::ParseDate => "parse_date",
            TransformationKind::NormalizeFuelType => "normalize_fuel_type",
            TransformationKind::InferCountry => "infer_country",
            TransformationKind::ValidateEmail => "validate_email",
            TransformationKind::NormalizePhone => "normalize_phone",
            TransformationKind::ValidateLeadSource => "validate_lead_source",
        }
    }
}

impl fmt::Display for TransformationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransformationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim().to_lowercase().as_str() {
            "none" => TransformationKind::None,
            "convert_to_integer" => TransformationKind::ConvertToInteger,
            "convert_to_decimal" => TransformationKind::ConvertToDecimal,
            "parse_date" => TransformationKind::ParseDate,
            "normalize_fuel_type" => TransformationKind::NormalizeFuelType,
            "infer_country" => TransformationKind::InferCountry,
            "validate_email" => TransformationKind::ValidateEmail,
            "normalize_phone" => TransformationKind::NormalizePhone,
            "validate_lead_source" => TransformationKind::ValidateLeadSource,
            other => return Err(format!("unknown transformation: {other}")),
        };
        Ok(kind)
    }
}

/// A canonical output field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetField {
    pub name: String,
    pub field_type: FieldType,
    pub transformation: TransformationKind,
    /// Free-text description handed to semantic classifiers.
    pub description: Option<String>,
}

impl TargetField {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            transformation: TransformationKind::default_for(field_type),
            description: None,
        }
    }

    #[must_use]
    pub fn with_transformation(mut self, transformation: TransformationKind) -> Self {
        self.transformation = transformation;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Ordered mapping from target-field name to its type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetSchema {
    fields: Vec<TargetField>,
}

impl TargetSchema {
    /// Builds a schema, keeping the first definition when a name repeats.
    pub fn new(fields: Vec<TargetField>) -> Self {
        let mut unique: Vec<TargetField> = Vec::with_capacity(fields.len());
        for field in fields {
            if !unique.iter().any(|f| f.name == field.name) {
                unique.push(field);
            }
        }
        Self { fields: unique }
    }

    pub fn fields(&self) -> &[TargetField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&TargetField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Fields of the given type, in schema order.
    pub fn fields_of_type(&self, field_type: FieldType) -> Vec<&TargetField> {
        self.fields
            .iter()
            .filter(|f| f.field_type == field_type)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
