use async_trait::async_trait;
use chrono::NaiveDate;
use harmonize_model::{
    CellValue, Classification, ColumnCandidate, DATE_FORMATS, FieldType, TargetSchema,
};

use super::Classifier;
use crate::error::ClassifierError;

const EMAIL_CONFIDENCE: f32 = 0.95;
const PHONE_CONFIDENCE: f32 = 0.85;
const DATE_CONFIDENCE: f32 = 0.85;
const YEAR_CONFIDENCE: f32 = 0.80;
const NUMBER_CONFIDENCE: f32 = 0.65;

/// Shape of a sample value, most specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Email,
    Date,
    Phone,
    Year,
    Integer,
    Decimal,
}

/// Local heuristic: proposes the only schema field whose type matches the
/// shape of the column's sample value.
#[derive(Debug, Default, Clone, Copy)]
pub struct ValueShapeClassifier;

impl ValueShapeClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn propose(&self, sample: &CellValue, schema: &TargetSchema) -> Classification {
        let Some(shape) = detect_shape(sample) else {
            return Classification::no_match();
        };
        let (field_type, confidence, label) = match shape {
            Shape::Email => (FieldType::Email, EMAIL_CONFIDENCE, "email address"),
            Shape::Date => (FieldType::Date, DATE_CONFIDENCE, "calendar date"),
            Shape::Phone => (FieldType::Phone, PHONE_CONFIDENCE, "phone number"),
            Shape::Year => {
                let years: Vec<_> = schema
                    .fields_of_type(FieldType::Integer)
                    .into_iter()
                    .filter(|f| f.name.to_lowercase().contains("year"))
                    .collect();
                if let [field] = years.as_slice() {
                    return Classification::new(&field.name, YEAR_CONFIDENCE)
                        .with_reasoning("sample value looks like a four-digit year");
                }
                (FieldType::Integer, NUMBER_CONFIDENCE, "whole number")
            }
            Shape::Integer => (FieldType::Integer, NUMBER_CONFIDENCE, "whole number"),
            Shape::Decimal => (FieldType::Decimal, NUMBER_CONFIDENCE, "decimal number"),
        };
        match schema.fields_of_type(field_type).as_slice() {
            [field] => Classification::new(&field.name, confidence)
                .with_reasoning(format!("sample value looks like a {label}")),
            _ => Classification::no_match(),
        }
    }
}

#[async_trait]
impl Classifier for ValueShapeClassifier {
    fn name(&self) -> &'static str {
        "shape"
    }

    async fn classify(
        &self,
        candidate: &ColumnCandidate,
        schema: &TargetSchema,
    ) -> Result<Classification, ClassifierError> {
        Ok(self.propose(&candidate.sample_value, schema))
    }
}

fn detect_shape(sample: &CellValue) -> Option<Shape> {
    match sample {
        CellValue::Null => None,
        CellValue::Integer(v) => Some(integer_shape(*v)),
        CellValue::Decimal(_) => Some(Shape::Decimal),
        CellValue::Text(text) => text_shape(text.trim()),
    }
}

fn integer_shape(value: i64) -> Shape {
    if (1900..=2100).contains(&value) {
        Shape::Year
    } else {
        Shape::Integer
    }
}

fn text_shape(text: &str) -> Option<Shape> {
    if text.is_empty() {
        return None;
    }
    if is_email(text) {
        return Some(Shape::Email);
    }
    if DATE_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(text, fmt).is_ok())
    {
        return Some(Shape::Date);
    }
    if is_phone(text) {
        return Some(Shape::Phone);
    }
    if let Ok(v) = text.parse::<i64>() {
        return Some(if text.len() == 4 {
            integer_shape(v)
        } else {
            Shape::Integer
        });
    }
    let stripped = text.trim_matches(|c: char| matches!(c, '€' | '$' | '£' | '¥') || c.is_whitespace());
    let decimal = if stripped.contains('.') {
        stripped.replace(',', "")
    } else {
        stripped.replace(',', ".")
    };
    decimal.parse::<f64>().ok().map(|_| Shape::Decimal)
}

fn is_email(text: &str) -> bool {
    if text.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = text.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, rest)| !host.is_empty() && !rest.is_empty())
}

fn is_phone(text: &str) -> bool {
    let body = text.strip_prefix('+').unwrap_or(text);
    if !body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')' | '.'))
    {
        return false;
    }
    let digits = body.chars().filter(char::is_ascii_digit).count();
    let separated = text.starts_with('+') || body.chars().any(|c| !c.is_ascii_digit());
    separated && (7..=15).contains(&digits)
}
