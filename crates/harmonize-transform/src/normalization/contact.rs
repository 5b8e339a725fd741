//! Email and phone number normalization.

use regex::Regex;

use crate::error::TransformError;

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";
const PHONE_DIGITS: std::ops::RangeInclusive<usize> = 7..=15;

/// Lowercases and checks addresses against a minimal `local@host.tld` shape.
#[derive(Debug, Clone)]
pub struct EmailValidator {
    pattern: Regex,
}

impl EmailValidator {
    pub fn new() -> Result<Self, TransformError> {
        Ok(Self {
            pattern: Regex::new(EMAIL_PATTERN)?,
        })
    }

    /// The normalized address, or `None` when it does not look like one.
    pub fn normalize(&self, value: &str) -> Option<String> {
        let normalized = value.trim().to_lowercase();
        self.pattern.is_match(&normalized).then_some(normalized)
    }
}

/// Keeps a leading `+` and the digits; spaces, dashes, dots and parentheses
/// are dropped. Any other character, or a digit count outside 7..=15, is
/// rejected.
pub fn normalize_phone(value: &str) -> Option<String> {
    let trimmed = value.trim();
    let (plus, body) = match trimmed.strip_prefix('+') {
        Some(rest) => ("+", rest),
        None => ("", trimmed),
    };
    let mut digits = String::with_capacity(body.len());
    for c in body.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' | '.' | '(' | ')' => {}
            _ => return None,
        }
    }
    PHONE_DIGITS
        .contains(&digits.len())
        .then(|| format!("{plus}{digits}"))
}
