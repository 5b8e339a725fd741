//! Controlled vocabularies: synonym tables with a canonical value each.

use std::collections::HashMap;

use harmonize_standards::VocabularyEntry;

/// Case-insensitive lookup from synonym (or canonical value) to canonical value.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    terms: HashMap<String, String>,
}

impl Vocabulary {
    /// Earlier entries win when a synonym is listed twice.
    pub fn new(entries: &[VocabularyEntry]) -> Self {
        let mut terms = HashMap::new();
        for entry in entries {
            let keys = std::iter::once(&entry.canonical).chain(entry.synonyms.iter());
            for key in keys {
                terms
                    .entry(key.trim().to_lowercase())
                    .or_insert_with(|| entry.canonical.clone());
            }
        }
        Self { terms }
    }

    pub fn lookup(&self, value: &str) -> Option<&str> {
        self.terms
            .get(&value.trim().to_lowercase())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Uppercases the first letter of each whitespace-separated word.
pub fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
