//! Lexical scoring of normalized column text against target-field synonyms.
//!
//! Uses normalized Indel similarity: 1.0 for identical strings, falling with
//! the number of insertions and deletions needed to turn one into the other.

use std::cmp::Ordering;

use harmonize_standards::HarmonizerConfig;
use rapidfuzz::distance::indel;
use serde::{Deserialize, Serialize};

use crate::utils::normalize_text;

/// Best lexical match for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexicalMatch {
    pub field: String,
    pub score: f32,
    /// The synonym (or field name) that produced the score.
    pub keyword: String,
}

#[derive(Debug, Clone, Default)]
pub struct LexicalScorer {
    /// Field name with its normalized keywords, in schema order.
    keywords: Vec<(String, Vec<String>)>,
}

impl LexicalScorer {
    /// `synonyms` pairs each field with its keyword list; the field's own
    /// name is always included as a keyword.
    pub fn new(synonyms: Vec<(String, Vec<String>)>) -> Self {
        let keywords = synonyms
            .into_iter()
            .map(|(field, words)| {
                let mut normalized: Vec<String> = Vec::with_capacity(words.len() + 1);
                for word in std::iter::once(field.as_str()).chain(words.iter().map(String::as_str))
                {
                    let word = normalize_text(word);
                    if !word.is_empty() && !normalized.contains(&word) {
                        normalized.push(word);
                    }
                }
                (field, normalized)
            })
            .collect();
        Self { keywords }
    }

    pub fn from_config(config: &HarmonizerConfig) -> Self {
        Self::new(config.synonyms())
    }

    /// Similarity of two already-normalized strings in `[0, 1]`.
    pub fn similarity(a: &str, b: &str) -> f32 {
        if a == b {
            return 1.0;
        }
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        (indel::normalized_similarity(a.chars(), b.chars()) as f32).clamp(0.0, 1.0)
    }

    /// Best `(field, score)` over every field's keywords.
    ///
    /// Ties keep the field declared first in the schema.
    pub fn best_match(&self, normalized_text: &str) -> Option<LexicalMatch> {
        let mut best: Option<LexicalMatch> = None;
        for (field, words) in &self.keywords {
            for word in words {
                let score = Self::similarity(normalized_text, word);
                let better = match &best {
                    None => true,
                    Some(current) => {
                        score.partial_cmp(&current.score).unwrap_or(Ordering::Equal)
                            == Ordering::Greater
                    }
                };
                if better {
                    best = Some(LexicalMatch {
                        field: field.clone(),
                        score,
                        keyword: word.clone(),
                    });
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> LexicalScorer {
        LexicalScorer::new(vec![
            (
                "customer_name".to_string(),
                vec!["customer".to_string(), "client".to_string()],
            ),
            (
                "unit_price".to_string(),
                vec!["unit price".to_string(), "price".to_string()],
            ),
            ("sale_date".to_string(), vec!["sale date".to_string()]),
        ])
    }

    #[test]
    fn exact_synonym_scores_one() {
        let m = scorer().best_match("unit price").expect("match");
        assert_eq!(m.field, "unit_price");
        assert_eq!(m.score, 1.0);
    }

    #[test]
    fn field_name_is_a_keyword() {
        let m = scorer().best_match("customer name").expect("match");
        assert_eq!(m.field, "customer_name");
        assert_eq!(m.score, 1.0);
        assert_eq!(m.keyword, "customer name");
    }

    #[test]
    fn near_miss_scores_below_one() {
        let m = scorer().best_match("sales date").expect("match");
        assert_eq!(m.field, "sale_date");
        assert!(m.score > 0.9 && m.score < 1.0);
    }

    #[test]
    fn unrelated_text_scores_low() {
        let m = scorer().best_match("zzz").expect("match");
        assert!(m.score < 0.3);
    }

    #[test]
    fn empty_scorer_has_no_match() {
        assert!(LexicalScorer::default().best_match("price").is_none());
    }
}
