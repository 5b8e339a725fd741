//! OpenAI-compatible chat-completions classifier.

use async_trait::async_trait;
use harmonize_model::{Classification, ColumnCandidate, TargetSchema};
use harmonize_standards::ClassifierConfig;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::debug;

use super::Classifier;
use crate::error::ClassifierError;

const SYSTEM_PROMPT: &str = "You map columns of tabular business data onto a fixed target schema. \
Column names may be in any language. Prefer the evidence in the sample value when it conflicts \
with the column name. Answer with a JSON object only.";

pub struct RemoteClassifier {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl RemoteClassifier {
    /// Reads the API key from the environment variable named in the config.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self, ClassifierError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ClassifierError::NotConfigured {
                message: format!("environment variable '{}' is not set", config.api_key_env),
            })?;
        Ok(Self::with_key(config, api_key))
    }

    pub fn with_key(config: &ClassifierConfig, api_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        }
    }

    fn user_prompt(candidate: &ColumnCandidate, schema: &TargetSchema) -> String {
        let mut prompt = String::from("Target fields:\n");
        for field in schema.fields() {
            prompt.push_str(&format!("- {} ({})", field.name, field.field_type));
            if let Some(description) = &field.description {
                prompt.push_str(&format!(": {description}"));
            }
            prompt.push('\n');
        }
        prompt.push_str(&format!(
            "\nSource column: {}\nNormalized name: {}\nSample value: {}\n\n",
            candidate.source_column, candidate.normalized_text, candidate.sample_value
        ));
        prompt.push_str(
            "Respond with {\"target_field\": <one field name above or \"no_match\">, \
             \"confidence\": <number between 0 and 1>, \"reasoning\": <short explanation>}.",
        );
        prompt
    }

    fn map_http_error(status: reqwest::StatusCode, body: &str) -> ClassifierError {
        ClassifierError::Status {
            status: status.as_u16(),
            body: body.chars().take(200).collect(),
        }
    }
}

/// Extracts the classification object from a chat-completions response body.
pub(crate) fn parse_completion(body: &Value) -> Result<Classification, ClassifierError> {
    let content = body
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        .ok_or_else(|| ClassifierError::MalformedResponse {
            message: "missing choices[0].message.content".to_string(),
        })?;
    let answer: Value =
        serde_json::from_str(content).map_err(|e| ClassifierError::MalformedResponse {
            message: format!("content is not JSON: {e}"),
        })?;
    let target_field = answer
        .get("target_field")
        .and_then(Value::as_str)
        .ok_or_else(|| ClassifierError::MalformedResponse {
            message: "missing target_field".to_string(),
        })?;
    let confidence = answer
        .get("confidence")
        .and_then(Value::as_f64)
        .ok_or_else(|| ClassifierError::MalformedResponse {
            message: "missing confidence".to_string(),
        })?;
    let classification = Classification::new(target_field, confidence as f32);
    Ok(match answer.get("reasoning").and_then(Value::as_str) {
        Some(reasoning) => classification.with_reasoning(reasoning),
        None => classification,
    })
}

#[async_trait]
impl Classifier for RemoteClassifier {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn classify(
        &self,
        candidate: &ColumnCandidate,
        schema: &TargetSchema,
    ) -> Result<Classification, ClassifierError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = json!({
            "model": self.model,
            "temperature": 0,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": Self::user_prompt(candidate, schema) },
            ],
        });

        debug!(url = %url, model = %self.model, source_column = %candidate.source_column, "sending classification request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| ClassifierError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ClassifierError::Transport {
                message: format!("failed to read response body: {e}"),
            })?;
        if !status.is_success() {
            return Err(Self::map_http_error(status, &text));
        }

        let json: Value =
            serde_json::from_str(&text).map_err(|e| ClassifierError::MalformedResponse {
                message: format!("invalid JSON: {e}"),
            })?;
        parse_completion(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harmonize_model::{CellValue, FieldType, TargetField};

    fn completion(content: &str) -> Value {
        json!({ "choices": [ { "message": { "role": "assistant", "content": content } } ] })
    }

    #[test]
    fn parses_answer_and_clamps_confidence() {
        let body = completion(
            r#"{"target_field": "price", "confidence": 1.4, "reasoning": "currency amount"}"#,
        );
        let c = parse_completion(&body).expect("parse");
        assert_eq!(c.target_field, "price");
        assert_eq!(c.confidence, 1.0);
        assert_eq!(c.reasoning.as_deref(), Some("currency amount"));
    }

    #[test]
    fn non_json_content_is_malformed() {
        let err = parse_completion(&completion("price, probably")).expect_err("malformed");
        assert!(matches!(err, ClassifierError::MalformedResponse { .. }));
    }

    #[test]
    fn missing_confidence_is_malformed() {
        let err =
            parse_completion(&completion(r#"{"target_field": "price"}"#)).expect_err("malformed");
        assert!(err.to_string().contains("missing confidence"));
    }

    #[test]
    fn prompt_lists_fields_and_sample() {
        let schema = TargetSchema::new(vec![
            TargetField::new("price", FieldType::Decimal).with_description("Vehicle price"),
        ]);
        let candidate = ColumnCandidate::new("Preis", "price", CellValue::text("18.500 €"));
        let prompt = RemoteClassifier::user_prompt(&candidate, &schema);
        assert!(prompt.contains("- price (decimal): Vehicle price"));
        assert!(prompt.contains("Sample value: 18.500 €"));
    }
}
