//! LLM backend abstraction for the classification oracle
//!
//! The pipeline never talks HTTP directly; it goes through the [`LlmClient`]
//! trait. [`HttpLlmClient`] speaks both Ollama-style and OpenAI-compatible
//! endpoints and always requests strict JSON output. [`FakeLlmClient`]
//! replays scripted responses for tests, so the whole pipeline is testable
//! without a network.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Oracle backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "llama3.2:3b".to_string()
}

fn default_timeout() -> u64 {
    60
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            timeout_secs: default_timeout(),
        }
    }
}

/// Errors from the oracle transport layer.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("oracle is disabled in configuration")]
    Disabled,

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("oracle returned invalid JSON: {0}")]
    InvalidJson(String),

    #[error("oracle request timed out after {0}s")]
    Timeout(u64),

    #[error("oracle returned an empty response")]
    EmptyResponse,
}

/// A backend able to answer a prompt with a JSON document.
pub trait LlmClient: Send + Sync {
    fn complete_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<serde_json::Value, LlmError>;
}

/// HTTP-backed client. Ollama endpoints get `/api/generate` with
/// `format: "json"`; everything else gets `/v1/chat/completions` with
/// `response_format: json_object`.
pub struct HttpLlmClient {
    config: OracleConfig,
    client: reqwest::blocking::Client,
}

impl HttpLlmClient {
    pub fn new(config: OracleConfig) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    fn is_ollama(&self) -> bool {
        self.config.endpoint.contains("11434") || self.config.endpoint.contains("ollama")
    }

    fn send_ollama(&self, prompt: &str) -> Result<serde_json::Value, LlmError> {
        let url = format!("{}/api/generate", self.config.endpoint);
        let body = serde_json::json!({
            "model": self.config.model,
            "prompt": prompt,
            "stream": false,
            "format": "json",
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| self.transport_error(e))?;
        if !response.status().is_success() {
            return Err(LlmError::Http(format!("HTTP {} from Ollama", response.status())));
        }

        let envelope: serde_json::Value = response
            .json()
            .map_err(|e| LlmError::InvalidJson(e.to_string()))?;
        let text = envelope
            .get("response")
            .and_then(|v| v.as_str())
            .ok_or(LlmError::EmptyResponse)?;
        parse_model_json(text)
    }

    fn send_openai(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<serde_json::Value, LlmError> {
        let url = format!("{}/v1/chat/completions", self.config.endpoint);
        let body = serde_json::json!({
            "model": self.config.model,
            "temperature": 0.2,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt},
            ],
            "response_format": {"type": "json_object"},
        });

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().map_err(|e| self.transport_error(e))?;
        if !response.status().is_success() {
            return Err(LlmError::Http(format!(
                "HTTP {} from chat completions endpoint",
                response.status()
            )));
        }

        let envelope: serde_json::Value = response
            .json()
            .map_err(|e| LlmError::InvalidJson(e.to_string()))?;
        let text = envelope
            .get("choices")
            .and_then(|v| v.get(0))
            .and_then(|v| v.get("message"))
            .and_then(|v| v.get("content"))
            .and_then(|v| v.as_str())
            .ok_or(LlmError::EmptyResponse)?;
        parse_model_json(text)
    }

    fn transport_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(self.config.timeout_secs)
        } else {
            LlmError::Http(e.to_string())
        }
    }
}

impl LlmClient for HttpLlmClient {
    fn complete_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<serde_json::Value, LlmError> {
        if !self.config.enabled {
            return Err(LlmError::Disabled);
        }

        if self.is_ollama() {
            let prompt = format!("{}\n\n{}", system_prompt, user_prompt);
            match self.send_ollama(&prompt) {
                Ok(json) => return Ok(json),
                Err(e) => {
                    tracing::debug!("Ollama call failed, trying OpenAI-compatible API: {}", e);
                }
            }
        }
        self.send_openai(system_prompt, user_prompt)
    }
}

/// Parse model output, tolerating markdown code fences around the JSON
fn parse_model_json(text: &str) -> Result<serde_json::Value, LlmError> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();
    serde_json::from_str(body).map_err(|e| LlmError::InvalidJson(e.to_string()))
}

/// Scripted client for tests: responses are consumed in order, the last one
/// repeats once the script runs out.
pub struct FakeLlmClient {
    script: std::sync::Mutex<Vec<Result<serde_json::Value, LlmError>>>,
    cursor: std::sync::Mutex<usize>,
}

impl FakeLlmClient {
    pub fn new(script: Vec<Result<serde_json::Value, LlmError>>) -> Self {
        Self {
            script: std::sync::Mutex::new(script),
            cursor: std::sync::Mutex::new(0),
        }
    }

    pub fn always(json: serde_json::Value) -> Self {
        Self::new(vec![Ok(json)])
    }

    pub fn always_failing(error: LlmError) -> Self {
        Self::new(vec![Err(error)])
    }

    /// Number of calls made so far
    pub fn calls(&self) -> usize {
        *self.cursor.lock().unwrap()
    }
}

impl LlmClient for FakeLlmClient {
    fn complete_json(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
    ) -> Result<serde_json::Value, LlmError> {
        let script = self.script.lock().unwrap();
        let mut cursor = self.cursor.lock().unwrap();
        let index = (*cursor).min(script.len().saturating_sub(1));
        *cursor += 1;
        script
            .get(index)
            .cloned()
            .unwrap_or(Err(LlmError::EmptyResponse))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fake_client_replays_script_in_order() {
        let fake = FakeLlmClient::new(vec![
            Ok(json!({"first": true})),
            Err(LlmError::EmptyResponse),
        ]);

        assert!(fake.complete_json("s", "u").unwrap()["first"].as_bool().unwrap());
        assert!(fake.complete_json("s", "u").is_err());
        // Script exhausted: last entry repeats
        assert!(fake.complete_json("s", "u").is_err());
        assert_eq!(fake.calls(), 3);
    }

    #[test]
    fn code_fences_are_stripped_before_parsing() {
        let parsed = parse_model_json("```json\n{\"ok\": 1}\n```").unwrap();
        assert_eq!(parsed["ok"], 1);

        let bare = parse_model_json("{\"ok\": 2}").unwrap();
        assert_eq!(bare["ok"], 2);
    }

    #[test]
    fn non_json_output_is_an_invalid_json_error() {
        assert!(matches!(
            parse_model_json("the ingredient looks safe to me"),
            Err(LlmError::InvalidJson(_))
        ));
    }
}
