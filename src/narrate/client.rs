use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::LlmSettings;
use crate::error::NarrateError;

/// One chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Anything that can turn a conversation into a reply.
pub trait ChatBackend {
    fn complete(&self, messages: &[ChatMessage]) -> Result<String, NarrateError>;
}

/// Blocking client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct HttpBackend {
    client: reqwest::blocking::Client,
    url: String,
    model: String,
    api_key: String,
    temperature: f32,
    seed: Option<u64>,
}

impl HttpBackend {
    pub fn new(llm: &LlmSettings, api_key: String) -> Result<Self, NarrateError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(llm.timeout_secs))
            .build()
            .map_err(|e| NarrateError::Transport(e.to_string()))?;
        let url = if llm.base_url.ends_with('/') {
            format!("{}chat/completions", llm.base_url)
        } else {
            format!("{}/chat/completions", llm.base_url)
        };
        Ok(Self {
            client,
            url,
            model: llm.model.clone(),
            api_key,
            temperature: llm.temperature,
            seed: llm.seed,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl ChatBackend for HttpBackend {
    fn complete(&self, messages: &[ChatMessage]) -> Result<String, NarrateError> {
        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
        });
        if let Some(seed) = self.seed {
            body["seed"] = json!(seed);
        }

        log::debug!("POST {} ({} messages)", self.url, messages.len());
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| NarrateError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            return Err(NarrateError::Status { status, body });
        }

        let json: serde_json::Value = response
            .json()
            .map_err(|e| NarrateError::InvalidResponse(e.to_string()))?;

        extract_content(&json)
    }
}

/// Pull `choices[0].message.content` out of a completion response.
pub fn extract_content(json: &serde_json::Value) -> Result<String, NarrateError> {
    json["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.trim().to_string())
        .ok_or_else(|| NarrateError::InvalidResponse("missing choices[0].message.content".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_choice() {
        let json = json!({ "choices": [{ "message": { "role": "assistant", "content": "  ok \n" } }] });
        assert_eq!(extract_content(&json).unwrap(), "ok");
    }

    #[test]
    fn null_content_is_invalid() {
        let json = json!({ "choices": [{ "message": { "content": null } }] });
        assert!(matches!(extract_content(&json), Err(NarrateError::InvalidResponse(_))));
    }

    #[test]
    fn url_joins_with_and_without_slash() {
        let mut llm = LlmSettings::default();
        llm.base_url = "http://localhost:8080/v1/".into();
        let backend = HttpBackend::new(&llm, "k".into()).unwrap();
        assert_eq!(backend.url, "http://localhost:8080/v1/chat/completions");
        assert_eq!(backend.model(), "groq/compound");
    }

    #[test]
    fn messages_serialize_as_role_content() {
        let value = serde_json::to_value(ChatMessage::user("hi")).unwrap();
        assert_eq!(value, json!({ "role": "user", "content": "hi" }));
    }
}
