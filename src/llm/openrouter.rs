//! OpenAI-compatible client for OpenRouter.
//!
//! Both model services behind the pipeline (embeddings and chat
//! completions) are reached through this one endpoint with a bearer
//! credential. Requests carry a client-level timeout; the chat call gets
//! one retry on transient failures.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::provider::{LlmProvider, ProviderError};
use super::types::ChatRequest;
use crate::core::config::settings::ProviderSettings;

const PROVIDER_NAME: &str = "openrouter";
const CHAT_ATTEMPTS: usize = 2;

#[derive(Clone)]
pub struct OpenRouterProvider {
    base_url: String,
    api_key: String,
    chat_model: String,
    embedding_model: String,
    client: Client,
}

impl OpenRouterProvider {
    pub fn new(settings: &ProviderSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            chat_model: settings.chat_model.clone(),
            embedding_model: settings.embedding_model.clone(),
            client,
        })
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                provider: PROVIDER_NAME,
                status: status.as_u16(),
                body,
            });
        }

        Ok(res.json().await?)
    }

    async fn chat_once(&self, request: &ChatRequest) -> Result<String, ProviderError> {
        let mut body = json!({
            "model": self.chat_model,
            "messages": request.messages,
            "stream": false,
        });

        if let Some(obj) = body.as_object_mut() {
            if let Some(t) = request.temperature {
                obj.insert("temperature".to_string(), json!(t));
            }
            if let Some(t) = request.max_tokens {
                obj.insert("max_tokens".to_string(), json!(t));
            }
        }

        let payload = self.post_json("/chat/completions", &body).await?;

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(|content| content.to_string())
            .ok_or(ProviderError::MalformedResponse(PROVIDER_NAME))
    }
}

#[async_trait]
impl LlmProvider for OpenRouterProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn chat(&self, request: ChatRequest) -> Result<String, ProviderError> {
        let mut last_err = None;
        for attempt in 1..=CHAT_ATTEMPTS {
            match self.chat_once(&request).await {
                Ok(content) => return Ok(content),
                Err(err) if err.is_transient() && attempt < CHAT_ATTEMPTS => {
                    tracing::warn!("chat attempt {} failed, retrying: {}", attempt, err);
                    last_err = Some(err);
                }
                Err(err) => return Err(err),
            }
        }
        Err(last_err.unwrap_or(ProviderError::MalformedResponse(PROVIDER_NAME)))
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        let body = json!({
            "model": self.embedding_model,
            "input": inputs,
        });

        let payload = self.post_json("/embeddings", &body).await?;

        let data = payload["data"]
            .as_array()
            .ok_or(ProviderError::MalformedResponse(PROVIDER_NAME))?;

        let mut embeddings = Vec::with_capacity(data.len());
        for item in data {
            let values = item["embedding"]
                .as_array()
                .ok_or(ProviderError::MalformedResponse(PROVIDER_NAME))?;
            let vector: Vec<f32> = values
                .iter()
                .filter_map(|v| v.as_f64().map(|f| f as f32))
                .collect();
            embeddings.push(vector);
        }

        if embeddings.len() != inputs.len() {
            return Err(ProviderError::MalformedResponse(PROVIDER_NAME));
        }

        Ok(embeddings)
    }
}
