//! Blocking client for the HuggingFace inference API.
//!
//! Every model is addressed as `POST {endpoint}/{model}` with a JSON body of
//! `{"inputs": ...}`. Text generation models answer with
//! `[{"generated_text": ...}]`, feature extraction models with a flat array
//! of floats.

use crate::generation::{AttemptError, GenerationBackend};
use crate::semantic::EmbeddingBackend;
use anyhow::{anyhow, bail};
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

pub struct HuggingFaceClient {
    http: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HuggingFaceClient {
    pub fn new(
        endpoint: &str,
        api_key: Option<String>,
        timeout: Option<Duration>,
    ) -> anyhow::Result<Self> {
        // None lifts the blocking client's built-in 30s limit
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn post(&self, model: &str, inputs: &str) -> anyhow::Result<Response> {
        let url = format!("{}/{}", self.endpoint, model);

        let mut request = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&json!({ "inputs": inputs }));

        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            bail!("status {}, body: {}", status.as_u16(), body);
        }

        Ok(response)
    }

    /// Run a text generation model and return the first generated text.
    pub fn generate(&self, model: &str, prompt: &str) -> anyhow::Result<String> {
        let outputs: Vec<GeneratedText> = self.post(model, prompt)?.json()?;
        outputs
            .into_iter()
            .next()
            .map(|o| o.generated_text)
            .ok_or_else(|| anyhow!("no response from {model}"))
    }

    /// Run a feature extraction model.
    pub fn embed(&self, model: &str, text: &str) -> anyhow::Result<Vec<f32>> {
        Ok(self.post(model, text)?.json()?)
    }
}

/// A single model on a shared client.
pub struct HuggingFaceModel {
    client: Arc<HuggingFaceClient>,
    model: String,
}

impl HuggingFaceModel {
    pub fn new(client: Arc<HuggingFaceClient>, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }
}

impl GenerationBackend for HuggingFaceModel {
    fn generate(&self, prompt: &str) -> Result<String, AttemptError> {
        self.client
            .generate(&self.model, prompt)
            .map_err(|e| AttemptError::Backend(e.to_string()))
    }

    fn name(&self) -> &str {
        &self.model
    }
}

impl EmbeddingBackend for HuggingFaceModel {
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.client.embed(&self.model, text)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
