//! Ollama `/api/generate` client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::Llm;
use crate::config::LlmConfig;
use crate::error::{BridgeError, BridgeResult};

/// Information about an available model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub size: u64,
    pub modified_at: String,
}

#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    models: Vec<ModelInfo>,
}

/// List available models from Ollama
pub async fn list_models(ollama_url: &str) -> BridgeResult<Vec<ModelInfo>> {
    let api_url = endpoint(ollama_url, "api/tags")?;

    let response = Client::new().get(api_url).send().await?;
    let response: OllamaTagsResponse = check_status(response).await?.json().await?;

    Ok(response.models)
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Non-streaming Ollama client
pub struct OllamaClient {
    client: Client,
    generate_url: url::Url,
    model: String,
    temperature: f32,
    num_predict: u32,
}

impl OllamaClient {
    /// Create a client from config; the timeout applies to each whole request
    pub fn new(config: &LlmConfig) -> BridgeResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("sql-bridge/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            generate_url: endpoint(&config.url, "api/generate")?,
            model: config.model.clone(),
            temperature: config.temperature,
            num_predict: config.num_predict,
        })
    }
}

#[async_trait]
impl Llm for OllamaClient {
    async fn generate(&self, prompt: &str) -> BridgeResult<String> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
                num_predict: self.num_predict,
            },
        };

        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "Sending generate request");

        let response = self
            .client
            .post(self.generate_url.clone())
            .json(&request)
            .send()
            .await?;

        let body: GenerateResponse = check_status(response).await?.json().await?;
        Ok(body.response)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Join `path` onto the base URL, tolerating a missing trailing slash
fn endpoint(base: &str, path: &str) -> BridgeResult<url::Url> {
    let mut base = url::Url::parse(base)
        .map_err(|e| BridgeError::Config(format!("invalid Ollama URL {:?}: {}", base, e)))?;

    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }

    base.join(path)
        .map_err(|e| BridgeError::Config(format!("invalid Ollama endpoint {:?}: {}", path, e)))
}

async fn check_status(response: reqwest::Response) -> BridgeResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(BridgeError::LlmStatus {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_join() {
        assert_eq!(
            endpoint("http://localhost:11434", "api/generate").unwrap().as_str(),
            "http://localhost:11434/api/generate"
        );
        assert_eq!(
            endpoint("http://gpu-box:11434/", "api/tags").unwrap().as_str(),
            "http://gpu-box:11434/api/tags"
        );
        assert_eq!(
            endpoint("http://proxy/ollama", "api/generate").unwrap().as_str(),
            "http://proxy/ollama/api/generate"
        );
        assert!(endpoint("not a url", "api/generate").is_err());
    }

    #[test]
    fn test_request_body_shape() {
        let request = GenerateRequest {
            model: "qwen2.5-coder:3b",
            prompt: "SELECT?",
            stream: false,
            options: GenerateOptions {
                temperature: 0.5,
                num_predict: 250,
            },
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "qwen2.5-coder:3b",
                "prompt": "SELECT?",
                "stream": false,
                "options": {"temperature": 0.5, "num_predict": 250}
            })
        );
    }

    #[test]
    fn test_missing_response_field_is_empty() {
        let body: GenerateResponse = serde_json::from_str(r#"{"done": true}"#).unwrap();
        assert_eq!(body.response, "");
    }

    #[test]
    fn test_client_rejects_bad_url() {
        let config = LlmConfig {
            url: "::nope::".to_string(),
            ..LlmConfig::default()
        };
        assert!(OllamaClient::new(&config).is_err());
    }
}
