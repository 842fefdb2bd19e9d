use crate::error::{ComplianceError, Result};
use crate::llm::types::*;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;

const OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Anything that can answer a chat request with a text completion.
///
/// The analyzer is generic over this seam so tests substitute a scripted
/// model for the real endpoint.
pub trait ChatModel {
    fn chat(
        &self,
        model: &str,
        temperature: f32,
        messages: &[ChatMessage],
    ) -> impl Future<Output = Result<String>> + Send;
}

/// HTTP client for an Ollama-style `/api/chat` endpoint.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn localhost() -> Self {
        Self::new(OLLAMA_BASE_URL)
    }

    /// Client with a whole-request deadline. Model inference runs seconds to
    /// tens of seconds; the timeout bounds how long a caller can be stuck on
    /// an unresponsive endpoint.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

impl ChatModel for OllamaClient {
    async fn chat(
        &self,
        model: &str,
        temperature: f32,
        messages: &[ChatMessage],
    ) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);
        let payload = ChatRequestBody {
            model,
            messages,
            stream: false,
            options: ChatOptions { temperature },
        };

        let res = self.client.post(&url).json(&payload).send().await?;
        let status = res.status();

        if !status.is_success() {
            let message = res.text().await?;
            return Err(ComplianceError::Model {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponseBody = res.json().await?;

        if let Some(error) = body.error {
            return Err(ComplianceError::Model {
                status: status.as_u16(),
                message: error,
            });
        }

        body.message
            .map(|message| message.content)
            .ok_or_else(|| ComplianceError::Model {
                status: status.as_u16(),
                message: "response missing message content".to_string(),
            })
    }
}
