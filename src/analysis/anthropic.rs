use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::types::LlmClient;
use super::AnalysisError;
use crate::config::AnalyzerConfig;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Blocking client for the Anthropic Messages API.
///
/// The underlying HTTP client is built per call so it lives and dies on the
/// worker thread that makes the request.
pub struct AnthropicClient {
    api_key: Option<String>,
    base_url: String,
    timeout_secs: u64,
}

impl AnthropicClient {
    pub fn new(api_key: Option<String>, base_url: &str, timeout_secs: u64) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
        }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(config.api_key.clone(), &config.base_url, config.timeout_secs)
    }

    fn map_transport_error(&self, e: reqwest::Error) -> AnalysisError {
        if e.is_timeout() {
            AnalysisError::UpstreamTimeout(self.timeout_secs)
        } else if e.is_connect() {
            AnalysisError::Upstream(format!("cannot connect to {}", self.base_url))
        } else {
            AnalysisError::Upstream(e.to_string())
        }
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [RequestMessage<'a>; 1],
}

#[derive(Serialize)]
struct RequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl LlmClient for AnthropicClient {
    fn generate(
        &self,
        model: &str,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, AnalysisError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AnalysisError::Configuration("API key is not set".into()))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| AnalysisError::Upstream(format!("HTTP client: {e}")))?;

        let url = format!("{}/v1/messages", self.base_url);
        let body = MessagesRequest {
            model,
            max_tokens,
            messages: [RequestMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AnalysisError::Upstream(format!(
                "status {}: {body}",
                status.as_u16()
            )));
        }

        let bytes = response.bytes().map_err(|e| self.map_transport_error(e))?;
        let parsed: MessagesResponse = serde_json::from_slice(&bytes)
            .map_err(|e| AnalysisError::Upstream(format!("invalid response body: {e}")))?;

        let first = parsed
            .content
            .into_iter()
            .next()
            .ok_or_else(|| AnalysisError::Upstream("response has no content".into()))?;

        if first.kind != "text" {
            return Err(AnalysisError::UnsupportedResponseShape(first.kind));
        }

        match first.text {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(AnalysisError::Upstream("response text is empty".into())),
        }
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Scripted LLM client for tests and local runs without a credential.
///
/// Replies are handed out in order; the last one repeats once the script
/// runs out. Every prompt received is recorded.
pub struct MockLlmClient {
    replies: Mutex<VecDeque<Result<String, AnalysisError>>>,
    last: Result<String, AnalysisError>,
    prompts: Mutex<Vec<String>>,
    configured: bool,
    delay: Duration,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self::scripted(vec![Ok(response.to_string())])
    }

    pub fn failing(error: AnalysisError) -> Self {
        Self::scripted(vec![Err(error)])
    }

    pub fn scripted(replies: Vec<Result<String, AnalysisError>>) -> Self {
        let last = replies
            .last()
            .cloned()
            .unwrap_or_else(|| Ok(String::new()));
        Self {
            replies: Mutex::new(replies.into()),
            last,
            prompts: Mutex::new(Vec::new()),
            configured: true,
            delay: Duration::ZERO,
        }
    }

    /// Behaves as if no credential were configured.
    pub fn unconfigured(mut self) -> Self {
        self.configured = false;
        self
    }

    /// Sleep before every reply.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }
}

impl LlmClient for MockLlmClient {
    fn generate(
        &self,
        _model: &str,
        prompt: &str,
        _max_tokens: u32,
    ) -> Result<String, AnalysisError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        let next = self.replies.lock().ok().and_then(|mut q| q.pop_front());
        next.unwrap_or_else(|| self.last.clone())
    }

    fn is_configured(&self) -> bool {
        self.configured
    }
}
