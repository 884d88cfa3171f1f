//! LLM API client supporting OpenAI and Anthropic backends
//!
//! Provides a unified interface for making API calls to different LLM providers.
//! Uses ureq (sync HTTP) — no async runtime needed; the pipeline fans the
//! three attempts out over rayon.

use crate::ai::{GenError, GenResult, GenerationService, ServiceResponse};
use crate::models::{ModelParams, PromptBundle};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Instant;

/// Supported LLM backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmBackend {
    #[default]
    Anthropic,
    OpenAi,
    Ollama,
}

impl LlmBackend {
    pub fn env_key(&self) -> &'static str {
        match self {
            LlmBackend::Anthropic => "ANTHROPIC_API_KEY",
            LlmBackend::OpenAi => "OPENAI_API_KEY",
            LlmBackend::Ollama => "OLLAMA_MODEL",
        }
    }

    pub fn signup_url(&self) -> &'static str {
        match self {
            LlmBackend::Anthropic => "https://console.anthropic.com/settings/keys",
            LlmBackend::OpenAi => "https://platform.openai.com/api-keys",
            LlmBackend::Ollama => "https://ollama.ai (no key needed, just run locally)",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            LlmBackend::Anthropic => "claude-sonnet-4-20250514",
            LlmBackend::OpenAi => "gpt-4o",
            LlmBackend::Ollama => "qwen2.5:7b",
        }
    }

    pub fn api_url(&self) -> &'static str {
        match self {
            LlmBackend::Anthropic => "https://api.anthropic.com/v1/messages",
            LlmBackend::OpenAi => "https://api.openai.com/v1/chat/completions",
            LlmBackend::Ollama => "http://localhost:11434/v1/chat/completions",
        }
    }

    pub fn is_openai_compatible(&self) -> bool {
        matches!(self, LlmBackend::OpenAi | LlmBackend::Ollama)
    }

    pub fn requires_api_key(&self) -> bool {
        !matches!(self, LlmBackend::Ollama)
    }
}

impl std::str::FromStr for LlmBackend {
    type Err = GenError;

    fn from_str(s: &str) -> GenResult<Self> {
        match s.to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(LlmBackend::Anthropic),
            "openai" => Ok(LlmBackend::OpenAi),
            "ollama" => Ok(LlmBackend::Ollama),
            other => Err(GenError::ConfigError(format!(
                "Unknown backend '{other}'. Valid backends: anthropic, openai, ollama"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// Maximum tokens per generation call. Copy is short; this is headroom.
const MAX_TOKENS: u32 = 2048;

/// Unified LLM client — sync HTTP via ureq (no tokio needed)
pub struct AiClient {
    backend: LlmBackend,
    api_key: String,
    agent: ureq::Agent,
}

fn make_agent() -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false) // We handle status codes ourselves
        .timeout_global(Some(std::time::Duration::from_secs(120))) // LLM calls can be slow
        .build()
        .new_agent()
}

impl AiClient {
    pub fn new(backend: LlmBackend, api_key: impl Into<String>) -> Self {
        Self {
            backend,
            api_key: api_key.into(),
            agent: make_agent(),
        }
    }

    pub fn from_env(backend: LlmBackend) -> GenResult<Self> {
        if !backend.requires_api_key() {
            return Ok(Self::new(backend, "ollama"));
        }

        let env_key = backend.env_key();
        let api_key = env::var(env_key).map_err(|_| GenError::MissingApiKey {
            env_var: env_key.to_string(),
            signup_url: backend.signup_url().to_string(),
        })?;

        Ok(Self::new(backend, api_key))
    }

    pub fn backend(&self) -> LlmBackend {
        self.backend
    }

    /// One generation call (sync). Returns the text and the HTTP status it
    /// rode in on.
    fn call(&self, prompt: &PromptBundle, params: &ModelParams) -> GenResult<(String, u16, String)> {
        if self.backend.is_openai_compatible() {
            self.call_openai(prompt, params)
        } else {
            self.call_anthropic(prompt, params)
        }
    }

    fn call_openai(
        &self,
        prompt: &PromptBundle,
        params: &ModelParams,
    ) -> GenResult<(String, u16, String)> {
        let messages = vec![
            Message::system(&prompt.system),
            Message::user(&prompt.user),
        ];
        let body = OpenAiRequest {
            model: params.model.clone(),
            messages,
            max_tokens: MAX_TOKENS,
            temperature: params.temperature,
        };

        let mut req = self
            .agent
            .post(self.backend.api_url())
            .header("Content-Type", "application/json");

        if self.backend.requires_api_key() {
            req = req.header("Authorization", &format!("Bearer {}", self.api_key));
        }

        let response = req
            .send_json(&body)
            .map_err(|e| GenError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let status_text = reason_phrase(&response);
        if status >= 400 {
            let error_text = response.into_body().read_to_string().unwrap_or_default();
            return Err(GenError::ApiError {
                status,
                message: error_text,
            });
        }

        let resp: OpenAiResponse = response
            .into_body()
            .read_json()
            .map_err(|e| GenError::ParseError(e.to_string()))?;

        resp.choices
            .into_iter()
            .next()
            .map(|c| (c.message.content, status, status_text))
            .ok_or_else(|| GenError::ParseError("No response choices".to_string()))
    }

    fn call_anthropic(
        &self,
        prompt: &PromptBundle,
        params: &ModelParams,
    ) -> GenResult<(String, u16, String)> {
        let body = AnthropicRequest {
            model: params.model.clone(),
            max_tokens: MAX_TOKENS,
            messages: vec![Message::user(&prompt.user)],
            system: Some(prompt.system.clone()),
            temperature: Some(params.temperature),
        };

        let response = self
            .agent
            .post(self.backend.api_url())
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .send_json(&body)
            .map_err(|e| GenError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let status_text = reason_phrase(&response);
        if status >= 400 {
            let error_text = response.into_body().read_to_string().unwrap_or_default();
            return Err(GenError::ApiError {
                status,
                message: error_text,
            });
        }

        let resp: AnthropicResponse = response
            .into_body()
            .read_json()
            .map_err(|e| GenError::ParseError(e.to_string()))?;

        resp.content
            .into_iter()
            .find(|c| c.content_type == "text")
            .map(|c| (c.text, status, status_text))
            .ok_or_else(|| GenError::ParseError("No text content in response".to_string()))
    }
}

fn reason_phrase<B>(response: &ureq::http::Response<B>) -> String {
    response
        .status()
        .canonical_reason()
        .unwrap_or("")
        .to_string()
}

impl GenerationService for AiClient {
    fn generate(&self, prompt: &PromptBundle, params: &ModelParams) -> ServiceResponse {
        let started = Instant::now();
        match self.call(prompt, params) {
            Ok((text, status, status_text)) => ServiceResponse::Success {
                text,
                status,
                status_text,
                latency_ms: started.elapsed().as_millis() as u64,
            },
            Err(err) => {
                let (status, status_text) = match &err {
                    GenError::ApiError { status, .. } => (*status, String::new()),
                    _ => (0, String::new()),
                };
                ServiceResponse::Failure {
                    status,
                    status_text,
                    latency_ms: started.elapsed().as_millis() as u64,
                    error_text: err.to_string(),
                }
            }
        }
    }
}

// OpenAI API types
#[derive(Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    content: String,
}

// Anthropic API types
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    #[serde(rename = "type")]
    content_type: String,
    text: String,
}
