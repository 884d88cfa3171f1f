//! Generation service client
//!
//! This module provides the interface to the external text-generation
//! service, with support for multiple LLM backends (Anthropic, OpenAI,
//! local Ollama). Uses BYOK (bring your own key) model - read API keys from
//! environment variables.
//!
//! # Environment Variables
//!
//! - `ANTHROPIC_API_KEY`: Required for Anthropic backend
//! - `OPENAI_API_KEY`: Required for OpenAI backend

mod client;
mod prompts;

pub use client::{AiClient, LlmBackend, Message, Role};
pub use prompts::compose_prompts;

use crate::models::{ModelParams, PromptBundle};
use thiserror::Error;

/// Errors that can occur in the generation client
#[derive(Error, Debug)]
pub enum GenError {
    #[error("Missing API key: {env_var} not set. Get your key at {signup_url}")]
    MissingApiKey { env_var: String, signup_url: String },

    #[error("API request failed: {0}")]
    Transport(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

pub type GenResult<T> = Result<T, GenError>;

/// What one generation call produced. Failure is data here, not an error;
/// the generator decides whether a round is fatal.
#[derive(Debug, Clone)]
pub enum ServiceResponse {
    Success {
        text: String,
        status: u16,
        status_text: String,
        latency_ms: u64,
    },
    Failure {
        status: u16,
        status_text: String,
        latency_ms: u64,
        error_text: String,
    },
}

/// The external text-generation service, as the pipeline sees it.
///
/// Production uses [`AiClient`]; tests substitute scripted responses.
pub trait GenerationService: Send + Sync {
    fn generate(&self, prompt: &PromptBundle, params: &ModelParams) -> ServiceResponse;
}
