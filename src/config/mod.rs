//! User-level configuration for copysmith
//!
//! Supports loading config from:
//! - Environment variables
//! - ~/.config/copysmith/config.toml

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UserConfig {
    #[serde(default)]
    pub ai: AiSettings,
    #[serde(default)]
    pub pipeline: PipelineSettings,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AiSettings {
    /// Anthropic API key
    pub anthropic_api_key: Option<String>,

    /// OpenAI API key
    pub openai_api_key: Option<String>,

    /// Default model to use
    pub model: Option<String>,

    /// Backend: "anthropic" (default), "openai", "ollama"
    pub backend: Option<String>,

    /// Sampling temperature
    pub temperature: Option<f32>,
}

/// File-level defaults for the pipeline toggles. The CLI folds these into
/// the explicit `PipelineConfig` object handed to the pipeline.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PipelineSettings {
    /// Concurrent attempts in the initial round
    pub attempts: Option<usize>,

    /// Allow the single rescue round
    pub rescue: Option<bool>,

    /// Allow the density-deficit rescue trigger
    pub density_rescue: Option<bool>,

    /// Mask input phrases in trace events
    pub mask_trace_phrases: Option<bool>,
}

impl UserConfig {
    /// Load config from all sources, with priority:
    /// 1. Environment variables (highest)
    /// 2. User config (~/.config/copysmith/config.toml)
    pub fn load() -> Result<Self> {
        let mut config = UserConfig::default();

        if let Some(user_config) = Self::user_config_path()
            .filter(|p| p.exists())
            .and_then(|p| std::fs::read_to_string(&p).ok())
            .and_then(|content| toml::from_str::<UserConfig>(&content).ok())
        {
            config.merge(user_config);
        }

        // Environment variables override everything
        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            config.ai.anthropic_api_key = Some(key);
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            config.ai.openai_api_key = Some(key);
        }

        Ok(config)
    }

    /// Get the user config directory path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("copysmith").join("config.toml"))
    }

    /// Merge another config into this one (other takes priority)
    fn merge(&mut self, other: UserConfig) {
        if other.ai.anthropic_api_key.is_some() {
            self.ai.anthropic_api_key = other.ai.anthropic_api_key;
        }
        if other.ai.openai_api_key.is_some() {
            self.ai.openai_api_key = other.ai.openai_api_key;
        }
        if other.ai.model.is_some() {
            self.ai.model = other.ai.model;
        }
        if other.ai.backend.is_some() {
            self.ai.backend = other.ai.backend;
        }
        if other.ai.temperature.is_some() {
            self.ai.temperature = other.ai.temperature;
        }
        if other.pipeline.attempts.is_some() {
            self.pipeline.attempts = other.pipeline.attempts;
        }
        if other.pipeline.rescue.is_some() {
            self.pipeline.rescue = other.pipeline.rescue;
        }
        if other.pipeline.density_rescue.is_some() {
            self.pipeline.density_rescue = other.pipeline.density_rescue;
        }
        if other.pipeline.mask_trace_phrases.is_some() {
            self.pipeline.mask_trace_phrases = other.pipeline.mask_trace_phrases;
        }
    }

    /// Get the AI backend name
    pub fn ai_backend(&self) -> &str {
        self.ai.backend.as_deref().unwrap_or("anthropic")
    }

    /// Initialize user config directory and create example config
    pub fn init_user_config() -> Result<PathBuf> {
        let config_path = Self::user_config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        if !config_path.exists() {
            let example = r#"# Copysmith User Configuration

[ai]
# Backend: "anthropic" (default), "openai", or "ollama" (free, local)
# backend = "anthropic"
# model = "claude-sonnet-4-20250514"
# temperature = 0.7
# anthropic_api_key = "sk-ant-..."

[pipeline]
# attempts = 3
# rescue = true
# density_rescue = true
# mask_trace_phrases = true
"#;
            std::fs::write(&config_path, example)?;
        }

        Ok(config_path)
    }
}
