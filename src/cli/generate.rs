//! `copysmith generate`: run the full pipeline for one request

use crate::ai::{compose_prompts, AiClient, LlmBackend};
use crate::config::UserConfig;
use crate::models::{ModelParams, NormalizedInput};
use crate::pipeline::{CopyPipeline, PipelineConfig};
use crate::reporters::{self, MemorySink, OutputFormat};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;

pub struct GenerateArgs {
    pub input: PathBuf,
    pub format: String,
    pub output: Option<PathBuf>,
    pub backend: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub attempts: Option<usize>,
    pub no_rescue: bool,
}

pub fn run(args: GenerateArgs) -> Result<()> {
    let format: OutputFormat = args.format.parse()?;
    let input = load_input(&args.input)?;
    let user_config = UserConfig::load()?;

    let backend: LlmBackend = args
        .backend
        .as_deref()
        .unwrap_or_else(|| user_config.ai_backend())
        .parse()?;
    let client = AiClient::from_env(backend)?;

    let params = ModelParams {
        model: args
            .model
            .or_else(|| user_config.ai.model.clone())
            .unwrap_or_else(|| backend.default_model().to_string()),
        temperature: args
            .temperature
            .or(user_config.ai.temperature)
            .unwrap_or(0.7),
    };

    let defaults = PipelineConfig::default();
    let config = PipelineConfig {
        attempts: args
            .attempts
            .or(user_config.pipeline.attempts)
            .unwrap_or(defaults.attempts),
        rescue_enabled: !args.no_rescue
            && user_config.pipeline.rescue.unwrap_or(defaults.rescue_enabled),
        density_rescue_enabled: user_config
            .pipeline
            .density_rescue
            .unwrap_or(defaults.density_rescue_enabled),
        mask_trace_phrases: user_config
            .pipeline
            .mask_trace_phrases
            .unwrap_or(defaults.mask_trace_phrases),
        ..defaults
    };

    let sink = Arc::new(MemorySink::default());
    let pipeline = CopyPipeline::new(Arc::new(client), sink.clone(), config);
    let prompt = compose_prompts(&input);

    match pipeline.run(&input, &prompt, &params) {
        Ok(result) => {
            let trace = sink.take();
            let rendered = reporters::render_result(&result, trace.as_ref(), format)?;
            write_output(args.output.as_deref(), &rendered)
        }
        Err(err) => {
            error!(
                reason = err.reason(),
                correlation_id = err.correlation_id(),
                "pipeline failed"
            );
            Err(err.into())
        }
    }
}

pub(crate) fn load_input(path: &std::path::Path) -> Result<NormalizedInput> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read request file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid request JSON in {}", path.display()))
}

fn write_output(path: Option<&std::path::Path>, rendered: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
            Ok(())
        }
        None => {
            println!("{rendered}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_input_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request.json");
        std::fs::write(
            &path,
            r#"{
                "product_name": "Acmeタンブラー",
                "category": "ドリンクウェア",
                "goal": "デスクで飲み物を保温する",
                "audience": "オフィスワーカー",
                "selling_points": ["保温6時間"]
            }"#,
        )
        .unwrap();

        let input = load_input(&path).unwrap();
        assert_eq!(input.product_name, "Acmeタンブラー");
        assert_eq!(input.selling_points.len(), 1);
    }

    #[test]
    fn test_load_input_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(load_input(&path).is_err());
    }
}
