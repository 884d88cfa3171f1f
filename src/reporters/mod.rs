//! Output reporters and the diagnostics sink
//!
//! Supports two output formats for the CLI:
//! - `text` - Terminal output with colors
//! - `json` - Machine-readable JSON
//!
//! The diagnostics sink receives one structured [`SelectionTrace`] per
//! pipeline run. Delivery is best-effort: the pipeline swallows sink
//! failures.

use crate::models::{CopyResult, SelectionTrace};
use anyhow::{anyhow, Result};
use console::style;
use std::str::FromStr;
use tracing::info;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown format '{}'. Valid formats: text, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Receives structured diagnostic events from the pipeline.
pub trait DiagnosticsSink: Send + Sync {
    fn emit(&self, trace: &SelectionTrace) -> Result<()>;
}

/// Default sink: structured events through `tracing`.
#[derive(Debug, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn emit(&self, trace: &SelectionTrace) -> Result<()> {
        let payload = serde_json::to_string(trace)?;
        info!(target: "copysmith::trace", %payload, "selection trace");
        Ok(())
    }
}

/// Sink that drops everything. For tests and `--quiet` runs.
#[derive(Debug, Default)]
pub struct NullSink;

impl DiagnosticsSink for NullSink {
    fn emit(&self, _trace: &SelectionTrace) -> Result<()> {
        Ok(())
    }
}

/// Sink that keeps the latest trace in memory so callers can render it
/// after the run.
#[derive(Debug, Default)]
pub struct MemorySink(std::sync::Mutex<Option<SelectionTrace>>);

impl MemorySink {
    pub fn take(&self) -> Option<SelectionTrace> {
        self.0.lock().ok().and_then(|mut slot| slot.take())
    }
}

impl DiagnosticsSink for MemorySink {
    fn emit(&self, trace: &SelectionTrace) -> Result<()> {
        if let Ok(mut slot) = self.0.lock() {
            *slot = Some(trace.clone());
        }
        Ok(())
    }
}

/// Render a finished result in the requested format.
pub fn render_result(
    result: &CopyResult,
    trace: Option<&SelectionTrace>,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "result": result,
                "trace": trace,
            });
            Ok(serde_json::to_string_pretty(&value)?)
        }
        OutputFormat::Text => Ok(render_text(result, trace)),
    }
}

fn render_text(result: &CopyResult, trace: Option<&SelectionTrace>) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", style("Generated copy").bold().green()));
    out.push_str(&format!("{}\n", result.text));
    out.push_str(&format!(
        "\n{} style={} tone={} template={} cta={}\n",
        style("meta:").dim(),
        result.meta.style,
        result.meta.tone,
        result.meta.template_key,
        result.meta.cta_mode
    ));
    if let Some(trace) = trace {
        out.push_str(&format!(
            "{} winner=#{} score={} density={} rescue={:?}\n",
            style("selection:").dim(),
            trace.selected_index,
            trace.selected_score,
            trace
                .density_a
                .map(|d| format!("{d:.2}"))
                .unwrap_or_else(|| "n/a".to_string()),
            trace.rescue.outcome
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CopyMeta;

    fn result() -> CopyResult {
        CopyResult {
            text: "テスト本文です。".to_string(),
            meta: CopyMeta {
                style: "standard".to_string(),
                tone: "neutral".to_string(),
                template_key: "lead2_bullets3_v1".to_string(),
                cta_mode: "none".to_string(),
            },
        }
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("sarif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_json_render_round_trips() {
        let rendered = render_result(&result(), None, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["result"]["text"], "テスト本文です。");
        assert!(value["trace"].is_null());
    }

    #[test]
    fn test_text_render_contains_copy() {
        let rendered = render_result(&result(), None, OutputFormat::Text).unwrap();
        assert!(rendered.contains("テスト本文です。"));
        assert!(rendered.contains("lead2_bullets3_v1"));
    }
}
