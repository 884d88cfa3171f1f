//! `copysmith score`: offline repair + scoring for an existing text
//!
//! Useful for debugging the rule set against real candidates without
//! spending LLM calls.

use crate::density;
use crate::models::{Candidate, CandidateOutcome, RepairedCandidate};
use crate::repair;
use crate::reporters::OutputFormat;
use crate::scoring;
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

pub fn run(input_path: &Path, text_path: &Path, format: &str) -> Result<()> {
    let format: OutputFormat = format.parse()?;
    let input = super::generate::load_input(input_path)?;
    let raw = std::fs::read_to_string(text_path)
        .with_context(|| format!("Failed to read text file {}", text_path.display()))?;

    let (text, did_repair) = repair::repair_text(&raw, &input.audience);
    let set = density::build_input_set(&input);
    let repaired = RepairedCandidate {
        candidate: Candidate {
            index: 1,
            outcome: CandidateOutcome::Success {
                text: raw.clone(),
                latency_ms: 0,
                status: 200,
                status_text: "OK".to_string(),
            },
        },
        text,
        did_repair,
    };
    let scored = scoring::score_candidate(&input, &set, &repaired);

    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "score": scored.score,
                "disqualified": scored.disqualified,
                "did_repair": scored.did_repair,
                "reasons": scored.reason_codes(),
                "facts": scored.facts,
                "density_a": scored.density_a,
                "input_count": scored.input_count,
                "used_count": scored.used_count,
                "repaired_text": scored.text,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            println!("{} {}", style("score:").bold(), scored.score);
            println!(
                "{} {}/{} ({})",
                style("density:").bold(),
                scored.used_count,
                scored.input_count,
                scored
                    .density_a
                    .map(|d| format!("{d:.2}"))
                    .unwrap_or_else(|| "n/a".to_string())
            );
            if scored.disqualified {
                println!("{}", style("disqualified (diagnostic only)").red());
            }
            for reason in scored.reason_codes() {
                println!("  - {reason}");
            }
            if scored.did_repair {
                println!("\n{}\n{}", style("repaired text:").dim(), scored.text);
            }
        }
    }
    Ok(())
}
