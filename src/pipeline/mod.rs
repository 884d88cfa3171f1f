//! Copy generation pipeline
//!
//! Orchestrates the full quality-control pipeline:
//! 1. Fan out N concurrent generation attempts (join-all)
//! 2. Repair each successful candidate (bullets + audience)
//! 3. Score each candidate (violations + density)
//! 4. Order the pool and pick a winner
//! 5. At most one rescue attempt under narrow triggers
//! 6. Final safety repair on the winning text only
//!
//! Worst case external calls per request: attempts + 1.

use crate::ai::GenerationService;
use crate::density::{self, InputSet};
use crate::generator;
use crate::models::{
    Candidate, CandidateOutcome, CandidateTraceSummary, CopyMeta, CopyResult, ModelParams,
    NormalizedInput, PromptBundle, RepairedCandidate, RescueOutcome, RescueTrace, RescueTrigger,
    SelectionTrace,
};
use crate::repair::{self, final_pass};
use crate::reporters::DiagnosticsSink;
use crate::scoring::{self, ScoredCandidate};
use crate::selector;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Explicit feature toggles, passed in at construction time, never read
/// ambient at call sites.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Concurrent attempts in the initial round.
    pub attempts: usize,
    /// Master switch for the rescue round.
    pub rescue_enabled: bool,
    /// Allow the density-deficit trigger specifically.
    pub density_rescue_enabled: bool,
    /// Cap on error text carried into candidate previews.
    pub error_preview_chars: usize,
    /// Mask input phrases in trace events.
    pub mask_trace_phrases: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            rescue_enabled: true,
            density_rescue_enabled: true,
            error_preview_chars: 160,
            mask_trace_phrases: true,
        }
    }
}

/// Typed pipeline failures. The pipeline never returns a raw, unscored, or
/// partially repaired string.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Every attempt in the active round failed.
    #[error("generation_failed: {message}")]
    GenerationFailed {
        message: String,
        correlation_id: String,
    },

    /// A winner was selected but its trimmed text is empty.
    #[error("content_empty: selected candidate produced empty text")]
    ContentEmpty { correlation_id: String },

    /// Unexpected condition inside the pipeline.
    #[error("internal: {message}")]
    Internal {
        message: String,
        correlation_id: String,
    },
}

impl PipelineError {
    pub fn reason(&self) -> &'static str {
        match self {
            PipelineError::GenerationFailed { .. } => "generation_failed",
            PipelineError::ContentEmpty { .. } => "content_empty",
            PipelineError::Internal { .. } => "internal",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            PipelineError::GenerationFailed { correlation_id, .. }
            | PipelineError::ContentEmpty { correlation_id }
            | PipelineError::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

/// The quality-control pipeline.
pub struct CopyPipeline {
    service: Arc<dyn GenerationService>,
    sink: Arc<dyn DiagnosticsSink>,
    config: PipelineConfig,
}

impl CopyPipeline {
    pub fn new(
        service: Arc<dyn GenerationService>,
        sink: Arc<dyn DiagnosticsSink>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            service,
            sink,
            config,
        }
    }

    /// Run one request through generation, repair, scoring, selection, and
    /// the final safety repair.
    pub fn run(
        &self,
        input: &NormalizedInput,
        prompt: &PromptBundle,
        params: &ModelParams,
    ) -> Result<CopyResult, PipelineError> {
        let correlation_id = Uuid::new_v4().to_string();
        info!(%correlation_id, attempts = self.config.attempts, "pipeline run started");

        let mut all_attempts = generator::generate_candidates(
            self.service.as_ref(),
            prompt,
            params,
            self.config.attempts,
            1,
            self.config.error_preview_chars,
        );

        let mut successes: Vec<Candidate> = all_attempts
            .iter()
            .filter(|c| c.is_success())
            .cloned()
            .collect();

        if successes.is_empty() {
            let message = generation_failed_message(&all_attempts);
            warn!(%correlation_id, "{message}");
            return Err(PipelineError::GenerationFailed {
                message,
                correlation_id,
            });
        }

        let set = density::build_input_set(input);

        let mut ordered = selector::order_candidates(
            successes
                .iter()
                .map(|c| repair_and_score(input, &set, c.clone()))
                .collect(),
        );

        let mut rescue = RescueTrace::default();
        if self.config.rescue_enabled {
            if let Some(trigger) = selector::rescue_trigger(&ordered, set.len(), &input.audience) {
                let density_only = trigger == RescueTrigger::DensityBelowThreshold;
                if !(density_only && !self.config.density_rescue_enabled) {
                    rescue = self.run_rescue(
                        input,
                        prompt,
                        params,
                        &set,
                        trigger,
                        &mut all_attempts,
                        &mut successes,
                        &mut ordered,
                    );
                }
            }
        }

        let winner = ordered.first().ok_or_else(|| PipelineError::Internal {
            message: "ordered pool empty despite successful attempts".to_string(),
            correlation_id: correlation_id.clone(),
        })?;

        let trace = build_trace(
            &correlation_id,
            &set,
            self.config.mask_trace_phrases,
            &all_attempts,
            &ordered,
            winner,
            rescue,
        );
        if let Err(err) = self.sink.emit(&trace) {
            // Diagnostics are best-effort; a sink failure never surfaces.
            debug!(%correlation_id, "diagnostics sink failed: {err}");
        }

        if winner.text.trim().is_empty() {
            return Err(PipelineError::ContentEmpty { correlation_id });
        }

        let text = final_pass::apply_safety_repair(&winner.text);
        info!(
            %correlation_id,
            winner = winner.index(),
            score = winner.score,
            "pipeline run finished"
        );

        Ok(CopyResult {
            text,
            meta: CopyMeta {
                style: input.style.clone().unwrap_or_else(|| "standard".to_string()),
                tone: input.tone.clone().unwrap_or_else(|| "neutral".to_string()),
                template_key: prompt.template_key.clone(),
                cta_mode: prompt.cta_mode.clone(),
            },
        })
    }

    /// One additional attempt, sequential, fail-open. On success the full
    /// pool is re-repaired, re-scored, and re-ordered.
    #[allow(clippy::too_many_arguments)]
    fn run_rescue(
        &self,
        input: &NormalizedInput,
        prompt: &PromptBundle,
        params: &ModelParams,
        set: &InputSet,
        trigger: RescueTrigger,
        all_attempts: &mut Vec<Candidate>,
        successes: &mut Vec<Candidate>,
        ordered: &mut Vec<ScoredCandidate>,
    ) -> RescueTrace {
        info!(?trigger, "rescue attempt triggered");
        let extra = generator::generate_candidates(
            self.service.as_ref(),
            prompt,
            params,
            1,
            self.config.attempts + 1,
            self.config.error_preview_chars,
        );

        let mut trace = RescueTrace {
            attempted: true,
            outcome: RescueOutcome::Failed,
            trigger: Some(trigger),
        };

        for candidate in extra {
            let succeeded = candidate.is_success();
            all_attempts.push(candidate.clone());
            if succeeded {
                successes.push(candidate);
                *ordered = selector::order_candidates(
                    successes
                        .iter()
                        .map(|c| repair_and_score(input, set, c.clone()))
                        .collect(),
                );
                trace.outcome = RescueOutcome::Succeeded;
            } else {
                // Fail-open: selection proceeds unchanged with the
                // original pool.
                warn!("rescue attempt failed; keeping original pool");
            }
        }
        trace
    }
}

fn repair_and_score(
    input: &NormalizedInput,
    set: &InputSet,
    candidate: Candidate,
) -> ScoredCandidate {
    let raw = candidate.text().unwrap_or_default().to_string();
    let (text, did_repair) = repair::repair_text(&raw, &input.audience);
    let repaired = RepairedCandidate {
        candidate,
        text,
        did_repair,
    };
    scoring::score_candidate(input, set, &repaired)
}

fn generation_failed_message(attempts: &[Candidate]) -> String {
    let first_failure = attempts.iter().find_map(|c| match &c.outcome {
        CandidateOutcome::Failure {
            status,
            status_text,
            error_preview,
            ..
        } => Some(format!("{status} {status_text} {error_preview}")),
        CandidateOutcome::Success { .. } => None,
    });
    format!(
        "all {} generation attempts failed; first failure: {}; attempts: {}",
        attempts.len(),
        first_failure.unwrap_or_else(|| "unknown".to_string()),
        generator::summarize_attempts(attempts)
    )
}

fn build_trace(
    correlation_id: &str,
    set: &InputSet,
    mask_phrases: bool,
    all_attempts: &[Candidate],
    ordered: &[ScoredCandidate],
    winner: &ScoredCandidate,
    rescue: RescueTrace,
) -> SelectionTrace {
    let candidates = all_attempts
        .iter()
        .map(|attempt| {
            let scored = ordered.iter().find(|s| s.index() == attempt.index);
            CandidateTraceSummary {
                index: attempt.index,
                success: attempt.is_success(),
                status: attempt.status(),
                latency_ms: attempt.latency_ms(),
                score: scored.map(|s| s.score),
                reasons: scored.map(|s| s.reason_codes()).unwrap_or_default(),
                text_digest: scored.map(|s| crate::models::text_digest(&s.text)),
                text_chars: scored.map(|s| s.text_chars()),
                error_preview: match &attempt.outcome {
                    CandidateOutcome::Failure { error_preview, .. } => {
                        Some(error_preview.clone())
                    }
                    CandidateOutcome::Success { .. } => None,
                },
            }
        })
        .collect();

    let input_phrases = set
        .phrases
        .iter()
        .map(|p| {
            if mask_phrases {
                density::mask_phrase(p)
            } else {
                p.clone()
            }
        })
        .collect();

    SelectionTrace {
        correlation_id: correlation_id.to_string(),
        created_at: Utc::now(),
        selected_index: winner.index(),
        selected_score: winner.score,
        selected_reasons: winner.reason_codes(),
        selected_facts: winner.facts,
        density_a: winner.density_a,
        input_count: winner.input_count,
        used_count: winner.used_count,
        input_phrases,
        candidates,
        rescue,
    }
}
