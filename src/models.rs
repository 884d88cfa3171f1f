//! Core data models for Copysmith
//!
//! These models are used throughout the codebase for representing
//! copy requests, generation candidates, and selection diagnostics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Generate a deterministic digest for a candidate text.
///
/// Trace events reference candidates by digest rather than by raw text, so
/// logs stay compact and user copy never leaks into log storage verbatim.
///
/// The digest is a 16-character hex string derived from hashing the text.
/// DefaultHasher is intentionally not used; it is not stable across
/// Rust/compiler versions.
pub fn text_digest(text: &str) -> String {
    let digest = md5::compute(text.as_bytes());
    format!("{:x}", digest)[..16].to_string()
}

/// A validated, normalized copy request.
///
/// Produced by an external collaborator (web layer / request validator);
/// immutable for the duration of one pipeline run. All optional extension
/// fields are named and strictly typed; there is no open-ended meta map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizedInput {
    pub product_name: String,
    pub category: String,
    pub goal: String,
    pub audience: String,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub brand_voice: Option<String>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub length_hint: Option<String>,
    /// Ordered, deduplicated by the upstream validator.
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub selling_points: Vec<String>,
    #[serde(default)]
    pub objections: Vec<String>,
    #[serde(default)]
    pub evidence: Vec<String>,
    #[serde(default)]
    pub cta_preference: Vec<String>,
    /// Raw text the request was derived from, if the caller kept it.
    #[serde(default)]
    pub original_text: Option<String>,
}

/// Model parameters for one generation round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelParams {
    pub model: String,
    pub temperature: f32,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            model: String::new(),
            temperature: 0.7,
        }
    }
}

/// An already-composed prompt pair plus the composer's routing metadata.
///
/// Prompt composition happens outside the core pipeline; the pipeline treats
/// `system` and `user` as opaque and echoes `template_key`/`cta_mode` into
/// the result meta.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptBundle {
    pub system: String,
    pub user: String,
    pub template_key: String,
    pub cta_mode: String,
}

/// Result of one generation attempt. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// 1-based attempt index.
    pub index: usize,
    pub outcome: CandidateOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CandidateOutcome {
    Success {
        text: String,
        latency_ms: u64,
        status: u16,
        status_text: String,
    },
    Failure {
        status: u16,
        status_text: String,
        latency_ms: u64,
        error_preview: String,
    },
}

impl Candidate {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, CandidateOutcome::Success { .. })
    }

    pub fn text(&self) -> Option<&str> {
        match &self.outcome {
            CandidateOutcome::Success { text, .. } => Some(text),
            CandidateOutcome::Failure { .. } => None,
        }
    }

    pub fn latency_ms(&self) -> u64 {
        match &self.outcome {
            CandidateOutcome::Success { latency_ms, .. }
            | CandidateOutcome::Failure { latency_ms, .. } => *latency_ms,
        }
    }

    pub fn status(&self) -> u16 {
        match &self.outcome {
            CandidateOutcome::Success { status, .. }
            | CandidateOutcome::Failure { status, .. } => *status,
        }
    }

    pub fn status_text(&self) -> &str {
        match &self.outcome {
            CandidateOutcome::Success { status_text, .. }
            | CandidateOutcome::Failure { status_text, .. } => status_text,
        }
    }
}

/// A candidate's text after the repair pass. One-to-one derivation from
/// `Candidate`; the original is retained for diagnostics.
#[derive(Debug, Clone)]
pub struct RepairedCandidate {
    pub candidate: Candidate,
    pub text: String,
    pub did_repair: bool,
}

/// Compact structural facts about one scored candidate.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ScoreFacts {
    pub lead_sentences: usize,
    pub bullet_count: usize,
    pub has_heading: bool,
    pub product_in_lead: bool,
    pub collapsed_bullets: bool,
}

/// The finished copy plus the routing metadata callers key presentation on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyResult {
    pub text: String,
    pub meta: CopyMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyMeta {
    pub style: String,
    pub tone: String,
    pub template_key: String,
    pub cta_mode: String,
}

/// Why a rescue round was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RescueTrigger {
    /// Every candidate in the pool carried the abstract-lead violation.
    AbstractLeadAll,
    /// The winner's density fell below the derived threshold.
    DensityBelowThreshold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RescueOutcome {
    #[default]
    NotAttempted,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RescueTrace {
    pub attempted: bool,
    pub outcome: RescueOutcome,
    pub trigger: Option<RescueTrigger>,
}

/// Per-candidate summary for the diagnostic trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateTraceSummary {
    pub index: usize,
    pub success: bool,
    pub status: u16,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_digest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_chars: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_preview: Option<String>,
}

/// Structured diagnostic event for one pipeline run.
///
/// Emitted to the diagnostics sink on a best-effort basis; sink failures
/// never affect the pipeline's result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionTrace {
    pub correlation_id: String,
    pub created_at: DateTime<Utc>,
    pub selected_index: usize,
    pub selected_score: u32,
    pub selected_reasons: Vec<String>,
    pub selected_facts: ScoreFacts,
    pub density_a: Option<f64>,
    pub input_count: usize,
    pub used_count: usize,
    /// Input-set phrases, masked for log safety when configured.
    #[serde(default)]
    pub input_phrases: Vec<String>,
    pub candidates: Vec<CandidateTraceSummary>,
    pub rescue: RescueTrace,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_digest_stable() {
        let a = text_digest("保温タンブラー");
        let b = text_digest("保温タンブラー");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert_ne!(a, text_digest("別のテキスト"));
    }

    #[test]
    fn test_candidate_accessors() {
        let ok = Candidate {
            index: 1,
            outcome: CandidateOutcome::Success {
                text: "本文".to_string(),
                latency_ms: 420,
                status: 200,
                status_text: "OK".to_string(),
            },
        };
        assert!(ok.is_success());
        assert_eq!(ok.text(), Some("本文"));
        assert_eq!(ok.latency_ms(), 420);

        let err = Candidate {
            index: 2,
            outcome: CandidateOutcome::Failure {
                status: 500,
                status_text: "Internal Server Error".to_string(),
                latency_ms: 90,
                error_preview: "overloaded".to_string(),
            },
        };
        assert!(!err.is_success());
        assert_eq!(err.text(), None);
        assert_eq!(err.status(), 500);
    }

    #[test]
    fn test_normalized_input_partial_json() {
        let json = r#"{
            "product_name": "Acme タンブラー",
            "category": "ドリンクウェア",
            "goal": "デスクで飲み物を保温する",
            "audience": "オフィスワーカー"
        }"#;
        let input: NormalizedInput = serde_json::from_str(json).unwrap();
        assert!(input.keywords.is_empty());
        assert!(input.platform.is_none());
        assert_eq!(input.audience, "オフィスワーカー");
    }
}
