//! Concurrent candidate generation
//!
//! Fans N attempts out against the generation service and joins all of
//! them (never first-response-wins). Each attempt is stateless; results
//! are aggregated by index into an immutable list before repair and
//! scoring start.

use crate::ai::{GenerationService, ServiceResponse};
use crate::models::{Candidate, CandidateOutcome, ModelParams, PromptBundle};
use rayon::prelude::*;
use tracing::debug;

/// Issue `attempts` concurrent generation calls. Indexes start at
/// `start_index` so rescue attempts keep numbering after the initial round.
pub fn generate_candidates(
    service: &dyn GenerationService,
    prompt: &PromptBundle,
    params: &ModelParams,
    attempts: usize,
    start_index: usize,
    error_preview_chars: usize,
) -> Vec<Candidate> {
    (0..attempts)
        .into_par_iter()
        .map(|offset| {
            let index = start_index + offset;
            let candidate = single_attempt(service, prompt, params, index, error_preview_chars);
            debug!(
                index,
                success = candidate.is_success(),
                status = candidate.status(),
                latency_ms = candidate.latency_ms(),
                "generation attempt finished"
            );
            candidate
        })
        .collect()
}

fn single_attempt(
    service: &dyn GenerationService,
    prompt: &PromptBundle,
    params: &ModelParams,
    index: usize,
    error_preview_chars: usize,
) -> Candidate {
    let outcome = match service.generate(prompt, params) {
        ServiceResponse::Success {
            text,
            status,
            status_text,
            latency_ms,
        } => CandidateOutcome::Success {
            text,
            latency_ms,
            status,
            status_text,
        },
        ServiceResponse::Failure {
            status,
            status_text,
            latency_ms,
            error_text,
        } => CandidateOutcome::Failure {
            status,
            status_text,
            latency_ms,
            error_preview: truncate_chars(&error_text, error_preview_chars),
        },
    };
    Candidate { index, outcome }
}

/// Char-safe truncation for error previews.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push('…');
    out
}

/// One line per attempt, for the generation_failed error message.
pub fn summarize_attempts(candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .map(|c| match &c.outcome {
            CandidateOutcome::Success { status, latency_ms, .. } => {
                format!("#{}: ok ({status}, {latency_ms}ms)", c.index)
            }
            CandidateOutcome::Failure {
                status,
                latency_ms,
                error_preview,
                ..
            } => format!("#{}: failed ({status}, {latency_ms}ms) {error_preview}", c.index),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingService {
        calls: AtomicUsize,
        fail: bool,
    }

    impl GenerationService for CountingService {
        fn generate(&self, _prompt: &PromptBundle, _params: &ModelParams) -> ServiceResponse {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                ServiceResponse::Failure {
                    status: 500,
                    status_text: "Internal Server Error".to_string(),
                    latency_ms: 5,
                    error_text: "x".repeat(500),
                }
            } else {
                ServiceResponse::Success {
                    text: format!("候補{n}"),
                    status: 200,
                    status_text: "OK".to_string(),
                    latency_ms: 5,
                }
            }
        }
    }

    fn bundle() -> PromptBundle {
        PromptBundle {
            system: "s".to_string(),
            user: "u".to_string(),
            template_key: "t".to_string(),
            cta_mode: "none".to_string(),
        }
    }

    #[test]
    fn test_all_attempts_joined_in_index_order() {
        let service = CountingService {
            calls: AtomicUsize::new(0),
            fail: false,
        };
        let candidates =
            generate_candidates(&service, &bundle(), &ModelParams::default(), 3, 1, 160);
        assert_eq!(candidates.len(), 3);
        assert_eq!(service.calls.load(Ordering::SeqCst), 3);
        let indexes: Vec<usize> = candidates.iter().map(|c| c.index).collect();
        assert_eq!(indexes, vec![1, 2, 3]);
    }

    #[test]
    fn test_failure_preview_truncated() {
        let service = CountingService {
            calls: AtomicUsize::new(0),
            fail: true,
        };
        let candidates =
            generate_candidates(&service, &bundle(), &ModelParams::default(), 1, 1, 160);
        match &candidates[0].outcome {
            CandidateOutcome::Failure { error_preview, .. } => {
                assert!(error_preview.chars().count() <= 161);
                assert!(error_preview.ends_with('…'));
            }
            _ => panic!("expected failure"),
        }
    }

    #[test]
    fn test_summarize_attempts() {
        let service = CountingService {
            calls: AtomicUsize::new(0),
            fail: true,
        };
        let candidates =
            generate_candidates(&service, &bundle(), &ModelParams::default(), 2, 1, 20);
        let summary = summarize_attempts(&candidates);
        assert!(summary.contains("#1: failed (500"));
        assert!(summary.contains("#2:"));
    }
}
