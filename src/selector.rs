//! Candidate ordering and rescue decisions
//!
//! Orders scored candidates with multi-level tie-breaking and decides
//! whether the single rescue attempt is warranted. Disqualifying
//! violations weigh into the score but never remove a candidate; a fully
//! disqualified pool still yields a winner.

use crate::models::RescueTrigger;
use crate::scoring::ScoredCandidate;
use std::cmp::Ordering;

/// Audiences at or under this many characters count as "short" for the
/// density threshold derivation.
pub const SHORT_AUDIENCE_MAX_CHARS: usize = 8;

/// Threshold returned for input sets the density metric can't grade; low
/// enough that density never triggers a rescue for them.
pub const UNGRADEABLE_THRESHOLD: f64 = 0.34;

/// Secondary composite used to break score ties: structural distance from
/// the house format.
pub fn preference_penalty(candidate: &ScoredCandidate) -> u32 {
    let facts = &candidate.facts;
    let mut penalty = facts.lead_sentences.abs_diff(2) as u32;
    if !facts.product_in_lead {
        penalty += 1;
    }
    if facts.has_heading {
        penalty += 1;
    }
    penalty += facts.bullet_count.abs_diff(crate::repair::MAX_BULLETS) as u32;
    if facts.collapsed_bullets {
        penalty += 1;
    }
    penalty
}

/// Order candidates best-first: ascending score, ascending preference
/// penalty, descending density (absent densities last), ascending text
/// length, then attempt index for a stable total order.
pub fn order_candidates(mut pool: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
    pool.sort_by(compare);
    pool
}

fn compare(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    a.score
        .cmp(&b.score)
        .then_with(|| preference_penalty(a).cmp(&preference_penalty(b)))
        .then_with(|| {
            let da = a.density_a.unwrap_or(-1.0);
            let db = b.density_a.unwrap_or(-1.0);
            db.partial_cmp(&da).unwrap_or(Ordering::Equal)
        })
        .then_with(|| a.text_chars().cmp(&b.text_chars()))
        .then_with(|| a.index().cmp(&b.index()))
}

/// Density threshold below which the winner is considered input-starved.
/// Derived from the input-set size and the audience length; sets the
/// density metric can't grade get a floor that disables the rescue.
pub fn density_threshold(input_set_len: usize, audience: &str) -> f64 {
    let audience_chars = audience.trim().chars().count();
    match input_set_len {
        4 if audience_chars <= SHORT_AUDIENCE_MAX_CHARS => 0.75,
        4 => 1.0,
        3 => 1.0,
        _ => UNGRADEABLE_THRESHOLD,
    }
}

/// Decide whether a rescue round is warranted for this ordered pool.
///
/// Two triggers, checked in order: every candidate shares the
/// abstract-lead violation, or the winner's density sits below threshold
/// (only for gradeable set sizes). Returns at most one trigger; the caller
/// enforces the once-per-request bound.
pub fn rescue_trigger(
    ordered: &[ScoredCandidate],
    input_set_len: usize,
    audience: &str,
) -> Option<RescueTrigger> {
    if ordered.is_empty() {
        return None;
    }

    if ordered.iter().all(|c| c.has_violation("lead_abstract")) {
        return Some(RescueTrigger::AbstractLeadAll);
    }

    if input_set_len == 3 || input_set_len == 4 {
        let threshold = density_threshold(input_set_len, audience);
        let winner = &ordered[0];
        if winner.density_a.is_some_and(|d| d < threshold) {
            return Some(RescueTrigger::DensityBelowThreshold);
        }
    }

    None
}
