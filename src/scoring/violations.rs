//! Violation catalogue
//!
//! Every scoring check reports a member of this closed enum. Each kind
//! carries its penalty weight as data, so the rule table can be inspected
//! and tested without running the scorer.

use serde::Serialize;

/// Penalty added per disqualifying violation. Disqualifying violations are
/// diagnostic-heavy but never remove a candidate from the pool.
pub const DISQUALIFYING_PENALTY: u32 = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum Violation {
    /// Heading markup has no place in plain marketing copy.
    HeadingPresent,
    /// The lead must be exactly two sentences.
    LeadSentenceCount { count: usize },
    /// Product name missing from the first lead sentence.
    ProductNameMissing,
    /// Generic hype vocabulary in the lead (weighs more than in the body).
    HypeInLead { word: String },
    HypeInBody { word: String },
    /// Boilerplate "can-do" phrasing in the lead.
    CanDoBoilerplate,
    /// A grammar-breakage rule from the pattern table matched.
    GrammarBreakage { rule: &'static str },
    /// Unsupported absolute-certainty claim.
    AbsoluteClaim { term: String },
    /// Consecutive lead sentences with identical endings.
    RepeatedSentenceEnding,
    /// Bullet count away from 3; penalty scales with the deviation.
    BulletCount { count: usize },
    /// A bullet line still visibly carries collapsed-list residue.
    CollapsedBulletResidue,
    /// The stated goal is not reflected anywhere in the lead.
    GoalNotReflected,
    /// Numeric/spec token in the output with no source in the input.
    /// The primary anti-hallucination guard.
    SpecInflation { token: String },
    /// The input supplied a spec token but none made it into the output.
    SpecMissing { token: String },
    /// Fewer than 2 of the 3 bullets link a feature to its effect.
    WeakFeatureLinkage { linked: usize },
    /// FAQ-style content nobody asked for.
    UnneededFaq,
    /// Second lead sentence is evaluative/abstract instead of a concrete
    /// scene. Disqualifying.
    LeadAbstract,
    /// Second lead sentence has no action verb. Disqualifying.
    LeadNoActionVerb,
    /// Second lead sentence has no time or place cue. Disqualifying.
    LeadNoTimePlaceCue,
    /// Body shows none of the four concrete-signal categories.
    BodyNoConcreteSignal,
}

impl Violation {
    /// Stable string code for diagnostics and trace events.
    pub fn code(&self) -> &'static str {
        match self {
            Violation::HeadingPresent => "heading_present",
            Violation::LeadSentenceCount { .. } => "lead_sentence_count",
            Violation::ProductNameMissing => "product_name_missing",
            Violation::HypeInLead { .. } => "hype_in_lead",
            Violation::HypeInBody { .. } => "hype_in_body",
            Violation::CanDoBoilerplate => "can_do_boilerplate",
            Violation::GrammarBreakage { .. } => "grammar_breakage",
            Violation::AbsoluteClaim { .. } => "absolute_claim",
            Violation::RepeatedSentenceEnding => "repeated_sentence_ending",
            Violation::BulletCount { .. } => "bullet_count",
            Violation::CollapsedBulletResidue => "collapsed_bullet_residue",
            Violation::GoalNotReflected => "goal_not_reflected",
            Violation::SpecInflation { .. } => "spec_inflation",
            Violation::SpecMissing { .. } => "spec_missing",
            Violation::WeakFeatureLinkage { .. } => "weak_feature_linkage",
            Violation::UnneededFaq => "unneeded_faq",
            Violation::LeadAbstract => "lead_abstract",
            Violation::LeadNoActionVerb => "lead_no_action_verb",
            Violation::LeadNoTimePlaceCue => "lead_no_time_place_cue",
            Violation::BodyNoConcreteSignal => "body_no_concrete_signal",
        }
    }

    /// Penalty contributed by this violation. Fixed for most kinds,
    /// data-dependent for bullet-count deviation.
    pub fn penalty(&self) -> u32 {
        match self {
            Violation::HeadingPresent => 2,
            Violation::LeadSentenceCount { .. } => 3,
            Violation::ProductNameMissing => 3,
            Violation::HypeInLead { .. } => 4,
            Violation::HypeInBody { .. } => 2,
            Violation::CanDoBoilerplate => 2,
            Violation::GrammarBreakage { .. } => 8,
            Violation::AbsoluteClaim { .. } => 6,
            Violation::RepeatedSentenceEnding => 2,
            Violation::BulletCount { count } => {
                2 * (count.abs_diff(crate::repair::MAX_BULLETS) as u32)
            }
            Violation::CollapsedBulletResidue => 3,
            Violation::GoalNotReflected => 3,
            Violation::SpecInflation { .. } => 10,
            Violation::SpecMissing { .. } => 4,
            Violation::WeakFeatureLinkage { .. } => 3,
            Violation::UnneededFaq => 2,
            Violation::LeadAbstract
            | Violation::LeadNoActionVerb
            | Violation::LeadNoTimePlaceCue => DISQUALIFYING_PENALTY,
            Violation::BodyNoConcreteSignal => 2,
        }
    }

    /// Disqualifying violations add a large fixed penalty but never remove
    /// a candidate from consideration.
    pub fn is_disqualifying(&self) -> bool {
        matches!(
            self,
            Violation::LeadAbstract
                | Violation::LeadNoActionVerb
                | Violation::LeadNoTimePlaceCue
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bullet_count_penalty_scales_with_deviation() {
        assert_eq!(Violation::BulletCount { count: 3 }.penalty(), 0);
        assert_eq!(Violation::BulletCount { count: 2 }.penalty(), 2);
        assert_eq!(Violation::BulletCount { count: 5 }.penalty(), 4);
        assert_eq!(Violation::BulletCount { count: 0 }.penalty(), 6);
    }

    #[test]
    fn test_disqualifying_kinds() {
        assert!(Violation::LeadAbstract.is_disqualifying());
        assert!(Violation::LeadNoActionVerb.is_disqualifying());
        assert!(Violation::LeadNoTimePlaceCue.is_disqualifying());
        assert!(!Violation::HeadingPresent.is_disqualifying());
        assert!(!Violation::SpecInflation {
            token: "500ml".to_string()
        }
        .is_disqualifying());
    }

    #[test]
    fn test_disqualifying_penalty_dominates_structural_penalties() {
        for v in [
            Violation::LeadAbstract,
            Violation::LeadNoActionVerb,
            Violation::LeadNoTimePlaceCue,
        ] {
            assert_eq!(v.penalty(), DISQUALIFYING_PENALTY);
            assert!(v.penalty() > Violation::ProductNameMissing.penalty());
        }
    }

    #[test]
    fn test_spec_inflation_is_heaviest_content_penalty() {
        let inflation = Violation::SpecInflation {
            token: "99%".to_string(),
        };
        assert!(inflation.penalty() > Violation::GrammarBreakage { rule: "x" }.penalty());
        assert!(inflation.penalty() > Violation::AbsoluteClaim {
            term: "絶対".to_string()
        }
        .penalty());
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(Violation::LeadAbstract.code(), "lead_abstract");
        assert_eq!(
            Violation::SpecInflation {
                token: String::new()
            }
            .code(),
            "spec_inflation"
        );
    }
}
