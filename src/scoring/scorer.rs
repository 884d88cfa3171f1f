//! L3 candidate scoring
//!
//! Accumulates a non-negative violation score from independent checks over
//! the repaired text. Checks only ever add penalty; the single
//! concreteness bonus is applied at the end with saturating subtraction, so
//! the score never goes below zero.

use crate::density::{self, DensityReport, InputSet};
use crate::models::{NormalizedInput, RepairedCandidate, ScoreFacts};
use crate::repair::{self, Sections};
use crate::scoring::rules;
use crate::scoring::violations::Violation;

/// Bonus subtracted when the body shows two or more concrete-signal
/// categories; penalty added when it shows none.
const CONCRETENESS_ADJUST: u32 = 2;

/// A repaired candidate plus everything selection needs to rank it.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub candidate: crate::models::Candidate,
    pub text: String,
    pub did_repair: bool,
    pub score: u32,
    pub violations: Vec<Violation>,
    pub facts: ScoreFacts,
    pub density_a: Option<f64>,
    pub input_count: usize,
    pub used_count: usize,
    /// Diagnostic only; a disqualified candidate still competes.
    pub disqualified: bool,
}

impl ScoredCandidate {
    pub fn index(&self) -> usize {
        self.candidate.index
    }

    pub fn text_chars(&self) -> usize {
        self.text.chars().count()
    }

    pub fn reason_codes(&self) -> Vec<String> {
        self.violations.iter().map(|v| v.code().to_string()).collect()
    }

    pub fn has_violation(&self, code: &str) -> bool {
        self.violations.iter().any(|v| v.code() == code)
    }
}

/// Score one repaired candidate against the request.
pub fn score_candidate(
    input: &NormalizedInput,
    set: &InputSet,
    repaired: &RepairedCandidate,
) -> ScoredCandidate {
    let text = repaired.text.as_str();
    let sections = repair::split_sections(text);
    let lead_sentences = repair::split_sentences(&sections.lead);
    let body = sections.bullets.join("\n");

    let mut violations: Vec<Violation> = Vec::new();

    let has_heading = check_heading(text, &mut violations);
    check_lead_sentence_count(&lead_sentences, &mut violations);
    let product_in_lead = check_product_name(input, &lead_sentences, &mut violations);
    check_hype(&sections.lead, &body, &mut violations);
    check_can_do(&sections.lead, &mut violations);
    check_grammar(text, &mut violations);
    check_absolute_claims(text, &mut violations);
    check_repeated_endings(&lead_sentences, &mut violations);
    check_bullet_count(&sections, &mut violations);
    let collapsed = check_collapsed_residue(&sections, &mut violations);
    check_goal_reflection(input, &sections.lead, &mut violations);
    check_spec_tokens(input, text, &mut violations);
    check_feature_linkage(input, &sections, &mut violations);
    check_unneeded_faq(input, text, &mut violations);
    check_second_sentence(&lead_sentences, &mut violations);

    let concrete_categories = body_concrete_categories(&body);
    if concrete_categories == 0 {
        violations.push(Violation::BodyNoConcreteSignal);
    }

    let mut score: u32 = violations.iter().map(Violation::penalty).sum();
    if concrete_categories >= 2 {
        score = score.saturating_sub(CONCRETENESS_ADJUST);
    }

    let disqualified = violations.iter().any(Violation::is_disqualifying);

    let DensityReport {
        input_count,
        used_count,
        density_a,
        ..
    } = density::evaluate(set, &input.audience, text);

    let facts = ScoreFacts {
        lead_sentences: lead_sentences.len(),
        bullet_count: sections.bullets.len(),
        has_heading,
        product_in_lead,
        collapsed_bullets: collapsed,
    };

    ScoredCandidate {
        candidate: repaired.candidate.clone(),
        text: repaired.text.clone(),
        did_repair: repaired.did_repair,
        score,
        violations,
        facts,
        density_a,
        input_count,
        used_count,
        disqualified,
    }
}

fn check_heading(text: &str, violations: &mut Vec<Violation>) -> bool {
    let has_heading = text.lines().any(|line| {
        let trimmed = line.trim();
        trimmed.starts_with('#')
            || trimmed.starts_with('■')
            || trimmed.starts_with('◆')
            || (trimmed.starts_with('【') && trimmed.ends_with('】'))
    });
    if has_heading {
        violations.push(Violation::HeadingPresent);
    }
    has_heading
}

fn check_lead_sentence_count(lead_sentences: &[String], violations: &mut Vec<Violation>) {
    if lead_sentences.len() != 2 {
        violations.push(Violation::LeadSentenceCount {
            count: lead_sentences.len(),
        });
    }
}

fn check_product_name(
    input: &NormalizedInput,
    lead_sentences: &[String],
    violations: &mut Vec<Violation>,
) -> bool {
    let in_first = lead_sentences
        .first()
        .is_some_and(|s| s.contains(input.product_name.trim()));
    if !in_first {
        violations.push(Violation::ProductNameMissing);
    }
    in_first
}

fn check_hype(lead: &str, body: &str, violations: &mut Vec<Violation>) {
    for word in rules::HYPE_WORDS {
        if lead.contains(word) {
            violations.push(Violation::HypeInLead {
                word: word.to_string(),
            });
        }
        if body.contains(word) {
            violations.push(Violation::HypeInBody {
                word: word.to_string(),
            });
        }
    }
}

fn check_can_do(lead: &str, violations: &mut Vec<Violation>) {
    if rules::CAN_DO_PHRASES.iter().any(|p| lead.contains(p)) {
        violations.push(Violation::CanDoBoilerplate);
    }
}

fn check_grammar(text: &str, violations: &mut Vec<Violation>) {
    for (name, pattern) in rules::grammar_rules() {
        if pattern.is_match(text) {
            violations.push(Violation::GrammarBreakage { rule: name });
        }
    }
}

fn check_absolute_claims(text: &str, violations: &mut Vec<Violation>) {
    for term in rules::HARD_CLAIM_TERMS {
        if text.contains(term) {
            violations.push(Violation::AbsoluteClaim {
                term: term.to_string(),
            });
        }
    }
    let sentences = repair::split_sentences(text);
    for term in rules::SOFT_CLAIM_TERMS {
        if sentences.iter().any(|s| s.starts_with(term)) {
            violations.push(Violation::AbsoluteClaim {
                term: term.to_string(),
            });
        }
    }
}

fn check_repeated_endings(lead_sentences: &[String], violations: &mut Vec<Violation>) {
    let endings: Vec<String> = lead_sentences.iter().map(|s| sentence_ending(s)).collect();
    if endings.windows(2).any(|w| !w[0].is_empty() && w[0] == w[1]) {
        violations.push(Violation::RepeatedSentenceEnding);
    }
}

/// Last few characters before the terminator, e.g. "です" / "ます".
fn sentence_ending(sentence: &str) -> String {
    let chars: Vec<char> = sentence
        .chars()
        .filter(|c| !matches!(c, '。' | '！' | '？'))
        .collect();
    let start = chars.len().saturating_sub(2);
    chars[start..].iter().collect()
}

fn check_bullet_count(sections: &Sections, violations: &mut Vec<Violation>) {
    let count = sections.bullets.len();
    if count != repair::MAX_BULLETS {
        violations.push(Violation::BulletCount { count });
    }
}

fn check_collapsed_residue(sections: &Sections, violations: &mut Vec<Violation>) -> bool {
    let collapsed = sections.bullets.iter().any(|line| {
        line.chars()
            .skip(1)
            .filter(|c| matches!(c, '・' | '●'))
            .count()
            >= 2
    });
    if collapsed {
        violations.push(Violation::CollapsedBulletResidue);
    }
    collapsed
}

fn check_goal_reflection(input: &NormalizedInput, lead: &str, violations: &mut Vec<Violation>) {
    let goal = input.goal.trim();
    if goal.is_empty() {
        return;
    }
    // Generic "write a description" goals carry no alignment signal.
    if rules::GENERIC_GOAL_MARKERS.iter().any(|m| goal.contains(m)) {
        return;
    }
    let reflected = lead.contains(goal)
        || density::contains_fragment(goal, lead, density::SUBSTRING_MATCH_CHARS);
    if !reflected {
        violations.push(Violation::GoalNotReflected);
    }
}

fn input_spec_tokens(input: &NormalizedInput) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let sources = [&input.product_name, &input.goal]
        .into_iter()
        .map(String::as_str)
        .chain(input.selling_points.iter().map(String::as_str))
        .chain(input.evidence.iter().map(String::as_str))
        .chain(input.keywords.iter().map(String::as_str))
        .chain(input.constraints.iter().map(String::as_str));
    for source in sources {
        for token in density::extract_spec_tokens(source) {
            if !tokens.contains(&token) {
                tokens.push(token);
            }
        }
    }
    tokens
}

fn check_spec_tokens(input: &NormalizedInput, text: &str, violations: &mut Vec<Violation>) {
    let supplied = input_spec_tokens(input);
    let mut seen: Vec<String> = Vec::new();
    for token in density::extract_spec_tokens(text) {
        if supplied.contains(&token) || seen.contains(&token) {
            continue;
        }
        seen.push(token.clone());
        violations.push(Violation::SpecInflation { token });
    }
    if let Some(first) = supplied.first() {
        if !supplied.iter().any(|t| text.contains(t)) {
            violations.push(Violation::SpecMissing {
                token: first.clone(),
            });
        }
    }
}

fn check_feature_linkage(
    input: &NormalizedInput,
    sections: &Sections,
    violations: &mut Vec<Violation>,
) {
    // Only judged when the input actually supplied feature-like evidence;
    // otherwise the check would pressure the model into fabrication.
    let has_feature_input = !input.evidence.is_empty()
        || input.selling_points.iter().any(|p| density::is_fact_like(p));
    if !has_feature_input || sections.bullets.is_empty() {
        return;
    }
    let linked = sections
        .bullets
        .iter()
        .filter(|line| rules::LINKAGE_CONNECTIVES.iter().any(|c| line.contains(c)))
        .count();
    if linked < 2 {
        violations.push(Violation::WeakFeatureLinkage { linked });
    }
}

fn check_unneeded_faq(input: &NormalizedInput, text: &str, violations: &mut Vec<Violation>) {
    if !input.objections.is_empty() || !input.cta_preference.is_empty() {
        return;
    }
    if rules::FAQ_MARKERS.iter().any(|m| text.contains(m)) {
        violations.push(Violation::UnneededFaq);
    }
}

/// The second lead sentence must be a concrete scene: no evaluative
/// vocabulary, an action verb, and a time or place cue. A missing second
/// sentence fails all three.
fn check_second_sentence(lead_sentences: &[String], violations: &mut Vec<Violation>) {
    match lead_sentences.get(1) {
        Some(sentence) => {
            if rules::ABSTRACT_EVAL_WORDS.iter().any(|w| sentence.contains(w)) {
                violations.push(Violation::LeadAbstract);
            }
            if !rules::ACTION_VERB_CUES.iter().any(|v| sentence.contains(v)) {
                violations.push(Violation::LeadNoActionVerb);
            }
            let has_cue = rules::TIME_WORDS.iter().any(|w| sentence.contains(w))
                || rules::PLACE_WORDS.iter().any(|w| sentence.contains(w));
            if !has_cue {
                violations.push(Violation::LeadNoTimePlaceCue);
            }
        }
        None => {
            violations.push(Violation::LeadAbstract);
            violations.push(Violation::LeadNoActionVerb);
            violations.push(Violation::LeadNoTimePlaceCue);
        }
    }
}

/// Count the concrete-signal categories present in the body: digits,
/// units, time words, place words.
fn body_concrete_categories(body: &str) -> usize {
    let mut categories = 0;
    if body
        .chars()
        .any(|c| c.is_ascii_digit() || ('０'..='９').contains(&c))
    {
        categories += 1;
    }
    if rules::UNIT_WORDS.iter().any(|u| body.contains(u)) {
        categories += 1;
    }
    if rules::TIME_WORDS.iter().any(|w| body.contains(w)) {
        categories += 1;
    }
    if rules::PLACE_WORDS.iter().any(|w| body.contains(w)) {
        categories += 1;
    }
    categories
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Candidate, CandidateOutcome};

    fn request() -> NormalizedInput {
        NormalizedInput {
            product_name: "Acmeタンブラー".to_string(),
            category: "ドリンクウェア".to_string(),
            goal: "デスクで飲み物を保温する".to_string(),
            audience: "オフィスワーカー".to_string(),
            selling_points: vec!["真空断熱で保温6時間".to_string()],
            ..Default::default()
        }
    }

    fn scored(input: &NormalizedInput, text: &str) -> ScoredCandidate {
        let set = density::build_input_set(input);
        let repaired = RepairedCandidate {
            candidate: Candidate {
                index: 1,
                outcome: CandidateOutcome::Success {
                    text: text.to_string(),
                    latency_ms: 100,
                    status: 200,
                    status_text: "OK".to_string(),
                },
            },
            text: text.to_string(),
            did_repair: false,
        };
        score_candidate(input, &set, &repaired)
    }

    /// A candidate that satisfies every structural check.
    fn good_text() -> String {
        [
            "Acmeタンブラーはデスクで飲み物を保温する専用ボトルです。オフィスワーカーなら、毎日の休憩にデスクでそのまま使えます。",
            "・真空断熱により保温6時間続く",
            "・350mlサイズなので持ち歩きやすい",
            "・結露しにくいからデスクを汚さない",
        ]
        .join("\n")
    }

    #[test]
    fn test_good_candidate_scores_low_and_qualified() {
        let mut input = request();
        input.selling_points.push("容量350ml".to_string());
        input.evidence.push("結露しにくい".to_string());
        let sc = scored(&input, &good_text());
        assert!(!sc.disqualified, "reasons: {:?}", sc.reason_codes());
        assert_eq!(sc.facts.lead_sentences, 2);
        assert_eq!(sc.facts.bullet_count, 3);
        assert!(sc.facts.product_in_lead);
        assert!(sc.score <= 2, "score {} too high: {:?}", sc.score, sc.reason_codes());
    }

    #[test]
    fn test_heading_and_lead_count_penalized() {
        let input = request();
        let sc = scored(&input, "■おすすめ\n一文だけ。\n・真空断熱で保温6時間");
        assert!(sc.has_violation("heading_present"));
        assert!(sc.has_violation("lead_sentence_count"));
        assert!(sc.facts.has_heading);
    }

    #[test]
    fn test_product_name_missing() {
        let input = request();
        let sc = scored(
            &input,
            "この商品はとても便利です。オフィスワーカーなら、毎日デスクで使えます。\n・真空断熱で保温6時間",
        );
        assert!(sc.has_violation("product_name_missing"));
        assert!(!sc.facts.product_in_lead);
    }

    #[test]
    fn test_hype_weighting_lead_over_body() {
        let lead_hit = Violation::HypeInLead {
            word: "究極".to_string(),
        };
        let body_hit = Violation::HypeInBody {
            word: "究極".to_string(),
        };
        assert!(lead_hit.penalty() > body_hit.penalty());

        let input = request();
        let sc = scored(
            &input,
            "Acmeタンブラーは究極の一本です。デスクで保温します。\n・抜群の保温力",
        );
        assert!(sc.has_violation("hype_in_lead"));
        assert!(sc.has_violation("hype_in_body"));
    }

    #[test]
    fn test_spec_inflation_detected() {
        let input = request();
        // 99% appears nowhere in the input.
        let sc = scored(
            &input,
            "Acmeタンブラーはデスクで飲み物を保温する一本です。オフィスワーカーなら、毎日デスクで使えます。\n・保温6時間\n・満足度99%\n・軽量ボディ",
        );
        assert!(sc.has_violation("spec_inflation"));
    }

    #[test]
    fn test_spec_missing_when_input_token_dropped() {
        let input = request();
        let sc = scored(
            &input,
            "Acmeタンブラーはデスクで飲み物を保温する一本です。オフィスワーカーなら、毎日デスクで使えます。\n・真空断熱でしっかり保温\n・軽量ボディなので楽々\n・結露しにくいから安心",
        );
        assert!(sc.has_violation("spec_missing"));
        assert!(!sc.has_violation("spec_inflation"));
    }

    #[test]
    fn test_goal_check_skipped_for_generic_goal() {
        let mut input = request();
        input.goal = "商品の説明文を書いて".to_string();
        let sc = scored(
            &input,
            "Acmeタンブラーは新しい定番です。オフィスワーカーなら、毎日デスクで使えます。\n・真空断熱で保温6時間",
        );
        assert!(!sc.has_violation("goal_not_reflected"));
    }

    #[test]
    fn test_goal_not_reflected_penalized() {
        let input = request();
        let sc = scored(
            &input,
            "Acmeタンブラーは新しい定番です。オフィスワーカーなら、毎日職場で使えます。\n・真空断熱で6時間続く",
        );
        assert!(sc.has_violation("goal_not_reflected"));
    }

    #[test]
    fn test_second_sentence_disqualifiers() {
        let input = request();
        // Abstract, verb-free, cue-free second sentence.
        let sc = scored(
            &input,
            "Acmeタンブラーはデスクで飲み物を保温する一本です。人気の理想的な一品。\n・真空断熱で保温6時間",
        );
        assert!(sc.has_violation("lead_abstract"));
        assert!(sc.has_violation("lead_no_action_verb"));
        assert!(sc.disqualified);
    }

    #[test]
    fn test_missing_second_sentence_fails_all_three() {
        let input = request();
        let sc = scored(&input, "Acmeタンブラーです。\n・真空断熱で保温6時間");
        assert!(sc.has_violation("lead_abstract"));
        assert!(sc.has_violation("lead_no_action_verb"));
        assert!(sc.has_violation("lead_no_time_place_cue"));
    }

    #[test]
    fn test_feature_linkage_only_with_feature_input() {
        let mut input = request();
        input.selling_points.clear();
        input.evidence.clear();
        let text = "Acmeタンブラーはデスクで飲み物を保温する一本です。オフィスワーカーなら、毎日デスクで使えます。\n・軽い\n・丈夫\n・安い";
        let sc = scored(&input, text);
        // No feature-like input -> never penalized.
        assert!(!sc.has_violation("weak_feature_linkage"));

        let sc = scored(&request(), text);
        assert!(sc.has_violation("weak_feature_linkage"));
    }

    #[test]
    fn test_unneeded_faq() {
        let input = request();
        let sc = scored(
            &input,
            "Acmeタンブラーはデスクで飲み物を保温する一本です。オフィスワーカーなら、毎日デスクで使えます。\n・真空断熱で保温6時間\nよくある質問はこちら。",
        );
        assert!(sc.has_violation("unneeded_faq"));

        let mut with_objections = request();
        with_objections.objections.push("手入れが面倒では".to_string());
        let sc = scored(
            &with_objections,
            "Acmeタンブラーはデスクで飲み物を保温する一本です。オフィスワーカーなら、毎日デスクで使えます。\n・真空断熱で保温6時間\nよくある質問はこちら。",
        );
        assert!(!sc.has_violation("unneeded_faq"));
    }

    #[test]
    fn test_repeated_sentence_endings() {
        let input = request();
        let sc = scored(
            &input,
            "Acmeタンブラーは便利です。どこでも使えて快適です。\n・真空断熱で保温6時間",
        );
        assert!(sc.has_violation("repeated_sentence_ending"));
    }

    #[test]
    fn test_concreteness_bonus_never_underflows() {
        let mut input = request();
        input.goal = "説明文を書いて".to_string();
        input.selling_points.clear();
        // Concrete body, near-clean text: bonus applies, score stays >= 0.
        let sc = scored(
            &input,
            "Acmeタンブラーは頼れる一本です。オフィスワーカーなら、毎日デスクで使えます。\n・朝でも6時間保温\n・デスクに置ける\n・350mlサイズ",
        );
        assert!(sc.score < 100);
    }

    #[test]
    fn test_grammar_breakage_scored() {
        let input = request();
        let sc = scored(
            &input,
            "Acmeタンブラーは保温力をが高い一本です。オフィスワーカーなら、毎日デスクで使えます。\n・真空断熱で保温6時間",
        );
        assert!(sc.has_violation("grammar_breakage"));
    }
}
