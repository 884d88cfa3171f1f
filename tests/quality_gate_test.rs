//! Cross-module quality-gate tests
//!
//! Verifies that the repair -> scoring -> selection chain upholds its
//! structural invariants on realistic candidate texts.

use copysmith::density;
use copysmith::models::{Candidate, CandidateOutcome, NormalizedInput, RepairedCandidate};
use copysmith::repair;
use copysmith::scoring;
use copysmith::selector;

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

fn score(input: &NormalizedInput, raw: &str) -> scoring::ScoredCandidate {
    let (text, did_repair) = repair::repair_text(raw, &input.audience);
    let set = density::build_input_set(input);
    let repaired = RepairedCandidate {
        candidate: Candidate {
            index: 1,
            outcome: CandidateOutcome::Success {
                text: raw.to_string(),
                latency_ms: 0,
                status: 200,
                status_text: "OK".to_string(),
            },
        },
        text,
        did_repair,
    };
    scoring::score_candidate(input, &set, &repaired)
}

#[test]
fn repaired_candidates_never_exceed_three_bullets() {
    let input = request();
    let raws = [
        "リード。二文目。\n・一・二・三・四・五",
        "リード。二文目。\n・1\n・2\n・3\n・4\n・5\n・6",
        "・A・B・C",
    ];
    for raw in raws {
        let scored = score(&input, raw);
        let sections = repair::split_sections(&scored.text);
        assert!(
            sections.bullets.len() <= 3,
            "raw {raw:?} produced {} bullets",
            sections.bullets.len()
        );
    }
}

#[test]
fn scoring_runs_on_post_repair_text() {
    let input = request();
    // Raw text lacks the audience; repair injects it, and scoring must see
    // the injected form.
    let raw = "Acmeタンブラーはデスクで飲み物を保温する一本です。毎日の休憩にデスクでそのまま使えます。\n・真空断熱により保温6時間続く\n・350mlサイズなので軽い\n・結露しにくいから安心";
    let scored = score(&input, raw);
    assert!(scored.did_repair);
    assert!(scored.text.contains("オフィスワーカー"));
    // Density credits the injected audience phrase.
    assert_eq!(scored.density_a, Some(1.0));
}

#[test]
fn cleaner_candidate_outranks_noisy_one() {
    let input = request();
    let clean = score(
        &input,
        "Acmeタンブラーはデスクで飲み物を保温する専用ボトルです。オフィスワーカーなら、毎日の休憩にデスクでそのまま使えます。\n・真空断熱により保温6時間続く\n・350mlサイズなので持ち歩きやすい\n・結露しにくいからデスクを汚さない",
    );
    let noisy = score(
        &input,
        "■究極のタンブラー\nこの商品は絶対に満足できる究極の一品です。人気で評判の理想のクオリティ。\n・魅力的\n・素敵",
    );
    assert!(clean.score < noisy.score);

    let ordered = selector::order_candidates(vec![noisy, clean]);
    assert!(ordered[0].text.contains("専用ボトル"));
    assert!(ordered[0].score < ordered[1].score);
}

#[test]
fn repair_then_score_is_stable_under_reapplication() {
    let input = request();
    let raw = "Acmeタンブラーは便利です。二文目です。\n・保温力が高い\nです。\n・A・B・C";
    let (once, _) = repair::repair_text(raw, &input.audience);
    let (twice, changed) = repair::repair_text(&once, &input.audience);
    assert_eq!(once, twice);
    assert!(!changed);

    let first = score(&input, raw);
    let second = score(&input, &first.text);
    assert_eq!(first.score, second.score);
    assert_eq!(first.reason_codes(), second.reason_codes());
}
