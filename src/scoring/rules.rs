//! Scoring lexicons and the grammar-breakage rule table
//!
//! Each grammar rule is a data-described pattern so the table can be tested
//! row by row. Word lists are deliberately small and fixed; they encode the
//! house style, not a general language model.

use regex::Regex;
use std::sync::OnceLock;

/// Generic hype/filler vocabulary. Penalized heavier in the lead than in
/// the body.
pub const HYPE_WORDS: [&str; 10] = [
    "魅力的",
    "素敵",
    "画期的",
    "究極",
    "理想的",
    "抜群",
    "洗練",
    "こだわり",
    "ワンランク上",
    "至福",
];

/// Boilerplate "can-do" phrasing.
pub const CAN_DO_PHRASES: [&str; 3] = ["することができます", "することが可能です", "が可能です"];

/// Absolute-certainty claims penalized anywhere in the text.
pub const HARD_CLAIM_TERMS: [&str; 8] = [
    "絶対",
    "100%",
    "１００％",
    "完全に",
    "必ず",
    "永久に",
    "世界一",
    "No.1",
];

/// Softer certainty claims, penalized only at sentence start.
pub const SOFT_CLAIM_TERMS: [&str; 4] = ["最高", "完璧", "唯一", "業界随一"];

/// Evaluative/abstract vocabulary that disqualifies the second lead
/// sentence from reading as a concrete scene.
pub const ABSTRACT_EVAL_WORDS: [&str; 10] = [
    "魅力",
    "おすすめ",
    "人気",
    "評判",
    "最適",
    "理想",
    "素晴らし",
    "優れ",
    "クオリティ",
    "ハイグレード",
];

/// Action-verb fragments expected somewhere in the second lead sentence.
pub const ACTION_VERB_CUES: [&str; 10] = [
    "します", "できます", "使え", "飲め", "持ち運べ", "過ごせ", "楽しめ", "働け", "届", "選べ",
];

/// Time-of-day / cadence cues.
pub const TIME_WORDS: [&str; 10] = [
    "朝",
    "昼",
    "夜",
    "毎日",
    "週末",
    "通勤",
    "休憩",
    "ランチ",
    "午後",
    "いつでも",
];

/// Place cues.
pub const PLACE_WORDS: [&str; 10] = [
    "オフィス",
    "自宅",
    "デスク",
    "屋外",
    "室内",
    "職場",
    "カフェ",
    "車内",
    "外出先",
    "どこでも",
];

/// Common measurement units, for the body concreteness count.
pub const UNIT_WORDS: [&str; 12] = [
    "ml", "mL", "kg", "cm", "mm", "%", "％", "時間", "分", "円", "℃", "度",
];

/// Connectives that mark a feature -> effect linkage inside a bullet.
pub const LINKAGE_CONNECTIVES: [&str; 6] = ["により", "ので", "から", "ため", "だから", "で、"];

/// FAQ-style markers.
pub const FAQ_MARKERS: [&str; 5] = ["よくある質問", "Q&A", "Ｑ＆Ａ", "Q.", "Ｑ."];

/// Goals that are generic "write a description" requests carry no useful
/// alignment signal, so goal-reflection checks skip them.
pub const GENERIC_GOAL_MARKERS: [&str; 5] = ["説明文", "紹介文", "書いて", "作成", "作って"];

/// One grammar-breakage rule: a name, a pattern, and why it exists.
pub struct GrammarRule {
    pub name: &'static str,
    pub pattern: &'static str,
    pub note: &'static str,
}

/// The grammar-breakage table. Each hit is a heavy penalty; patterns are
/// narrow enough that a hit is near-certain breakage, not style.
pub const GRAMMAR_RULES: [GrammarRule; 5] = [
    GrammarRule {
        name: "particle_wo_ga",
        pattern: "をが|がを",
        note: "case particle doubled up",
    },
    GrammarRule {
        name: "particle_ni_wo_ha",
        pattern: "にをは|をには|はをに",
        note: "three-particle pileup",
    },
    GrammarRule {
        name: "doubled_connective",
        pattern: "のでので|ですです|ますます。",
        note: "connective or copula duplicated",
    },
    GrammarRule {
        name: "doubled_noun_phrase",
        pattern: "タンブラーのタンブラー|ボトルのボトル|デスクのデスク|毎日の毎日",
        note: "noun phrase repeated across の",
    },
    GrammarRule {
        name: "doubled_place_noun",
        pattern: "オフィスやオフィス|自宅や自宅|職場や職場",
        note: "place noun repeated in a list",
    },
];

static COMPILED_GRAMMAR: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();

/// Compiled grammar table, name + regex per rule.
pub fn grammar_rules() -> &'static [(&'static str, Regex)] {
    COMPILED_GRAMMAR.get_or_init(|| {
        GRAMMAR_RULES
            .iter()
            .map(|rule| {
                (
                    rule.name,
                    Regex::new(rule.pattern).expect("grammar rule pattern must compile"),
                )
            })
            .collect()
    })
}
