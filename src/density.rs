//! Input-material density evaluation
//!
//! Measures how much of a fixed "must-use" input set actually appears in a
//! generated text. The input set has a stable cardinality (3 without selling
//! points, 4 with) so density scores stay comparable across requests.

use crate::models::NormalizedInput;
use regex::Regex;
use std::sync::OnceLock;

/// Minimum fraction of recognized character classes before a line is
/// considered garbled and excluded from the input set. Tunable; calibrated
/// against production request logs, not a hard requirement.
pub const RECOGNIZED_RATIO_MIN: f64 = 0.60;

/// Maximum symbol density before a line of at least
/// [`SYMBOL_CHECK_MIN_CHARS`] is considered garbled. Tunable.
pub const SYMBOL_RATIO_MAX: f64 = 0.55;

pub const SYMBOL_CHECK_MIN_CHARS: usize = 6;

/// Minimum contiguous-substring length for a partial phrase match. Tunable.
pub const SUBSTRING_MATCH_CHARS: usize = 4;

/// Maximum characters of a phrase surfaced in masked logging output.
const MASK_MAX_CHARS: usize = 24;

/// Tokens that mark a home/remote-work audience. Used for the one narrow
/// paraphrase allowance: an unused audience phrase is promoted to used when
/// both the phrase and the output carry one of these. Deliberately minimal
/// and non-extensible.
const REMOTE_WORK_TOKENS: [&str; 4] = ["在宅", "リモート", "テレワーク", "自宅"];

static SPEC_TOKEN_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Numeric + unit token, e.g. "350ml", "２４時間", "1.2kg".
///
/// Longer unit spellings come first so alternation never stops at a prefix
/// ("mm" before "m", "kcal" before... etc).
fn spec_token_pattern() -> &'static Regex {
    SPEC_TOKEN_PATTERN.get_or_init(|| {
        Regex::new(
            r"[0-9０-９]+(?:[.．][0-9０-９]+)?(?:mAh|kcal|時間|週間|ヶ月|ml|mL|mg|mm|kg|km|cm|cc|％|%|℃|度|分|秒|日|年|円|倍|回|枚|個|名|人|L|g|m|W|V)",
        )
        .expect("spec token pattern must compile")
    })
}

/// The fixed-cardinality set of must-use phrases for one request.
#[derive(Debug, Clone, Default)]
pub struct InputSet {
    pub phrases: Vec<String>,
}

impl InputSet {
    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

/// Density evaluation for one candidate text.
#[derive(Debug, Clone, Default)]
pub struct DensityReport {
    pub input_count: usize,
    pub used_count: usize,
    /// `used / input`, or `None` when the input set is empty.
    pub density_a: Option<f64>,
    /// Phrases detected in the output, in input-set order.
    pub used_phrases: Vec<String>,
}

/// Build the input set: product name, goal, audience, plus at most one
/// representative selling point (fact-like if available, else the first).
///
/// Lines are trimmed, deduplicated exactly, and dropped when garbled; a
/// line the matcher can't reliably use is excluded rather than mis-scored.
/// The denominator therefore stays at exactly 3 or 4 for well-formed
/// requests.
pub fn build_input_set(input: &NormalizedInput) -> InputSet {
    let mut raw: Vec<&str> = vec![&input.product_name, &input.goal, &input.audience];
    if let Some(point) = representative_selling_point(&input.selling_points) {
        raw.push(point);
    }

    let mut phrases: Vec<String> = Vec::with_capacity(raw.len());
    for line in raw {
        let trimmed = line.trim();
        if trimmed.is_empty() || is_garbled(trimmed) {
            continue;
        }
        if phrases.iter().any(|p| p == trimmed) {
            continue;
        }
        phrases.push(trimmed.to_string());
    }

    InputSet { phrases }
}

/// Pick at most one selling point: the first fact-like entry, else the first
/// non-empty entry, else none.
fn representative_selling_point(points: &[String]) -> Option<&String> {
    points
        .iter()
        .find(|p| is_fact_like(p))
        .or_else(|| points.iter().find(|p| !p.trim().is_empty()))
}

/// A selling point is fact-like when it carries a concrete numeric claim.
pub fn is_fact_like(phrase: &str) -> bool {
    !extract_spec_tokens(phrase).is_empty()
        || phrase.chars().any(|c| c.is_ascii_digit() || ('０'..='９').contains(&c))
}

/// Heuristic for lines the matcher can't reliably use (mojibake, markup
/// fragments, copy-paste noise).
pub fn is_garbled(line: &str) -> bool {
    let chars: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
    if chars.is_empty() {
        return true;
    }
    let total = chars.len() as f64;
    let recognized = chars.iter().filter(|c| is_recognized_char(**c)).count() as f64;
    if recognized / total < RECOGNIZED_RATIO_MIN {
        return true;
    }
    if chars.len() >= SYMBOL_CHECK_MIN_CHARS {
        let symbols = total - recognized;
        if symbols / total > SYMBOL_RATIO_MAX {
            return true;
        }
    }
    false
}

fn is_recognized_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || ('ぁ'..='ゖ').contains(&c)          // hiragana
        || ('ァ'..='ヶ').contains(&c)          // katakana
        || ('一'..='鿿').contains(&c)          // CJK unified ideographs
        || ('０'..='９').contains(&c)
        || ('Ａ'..='Ｚ').contains(&c)
        || ('ａ'..='ｚ').contains(&c)
        || c == 'ー'
        || c == '々'
}

/// Extract numeric+unit tokens ("350ml", "24時間") from a phrase.
pub fn extract_spec_tokens(text: &str) -> Vec<String> {
    spec_token_pattern()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// True when `haystack` contains any contiguous `min_chars`-character
/// substring of `needle`. Character-based, not byte-based.
pub fn contains_fragment(needle: &str, haystack: &str, min_chars: usize) -> bool {
    let chars: Vec<char> = needle.chars().collect();
    if chars.len() < min_chars {
        return false;
    }
    chars
        .windows(min_chars)
        .any(|w| haystack.contains(&w.iter().collect::<String>()))
}

/// A phrase counts as used when it appears verbatim, when any 4+-character
/// contiguous substring of it appears, or when a numeric+unit token
/// extracted from it appears.
fn phrase_used(phrase: &str, output: &str) -> bool {
    if output.contains(phrase) {
        return true;
    }
    if contains_fragment(phrase, output, SUBSTRING_MATCH_CHARS) {
        return true;
    }
    extract_spec_tokens(phrase)
        .iter()
        .any(|token| output.contains(token))
}

/// Evaluate how much of the input set survived into `output`.
///
/// `audience` is the request's audience string, needed for the remote-work
/// promotion; it is matched against the set by exact phrase equality.
pub fn evaluate(set: &InputSet, audience: &str, output: &str) -> DensityReport {
    let audience = audience.trim();
    let mut used_phrases = Vec::new();

    for phrase in &set.phrases {
        let mut used = phrase_used(phrase, output);
        if !used && phrase == audience && remote_work_promotion(audience, output) {
            used = true;
        }
        if used {
            used_phrases.push(phrase.clone());
        }
    }

    let input_count = set.len();
    let used_count = used_phrases.len();
    let density_a = if input_count == 0 {
        None
    } else {
        Some(used_count as f64 / input_count as f64)
    };

    DensityReport {
        input_count,
        used_count,
        density_a,
        used_phrases,
    }
}

/// The audience counts as used when both it and the output speak to a
/// home/remote-work context, even without a literal match.
fn remote_work_promotion(audience: &str, output: &str) -> bool {
    REMOTE_WORK_TOKENS.iter().any(|t| audience.contains(t))
        && REMOTE_WORK_TOKENS.iter().any(|t| output.contains(t))
}

/// Mask a phrase for logging: digits become `#`, letters become `*`,
/// punctuation survives, and the result is length-capped.
pub fn mask_phrase(phrase: &str) -> String {
    let mut masked = String::new();
    for (i, c) in phrase.chars().enumerate() {
        if i >= MASK_MAX_CHARS {
            masked.push('…');
            break;
        }
        if c.is_numeric() {
            masked.push('#');
        } else if c.is_alphabetic() {
            masked.push('*');
        } else {
            masked.push(c);
        }
    }
    masked
}
