//! Deterministic candidate repair
//!
//! Two idempotent, meaning-preserving transformations applied to every
//! candidate before scoring:
//! - bullet repair: split visibly collapsed bullet lines, merge dangling
//!   mid-sentence fragments, cap the bullet section at 3 lines
//! - audience enforcement: make sure the exact audience phrase appears in
//!   the lead
//!
//! Scoring always runs on the repaired text, never the raw generation
//! output, so diagnostics and the returned text stay consistent.

pub mod final_pass;

/// Maximum bullet lines retained after repair.
pub const MAX_BULLETS: usize = 3;

/// Characters that open a bullet line.
const BULLET_MARKERS: [char; 3] = ['・', '●', '-'];

/// Markers eligible for intra-line splitting. '-' is excluded: it appears
/// inside product codes and latin compounds far too often.
const SPLIT_MARKERS: [char; 2] = ['・', '●'];

/// Hiragana patterns that open a new bullet clause after an interior marker.
/// Without one of these (or a digit/letter/quote/bracket) the marker is
/// treated as part of a lexical compound like 保温・保冷 and left alone.
const CLAUSE_OPENERS: [&str; 12] = [
    "お", "ご", "どこ", "いつ", "すぐ", "しっかり", "たっぷり", "使い", "持ち", "飲み", "洗い",
    "選べ",
];

const SENTENCE_ENDERS: [char; 3] = ['。', '！', '？'];

const FRAGMENT_PUNCT: &str = "。、！？!?…」』）)";

/// Maximum length (in chars) of a dangling fragment that gets merged back
/// into the preceding bullet.
const FRAGMENT_MAX_CHARS: usize = 6;

/// Place nouns that mark a location-opening second sentence.
const LOCATION_LEADS: [&str; 10] = [
    "オフィス", "自宅", "屋外", "室内", "車内", "外出先", "職場", "キッチン", "リビング",
    "どこ",
];

/// Verb stems / gerund nouns that mark an action-opening second sentence.
const ACTION_LEADS: [&str; 9] = [
    "使い", "働き", "作業", "移動", "持ち運", "飲み", "食べ", "通勤", "通学",
];

/// Structural zones of a candidate text: prose lead, bullet block, and any
/// trailing non-bullet lines (closing CTA etc).
#[derive(Debug, Clone, Default)]
pub struct Sections {
    pub lead: String,
    pub bullets: Vec<String>,
    pub tail: Vec<String>,
}

pub fn is_bullet_line(line: &str) -> bool {
    line.trim_start()
        .chars()
        .next()
        .is_some_and(|c| BULLET_MARKERS.contains(&c))
}

/// Split a text into lead / bullet block / tail without modifying it.
pub fn split_sections(text: &str) -> Sections {
    let mut lead_lines: Vec<&str> = Vec::new();
    let mut bullets: Vec<String> = Vec::new();
    let mut tail: Vec<String> = Vec::new();
    let mut in_block = false;
    let mut in_tail = false;

    for line in text.lines() {
        if in_tail {
            tail.push(line.to_string());
        } else if is_bullet_line(line) {
            in_block = true;
            bullets.push(line.to_string());
        } else if in_block {
            in_tail = true;
            tail.push(line.to_string());
        } else {
            lead_lines.push(line);
        }
    }

    Sections {
        lead: lead_lines.join("\n"),
        bullets,
        tail,
    }
}

/// Split a text into sentences, terminators retained. Newlines are treated
/// as soft breaks and dropped.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if c == '\n' || c == '\r' {
            continue;
        }
        current.push(c);
        if SENTENCE_ENDERS.contains(&c) {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_string());
            }
            current.clear();
        }
    }
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    sentences
}

/// Run the full repair pass. Returns the repaired text and whether anything
/// changed.
pub fn repair_text(text: &str, audience: &str) -> (String, bool) {
    let bulleted = repair_bullets(text);
    let enforced = enforce_audience(&bulleted, audience);
    let did_repair = enforced != text;
    (enforced, did_repair)
}

/// Normalize the bullet block: split collapsed lines, merge dangling
/// fragments, truncate to [`MAX_BULLETS`].
pub fn repair_bullets(text: &str) -> String {
    let mut lead: Vec<String> = Vec::new();
    let mut bullets: Vec<String> = Vec::new();
    let mut tail: Vec<String> = Vec::new();
    let mut in_block = false;
    let mut in_tail = false;

    for line in text.lines() {
        if in_tail {
            tail.push(line.to_string());
        } else if is_bullet_line(line) {
            in_block = true;
            bullets.extend(split_collapsed_line(line));
        } else if in_block && is_dangling_fragment(line) {
            // Mid-sentence line break: glue the fragment back on.
            if let Some(last) = bullets.last_mut() {
                last.push_str(line.trim());
            }
        } else if in_block {
            in_tail = true;
            tail.push(line.to_string());
        } else {
            lead.push(line.to_string());
        }
    }

    bullets.truncate(MAX_BULLETS);

    let mut out: Vec<String> = lead;
    out.extend(bullets);
    out.extend(tail);
    out.join("\n")
}

/// Split a bullet line at interior markers, but only where the following
/// content reads as the start of a new clause.
fn split_collapsed_line(line: &str) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    let mut pieces: Vec<String> = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if SPLIT_MARKERS.contains(&c) && !current.trim().is_empty() {
            let rest: String = chars[i + 1..].iter().collect();
            if opens_new_clause(&rest) {
                pieces.push(current.trim_end().to_string());
                current = String::new();
            }
        }
        current.push(c);
    }
    if !current.trim().is_empty() {
        pieces.push(current.trim_end().to_string());
    }
    pieces
}

/// Content after an interior marker that looks like a fresh list item:
/// a digit, a Latin letter, an opening quote/bracket, or one of the fixed
/// clause-opening hiragana patterns. Kanji continuations stay fused so
/// lexical compounds (保温・保冷) survive.
fn opens_new_clause(rest: &str) -> bool {
    let Some(first) = rest.chars().next() else {
        return false;
    };
    if first.is_ascii_alphanumeric()
        || ('０'..='９').contains(&first)
        || ('Ａ'..='Ｚ').contains(&first)
        || ('ａ'..='ｚ').contains(&first)
    {
        return true;
    }
    if "「『（(【[\"'“‘".contains(first) {
        return true;
    }
    CLAUSE_OPENERS.iter().any(|lead| rest.starts_with(lead))
}

/// A short line that is only punctuation or a short hiragana run, with no
/// bullet marker. The residue of a mid-sentence line break.
fn is_dangling_fragment(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() || is_bullet_line(trimmed) {
        return false;
    }
    let chars: Vec<char> = trimmed.chars().collect();
    chars.len() <= FRAGMENT_MAX_CHARS
        && chars
            .iter()
            .all(|&c| is_hiragana(c) || FRAGMENT_PUNCT.contains(c))
}

fn is_hiragana(c: char) -> bool {
    ('ぁ'..='ゖ').contains(&c) || c == 'ー'
}

/// Make sure the exact audience phrase appears in the text. When absent it
/// is injected once into the second lead sentence with a connective chosen
/// by how that sentence opens; a lead with fewer than two sentences gets a
/// trailing audience sentence instead. Already present -> no change.
pub fn enforce_audience(text: &str, audience: &str) -> String {
    let audience = audience.trim();
    if audience.is_empty() || text.contains(audience) {
        return text.to_string();
    }

    let sections = split_sections(text);
    let mut sentences = split_sentences(&sections.lead);

    let lead = if sentences.len() >= 2 {
        let particle = connective_for(&sentences[1]);
        sentences[1] = format!("{audience}{particle}{}", sentences[1]);
        sentences.concat()
    } else {
        let trimmed = sections.lead.trim_end();
        if trimmed.is_empty() {
            format!("{audience}にぴったりです。")
        } else if trimmed.ends_with(SENTENCE_ENDERS) {
            format!("{trimmed}{audience}にぴったりです。")
        } else {
            format!("{trimmed}。{audience}にぴったりです。")
        }
    };

    let mut out: Vec<String> = vec![lead];
    out.extend(sections.bullets);
    out.extend(sections.tail);
    out.join("\n")
}

/// Two connectives cover three openings: location and action sentences read
/// naturally with なら, everything else takes には.
fn connective_for(sentence: &str) -> &'static str {
    let location = LOCATION_LEADS.iter().any(|l| sentence.starts_with(l));
    let action = ACTION_LEADS.iter().any(|l| sentence.starts_with(l));
    if location || action {
        "なら、"
    } else {
        "には、"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapsed_bullets_split() {
        // Scenario: one collapsed line becomes three bullets.
        let repaired = repair_bullets("・A・B・C");
        assert_eq!(repaired, "・A\n・B\n・C");
    }

    #[test]
    fn test_lexical_compound_not_split() {
        let line = "・保温・保冷どちらも対応";
        let repaired = repair_bullets(line);
        assert_eq!(repaired, line);
    }

    #[test]
    fn test_clause_opener_split() {
        let repaired = repair_bullets("・軽量ボディ・お手入れ簡単");
        assert_eq!(repaired, "・軽量ボディ\n・お手入れ簡単");
    }

    #[test]
    fn test_dangling_fragment_merged() {
        let text = "・保温力が高い\nです。\n・軽量";
        let repaired = repair_bullets(text);
        assert_eq!(repaired, "・保温力が高いです。\n・軽量");
    }

    #[test]
    fn test_bullets_truncated_to_three() {
        let text = "リード文。\n・一\n・二\n・三\n・四\n・五";
        let repaired = repair_bullets(text);
        let sections = split_sections(&repaired);
        assert_eq!(sections.bullets.len(), 3);
        assert_eq!(sections.bullets, vec!["・一", "・二", "・三"]);
    }

    #[test]
    fn test_tail_preserved() {
        let text = "リード文です。\n・一\n・二\n今すぐチェックしてください。";
        let repaired = repair_bullets(text);
        assert!(repaired.ends_with("今すぐチェックしてください。"));
    }

    #[test]
    fn test_audience_injected_into_second_sentence() {
        let text = "Acmeタンブラーは新しい定番です。毎日の休憩がもっと楽しくなります。\n・保温6時間";
        let out = enforce_audience(text, "オフィスワーカー");
        assert!(out.contains("オフィスワーカーには、毎日の休憩"));
    }

    #[test]
    fn test_audience_connective_for_location_opening() {
        let text = "Acmeタンブラーは新しい定番です。オフィスでも大活躍します。";
        let out = enforce_audience(text, "営業職の方");
        assert!(out.contains("営業職の方なら、オフィスでも"));
    }

    #[test]
    fn test_audience_appended_when_lead_short() {
        let text = "Acmeタンブラーの紹介です。\n・保温6時間";
        let out = enforce_audience(text, "オフィスワーカー");
        assert!(out.contains("オフィスワーカーにぴったりです。"));
    }

    #[test]
    fn test_audience_present_is_noop() {
        let text = "オフィスワーカーの定番。毎日使えます。";
        assert_eq!(enforce_audience(text, "オフィスワーカー"), text);
    }

    #[test]
    fn test_repair_idempotent() {
        let raw = "Acmeタンブラーは頼れる相棒です。休憩が変わります。\n・保温力が高い\nです。\n・A・B・C\n・保温・保冷対応\n・五つ目";
        let (once, changed) = repair_text(raw, "オフィスワーカー");
        assert!(changed);
        let (twice, changed_again) = repair_text(&once, "オフィスワーカー");
        assert_eq!(once, twice);
        assert!(!changed_again);
    }

    #[test]
    fn test_split_sections_structure() {
        let text = "一文目。二文目。\n・あ\n・い\n締めの一文。";
        let s = split_sections(text);
        assert_eq!(s.lead, "一文目。二文目。");
        assert_eq!(s.bullets.len(), 2);
        assert_eq!(s.tail, vec!["締めの一文。"]);
    }

    #[test]
    fn test_split_sentences() {
        let s = split_sentences("一つ目です。二つ目！三つ目");
        assert_eq!(s, vec!["一つ目です。", "二つ目！", "三つ目"]);
    }
}
