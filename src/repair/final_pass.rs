//! Last-mile safety repair
//!
//! A short fixed table of regex-to-literal replacements applied once, to the
//! winning text only, after all scoring. Every entry is meaning-preserving:
//! known particle-misuse sequences, one duplicated-place-noun pattern, and
//! doubled punctuation. No content is removed.

use regex::Regex;
use std::sync::OnceLock;

/// One safety fix: a pattern and the literal it collapses to.
pub struct SafetyFix {
    pub name: &'static str,
    pub pattern: &'static str,
    pub replacement: &'static str,
}

pub const SAFETY_FIXES: [SafetyFix; 7] = [
    SafetyFix {
        name: "particle_wo_ga",
        pattern: "をが",
        replacement: "が",
    },
    SafetyFix {
        name: "particle_ga_wo",
        pattern: "がを",
        replacement: "を",
    },
    SafetyFix {
        name: "doubled_node",
        pattern: "のでので",
        replacement: "ので",
    },
    SafetyFix {
        name: "doubled_office",
        pattern: "オフィスやオフィス",
        replacement: "オフィス",
    },
    SafetyFix {
        name: "doubled_kuten",
        pattern: "。。+",
        replacement: "。",
    },
    SafetyFix {
        name: "doubled_touten",
        pattern: "、、+",
        replacement: "、",
    },
    SafetyFix {
        name: "doubled_exclaim",
        pattern: "！！+",
        replacement: "！",
    },
];

static COMPILED: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();

fn compiled() -> &'static [(Regex, &'static str)] {
    COMPILED.get_or_init(|| {
        SAFETY_FIXES
            .iter()
            .map(|fix| {
                (
                    Regex::new(fix.pattern).expect("safety fix pattern must compile"),
                    fix.replacement,
                )
            })
            .collect()
    })
}

/// Apply the full fix table to the winning text.
pub fn apply_safety_repair(text: &str) -> String {
    let mut out = text.to_string();
    for (pattern, replacement) in compiled() {
        if pattern.is_match(&out) {
            out = pattern.replace_all(&out, *replacement).into_owned();
        }
    }
    out
}
