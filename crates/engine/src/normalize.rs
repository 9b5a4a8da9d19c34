use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

// Legal forms and venue words that say nothing about which merchant it is.
re!(re_noise_suffix,
    r"\b(?:gmbh|ag|kg|ohg|e\.k|ug|mbh|co|inc|ltd|llc|corp|sa|srl|restaurant|hotel|gasthof|cafe|café)\b\.?");
re!(re_punctuation,
    r"[^\w\s]");

/// Lower-cases a merchant name or statement description, drops legal-form and
/// venue words, turns punctuation into spaces and collapses whitespace.
pub fn normalize_merchant(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    let stripped = re_noise_suffix().replace_all(&lower, "");
    let spaced = re_punctuation().replace_all(&stripped, " ");
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Number of distinct words two normalized names have in common.
pub fn shared_word_count(a: &str, b: &str) -> usize {
    let a_words: HashSet<&str> = a.split_whitespace().collect();
    let b_words: HashSet<&str> = b.split_whitespace().collect();
    a_words.intersection(&b_words).count()
}
