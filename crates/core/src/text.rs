//! Small text predicates shared by the title, form and heading stages.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

/// Whitespace-separated words.
pub fn words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn distinct_count(words: &[&str]) -> usize {
    words.iter().collect::<HashSet<_>>().len()
}

/// `true` when fewer than `ratio` of the words are distinct.
///
/// `distinct < len * ratio`, compared in `f64` so the boundary is exact for
/// the ratios the pipeline uses.
pub fn is_repetitive(words: &[&str], ratio: f64) -> bool {
    (distinct_count(words) as f64) < words.len() as f64 * ratio
}

/// `true` when more than `ratio` of the words are distinct.
pub fn is_mostly_distinct(words: &[&str], ratio: f64) -> bool {
    distinct_count(words) as f64 > words.len() as f64 * ratio
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Average word length in characters, `0.0` for no words.
pub fn average_word_len(words: &[&str]) -> f64 {
    if words.is_empty() {
        return 0.0;
    }
    let total: usize = words.iter().map(|w| char_len(w)).sum();
    total as f64 / words.len() as f64
}

/// At least one cased character and no lowercase ones.
pub fn is_upper(text: &str) -> bool {
    let mut cased = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// Short all-caps phrase: all-caps with at most five words.
pub fn is_short_caps(text: &str) -> bool {
    is_upper(text) && word_count(text) <= 5
}

/// `true` when the lowercased word contains `run` identical consecutive ASCII
/// letters (`"committee"` has a doubled run, `"brrr"` a tripled one).
pub fn has_letter_run(word: &str, run: usize) -> bool {
    let lower = word.to_lowercase();
    let mut prev: Option<char> = None;
    let mut len = 0;
    for c in lower.chars() {
        if c.is_ascii_lowercase() && prev == Some(c) {
            len += 1;
        } else {
            len = 1;
        }
        if c.is_ascii_lowercase() && len >= run {
            return true;
        }
        prev = Some(c);
    }
    false
}

/// Collapse every whitespace run to a single space and trim both ends.
pub fn collapse_whitespace(text: &str) -> String {
    words(text).join(" ")
}

/// `"<int>. "` at the start of the text.
pub fn is_ordinal_item(text: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\s+").unwrap())
        .is_match(text)
}

/// `"<int>.<int> "` at the start of the text.
pub fn is_ordinal_subitem(text: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\d+\s+").unwrap())
        .is_match(text)
}

/// Either ordinal list form.
pub fn is_ordinal_list(text: &str) -> bool {
    is_ordinal_item(text) || is_ordinal_subitem(text)
}

/// `"<int>. <Capital>..."`, the shape of a numbered form field label.
pub fn is_numbered_field(text: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\s+[A-Z]").unwrap())
        .is_match(text)
}

/// A four-digit number with word boundaries and at least one character on
/// each side, e.g. `"(2023)"` or `"March 2021 update"`.
pub fn contains_bounded_year(text: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r".\b\d{4}\b.").unwrap())
        .is_match(text)
}

/// Text ending in four digits.
pub fn ends_with_year(text: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{4}$").unwrap())
        .is_match(text)
}

/// A capital letter followed by a lowercase one at the start.
pub fn starts_capitalized(text: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z][a-z]").unwrap())
        .is_match(text)
}

/// Placeholder inserted after a short all-caps prefix such as `"RFP:"`.
pub const ACRONYM_EXPANSION: &str = "Expanded Form ";

/// Insert [`ACRONYM_EXPANSION`] after a leading all-caps acronym.
///
/// Applies when the text has at least five words, starts with one to four
/// uppercase ASCII letters followed by `:`, and the first word after the
/// colon is capitalised and at most three characters long.
pub fn expand_acronym_prefix(text: &str) -> String {
    let Some(colon) = text.find(':') else {
        return text.to_string();
    };
    let prefix = &text[..colon];
    if colon == 0 || colon >= 5 || !prefix.chars().all(|c| c.is_ascii_uppercase()) {
        return text.to_string();
    }
    if word_count(text) < 5 {
        return text.to_string();
    }
    let rest = text[colon + 1..].trim();
    let capitalised = rest.chars().next().is_some_and(|c| c.is_uppercase());
    let short_first = rest
        .split_whitespace()
        .next()
        .is_some_and(|w| char_len(w) <= 3);
    if !(capitalised && short_first) {
        return text.to_string();
    }
    format!("{prefix}:{ACRONYM_EXPANSION}{}", &text[colon + 1..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_upper_requires_cased_char() {
        assert!(is_upper("HELLO WORLD"));
        assert!(is_upper("SECTION 2:"));
        assert!(!is_upper("1234"));
        assert!(!is_upper("Hello"));
        assert!(!is_upper(""));
    }

    #[test]
    fn test_short_caps_word_limit() {
        assert!(is_short_caps("ONE TWO THREE FOUR FIVE"));
        assert!(!is_short_caps("ONE TWO THREE FOUR FIVE SIX"));
    }

    #[test]
    fn test_letter_runs() {
        assert!(has_letter_run("Committee", 2));
        assert!(!has_letter_run("Overview", 2));
        assert!(has_letter_run("RRRequest", 3));
        assert!(!has_letter_run("Committee", 3));
        assert!(!has_letter_run("1100", 2));
    }

    #[test]
    fn test_repetition_ratios() {
        let w = words("a a a a b b");
        assert!(is_repetitive(&w, 0.5));
        assert!(!is_mostly_distinct(&w, 0.8));
        let w = words("alpha beta gamma delta");
        assert!(!is_repetitive(&w, 0.6));
        assert!(is_mostly_distinct(&w, 0.8));
    }

    #[test]
    fn test_ordinal_patterns() {
        assert!(is_ordinal_item("1. Introduction"));
        assert!(is_ordinal_subitem("2.3 Scope"));
        assert!(!is_ordinal_item("2.3 Scope"));
        assert!(!is_ordinal_list("Introduction"));
        assert!(is_numbered_field("3. Name"));
        assert!(!is_numbered_field("3. name"));
    }

    #[test]
    fn test_bounded_year() {
        assert!(contains_bounded_year("(2023)"));
        assert!(contains_bounded_year("Report for 2021 season"));
        assert!(!contains_bounded_year("2021"));
        assert!(!contains_bounded_year("Version 12345 build"));
    }

    #[test]
    fn test_ends_with_year() {
        assert!(ends_with_year("March 21, 2003"));
        assert!(!ends_with_year("2003 March"));
    }

    #[test]
    fn test_expand_acronym_prefix() {
        assert_eq!(
            expand_acronym_prefix("RFP: To Develop the Ontario Library"),
            "RFP:Expanded Form  To Develop the Ontario Library"
        );
    }

    #[test]
    fn test_expand_acronym_prefix_skips_long_first_word() {
        let t = "RFP: Request for Proposal documents";
        assert_eq!(expand_acronym_prefix(t), t);
    }

    #[test]
    fn test_expand_acronym_prefix_skips_short_titles() {
        let t = "RFP: To Do";
        assert_eq!(expand_acronym_prefix(t), t);
    }

    #[test]
    fn test_expand_acronym_prefix_requires_caps_prefix() {
        let t = "Rfp: To Develop the Ontario Library";
        assert_eq!(expand_acronym_prefix(t), t);
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \t b\n c  "), "a b c");
    }
}
