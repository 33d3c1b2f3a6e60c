/// Text processing utilities
pub mod text {
    use regex::Regex;
    use std::collections::HashSet;
    use std::sync::LazyLock;

    static HTML_TAG: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<[^>]*>").expect("html tag pattern compiles"));

    /// Strip markup and collapse every whitespace run into a single space.
    pub fn normalize_text(text: &str) -> String {
        let without_tags = HTML_TAG.replace_all(text, " ");
        without_tags.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    pub fn word_count(text: &str) -> usize {
        text.split_whitespace().count()
    }

    /// Split on `.`, `!` and `?`; consecutive delimiters produce no empty
    /// sentences. Returned sentences are trimmed.
    pub fn split_sentences(text: &str) -> impl Iterator<Item = &str> {
        text.split(['.', '!', '?'])
            .map(str::trim)
            .filter(|sentence| !sentence.is_empty())
    }

    /// Keep first occurrences (case-sensitive) and stop at `cap` entries.
    pub fn dedup_capped<I, S>(items: I, cap: usize) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        dedup_capped_by(items, cap, str::to_string)
    }

    /// Like `dedup_capped`, but "Paris" and "PARIS" are one item and the
    /// first spelling is kept.
    pub fn dedup_capped_ignore_case<I, S>(items: I, cap: usize) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        dedup_capped_by(items, cap, str::to_lowercase)
    }

    fn dedup_capped_by<I, S, K>(items: I, cap: usize, key: K) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        K: Fn(&str) -> String,
    {
        let mut seen = HashSet::new();
        let mut unique = Vec::new();
        for item in items {
            if unique.len() >= cap {
                break;
            }
            let item = item.as_ref();
            if seen.insert(key(item)) {
                unique.push(item.to_string());
            }
        }
        unique
    }

    pub fn round3(value: f64) -> f64 {
        (value * 1000.0).round() / 1000.0
    }
}

/// Source name utilities
pub mod source {
    /// Key used for credibility lookups: trimmed and lowercased.
    pub fn lookup_key(source: &str) -> String {
        source.trim().to_lowercase()
    }

    /// Key used for per-source rollups, e.g. "The Guardian" -> "the_guardian".
    pub fn rollup_key(source: &str) -> String {
        source
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("_")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_tags_and_collapses_whitespace() {
        let raw = "  <p>Senate   votes</p>\n\n<b>today</b>\t ";
        assert_eq!(text::normalize_text(raw), "Senate votes today");
        assert_eq!(text::normalize_text(""), "");
    }

    #[test]
    fn sentences_collapse_consecutive_delimiters() {
        let sentences: Vec<_> = text::split_sentences("Wait... what?! Yes. ").collect();
        assert_eq!(sentences, vec!["Wait", "what", "Yes"]);
    }

    #[test]
    fn dedup_is_case_sensitive_and_capped() {
        let items = ["Paris", "paris", "Paris", "Rome", "Oslo"];
        assert_eq!(text::dedup_capped(items, 10), vec!["Paris", "paris", "Rome", "Oslo"]);
        assert_eq!(text::dedup_capped(items, 2), vec!["Paris", "paris"]);
    }

    #[test]
    fn dedup_ignoring_case_keeps_first_spelling() {
        let items = ["Paris", "PARIS", "Rome", "paris", "Oslo"];
        assert_eq!(text::dedup_capped_ignore_case(items, 10), vec!["Paris", "Rome", "Oslo"]);
        assert_eq!(text::dedup_capped_ignore_case(items, 2), vec!["Paris", "Rome"]);
    }

    #[test]
    fn source_keys() {
        assert_eq!(source::lookup_key("  Reuters "), "reuters");
        assert_eq!(source::rollup_key(" The  Guardian "), "the_guardian");
    }

    #[test]
    fn rounding_keeps_three_decimals() {
        assert_eq!(text::round3(0.123_456), 0.123);
        assert_eq!(text::round3(-0.5), -0.5);
    }
}
