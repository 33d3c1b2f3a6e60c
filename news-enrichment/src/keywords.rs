use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

pub const TOP_KEYWORDS: usize = 20;

pub const STOPWORDS: [&str; 24] = [
    "that", "this", "with", "from", "have", "been", "their", "said", "will", "were", "what",
    "would", "there", "about", "which", "when", "they", "more", "than", "other", "some", "into",
    "could", "only",
];

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-z]{4,}\b").expect("keyword pattern compiles"));

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordRanking {
    /// At most `TOP_KEYWORDS` entries, count descending.
    pub top: Vec<(String, usize)>,
    pub distinct: usize,
}

#[derive(Debug, Clone, Default)]
pub struct KeywordRanker;

impl KeywordRanker {
    pub fn new() -> Self {
        Self
    }

    /// Rank the words of a corpus. Equal counts keep first-occurrence order.
    pub fn rank(&self, corpus: &str) -> KeywordRanking {
        let lowered = corpus.to_lowercase();
        let mut positions: HashMap<&str, usize> = HashMap::new();
        let mut counts: Vec<(String, usize)> = Vec::new();

        for word in WORD.find_iter(&lowered).map(|m| m.as_str()) {
            if STOPWORDS.contains(&word) {
                continue;
            }
            match positions.get(word) {
                Some(&index) => counts[index].1 += 1,
                None => {
                    positions.insert(word, counts.len());
                    counts.push((word.to_string(), 1));
                }
            }
        }

        let distinct = counts.len();
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts.truncate(TOP_KEYWORDS);
        KeywordRanking {
            top: counts,
            distinct,
        }
    }
}
