use crate::types::{Article, BiasDirection, BiasSignals};
use crate::utils::source::rollup_key;
use crate::utils::text::round3;
use aho_corasick::{AhoCorasick, AhoCorasickBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

pub const LEFT_TERMS: [&str; 10] = [
    "progressive",
    "reform",
    "equality",
    "climate",
    "healthcare",
    "workers",
    "regulation",
    "discrimination",
    "rights",
    "justice",
];

pub const RIGHT_TERMS: [&str; 10] = [
    "conservative",
    "traditional",
    "freedom",
    "security",
    "border",
    "tax",
    "deregulation",
    "law and order",
    "values",
    "patriot",
];

pub const EMOTIONAL_TERMS: [&str; 11] = [
    "crisis",
    "disaster",
    "threat",
    "dangerous",
    "attack",
    "destroy",
    "scandal",
    "corrupt",
    "failing",
    "radical",
    "extreme",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lexicon {
    Left,
    Right,
    Emotional,
}

/// Keyword-frequency bias heuristic over three fixed lexicons.
///
/// All lexicon terms are compiled into one case-insensitive automaton and
/// every occurrence is counted, so "regulation" also counts inside
/// "deregulation".
#[derive(Debug, Clone)]
pub struct BiasDetector {
    matcher: AhoCorasick,
    lexicons: Vec<Lexicon>,
}

impl BiasDetector {
    pub fn new() -> Self {
        let mut terms = Vec::new();
        let mut lexicons = Vec::new();
        for (lexicon, words) in [
            (Lexicon::Left, &LEFT_TERMS[..]),
            (Lexicon::Right, &RIGHT_TERMS[..]),
            (Lexicon::Emotional, &EMOTIONAL_TERMS[..]),
        ] {
            for word in words {
                terms.push(*word);
                lexicons.push(lexicon);
            }
        }
        let matcher = AhoCorasickBuilder::new()
            .ascii_case_insensitive(true)
            .build(&terms)
            .expect("bias lexicons compile");
        Self { matcher, lexicons }
    }

    pub fn detect(&self, text: &str) -> BiasSignals {
        let mut left = 0;
        let mut right = 0;
        let mut emotional = 0;
        for found in self.matcher.find_overlapping_iter(text) {
            match self.lexicons[found.pattern().as_usize()] {
                Lexicon::Left => left += 1,
                Lexicon::Right => right += 1,
                Lexicon::Emotional => emotional += 1,
            }
        }

        let bias_direction = if left > right {
            BiasDirection::LeftLeaning
        } else if right > left {
            BiasDirection::RightLeaning
        } else {
            BiasDirection::Neutral
        };

        BiasSignals {
            bias_direction,
            left_keyword_count: left,
            right_keyword_count: right,
            emotional_language_count: emotional,
        }
    }
}

impl Default for BiasDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-source rollup of bias signals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceBias {
    pub display_name: String,
    pub articles: usize,
    pub left_signals: usize,
    pub right_signals: usize,
    pub emotional_language: usize,
    pub avg_left_signals: f64,
    pub avg_right_signals: f64,
    pub avg_emotional: f64,
}

impl SourceBias {
    fn add(&mut self, signals: &BiasSignals) {
        self.articles += 1;
        self.left_signals += signals.left_keyword_count;
        self.right_signals += signals.right_keyword_count;
        self.emotional_language += signals.emotional_language_count;

        let n = self.articles as f64;
        self.avg_left_signals = round3(self.left_signals as f64 / n);
        self.avg_right_signals = round3(self.right_signals as f64 / n);
        self.avg_emotional = round3(self.emotional_language as f64 / n);
    }
}

/// Bias rollups keyed by normalized source name. A source only gets an entry
/// once one of its articles is added, so every entry has `articles >= 1`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BiasAnalysis {
    sources: BTreeMap<String, SourceBias>,
}

impl BiasAnalysis {
    pub fn add(&mut self, source: &str, signals: &BiasSignals) {
        let entry = self
            .sources
            .entry(rollup_key(source))
            .or_insert_with(|| SourceBias {
                display_name: source.trim().to_string(),
                ..SourceBias::default()
            });
        entry.add(signals);
    }

    /// Fold every article that carries bias signals.
    pub fn add_articles(&mut self, articles: &[Article]) {
        for article in articles {
            if let Some(signals) = &article.bias {
                self.add(article.source(), signals);
            }
        }
        debug!("Bias rollup covers {} sources", self.sources.len());
    }

    pub fn get(&self, source: &str) -> Option<&SourceBias> {
        self.sources.get(&rollup_key(source))
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SourceBias)> {
        self.sources.iter()
    }
}
