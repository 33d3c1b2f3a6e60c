use crate::types::{SentimentAssessment, SentimentCategory, SentimentModel, SentimentReading};
use crate::utils::text::round3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

pub const POSITIVE_THRESHOLD: f64 = 0.1;
pub const NEGATIVE_THRESHOLD: f64 = -0.1;

/// Threshold classification; both bounds are exclusive.
pub fn classify(polarity: f64) -> SentimentCategory {
    if polarity > POSITIVE_THRESHOLD {
        SentimentCategory::Positive
    } else if polarity < NEGATIVE_THRESHOLD {
        SentimentCategory::Negative
    } else {
        SentimentCategory::Neutral
    }
}

#[derive(Clone)]
pub enum SentimentCapability {
    Model(Arc<dyn SentimentModel>),
    Unavailable,
}

#[derive(Clone)]
pub struct SentimentScorer {
    capability: SentimentCapability,
}

impl SentimentScorer {
    pub fn with_model(model: Arc<dyn SentimentModel>) -> Self {
        info!("Sentiment scoring using model {}", model.model_name());
        Self {
            capability: SentimentCapability::Model(model),
        }
    }

    /// Every article scores as neutral with zero polarity and subjectivity.
    pub fn unavailable() -> Self {
        warn!("Sentiment model unavailable, scores will be zero");
        Self {
            capability: SentimentCapability::Unavailable,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.capability, SentimentCapability::Model(_))
    }

    /// Clamped, unrounded reading for `text`.
    pub fn reading(&self, text: &str) -> SentimentReading {
        match &self.capability {
            SentimentCapability::Model(model) => model.analyze(text).clamped(),
            SentimentCapability::Unavailable => SentimentReading::default(),
        }
    }

    pub fn score(&self, text: &str) -> SentimentAssessment {
        assess(self.reading(text))
    }
}

/// Rounds a reading for storage; the category comes from the raw polarity.
pub fn assess(reading: SentimentReading) -> SentimentAssessment {
    SentimentAssessment {
        sentiment_polarity: round3(reading.polarity),
        sentiment_subjectivity: round3(reading.subjectivity),
        sentiment_category: classify(reading.polarity),
    }
}

impl Default for SentimentScorer {
    fn default() -> Self {
        Self::with_model(Arc::new(LexiconSentimentModel::default()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentStats {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub avg_polarity: f64,
    pub avg_subjectivity: f64,
    #[serde(skip)]
    scored: usize,
    #[serde(skip)]
    polarity_total: f64,
    #[serde(skip)]
    subjectivity_total: f64,
}

impl SentimentStats {
    /// Means are taken over raw readings and rounded once.
    pub fn record(&mut self, reading: SentimentReading) {
        match classify(reading.polarity) {
            SentimentCategory::Positive => self.positive += 1,
            SentimentCategory::Negative => self.negative += 1,
            SentimentCategory::Neutral => self.neutral += 1,
        }
        self.scored += 1;
        self.polarity_total += reading.polarity;
        self.subjectivity_total += reading.subjectivity;
        self.avg_polarity = round3(self.polarity_total / self.scored as f64);
        self.avg_subjectivity = round3(self.subjectivity_total / self.scored as f64);
    }

    pub fn scored(&self) -> usize {
        self.scored
    }
}

/// Small word-score model: polarity and subjectivity are the means over the
/// lexicon words found in the text. A negator right before a word flips and
/// halves its polarity; an intensifier scales it.
pub struct LexiconSentimentModel {
    lexicon: HashMap<&'static str, (f64, f64)>,
}

const NEGATORS: [&str; 3] = ["not", "no", "never"];
const INTENSIFIERS: [(&str, f64); 4] = [
    ("very", 1.3),
    ("extremely", 1.5),
    ("highly", 1.3),
    ("slightly", 0.5),
];

const LEXICON: [(&str, f64, f64); 36] = [
    ("good", 0.7, 0.6),
    ("great", 0.8, 0.75),
    ("excellent", 1.0, 1.0),
    ("positive", 0.23, 0.55),
    ("strong", 0.43, 0.73),
    ("success", 0.5, 0.4),
    ("successful", 0.75, 0.95),
    ("win", 0.8, 0.4),
    ("gain", 0.3, 0.3),
    ("growth", 0.3, 0.2),
    ("improve", 0.4, 0.4),
    ("improved", 0.4, 0.4),
    ("hope", 0.4, 0.5),
    ("happy", 0.8, 1.0),
    ("best", 1.0, 0.3),
    ("safe", 0.5, 0.5),
    ("peace", 0.4, 0.3),
    ("agreement", 0.2, 0.2),
    ("bad", -0.7, 0.67),
    ("terrible", -1.0, 1.0),
    ("poor", -0.4, 0.6),
    ("negative", -0.3, 0.4),
    ("worst", -1.0, 1.0),
    ("crisis", -0.5, 0.5),
    ("disaster", -0.8, 0.7),
    ("dangerous", -0.6, 0.9),
    ("threat", -0.5, 0.5),
    ("attack", -0.6, 0.4),
    ("killed", -0.8, 0.3),
    ("loss", -0.4, 0.3),
    ("fail", -0.5, 0.3),
    ("failing", -0.5, 0.4),
    ("corrupt", -0.7, 0.8),
    ("scandal", -0.6, 0.6),
    ("angry", -0.5, 1.0),
    ("fear", -0.6, 0.7),
];

impl Default for LexiconSentimentModel {
    fn default() -> Self {
        Self {
            lexicon: LEXICON
                .iter()
                .map(|&(word, polarity, subjectivity)| (word, (polarity, subjectivity)))
                .collect(),
        }
    }
}

impl SentimentModel for LexiconSentimentModel {
    fn model_name(&self) -> &str {
        "lexicon"
    }

    fn analyze(&self, text: &str) -> SentimentReading {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered
            .split(|c: char| !(c.is_alphabetic() || c == '\''))
            .filter(|token| !token.is_empty())
            .collect();

        let mut matched = 0usize;
        let mut polarity = 0.0;
        let mut subjectivity = 0.0;
        for (index, token) in tokens.iter().enumerate() {
            let Some(&(word_polarity, word_subjectivity)) = self.lexicon.get(*token) else {
                continue;
            };
            let previous = index.checked_sub(1).map(|i| tokens[i]);
            let mut score = word_polarity;
            if let Some(previous) = previous {
                if let Some(&(_, factor)) = INTENSIFIERS.iter().find(|(w, _)| *w == previous) {
                    score *= factor;
                }
                if NEGATORS.contains(&previous) || previous.ends_with("n't") {
                    score *= -0.5;
                }
            }
            matched += 1;
            polarity += score;
            subjectivity += word_subjectivity;
        }

        if matched == 0 {
            return SentimentReading::default();
        }
        SentimentReading {
            polarity: polarity / matched as f64,
            subjectivity: subjectivity / matched as f64,
        }
        .clamped()
    }
}
