use serde::{Deserialize, Serialize};
use std::fmt;

pub use interfaces::defs::{
    ArticleRecord, Category, EntityLabel, EntitySpan, ModelLoadError, NerModel, SentimentModel,
    SentimentReading,
};

/// Stages of one enrichment run, in the only order they may be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Preprocess,
    CredibilityScore,
    ClaimFlag,
    Sentiment,
    BiasDetect,
    KeywordRank,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 6] = [
        PipelineStage::Preprocess,
        PipelineStage::CredibilityScore,
        PipelineStage::ClaimFlag,
        PipelineStage::Sentiment,
        PipelineStage::BiasDetect,
        PipelineStage::KeywordRank,
    ];

    pub fn position(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            PipelineStage::Preprocess => "preprocess",
            PipelineStage::CredibilityScore => "credibility_score",
            PipelineStage::ClaimFlag => "claim_flag",
            PipelineStage::Sentiment => "sentiment",
            PipelineStage::BiasDetect => "bias_detect",
            PipelineStage::KeywordRank => "keyword_rank",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Output of the preprocessing stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preprocessing {
    pub clean_text: String,
    pub word_count: usize,
    pub persons: Vec<String>,
    pub organizations: Vec<String>,
    pub locations: Vec<String>,
    /// Flat union of the categories (or the fallback matches).
    pub entities: Vec<String>,
    pub claims: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FactAccuracyRating {
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "high")]
    High,
    #[serde(rename = "very high")]
    VeryHigh,
}

impl FactAccuracyRating {
    /// Total, monotonic mapping from a credibility score.
    pub fn from_score(score: u8) -> Self {
        match score {
            88..=u8::MAX => FactAccuracyRating::VeryHigh,
            80..=87 => FactAccuracyRating::High,
            65..=79 => FactAccuracyRating::Medium,
            _ => FactAccuracyRating::Low,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FactAccuracyRating::Low => "low",
            FactAccuracyRating::Medium => "medium",
            FactAccuracyRating::High => "high",
            FactAccuracyRating::VeryHigh => "very high",
        }
    }
}

/// Output of the credibility stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredibilityAssessment {
    pub credibility_score: u8,
    pub bias_score: u8,
    pub political_bias: String,
    pub fact_accuracy_rating: FactAccuracyRating,
    pub credibility_notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentCategory {
    Positive,
    Negative,
    Neutral,
}

/// Output of the sentiment stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAssessment {
    pub sentiment_polarity: f64,
    pub sentiment_subjectivity: f64,
    pub sentiment_category: SentimentCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BiasDirection {
    LeftLeaning,
    RightLeaning,
    Neutral,
}

/// Output of the bias stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiasSignals {
    pub bias_direction: BiasDirection,
    pub left_keyword_count: usize,
    pub right_keyword_count: usize,
    pub emotional_language_count: usize,
}

/// An article as it moves through a run. Each stage fills exactly one of the
/// optional sections and never touches the others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(flatten)]
    pub record: ArticleRecord,
    #[serde(flatten)]
    pub preprocessing: Option<Preprocessing>,
    #[serde(flatten)]
    pub credibility: Option<CredibilityAssessment>,
    #[serde(flatten)]
    pub sentiment: Option<SentimentAssessment>,
    #[serde(flatten)]
    pub bias: Option<BiasSignals>,
}

impl Article {
    pub fn new(record: ArticleRecord) -> Self {
        Self {
            record,
            preprocessing: None,
            credibility: None,
            sentiment: None,
            bias: None,
        }
    }

    pub fn source(&self) -> &str {
        &self.record.source
    }

    /// Normalized text once preprocessing ran, empty before that.
    pub fn clean_text(&self) -> &str {
        self.preprocessing
            .as_ref()
            .map(|p| p.clean_text.as_str())
            .unwrap_or("")
    }

    pub fn claims(&self) -> &[String] {
        self.preprocessing
            .as_ref()
            .map(|p| p.claims.as_slice())
            .unwrap_or(&[])
    }
}

impl From<ArticleRecord> for Article {
    fn from(record: ArticleRecord) -> Self {
        Self::new(record)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagReason {
    VerificationKeyword,
    HighBiasSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlaggedClaim {
    pub claim: String,
    pub source: String,
    pub article_title: String,
    pub reason: FlagReason,
    pub credibility_score: u8,
}

#[derive(Debug, thiserror::Error)]
pub enum EnrichmentError {
    #[error("stage {stage} cannot run yet: {expected} has not completed")]
    StageOutOfOrder {
        stage: PipelineStage,
        expected: PipelineStage,
    },

    #[error("stage {stage} was already applied to this run")]
    StageAlreadyApplied { stage: PipelineStage },

    #[error("batch changed mid-run: expected {expected} articles, got {actual}")]
    BatchMismatch { expected: usize, actual: usize },

    #[error("run is incomplete, stage {missing} has not run")]
    IncompleteRun { missing: PipelineStage },

    #[error("invalid credibility entry for {source_name}: {reason}")]
    InvalidCredibilityEntry { source_name: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EnrichmentError>;
