pub mod types;
pub mod utils;
pub mod entities;
pub mod claims;
pub mod credibility;
pub mod sentiment;
pub mod bias;
pub mod keywords;
pub mod aggregator;
pub mod processing;
pub mod pipeline;
pub mod config;

pub use types::*;
pub use entities::{EntityExtraction, EntityExtractor, ExtractionCapability, GazetteerModel};
pub use claims::{ClaimExtractor, ClaimFlagger, ClaimStats};
pub use credibility::{CredibilityScorer, CredibilityStats, CredibilityTable, SourceCredibilityEntry};
pub use sentiment::{LexiconSentimentModel, SentimentScorer, SentimentStats};
pub use bias::{BiasAnalysis, BiasDetector, SourceBias};
pub use keywords::{KeywordRanker, KeywordRanking};
pub use aggregator::{AggregateStats, Degraded, EnrichedCorpus, PreprocessingStats};
pub use processing::{ProcessingInput, ProcessingOutput, ProcessingStage};
pub use pipeline::{EnrichmentPipeline, PipelineBuilder};
pub use config::EnrichmentConfig;
