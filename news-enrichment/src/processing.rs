use crate::aggregator::AggregateStats;
use crate::bias::BiasDetector;
use crate::claims::{ClaimExtractor, ClaimFlagger};
use crate::credibility::{CredibilityScorer, CredibilityTable};
use crate::entities::EntityExtractor;
use crate::keywords::KeywordRanker;
use crate::sentiment::{assess, SentimentScorer};
use crate::types::{
    Article, ArticleRecord, EnrichmentError, PipelineStage, Preprocessing, Result,
};
use crate::utils::text::{normalize_text, word_count};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Trait for enrichment stages
pub trait ProcessingStage: Send + Sync {
    /// Enrich the batch and fold the results into the run's accumulator
    fn process(&self, input: ProcessingInput) -> Result<ProcessingOutput>;

    /// Position of this stage in the run
    fn stage(&self) -> PipelineStage;

    fn stage_name(&self) -> String {
        self.stage().to_string()
    }
}

/// Input to a processing stage
#[derive(Debug, Clone)]
pub struct ProcessingInput {
    pub articles: Vec<Article>,
    pub stats: AggregateStats,
    pub metadata: HashMap<String, String>,
}

impl ProcessingInput {
    /// Start a fresh run over the given records.
    pub fn new(records: Vec<ArticleRecord>) -> Self {
        Self {
            articles: records.into_iter().map(Article::from).collect(),
            stats: AggregateStats::new(),
            metadata: HashMap::new(),
        }
    }
}

/// Output from a processing stage
#[derive(Debug, Clone)]
pub struct ProcessingOutput {
    pub articles: Vec<Article>,
    pub stats: AggregateStats,
    pub metadata: HashMap<String, String>,
}

impl From<ProcessingOutput> for ProcessingInput {
    fn from(output: ProcessingOutput) -> Self {
        Self {
            articles: output.articles,
            stats: output.stats,
            metadata: output.metadata,
        }
    }
}

/// Runs `enrich` inside the stage bracket kept by the accumulator.
fn run_stage<F>(stage: PipelineStage, input: ProcessingInput, enrich: F) -> Result<ProcessingOutput>
where
    F: FnOnce(&mut [Article], &mut AggregateStats) -> Result<()>,
{
    let ProcessingInput {
        mut articles,
        mut stats,
        mut metadata,
    } = input;

    debug!("Processing {} articles in {} stage", articles.len(), stage);
    stats.begin_stage(stage, articles.len())?;
    enrich(&mut articles, &mut stats)?;
    stats.complete_stage(stage);

    metadata.insert("stage".to_string(), stage.to_string());
    metadata.insert("items_processed".to_string(), articles.len().to_string());
    metadata.insert("run_id".to_string(), stats.run_id().to_string());

    Ok(ProcessingOutput {
        articles,
        stats,
        metadata,
    })
}

/// Derived sections are written once; a filled slot means the article went
/// through this stage already.
fn fill<T>(slot: &mut Option<T>, value: T, stage: PipelineStage) -> Result<()> {
    if slot.is_some() {
        return Err(EnrichmentError::StageAlreadyApplied { stage });
    }
    *slot = Some(value);
    Ok(())
}

/// Normalizes text and extracts entities and claims
pub struct PreprocessStage {
    extractor: EntityExtractor,
    claims: ClaimExtractor,
}

impl PreprocessStage {
    pub fn new(extractor: EntityExtractor) -> Self {
        Self {
            extractor,
            claims: ClaimExtractor::new(),
        }
    }

    fn preprocess(&self, article: &Article) -> Preprocessing {
        let Some(body) = article.record.body() else {
            debug!("Article {:?} has no text, leaving derived fields empty", article.record.title);
            return Preprocessing::default();
        };
        let clean_text = normalize_text(body);
        let extraction = self.extractor.extract(&clean_text);
        Preprocessing {
            word_count: word_count(&clean_text),
            claims: self.claims.extract_claims(&clean_text),
            persons: extraction.persons,
            organizations: extraction.organizations,
            locations: extraction.locations,
            entities: extraction.all_entities,
            clean_text,
        }
    }
}

impl ProcessingStage for PreprocessStage {
    fn process(&self, input: ProcessingInput) -> Result<ProcessingOutput> {
        run_stage(self.stage(), input, |articles, stats| {
            stats.set_entity_categorization(self.extractor.is_categorized());
            for article in articles.iter_mut() {
                let preprocessing = self.preprocess(article);
                stats.record_preprocessing(&preprocessing);
                fill(&mut article.preprocessing, preprocessing, PipelineStage::Preprocess)?;
            }
            Ok(())
        })
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::Preprocess
    }
}

/// Annotates each article from the credibility table
pub struct CredibilityStage {
    table: Arc<CredibilityTable>,
}

impl CredibilityStage {
    pub fn new(table: Arc<CredibilityTable>) -> Self {
        Self { table }
    }
}

impl ProcessingStage for CredibilityStage {
    fn process(&self, input: ProcessingInput) -> Result<ProcessingOutput> {
        let scorer = CredibilityScorer::new(&self.table);
        run_stage(self.stage(), input, |articles, stats| {
            for article in articles.iter_mut() {
                let assessment = scorer.score(article);
                stats.record_credibility(&assessment);
                fill(&mut article.credibility, assessment, PipelineStage::CredibilityScore)?;
            }
            Ok(())
        })
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::CredibilityScore
    }
}

/// Collects claims that need verification
#[derive(Default)]
pub struct ClaimFlagStage {
    flagger: ClaimFlagger,
}

impl ClaimFlagStage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProcessingStage for ClaimFlagStage {
    fn process(&self, input: ProcessingInput) -> Result<ProcessingOutput> {
        run_stage(self.stage(), input, |articles, stats| {
            let total_claims = articles.iter().map(|a| a.claims().len()).sum();
            let flagged = self.flagger.flag(articles);
            stats.record_claims(total_claims, flagged);
            Ok(())
        })
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::ClaimFlag
    }
}

pub struct SentimentStage {
    scorer: SentimentScorer,
}

impl SentimentStage {
    pub fn new(scorer: SentimentScorer) -> Self {
        Self { scorer }
    }
}

impl ProcessingStage for SentimentStage {
    fn process(&self, input: ProcessingInput) -> Result<ProcessingOutput> {
        run_stage(self.stage(), input, |articles, stats| {
            stats.set_sentiment_available(self.scorer.is_available());
            for article in articles.iter_mut() {
                let reading = self.scorer.reading(article.clean_text());
                stats.record_sentiment(reading);
                fill(&mut article.sentiment, assess(reading), PipelineStage::Sentiment)?;
            }
            Ok(())
        })
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::Sentiment
    }
}

/// Per-article bias signals plus the per-source rollup
#[derive(Default)]
pub struct BiasStage {
    detector: BiasDetector,
}

impl BiasStage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProcessingStage for BiasStage {
    fn process(&self, input: ProcessingInput) -> Result<ProcessingOutput> {
        run_stage(self.stage(), input, |articles, stats| {
            for article in articles.iter_mut() {
                let signals = self.detector.detect(article.clean_text());
                stats.bias_analysis_mut().add(article.source(), &signals);
                fill(&mut article.bias, signals, PipelineStage::BiasDetect)?;
            }
            Ok(())
        })
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::BiasDetect
    }
}

/// Corpus-wide keyword ranking
#[derive(Default)]
pub struct KeywordStage {
    ranker: KeywordRanker,
}

impl KeywordStage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProcessingStage for KeywordStage {
    fn process(&self, input: ProcessingInput) -> Result<ProcessingOutput> {
        run_stage(self.stage(), input, |articles, stats| {
            let corpus = articles
                .iter()
                .map(Article::clean_text)
                .collect::<Vec<_>>()
                .join(" ");
            stats.record_keywords(self.ranker.rank(&corpus));
            Ok(())
        })
    }

    fn stage(&self) -> PipelineStage {
        PipelineStage::KeywordRank
    }
}
