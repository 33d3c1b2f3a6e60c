use crate::aggregator::EnrichedCorpus;
use crate::credibility::CredibilityTable;
use crate::entities::EntityExtractor;
use crate::processing::{
    BiasStage, ClaimFlagStage, CredibilityStage, KeywordStage, PreprocessStage, ProcessingInput,
    ProcessingStage, SentimentStage,
};
use crate::sentiment::SentimentScorer;
use crate::types::{ArticleRecord, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// Runs a batch through the configured stages and seals the result.
///
/// A pipeline holds no per-run state: every call to [`EnrichmentPipeline::run`]
/// starts a fresh accumulator, so one pipeline can serve concurrent runs.
pub struct EnrichmentPipeline {
    processing_stages: Vec<Box<dyn ProcessingStage>>,
}

impl EnrichmentPipeline {
    /// All six stages in order.
    pub fn standard(
        extractor: EntityExtractor,
        table: Arc<CredibilityTable>,
        sentiment: SentimentScorer,
    ) -> Self {
        PipelineBuilder::new()
            .with_standard_stages(extractor, table, sentiment)
            .build()
    }

    pub fn stage_names(&self) -> Vec<String> {
        self.processing_stages.iter().map(|s| s.stage_name()).collect()
    }

    pub fn run(&self, records: Vec<ArticleRecord>) -> Result<EnrichedCorpus> {
        let mut input = ProcessingInput::new(records);
        info!(
            "Starting enrichment run {} over {} articles",
            input.stats.run_id(),
            input.articles.len()
        );

        for stage in &self.processing_stages {
            let output = stage.process(input)?;
            debug!("Stage {} finished", stage.stage_name());
            input = output.into();
        }

        input.stats.finish(input.articles)
    }
}

impl Default for EnrichmentPipeline {
    fn default() -> Self {
        Self::standard(
            EntityExtractor::fallback(),
            Arc::new(CredibilityTable::default()),
            SentimentScorer::default(),
        )
    }
}

/// Builder for creating enrichment pipelines
pub struct PipelineBuilder {
    processing_stages: Vec<Box<dyn ProcessingStage>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            processing_stages: Vec::new(),
        }
    }

    pub fn add_processing_stage(mut self, stage: Box<dyn ProcessingStage>) -> Self {
        info!("Adding processing stage to pipeline: {}", stage.stage_name());
        self.processing_stages.push(stage);
        self
    }

    pub fn with_standard_stages(
        self,
        extractor: EntityExtractor,
        table: Arc<CredibilityTable>,
        sentiment: SentimentScorer,
    ) -> Self {
        self.add_processing_stage(Box::new(PreprocessStage::new(extractor)))
            .add_processing_stage(Box::new(CredibilityStage::new(table)))
            .add_processing_stage(Box::new(ClaimFlagStage::new()))
            .add_processing_stage(Box::new(SentimentStage::new(sentiment)))
            .add_processing_stage(Box::new(BiasStage::new()))
            .add_processing_stage(Box::new(KeywordStage::new()))
    }

    pub fn build(self) -> EnrichmentPipeline {
        EnrichmentPipeline {
            processing_stages: self.processing_stages,
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
