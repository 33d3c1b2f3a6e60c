use crate::bias::BiasAnalysis;
use crate::claims::ClaimStats;
use crate::credibility::CredibilityStats;
use crate::keywords::KeywordRanking;
use crate::sentiment::SentimentStats;
use crate::types::{
    Article, CredibilityAssessment, EnrichmentError, FlaggedClaim, PipelineStage, Preprocessing,
    Result, SentimentReading,
};
use crate::utils::text::round3;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreprocessingStats {
    pub total_articles: usize,
    pub total_entities: usize,
    pub total_claims: usize,
    pub avg_word_count: f64,
    pub categorized_extraction: bool,
    #[serde(skip)]
    word_total: usize,
}

impl PreprocessingStats {
    fn record(&mut self, preprocessing: &Preprocessing) {
        self.total_articles += 1;
        self.total_entities += preprocessing.entities.len();
        self.total_claims += preprocessing.claims.len();
        self.word_total += preprocessing.word_count;
        self.avg_word_count = round3(self.word_total as f64 / self.total_articles as f64);
    }
}

/// Capabilities that were missing for the run. `true` means degraded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Degraded {
    pub entity_categorization: bool,
    pub sentiment_model: bool,
}

impl Degraded {
    pub fn any(&self) -> bool {
        self.entity_categorization || self.sentiment_model
    }
}

/// Accumulator owned by one pipeline run.
///
/// Stages announce themselves with [`AggregateStats::begin_stage`] and close
/// with [`AggregateStats::complete_stage`]; in between they fold their
/// per-article results in. Stages must arrive in [`PipelineStage::ALL`] order,
/// each exactly once, and always over the batch the run started with.
#[derive(Debug, Clone)]
pub struct AggregateStats {
    run_id: Uuid,
    batch_len: Option<usize>,
    completed: Vec<PipelineStage>,
    preprocessing_stats: PreprocessingStats,
    credibility_stats: CredibilityStats,
    claim_stats: ClaimStats,
    flagged_claims: Vec<FlaggedClaim>,
    sentiment_stats: SentimentStats,
    bias_analysis: BiasAnalysis,
    top_keywords: Vec<(String, usize)>,
    distinct_keywords: usize,
    degraded: Degraded,
}

impl AggregateStats {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            batch_len: None,
            completed: Vec::with_capacity(PipelineStage::ALL.len()),
            preprocessing_stats: PreprocessingStats::default(),
            credibility_stats: CredibilityStats::default(),
            claim_stats: ClaimStats::default(),
            flagged_claims: Vec::new(),
            sentiment_stats: SentimentStats::default(),
            bias_analysis: BiasAnalysis::default(),
            top_keywords: Vec::new(),
            distinct_keywords: 0,
            degraded: Degraded::default(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// The next stage the run will accept, `None` once every stage ran.
    pub fn next_stage(&self) -> Option<PipelineStage> {
        PipelineStage::ALL.get(self.completed.len()).copied()
    }

    pub fn is_complete(&self) -> bool {
        self.next_stage().is_none()
    }

    pub fn has_completed(&self, stage: PipelineStage) -> bool {
        self.completed.contains(&stage)
    }

    pub fn begin_stage(&mut self, stage: PipelineStage, batch_len: usize) -> Result<()> {
        if self.has_completed(stage) {
            return Err(EnrichmentError::StageAlreadyApplied { stage });
        }
        if let Some(expected) = self.next_stage() {
            if expected != stage {
                return Err(EnrichmentError::StageOutOfOrder { stage, expected });
            }
        }
        match self.batch_len {
            Some(expected) if expected != batch_len => {
                return Err(EnrichmentError::BatchMismatch {
                    expected,
                    actual: batch_len,
                });
            }
            Some(_) => {}
            None => self.batch_len = Some(batch_len),
        }
        debug!("Run {}: starting {} over {} articles", self.run_id, stage, batch_len);
        Ok(())
    }

    pub fn complete_stage(&mut self, stage: PipelineStage) {
        if self.next_stage() == Some(stage) {
            self.completed.push(stage);
        }
    }

    pub(crate) fn record_preprocessing(&mut self, preprocessing: &Preprocessing) {
        self.preprocessing_stats.record(preprocessing);
    }

    pub(crate) fn set_entity_categorization(&mut self, categorized: bool) {
        self.preprocessing_stats.categorized_extraction = categorized;
        self.degraded.entity_categorization = !categorized;
    }

    pub(crate) fn record_credibility(&mut self, assessment: &CredibilityAssessment) {
        self.credibility_stats.record(assessment);
    }

    pub(crate) fn record_claims(&mut self, total_claims: usize, flagged: Vec<FlaggedClaim>) {
        let flagged_count = flagged.len();
        self.claim_stats = ClaimStats {
            total_claims,
            flagged_count,
            flag_rate: if total_claims == 0 {
                0.0
            } else {
                round3(flagged_count as f64 / total_claims as f64)
            },
        };
        self.flagged_claims = flagged;
    }

    pub(crate) fn record_sentiment(&mut self, reading: SentimentReading) {
        self.sentiment_stats.record(reading);
    }

    pub(crate) fn set_sentiment_available(&mut self, available: bool) {
        self.degraded.sentiment_model = !available;
    }

    pub(crate) fn bias_analysis_mut(&mut self) -> &mut BiasAnalysis {
        &mut self.bias_analysis
    }

    pub(crate) fn record_keywords(&mut self, ranking: KeywordRanking) {
        self.top_keywords = ranking.top;
        self.distinct_keywords = ranking.distinct;
    }

    pub fn preprocessing_stats(&self) -> &PreprocessingStats {
        &self.preprocessing_stats
    }

    pub fn credibility_stats(&self) -> &CredibilityStats {
        &self.credibility_stats
    }

    pub fn claim_stats(&self) -> &ClaimStats {
        &self.claim_stats
    }

    pub fn flagged_claims(&self) -> &[FlaggedClaim] {
        &self.flagged_claims
    }

    pub fn sentiment_stats(&self) -> &SentimentStats {
        &self.sentiment_stats
    }

    pub fn bias_analysis(&self) -> &BiasAnalysis {
        &self.bias_analysis
    }

    pub fn top_keywords(&self) -> &[(String, usize)] {
        &self.top_keywords
    }

    pub fn degraded(&self) -> Degraded {
        self.degraded
    }

    /// Seal the run into the report package. Fails when a stage is missing or
    /// the articles are not the batch the run was started with.
    pub fn finish(self, articles: Vec<Article>) -> Result<EnrichedCorpus> {
        if let Some(missing) = self.next_stage() {
            return Err(EnrichmentError::IncompleteRun { missing });
        }
        let expected = self.batch_len.unwrap_or_default();
        if expected != articles.len() {
            return Err(EnrichmentError::BatchMismatch {
                expected,
                actual: articles.len(),
            });
        }

        info!(
            "Run {} complete: {} articles, {} flagged claims, degraded: {}",
            self.run_id,
            articles.len(),
            self.flagged_claims.len(),
            self.degraded.any()
        );
        Ok(EnrichedCorpus {
            run_id: self.run_id,
            generated_at: Utc::now(),
            current_run_articles: articles,
            preprocessing_stats: self.preprocessing_stats,
            sentiment_stats: self.sentiment_stats,
            bias_analysis: self.bias_analysis,
            top_keywords: self.top_keywords,
            distinct_keywords: self.distinct_keywords,
            credibility_stats: self.credibility_stats,
            claim_stats: self.claim_stats,
            flagged_claims: self.flagged_claims,
            degraded: self.degraded,
        })
    }
}

impl Default for AggregateStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only package handed to report rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedCorpus {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub current_run_articles: Vec<Article>,
    pub preprocessing_stats: PreprocessingStats,
    pub sentiment_stats: SentimentStats,
    pub bias_analysis: BiasAnalysis,
    pub top_keywords: Vec<(String, usize)>,
    pub distinct_keywords: usize,
    pub credibility_stats: CredibilityStats,
    pub claim_stats: ClaimStats,
    pub flagged_claims: Vec<FlaggedClaim>,
    pub degraded: Degraded,
}
