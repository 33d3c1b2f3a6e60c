use crate::credibility::CredibilityTable;
use crate::entities::{EntityExtractor, GazetteerModel};
use crate::pipeline::EnrichmentPipeline;
use crate::sentiment::SentimentScorer;
use crate::types::{ModelLoadError, NerModel, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Configuration for building an enrichment pipeline
#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    /// JSON credibility table; the built-in table when `None`
    pub credibility_table: Option<PathBuf>,
    /// JSON gazetteer backing the NER model
    pub gazetteer: Option<PathBuf>,
    pub ner_enabled: bool,
    pub sentiment_model_enabled: bool,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            credibility_table: None,
            gazetteer: None,
            ner_enabled: true,
            sentiment_model_enabled: true,
        }
    }
}

impl EnrichmentConfig {
    /// A broken table file is an error; a missing NER model is not.
    pub fn credibility_table(&self) -> Result<CredibilityTable> {
        match &self.credibility_table {
            Some(path) => CredibilityTable::from_json_file(path),
            None => Ok(CredibilityTable::default()),
        }
    }

    pub fn entity_extractor(&self) -> EntityExtractor {
        if !self.ner_enabled {
            info!("NER disabled, using pattern fallback");
            return EntityExtractor::fallback();
        }
        EntityExtractor::from_load(|| {
            let path = self.gazetteer.as_ref().ok_or_else(|| ModelLoadError::Unavailable {
                model: "gazetteer".to_string(),
                reason: "no gazetteer configured".to_string(),
            })?;
            let model: Arc<dyn NerModel> = Arc::new(GazetteerModel::from_json_file(path)?);
            Ok(model)
        })
    }

    pub fn sentiment_scorer(&self) -> SentimentScorer {
        if self.sentiment_model_enabled {
            SentimentScorer::default()
        } else {
            SentimentScorer::unavailable()
        }
    }

    pub fn build_pipeline(&self) -> Result<EnrichmentPipeline> {
        let table = Arc::new(self.credibility_table()?);
        Ok(EnrichmentPipeline::standard(
            self.entity_extractor(),
            table,
            self.sentiment_scorer(),
        ))
    }
}
