use news_enrichment::processing::{
    BiasStage, ClaimFlagStage, CredibilityStage, KeywordStage, PreprocessStage, SentimentStage,
};
use news_enrichment::types::*;
use news_enrichment::{
    CredibilityTable, EntityExtractor, ProcessingInput, ProcessingStage, SentimentScorer,
};
use std::sync::Arc;
use tracing::info;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .try_init();
}

fn stages() -> Vec<Box<dyn ProcessingStage>> {
    vec![
        Box::new(PreprocessStage::new(EntityExtractor::fallback())),
        Box::new(CredibilityStage::new(Arc::new(CredibilityTable::default()))),
        Box::new(ClaimFlagStage::new()),
        Box::new(SentimentStage::new(SentimentScorer::default())),
        Box::new(BiasStage::new()),
        Box::new(KeywordStage::new()),
    ]
}

fn batch() -> Vec<ArticleRecord> {
    vec![
        ArticleRecord::new(
            "The Guardian",
            "Campaigners said the climate reform is a matter of justice. \
             Ministers allegedly warned against the reform.",
        )
        .with_title("Climate reform"),
        ArticleRecord::new(
            "The Wall Street Journal",
            "Lawmakers argued that tax cuts and border security come first.",
        )
        .with_title("Tax debate"),
    ]
}

#[test]
fn test_stage_by_stage_run() -> Result<()> {
    init_tracing();
    let mut input = ProcessingInput::new(batch());

    for stage in stages() {
        let output = stage.process(input)?;
        info!("Stage {} processed {} articles", stage.stage_name(), output.articles.len());
        assert_eq!(output.metadata.get("stage"), Some(&stage.stage_name()));
        assert_eq!(output.metadata.get("items_processed").map(String::as_str), Some("2"));
        assert!(output.stats.has_completed(stage.stage()));
        input = output.into();
    }

    let stats = &input.stats;
    assert!(stats.is_complete());

    let guardian = &input.articles[0];
    let signals = guardian.bias.as_ref().unwrap();
    assert_eq!(signals.left_keyword_count, 4);
    assert_eq!(signals.bias_direction, BiasDirection::LeftLeaning);
    assert_eq!(guardian.credibility.as_ref().unwrap().credibility_score, 74);

    let wsj = &input.articles[1];
    let signals = wsj.bias.as_ref().unwrap();
    assert_eq!(signals.right_keyword_count, 3);
    assert_eq!(signals.bias_direction, BiasDirection::RightLeaning);
    assert_eq!(
        wsj.credibility.as_ref().unwrap().fact_accuracy_rating,
        FactAccuracyRating::High
    );

    assert_eq!(stats.flagged_claims().len(), 1);
    assert_eq!(stats.flagged_claims()[0].source, "The Guardian");
    assert_eq!(stats.flagged_claims()[0].reason, FlagReason::VerificationKeyword);
    assert_eq!(stats.bias_analysis().get("the guardian").unwrap().left_signals, 4);
    assert_eq!(stats.top_keywords()[0], ("reform".to_string(), 2));

    let corpus = input.stats.finish(input.articles)?;
    assert_eq!(corpus.current_run_articles.len(), 2);
    assert_eq!(corpus.credibility_stats.high_credibility, 1);
    assert_eq!(corpus.credibility_stats.medium_credibility, 1);
    Ok(())
}

#[test]
fn test_skipping_a_stage_is_rejected() -> Result<()> {
    init_tracing();
    let stages = stages();
    let input: ProcessingInput = stages[0].process(ProcessingInput::new(batch()))?.into();

    match stages[2].process(input) {
        Err(EnrichmentError::StageOutOfOrder { stage, expected }) => {
            assert_eq!(stage, PipelineStage::ClaimFlag);
            assert_eq!(expected, PipelineStage::CredibilityScore);
        }
        other => panic!("expected StageOutOfOrder, got {:?}", other.map(|o| o.metadata)),
    }
    Ok(())
}

#[test]
fn test_reapplying_a_stage_is_rejected() -> Result<()> {
    init_tracing();
    let stages = stages();
    let input: ProcessingInput = stages[0].process(ProcessingInput::new(batch()))?.into();

    let result = stages[0].process(input);
    assert!(matches!(
        result,
        Err(EnrichmentError::StageAlreadyApplied {
            stage: PipelineStage::Preprocess
        })
    ));
    Ok(())
}

#[test]
fn test_changing_the_batch_mid_run_is_rejected() -> Result<()> {
    init_tracing();
    let stages = stages();
    let mut input: ProcessingInput = stages[0].process(ProcessingInput::new(batch()))?.into();
    input.articles.pop();

    let result = stages[1].process(input);
    assert!(matches!(
        result,
        Err(EnrichmentError::BatchMismatch {
            expected: 2,
            actual: 1
        })
    ));
    Ok(())
}

#[test]
fn test_snapshot_before_completion_is_rejected() -> Result<()> {
    init_tracing();
    let stages = stages();
    let mut input = ProcessingInput::new(batch());
    for stage in &stages[..4] {
        input = stage.process(input)?.into();
    }

    let result = input.stats.finish(input.articles);
    assert!(matches!(
        result,
        Err(EnrichmentError::IncompleteRun {
            missing: PipelineStage::BiasDetect
        })
    ));
    Ok(())
}

#[test]
fn test_derived_fields_survive_later_stages() -> Result<()> {
    init_tracing();
    let stages = stages();
    let mut input: ProcessingInput = stages[0].process(ProcessingInput::new(batch()))?.into();
    let preprocessed = input.articles[0].preprocessing.clone();

    for stage in &stages[1..] {
        input = stage.process(input)?.into();
    }
    assert_eq!(input.articles[0].preprocessing, preprocessed);
    Ok(())
}
