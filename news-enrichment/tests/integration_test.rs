use news_enrichment::types::*;
use news_enrichment::{
    CredibilityTable, EnrichmentConfig, EnrichmentPipeline, EntityExtractor, SentimentScorer,
    SourceCredibilityEntry,
};
use std::io::Write;
use std::sync::Arc;
use tracing::info;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .try_init();
}

fn newsroom_table() -> Result<CredibilityTable> {
    CredibilityTable::from_entries([
        ("Reuters", SourceCredibilityEntry::new(90, "center", 1, "Wire service")),
        ("BBC", SourceCredibilityEntry::new(88, "center", 2, "Public broadcaster")),
        ("Unknown Blog", SourceCredibilityEntry::new(45, "right", 8, "Partisan blog")),
    ])
}

fn three_article_batch() -> Vec<ArticleRecord> {
    vec![
        ArticleRecord::new("Reuters", "Reuters reportedly confirmed the deal.")
            .with_title("Deal confirmed")
            .with_category(Category::Politics),
        ArticleRecord::new(
            "Unknown Blog",
            "Officials said the radical plan is a disaster. The senator warned of a crisis.",
        )
        .with_title("Plan under fire")
        .with_category(Category::Politics),
        ArticleRecord::new("BBC", "The weather in London stayed mild on Tuesday.")
            .with_title("Mild week")
            .with_category(Category::Europe),
    ]
}

#[test]
fn test_three_article_batch_end_to_end() -> Result<()> {
    init_tracing();
    info!("Running three article end-to-end batch");

    let pipeline = EnrichmentPipeline::standard(
        EntityExtractor::fallback(),
        Arc::new(newsroom_table()?),
        SentimentScorer::default(),
    );
    let corpus = pipeline.run(three_article_batch())?;
    let articles = &corpus.current_run_articles;
    assert_eq!(articles.len(), 3);

    let reuters = &articles[0];
    let reuters_credibility = reuters.credibility.as_ref().unwrap();
    assert_eq!(reuters_credibility.credibility_score, 90);
    assert_eq!(reuters.claims(), ["Reuters reportedly confirmed the deal"]);

    let blog = &articles[1];
    assert_eq!(blog.credibility.as_ref().unwrap().bias_score, 8);
    assert_eq!(blog.claims().len(), 2);
    assert_eq!(blog.bias.as_ref().unwrap().emotional_language_count, 3);

    let bbc = &articles[2];
    assert!(bbc.claims().is_empty());

    let flagged = &corpus.flagged_claims;
    assert_eq!(flagged.len(), 3);
    assert_eq!(flagged[0].claim, "Reuters reportedly confirmed the deal");
    assert_eq!(flagged[0].reason, FlagReason::VerificationKeyword);
    assert_eq!(flagged[0].credibility_score, 90);
    assert!(flagged[1..]
        .iter()
        .all(|f| f.reason == FlagReason::HighBiasSource && f.source == "Unknown Blog"));

    assert_eq!(corpus.claim_stats.total_claims, 3);
    assert_eq!(corpus.claim_stats.flag_rate, 1.0);

    let credibility = &corpus.credibility_stats;
    assert_eq!(credibility.high_credibility, 2);
    assert_eq!(credibility.medium_credibility, 0);
    assert_eq!(credibility.low_credibility, 1);
    assert_eq!(credibility.high_bias, 1);

    let sentiment = &corpus.sentiment_stats;
    assert_eq!(sentiment.positive + sentiment.negative + sentiment.neutral, 3);

    assert_eq!(corpus.bias_analysis.len(), 3);
    assert_eq!(
        corpus.bias_analysis.get("unknown blog").unwrap().avg_emotional,
        3.0
    );

    assert!(corpus.top_keywords.len() <= 20);
    assert!(corpus.top_keywords.iter().all(|(word, _)| word != "said"));
    assert_eq!(corpus.preprocessing_stats.total_articles, 3);
    assert_eq!(corpus.preprocessing_stats.total_claims, 3);

    info!("Flagged {} claims", flagged.len());
    Ok(())
}

#[test]
fn test_unknown_source_uses_default_entry() -> Result<()> {
    init_tracing();
    let corpus = EnrichmentPipeline::default().run(vec![ArticleRecord::new(
        "Random Blog XYZ",
        "Nothing happened today.",
    )])?;
    let credibility = corpus.current_run_articles[0].credibility.as_ref().unwrap();
    assert_eq!(credibility.credibility_score, 60);
    assert_eq!(credibility.bias_score, 5);
    assert_eq!(credibility.fact_accuracy_rating, FactAccuracyRating::Low);
    assert_eq!(corpus.credibility_stats.medium_credibility, 1);
    Ok(())
}

#[test]
fn test_fallback_mode_fills_only_flat_entities() -> Result<()> {
    init_tracing();
    let pipeline = EnrichmentConfig {
        ner_enabled: false,
        ..EnrichmentConfig::default()
    }
    .build_pipeline()?;

    let corpus = pipeline.run(vec![
        ArticleRecord::new(
            "CNN",
            "President Joe Biden met Apple CEO Tim Cook at the White House.",
        ),
        ArticleRecord::new("NPR", "Senator Maria Lopez spoke in New Mexico."),
    ])?;

    assert!(corpus.degraded.entity_categorization);
    assert!(!corpus.preprocessing_stats.categorized_extraction);
    for article in &corpus.current_run_articles {
        let prep = article.preprocessing.as_ref().unwrap();
        assert!(prep.persons.is_empty());
        assert!(prep.organizations.is_empty());
        assert!(prep.locations.is_empty());
        assert!(!prep.entities.is_empty());
    }
    let first = corpus.current_run_articles[0].preprocessing.as_ref().unwrap();
    assert_eq!(
        first.entities,
        vec!["President Joe Biden", "Tim Cook", "White House"]
    );
    Ok(())
}

#[test]
fn test_gazetteer_model_categorizes_entities() -> Result<()> {
    init_tracing();
    let mut gazetteer = tempfile::NamedTempFile::new()?;
    gazetteer.write_all(
        br#"{"PERSON": ["Tim Cook"], "ORG": ["Apple"], "GPE": ["Washington"], "LOC": ["Potomac"]}"#,
    )?;

    let pipeline = EnrichmentConfig {
        gazetteer: Some(gazetteer.path().to_path_buf()),
        ..EnrichmentConfig::default()
    }
    .build_pipeline()?;
    let corpus = pipeline.run(vec![ArticleRecord::new(
        "Reuters",
        "Tim Cook of Apple visited Washington near the Potomac. Tim Cook said Apple will grow.",
    )])?;

    assert!(!corpus.degraded.entity_categorization);
    let prep = corpus.current_run_articles[0].preprocessing.as_ref().unwrap();
    assert_eq!(prep.persons, vec!["Tim Cook"]);
    assert_eq!(prep.organizations, vec!["Apple"]);
    assert_eq!(prep.locations, vec!["Washington", "Potomac"]);
    assert_eq!(prep.entities, vec!["Tim Cook", "Apple", "Washington", "Potomac"]);
    Ok(())
}

#[test]
fn test_missing_sentiment_model_degrades_to_neutral() -> Result<()> {
    init_tracing();
    let pipeline = EnrichmentConfig {
        sentiment_model_enabled: false,
        ..EnrichmentConfig::default()
    }
    .build_pipeline()?;
    let corpus = pipeline.run(vec![ArticleRecord::new(
        "BBC",
        "A great and excellent success for everyone.",
    )])?;

    assert!(corpus.degraded.sentiment_model);
    let sentiment = corpus.current_run_articles[0].sentiment.as_ref().unwrap();
    assert_eq!(sentiment.sentiment_polarity, 0.0);
    assert_eq!(sentiment.sentiment_category, SentimentCategory::Neutral);
    assert_eq!(corpus.sentiment_stats.neutral, 1);
    Ok(())
}

#[test]
fn test_empty_and_malformed_records() -> Result<()> {
    init_tracing();
    let pipeline = EnrichmentPipeline::default();

    let empty = pipeline.run(Vec::new())?;
    assert!(empty.current_run_articles.is_empty());
    assert_eq!(empty.sentiment_stats.avg_polarity, 0.0);
    assert_eq!(empty.preprocessing_stats.avg_word_count, 0.0);
    assert!(empty.bias_analysis.is_empty());

    let records: Vec<ArticleRecord> = serde_json::from_str(
        r#"[
            {"title": "No body", "source": "BBC", "category": "politics"},
            {"title": "Empty", "source": "NPR", "category": "tech", "text": ""},
            {"title": "Fine", "source": "CNN", "category": "weather",
             "timestamp": "2024-05-01T12:00:00Z", "text": "Officials announced new climate rules."}
        ]"#,
    )?;
    let corpus = pipeline.run(records)?;
    assert_eq!(corpus.current_run_articles.len(), 3);
    for article in &corpus.current_run_articles[..2] {
        assert_eq!(article.clean_text(), "");
        assert!(article.claims().is_empty());
        assert_eq!(
            article.sentiment.as_ref().unwrap().sentiment_category,
            SentimentCategory::Neutral
        );
        assert!(article.credibility.is_some());
    }
    assert_eq!(corpus.claim_stats.total_claims, 1);
    assert_eq!(corpus.current_run_articles[2].record.category, Category::Other);
    Ok(())
}

#[test]
fn test_corpus_serializes_flat_articles() -> Result<()> {
    init_tracing();
    let corpus = EnrichmentPipeline::default().run(vec![ArticleRecord::new(
        "Reuters",
        "Markets rallied after the central bank announced a pause.",
    )
    .with_title("Markets rally")])?;

    let json = serde_json::to_value(&corpus)?;
    let article = &json["current_run_articles"][0];
    assert_eq!(article["title"], "Markets rally");
    assert_eq!(article["credibility_score"], 90);
    assert_eq!(article["fact_accuracy_rating"], "very high");
    assert!(article["sentiment_category"].is_string());
    assert!(article["bias_direction"].is_string());
    assert_eq!(json["bias_analysis"]["reuters"]["articles"], 1);
    assert_eq!(json["degraded"]["sentiment_model"], false);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_runs_are_isolated() -> Result<()> {
    init_tracing();
    let pipeline = Arc::new(EnrichmentPipeline::default());

    let mut handles = Vec::new();
    for size in 1..=4usize {
        let pipeline = Arc::clone(&pipeline);
        handles.push(tokio::task::spawn_blocking(move || {
            let records = (0..size)
                .map(|i| ArticleRecord::new("BBC", format!("Report {i} said the reform passed.")))
                .collect();
            pipeline.run(records)
        }));
    }

    let mut run_ids = std::collections::HashSet::new();
    for (index, handle) in handles.into_iter().enumerate() {
        let corpus = handle.await.expect("run panicked")?;
        let size = index + 1;
        assert_eq!(corpus.current_run_articles.len(), size);
        assert_eq!(corpus.preprocessing_stats.total_articles, size);
        assert_eq!(corpus.claim_stats.total_claims, size);
        assert_eq!(corpus.bias_analysis.get("BBC").unwrap().articles, size);
        run_ids.insert(corpus.run_id);
    }
    assert_eq!(run_ids.len(), 4);
    Ok(())
}
