use anyhow::{bail, Context, Result};
use clap::Parser;
use news_enrichment::{ArticleRecord, EnrichedCorpus, EnrichmentConfig, EnrichmentPipeline};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info};

/// Enrich batches of news articles with entities, claims, credibility,
/// sentiment, bias signals and keyword statistics.
#[derive(Parser, Debug)]
#[command(name = "news-enrichment", version)]
struct Args {
    /// JSON array of article records; each file is enriched as its own run
    #[arg(short, long = "input", required = true, num_args = 1..)]
    inputs: Vec<PathBuf>,

    /// Directory for `<stem>.enriched.json` files, stdout when omitted
    #[arg(short, long, env = "NEWS_ENRICH_OUTPUT")]
    output: Option<PathBuf>,

    #[arg(long, env = "NEWS_ENRICH_CREDIBILITY_TABLE")]
    credibility_table: Option<PathBuf>,

    #[arg(long, env = "NEWS_ENRICH_GAZETTEER")]
    gazetteer: Option<PathBuf>,

    /// Use the pattern fallback instead of the NER model
    #[arg(long, env = "NEWS_ENRICH_NO_NER")]
    no_ner: bool,

    #[arg(long, env = "NEWS_ENRICH_NO_SENTIMENT_MODEL")]
    no_sentiment_model: bool,

    #[arg(long)]
    pretty: bool,

    #[arg(long, env = "NEWS_ENRICH_LOG", default_value = "info")]
    log_level: tracing::Level,
}

impl Args {
    fn config(&self) -> EnrichmentConfig {
        EnrichmentConfig {
            credibility_table: self.credibility_table.clone(),
            gazetteer: self.gazetteer.clone(),
            ner_enabled: !self.no_ner,
            sentiment_model_enabled: !self.no_sentiment_model,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    info!("Starting news enrichment over {} input files", args.inputs.len());

    let pipeline = Arc::new(
        args.config()
            .build_pipeline()
            .context("Failed to build enrichment pipeline")?,
    );

    if let Some(dir) = &args.output {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    }

    let mut runs = JoinSet::new();
    for input in args.inputs.iter().cloned() {
        let pipeline = Arc::clone(&pipeline);
        runs.spawn_blocking(move || {
            let corpus = enrich_file(&pipeline, &input);
            (input, corpus)
        });
    }

    let mut failed = 0;
    while let Some(joined) = runs.join_next().await {
        let (input, corpus) = joined.context("Enrichment task panicked")?;
        match corpus {
            Ok(corpus) => write_corpus(&corpus, &input, args.output.as_deref(), args.pretty).await?,
            Err(e) => {
                error!("Failed to enrich {}: {:#}", input.display(), e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} runs failed", failed, args.inputs.len());
    }
    info!("News enrichment finished");
    Ok(())
}

fn enrich_file(pipeline: &EnrichmentPipeline, input: &Path) -> Result<EnrichedCorpus> {
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let records: Vec<ArticleRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of articles", input.display()))?;
    let corpus = pipeline.run(records)?;
    Ok(corpus)
}

async fn write_corpus(
    corpus: &EnrichedCorpus,
    input: &Path,
    output: Option<&Path>,
    pretty: bool,
) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(corpus)?
    } else {
        serde_json::to_string(corpus)?
    };

    match output {
        Some(dir) => {
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| corpus.run_id.to_string());
            let path = dir.join(format!("{stem}.enriched.json"));
            tokio::fs::write(&path, json)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(
                "Wrote {} articles from {} to {}",
                corpus.current_run_articles.len(),
                input.display(),
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}
