mod cli;
mod output;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::Mutex;
use tracing::{info, warn};

use chunkwise_core::config::{load_dotenv, Config};
use chunkwise_ingest::{
    narrative_from_config, AdaptiveChunker, BatchChunker, ChunkCache, ChunkOutcome, ChunkerConfig,
    DocType, DocumentTypeDetector, RebalanceConfig, RecursiveChunker, Strategy, StructuralChunker,
    TextChunker,
};

use crate::cli::{CliArgs, StrategyArg};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    load_dotenv();
    let config = Config::from_env();
    config.validate().context("invalid configuration")?;
    config.log_summary();

    let mut documents = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        documents.push(text);
    }
    info!(files = documents.len(), strategy = ?args.strategy, "chunking files");

    let doc_type = DocType::from(args.doc_type);
    let outcomes = match args.strategy {
        StrategyArg::Adaptive => chunk_adaptive(&config, &documents, doc_type, args.offline).await?,
        StrategyArg::Recursive => {
            let chunker = RecursiveChunker::new(
                ChunkerConfig::try_from(&config.chunking).context("invalid chunking config")?,
            );
            let detector = DocumentTypeDetector::from(&config.routing);
            documents
                .iter()
                .map(|text| {
                    let resolved = match doc_type {
                        DocType::Auto => detector.detect(text),
                        other => other,
                    };
                    ChunkOutcome::new(chunker.chunk(text), resolved, Strategy::Recursive)
                })
                .collect()
        }
        StrategyArg::Structural => {
            chunk_structural(&config, &documents, args.flavor.as_deref()).await?
        }
    };

    for (path, outcome) in args.files.iter().zip(&outcomes) {
        print_outcome(path, outcome, args.json)?;
    }
    Ok(())
}

async fn chunk_adaptive(
    config: &Config,
    documents: &[String],
    doc_type: DocType,
    offline: bool,
) -> Result<Vec<ChunkOutcome>> {
    let mut chunker = AdaptiveChunker::from_config(config).context("invalid chunking config")?;

    if offline {
        info!("offline mode, narrative documents use recursive chunking");
    } else {
        match narrative_from_config(config) {
            Ok(Some(strategy)) => {
                info!(strategy = %strategy.strategy(), "narrative strategy ready");
                chunker = chunker.with_narrative(strategy);
            }
            Ok(None) => info!("narrative strategy disabled"),
            Err(e) => warn!(error = %e, "narrative strategy unavailable, continuing without it"),
        }
    }

    let cache = Arc::new(Mutex::new(ChunkCache::from_config(&config.cache)));
    let batcher = BatchChunker::new(Arc::new(chunker))
        .with_cache(cache.clone())
        .with_batch_size(config.cache.batch_size);
    let outcomes = batcher.chunk_documents(documents, doc_type).await;

    let cache = cache.lock().await;
    info!(
        hits = cache.hits(),
        misses = cache.misses(),
        hit_rate = cache.hit_rate(),
        "chunk cache stats"
    );
    Ok(outcomes)
}

async fn chunk_structural(
    config: &Config,
    documents: &[String],
    flavor: Option<&str>,
) -> Result<Vec<ChunkOutcome>> {
    let chunker = StructuralChunker::new(
        RebalanceConfig::try_from(&config.structural).context("invalid structural config")?,
    );
    let mut outcomes = Vec::with_capacity(documents.len());
    for text in documents {
        let chunks = match flavor {
            Some(flavor) => chunker.chunk_labeled(text, flavor)?,
            None => chunker.chunk_text(text).await?,
        };
        outcomes.push(ChunkOutcome::new(chunks, DocType::Structured, Strategy::Structural));
    }
    Ok(outcomes)
}

fn print_outcome(path: &Path, outcome: &ChunkOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", output::render_json(path, outcome)?);
    } else {
        print!("{}", output::render_plain(path, outcome));
    }
    Ok(())
}
