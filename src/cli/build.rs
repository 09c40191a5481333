//! Build command - index construction from documents

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::config::Config;
use crate::error::Error;
use crate::extract::{load_documents, LoadOptions};
use crate::index::{local_indexes_dir, CorpusPaths, IndexBuilder, IndexMeta, FORMAT_VERSION};

use super::{embedding_adapter, embedding_mode, EmbeddingArgs};

#[derive(Args)]
pub struct BuildArgs {
    /// Index name (default: current directory name)
    #[arg()]
    pub index_name: Option<String>,

    /// Document directories and/or files
    #[arg(long, num_args = 1.., default_value = ".")]
    pub docs: Vec<PathBuf>,

    /// Word budget per passage
    #[arg(long)]
    pub max_tokens: Option<usize>,

    /// Embedding provider (ollama, openai, simulated, local)
    #[arg(long)]
    pub provider: Option<String>,

    /// Embedding model name
    #[arg(long)]
    pub embedding_model: Option<String>,

    /// Vector length for the simulated provider
    #[arg(long)]
    pub dimensions: Option<usize>,

    #[command(flatten)]
    pub embedding: EmbeddingArgs,

    /// File types to include (comma-separated, e.g., ".txt,.pdf,.docx")
    #[arg(long)]
    pub file_types: Option<String>,

    /// Include hidden files
    #[arg(long)]
    pub include_hidden: bool,

    /// Force rebuild existing index
    #[arg(short, long)]
    pub force: bool,

    /// Write the index to this directory instead of the index registry
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub async fn run(args: BuildArgs, config: &Config, quiet: bool) -> anyhow::Result<()> {
    let index_name = args.index_name.clone().unwrap_or_else(|| {
        std::env::current_dir()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
            .unwrap_or_else(|| "index".to_string())
    });

    info!("Building index '{}'", index_name);

    let index_dir = args.output.clone().unwrap_or_else(|| {
        local_indexes_dir(config.storage.index_dir.as_deref()).join(&index_name)
    });

    if CorpusPaths::in_dir(&index_dir).exists() && !args.force {
        anyhow::bail!(
            "Index '{}' already exists. Use --force to rebuild.",
            index_name
        );
    }

    let provider = args
        .provider
        .clone()
        .unwrap_or_else(|| config.embedding.provider.clone());
    let model = args
        .embedding_model
        .clone()
        .unwrap_or_else(|| config.embedding.model.clone());
    let max_tokens = args.max_tokens.unwrap_or(config.build.max_tokens);
    if max_tokens == 0 {
        anyhow::bail!("--max-tokens must be at least 1");
    }

    let mode = embedding_mode(
        &provider,
        args.dimensions.unwrap_or(config.embedding.dimensions),
        &args.embedding,
        config,
    )?;
    let provider_name = mode.name();
    let embedder = embedding_adapter(&model, mode, config)?;

    // Load documents
    let progress = spinner(quiet);
    progress.set_message("Loading documents...");

    let options = LoadOptions {
        file_types: args
            .file_types
            .as_deref()
            .map(|ft| ft.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_else(|| config.build.file_types.clone()),
        include_hidden: args.include_hidden || config.build.include_hidden,
        recursive: config.build.recursive,
    };
    let documents = load_documents(&args.docs, &options);

    progress.finish_with_message(format!("Loaded {} files", documents.len()));

    if documents.is_empty() {
        anyhow::bail!("No supported files found to index");
    }

    // Chunk and embed, one document at a time
    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(documents.len() as u64)
    };
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut builder = IndexBuilder::new(&embedder, max_tokens);
    for document in &documents {
        progress.set_message(document.source_id.clone());
        builder
            .add_document(&document.source_id, &document.text)
            .await?;
        progress.inc(1);
    }
    progress.finish_with_message("Embeddings computed");

    let corpus = match builder.finish() {
        Ok(corpus) => corpus,
        Err(Error::EmptyCorpus) => {
            anyhow::bail!("No text could be extracted from the supplied documents")
        }
        Err(e) => return Err(e.into()),
    };

    let dimensions = corpus
        .dimension()
        .context("built corpus has no embedding dimension")?;
    let meta = IndexMeta {
        version: FORMAT_VERSION.to_string(),
        embedding_provider: provider_name.to_string(),
        embedding_model: model,
        dimensions,
        passage_count: corpus.size(),
        source_count: corpus.passages().source_count(),
        max_tokens,
    };
    corpus
        .save(&index_dir, &meta)
        .with_context(|| format!("failed to save index to {}", index_dir.display()))?;

    println!(
        "Indexed {} chunks from {} files",
        meta.passage_count, meta.source_count
    );
    println!("Index '{}' saved at {}", index_name, index_dir.display());
    println!("  Dimensions: {}", dimensions);

    Ok(())
}

fn spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let progress = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        progress.set_style(style);
    }
    progress
}
