//! Search command - query an index

use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use rustyline::error::ReadlineError;
use tracing::info;

use crate::config::Config;
use crate::index::{find_index, Corpus, QueryEngine, QueryResult};

use super::{embedding_adapter, embedding_mode, EmbeddingArgs};

#[derive(Args)]
pub struct SearchArgs {
    /// Index name to search
    pub index_name: String,

    /// Search query (omit for interactive mode)
    pub query: Option<String>,

    /// Number of results to return (default: from config, 3)
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Output format (text, json)
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    #[command(flatten)]
    pub embedding: EmbeddingArgs,
}

pub async fn run(args: SearchArgs, config: &Config) -> anyhow::Result<()> {
    let index_dir = find_index(&args.index_name, config.storage.index_dir.as_deref())?;
    let (corpus, meta) = Corpus::load(&index_dir)
        .with_context(|| format!("failed to load index '{}'", args.index_name))?;

    info!(
        "Searching index '{}' ({} passages, {} dims)",
        args.index_name, meta.passage_count, meta.dimensions
    );

    // Queries must be embedded by the same model the index was built with
    let mode = embedding_mode(
        &meta.embedding_provider,
        meta.dimensions,
        &args.embedding,
        config,
    )?;
    let embedder = embedding_adapter(&meta.embedding_model, mode, config)?;
    let engine = QueryEngine::new(embedder, Arc::new(corpus));
    engine.verify_dimensions()?;

    let top_k = args.top_k.unwrap_or(config.search.top_k);
    let json = args.format == "json";

    match &args.query {
        Some(query) => {
            let results = engine.query(query, top_k).await?;
            print_results(query, &results, json)?;
        }
        None => run_interactive(&engine, top_k, json).await?,
    }

    Ok(())
}

async fn run_interactive(engine: &QueryEngine, top_k: usize, json: bool) -> anyhow::Result<()> {
    let mut editor = rustyline::DefaultEditor::new()?;

    loop {
        let line = match editor.readline("Ask a question (or type 'exit' to quit): ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let query = line.trim();

        if query.is_empty() {
            continue;
        }
        if query.eq_ignore_ascii_case("exit") || query.eq_ignore_ascii_case("quit") {
            break;
        }
        let _ = editor.add_history_entry(query);

        match engine.query(query, top_k).await {
            Ok(results) => print_results(query, &results, json)?,
            Err(e) => eprintln!("\nError: {}\n", e),
        }
    }

    Ok(())
}

fn print_results(query: &str, results: &[QueryResult], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }

    println!("\nTop {} results for '{}':\n", results.len(), query);
    for (rank, result) in results.iter().enumerate() {
        println!(
            "{}. {} (chunk {}) - distance: {:.4}",
            rank + 1,
            result.source_id,
            result.ordinal,
            result.distance
        );
        println!("   {}", result.text);
        println!();
    }

    Ok(())
}
