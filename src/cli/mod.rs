//! CLI module - command definitions and handlers

pub mod build;
mod config_cmd;
mod list;
mod remove;
mod search;

use clap::{Args, Parser, Subcommand};

pub use build::BuildArgs;
pub use config_cmd::ConfigArgs;
pub use list::ListArgs;
pub use remove::RemoveArgs;
pub use search::SearchArgs;

use crate::config::Config;
use crate::embedding::{create_provider, EmbeddingAdapter, EmbeddingMode};

/// memdex - index local documents and search them by meaning
#[derive(Parser)]
#[command(name = "memdex")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a document index
    Build(BuildArgs),

    /// Search documents in an index
    Search(SearchArgs),

    /// List all indexes
    List(ListArgs),

    /// Remove an index
    Remove(RemoveArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load();
        match self.command {
            Commands::Build(args) => build::run(args, &config, self.quiet).await,
            Commands::Search(args) => search::run(args, &config).await,
            Commands::List(args) => list::run(args, &config).await,
            Commands::Remove(args) => remove::run(args, &config).await,
            Commands::Config(args) => config_cmd::run(args).await,
        }
    }
}

/// Connection options for the embedding provider
#[derive(Args, Clone, Default)]
pub struct EmbeddingArgs {
    /// Ollama host for embeddings
    #[arg(long, env = "OLLAMA_HOST")]
    pub embedding_host: Option<String>,

    /// OpenAI API base URL
    #[arg(long, env = "OPENAI_BASE_URL")]
    pub embedding_api_base: Option<String>,

    /// API key for embedding service (OpenAI)
    #[arg(long, env = "OPENAI_API_KEY")]
    pub embedding_api_key: Option<String>,

    /// Local model path (for local embedding mode)
    #[cfg(feature = "local-embeddings")]
    #[arg(long)]
    pub embedding_model_path: Option<String>,
}

/// Resolve a provider name into an embedding mode, flags over config
pub(crate) fn embedding_mode(
    provider: &str,
    dimensions: usize,
    args: &EmbeddingArgs,
    config: &Config,
) -> anyhow::Result<EmbeddingMode> {
    let embedding = &config.embedding;
    let mode = match provider {
        "openai" => EmbeddingMode::OpenAI {
            api_key: args
                .embedding_api_key
                .clone()
                .or_else(|| embedding.api_key.clone()),
            base_url: args
                .embedding_api_base
                .clone()
                .or_else(|| embedding.base_url.clone()),
        },
        "ollama" => EmbeddingMode::Ollama {
            host: args
                .embedding_host
                .clone()
                .or_else(|| embedding.host.clone()),
        },
        "simulated" => EmbeddingMode::Simulated { dimensions },
        #[cfg(feature = "local-embeddings")]
        "local" => EmbeddingMode::Local {
            model_path: args.embedding_model_path.clone(),
        },
        other => anyhow::bail!("Unknown embedding provider: {}", other),
    };
    Ok(mode)
}

/// Create an embedding adapter with the configured batching
pub(crate) fn embedding_adapter(
    model: &str,
    mode: EmbeddingMode,
    config: &Config,
) -> anyhow::Result<EmbeddingAdapter> {
    let provider = create_provider(model, mode)?;
    Ok(EmbeddingAdapter::new(provider)
        .with_batch_size(config.embedding.batch_size)
        .with_max_concurrent_batches(config.embedding.max_concurrent_batches))
}
