//! Config command - inspect and create the memdex config file

use clap::{Args, Subcommand};

use crate::config::Config;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective settings, secrets masked
    Show,

    /// Write a commented example config file
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Show config file path
    Path,
}

pub async fn run(args: ConfigArgs) -> anyhow::Result<()> {
    let path = Config::config_path();

    match args.command {
        ConfigCommands::Show => {
            let origin = if path.exists() {
                "loaded"
            } else {
                "not found, defaults in effect"
            };
            println!("# {} ({})", path.display(), origin);
            print!("{}", render(&Config::load())?);
        }

        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }

            let path = Config::write_example()?;
            println!("Wrote {}", path.display());
            println!("Indexes built from now on pick up its [embedding] and [build] settings;");
            println!("existing indexes keep the provider and model they were built with.");
        }

        ConfigCommands::Path => {
            println!("{}", path.display());
        }
    }

    Ok(())
}

/// Effective config as TOML, with the API key masked
fn render(config: &Config) -> anyhow::Result<String> {
    let mut shown = config.clone();
    if shown.embedding.api_key.is_some() {
        shown.embedding.api_key = Some("***".to_string());
    }
    Ok(toml::to_string_pretty(&shown)?)
}
