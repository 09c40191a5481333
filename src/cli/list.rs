//! List command - show all indexes

use std::path::{Path, PathBuf};

use clap::Args;

use crate::config::Config;
use crate::index::{global_indexes_dir, local_indexes_dir, CorpusPaths, IndexMeta};

#[derive(Args)]
pub struct ListArgs {
    /// Show detailed information
    #[arg(short, long)]
    pub detailed: bool,
}

pub async fn run(args: ListArgs, config: &Config) -> anyhow::Result<()> {
    println!("memdex indexes");
    println!("{}", "=".repeat(50));

    let mut total_indexes = 0;

    println!("\nCurrent Project");
    println!("   {}", std::env::current_dir()?.display());
    println!("   {}", "-".repeat(45));

    let local_path = local_indexes_dir(config.storage.index_dir.as_deref());
    if local_path.exists() {
        let count = print_indexes(&local_path, args.detailed, &mut total_indexes)?;
        if count == 0 {
            println!("   No indexes found");
        }
    } else {
        println!("   No index directory ({})", local_path.display());
    }

    if let Some(global_path) = global_indexes_dir() {
        if global_path.exists() {
            println!("\nGlobal Indexes (~/.memdex/indexes)");
            println!("   {}", "-".repeat(45));

            let count = print_indexes(&global_path, args.detailed, &mut total_indexes)?;
            if count == 0 {
                println!("   No indexes found");
            }
        }
    }

    println!("\n{}", "=".repeat(50));
    println!("Total: {} index(es)", total_indexes);

    if total_indexes == 0 {
        println!("\nGet started:");
        println!("   memdex build my-docs --docs ./documents");
    }

    Ok(())
}

/// Print every index under `dir`, returning how many were printed
fn print_indexes(dir: &Path, detailed: bool, total: &mut usize) -> anyhow::Result<usize> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_dir())
        .collect();
    entries.sort();

    for path in &entries {
        let index_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let paths = CorpusPaths::in_dir(path);
        let status = if paths.exists() { "OK" } else { "INCOMPLETE" };

        print!("   {}. {} {}", *total + 1, index_name, status);

        if detailed && paths.meta.exists() {
            if let Ok(meta) = IndexMeta::load(&paths.meta) {
                print!(
                    " ({} passages from {} files, {} dims, {}/{})",
                    meta.passage_count,
                    meta.source_count,
                    meta.dimensions,
                    meta.embedding_provider,
                    meta.embedding_model
                );
            }
        }

        if let Ok(size) = calculate_dir_size(path) {
            print!(" [{:.1} MB]", size as f64 / (1024.0 * 1024.0));
        }

        println!();
        *total += 1;
    }

    Ok(entries.len())
}

fn calculate_dir_size(path: &Path) -> std::io::Result<u64> {
    let mut size = 0;
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if metadata.is_file() {
            size += metadata.len();
        } else if metadata.is_dir() {
            size += calculate_dir_size(&entry.path())?;
        }
    }
    Ok(size)
}
