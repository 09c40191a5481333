//! Remove command - delete an index

use std::path::{Path, PathBuf};

use clap::Args;

use crate::config::Config;
use crate::index::{global_indexes_dir, local_indexes_dir};

#[derive(Args)]
pub struct RemoveArgs {
    /// Index name to remove
    pub index_name: String,

    /// Force removal without confirmation
    #[arg(short, long)]
    pub force: bool,
}

pub async fn run(args: RemoveArgs, config: &Config) -> anyhow::Result<()> {
    let matches = find_all_indexes(&args.index_name, config.storage.index_dir.as_deref());

    if matches.is_empty() {
        anyhow::bail!("Index '{}' not found.", args.index_name);
    }

    if matches.len() == 1 {
        let (path, location) = &matches[0];
        remove_index(path, &args.index_name, location, args.force)?;
    } else {
        println!("Found {} indexes named '{}':", matches.len(), args.index_name);
        for (i, (path, location)) in matches.iter().enumerate() {
            println!("   {}. {} ({})", i + 1, path.display(), location);
        }

        if args.force {
            anyhow::bail!("Multiple matches found. Cannot use --force with multiple indexes.");
        }

        let input = prompt(&format!(
            "Which one to remove? (1-{}, or 'c' to cancel): ",
            matches.len()
        ))?;

        if input == "c" || input == "cancel" {
            println!("Cancelled.");
            return Ok(());
        }

        let choice: usize = input.parse().map_err(|_| anyhow::anyhow!("Invalid choice"))?;
        if choice < 1 || choice > matches.len() {
            anyhow::bail!("Invalid choice");
        }

        let (path, location) = &matches[choice - 1];
        remove_index(path, &args.index_name, location, false)?;
    }

    Ok(())
}

fn find_all_indexes(name: &str, configured: Option<&Path>) -> Vec<(PathBuf, String)> {
    let mut matches = Vec::new();

    let local_path = local_indexes_dir(configured).join(name);
    if local_path.is_dir() {
        matches.push((local_path, "current project".to_string()));
    }

    if let Some(global) = global_indexes_dir() {
        let global_path = global.join(name);
        let same_as_local = matches.first().is_some_and(|(local, _)| {
            local.canonicalize().ok() == global_path.canonicalize().ok()
        });
        if global_path.is_dir() && !same_as_local {
            matches.push((global_path, "global (~/.memdex)".to_string()));
        }
    }

    matches
}

fn prompt(message: &str) -> anyhow::Result<String> {
    use std::io::Write;

    print!("{}", message);
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn remove_index(path: &Path, name: &str, location: &str, force: bool) -> anyhow::Result<()> {
    if !force {
        let input = prompt(&format!(
            "Remove index '{}' from {}? Type '{}' to confirm: ",
            name, location, name
        ))?;

        if input != name {
            println!("Confirmation failed. Index not removed.");
            return Ok(());
        }
    }

    std::fs::remove_dir_all(path)?;
    println!("Index '{}' removed from {}.", name, location);

    Ok(())
}
