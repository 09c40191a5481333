//! Index location utilities

use std::path::{Path, PathBuf};

use super::corpus::CorpusPaths;

/// Project-local index directory, or the configured override
pub fn local_indexes_dir(configured: Option<&Path>) -> PathBuf {
    configured
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(".memdex").join("indexes"))
}

/// Global user registry: `~/.memdex/indexes`
pub fn global_indexes_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".memdex").join("indexes"))
}

/// Find an index by name in the current project or global registry
///
/// Search order:
/// 1. Local project: `.memdex/indexes/<name>` (or the configured directory)
/// 2. Absolute path (if provided)
/// 3. Global user registry: `~/.memdex/indexes/<name>`
pub fn find_index(name: &str, configured: Option<&Path>) -> anyhow::Result<PathBuf> {
    let local_path = local_indexes_dir(configured).join(name);
    if CorpusPaths::in_dir(&local_path).exists() {
        return Ok(local_path);
    }

    let abs_path = PathBuf::from(name);
    if abs_path.is_absolute() && CorpusPaths::in_dir(&abs_path).exists() {
        return Ok(abs_path);
    }

    if let Some(global) = global_indexes_dir() {
        let global_path = global.join(name);
        if CorpusPaths::in_dir(&global_path).exists() {
            return Ok(global_path);
        }
    }

    anyhow::bail!(
        "Index '{}' not found. Run 'memdex list' to see available indexes.",
        name
    )
}
