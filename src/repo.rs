//! Repository utilities for stackwright
//!
//! Locating the workspace directory and external tool binaries.

use std::path::{Path, PathBuf};
use tracing::debug;

/// Find the nearest ancestor of `start` (inclusive) containing `directory_name`
///
/// Search order:
/// 1. `start` itself
/// 2. Parent directories (up to `depth` levels)
///
/// Returns the directory that *contains* `directory_name`, or `None`.
pub fn find_workspace_root(start: &Path, directory_name: &str, depth: usize) -> Option<PathBuf> {
    debug!(
        "Searching for {}/ from: {}",
        directory_name,
        start.display()
    );

    let mut dir = start;
    for level in 0..=depth {
        if dir.join(directory_name).is_dir() {
            debug!(
                "Found {}/ {} level(s) up at: {}",
                directory_name,
                level,
                dir.display()
            );
            return Some(dir.to_path_buf());
        }
        dir = dir.parent()?;
    }
    None
}

/// Get a tool binary path from environment or fallback to PATH
///
/// # Examples
///
/// ```rust,ignore
/// let aws = get_tool_path("AWS_BIN", "aws");
/// ```
pub fn get_tool_path(env_var: &str, fallback: &str) -> String {
    std::env::var(env_var).unwrap_or_else(|_| fallback.to_string())
}
