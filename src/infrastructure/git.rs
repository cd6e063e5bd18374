//! Default image tag for `app package`
//!
//! `RELEASE_GIT_SHA`, then `GIT_SHA`, override the short SHA of the
//! workspace checkout's HEAD.

use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::GitError;
use crate::repo::get_tool_path;

const TAG_OVERRIDES: [&str; 2] = ["RELEASE_GIT_SHA", "GIT_SHA"];

/// Reads the image tag from the repository containing `dir`
pub struct GitClient {
    dir: PathBuf,
}

impl GitClient {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub async fn image_tag(&self) -> Result<String, GitError> {
        if let Some(tag) = tag_override(|var| std::env::var(var).ok()) {
            debug!("Image tag {} set by the environment", tag);
            return Ok(tag);
        }

        let output = Command::new(get_tool_path("GIT_BIN", "git"))
            .args(["rev-parse", "--short", "HEAD"])
            .current_dir(&self.dir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| GitError::ShaFailed(e.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("not a git repository") {
                return Err(GitError::NotARepository);
            }
            return Err(GitError::ShaFailed(stderr.trim().to_string()));
        }

        let sha = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if sha.is_empty() {
            return Err(GitError::ShaFailed("git printed no SHA".to_string()));
        }
        debug!("Image tag {} from HEAD of {}", sha, self.dir.display());
        Ok(sha)
    }
}

/// First non-empty override in priority order
fn tag_override(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    TAG_OVERRIDES
        .iter()
        .find_map(|var| lookup(var).filter(|value| !value.is_empty()))
}
