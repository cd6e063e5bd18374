//! Local workspace on disk
//!
//! ```text
//! <root>/stackwright/
//!   .workspace            # YAML summary: the bound project
//!   <app>/manifest.yml
//!   <app>/addons/*.yml
//! ```

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::WorkspaceConfig;
use crate::domain::ports::{Workspace, WorkspaceSummary};
use crate::error::WorkspaceError;
use crate::repo::find_workspace_root;

const SUMMARY_FILE: &str = ".workspace";
const MANIFEST_FILE: &str = "manifest.yml";
const ADDONS_DIR: &str = "addons";

pub struct LocalWorkspace {
    dir: PathBuf,
}

impl LocalWorkspace {
    /// Workspace rooted at `dir` (the `stackwright/` directory itself)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Use the nearest existing workspace above `cwd`, or a new one in `cwd`
    pub fn discover(cwd: &Path, config: &WorkspaceConfig) -> Self {
        let root = find_workspace_root(cwd, &config.directory_name, config.search_depth)
            .unwrap_or_else(|| cwd.to_path_buf());
        Self::new(root.join(&config.directory_name))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn summary_path(&self) -> PathBuf {
        self.dir.join(SUMMARY_FILE)
    }

    fn manifest_path(&self, app: &str) -> PathBuf {
        self.dir.join(app).join(MANIFEST_FILE)
    }
}

fn io_error(action: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> WorkspaceError {
    let path = path.to_path_buf();
    move |source| WorkspaceError::Io {
        action,
        path,
        source,
    }
}

#[async_trait]
impl Workspace for LocalWorkspace {
    async fn read_manifest(&self, app: &str) -> Result<Vec<u8>, WorkspaceError> {
        let path = self.manifest_path(app);
        match tokio::fs::read(&path).await {
            Ok(raw) => Ok(raw),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(WorkspaceError::ManifestNotFound {
                app: app.to_string(),
                path,
            }),
            Err(e) => Err(io_error("read manifest", &path)(e)),
        }
    }

    async fn app_names(&self) -> Result<Vec<String>, WorkspaceError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error("list", &self.dir)(e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(io_error("list", &self.dir))?
        {
            let path = entry.path();
            if path.join(MANIFEST_FILE).is_file() {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        debug!("Workspace has {} application(s)", names.len());
        Ok(names)
    }

    async fn create(&self, project: &str) -> Result<(), WorkspaceError> {
        match self.summary().await {
            Ok(summary) if summary.project == project => {
                debug!("Workspace already bound to {}", project);
                return Ok(());
            }
            Ok(summary) => {
                return Err(WorkspaceError::AlreadyBound {
                    existing: summary.project,
                })
            }
            Err(WorkspaceError::NoProject) => {}
            Err(e) => return Err(e),
        }

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(io_error("create directory", &self.dir))?;

        let path = self.summary_path();
        let body = serde_yaml::to_string(&WorkspaceSummary {
            project: project.to_string(),
        })
        .map_err(|e| WorkspaceError::Summary {
            path: path.clone(),
            message: e.to_string(),
        })?;
        tokio::fs::write(&path, body)
            .await
            .map_err(io_error("write", &path))?;

        info!("Bound workspace {} to project {}", self.dir.display(), project);
        Ok(())
    }

    async fn summary(&self) -> Result<WorkspaceSummary, WorkspaceError> {
        let path = self.summary_path();
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(WorkspaceError::NoProject),
            Err(e) => return Err(io_error("read", &path)(e)),
        };
        serde_yaml::from_str(&raw).map_err(|e| WorkspaceError::Summary {
            path,
            message: e.to_string(),
        })
    }

    fn addons_dir(&self, app: &str) -> PathBuf {
        self.dir.join(app).join(ADDONS_DIR)
    }
}
