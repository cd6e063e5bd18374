//! Addons resolver - merges an application's extension templates
//!
//! Addons are CloudFormation fragments kept under `<app>/addons/` in the
//! workspace. A missing directory means the application has no addons and is
//! reported as [`AddonsError::NotDefined`]; every other failure is real.

use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::domain::ports::Workspace;
use crate::domain::AddonsArtifact;
use crate::error::AddonsError;

/// Template sections merged across addons files, in output order
const MERGED_SECTIONS: &[&str] = &["Parameters", "Mappings", "Conditions", "Resources", "Outputs"];

/// Top-level keys accepted but not merged
const IGNORED_KEYS: &[&str] = &["AWSTemplateFormatVersion", "Description", "Metadata"];

const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// Locates and renders addons for applications in a workspace
pub struct AddonsResolver<'a> {
    workspace: &'a dyn Workspace,
}

impl<'a> AddonsResolver<'a> {
    pub fn new(workspace: &'a dyn Workspace) -> Self {
        Self { workspace }
    }

    /// Render all addons of `app` into one template
    pub async fn resolve(&self, app: &str) -> Result<AddonsArtifact, AddonsError> {
        let dir = self.workspace.addons_dir(app);
        let files = list_template_files(app, &dir).await?;
        info!("Merging {} addons template(s) for {}", files.len(), app);

        let mut merged = MergedTemplate::new(app);
        for path in &files {
            let content =
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| AddonsError::ReadDir {
                        path: path.clone(),
                        source,
                    })?;
            merged.add(path, &content)?;
        }

        Ok(AddonsArtifact {
            template: merged.render()?,
        })
    }
}

/// `*.yml` / `*.yaml` files in `dir`, sorted by name
async fn list_template_files(app: &str, dir: &Path) -> Result<Vec<PathBuf>, AddonsError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No addons directory at {}", dir.display());
            return Err(AddonsError::NotDefined {
                app: app.to_string(),
                path: dir.to_path_buf(),
            });
        }
        Err(source) => {
            return Err(AddonsError::ReadDir {
                path: dir.to_path_buf(),
                source,
            })
        }
    };

    let mut files = Vec::new();
    loop {
        let entry = entries
            .next_entry()
            .await
            .map_err(|source| AddonsError::ReadDir {
                path: dir.to_path_buf(),
                source,
            })?;
        let Some(entry) = entry else { break };

        let path = entry.path();
        let is_template = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yml") | Some("yaml")
        );
        if is_template && path.is_file() {
            files.push(path);
        }
    }

    if files.is_empty() {
        return Err(AddonsError::Empty {
            path: dir.to_path_buf(),
        });
    }
    files.sort();
    Ok(files)
}

/// Sections accumulated from every addons file
struct MergedTemplate {
    app: String,
    sections: Vec<(&'static str, Mapping)>,
}

impl MergedTemplate {
    fn new(app: &str) -> Self {
        Self {
            app: app.to_string(),
            sections: MERGED_SECTIONS
                .iter()
                .map(|name| (*name, Mapping::new()))
                .collect(),
        }
    }

    fn add(&mut self, path: &Path, content: &str) -> Result<(), AddonsError> {
        let doc: Value = serde_yaml::from_str(content).map_err(|e| AddonsError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let Value::Mapping(doc) = doc else {
            return Err(AddonsError::Parse {
                path: path.to_path_buf(),
                message: "template must be a mapping".to_string(),
            });
        };

        for (key, value) in doc {
            let key_name = key.as_str().unwrap_or_default().to_string();
            if IGNORED_KEYS.contains(&key_name.as_str()) {
                continue;
            }

            let Some((section, merged)) = self
                .sections
                .iter_mut()
                .find(|(name, _)| *name == key_name)
            else {
                return Err(AddonsError::Parse {
                    path: path.to_path_buf(),
                    message: format!("unsupported section {:?}", key_name),
                });
            };

            let Value::Mapping(entries) = value else {
                return Err(AddonsError::Parse {
                    path: path.to_path_buf(),
                    message: format!("section {} must be a mapping", section),
                });
            };

            for (logical_id, definition) in entries {
                match merged.get(&logical_id) {
                    // Identical definitions (e.g. the shared App/Env/Name parameters) collapse
                    Some(existing) if *existing == definition => {}
                    Some(_) => {
                        return Err(AddonsError::DuplicateLogicalId {
                            section: section.to_string(),
                            logical_id: logical_id.as_str().unwrap_or_default().to_string(),
                            path: path.to_path_buf(),
                        })
                    }
                    None => {
                        merged.insert(logical_id, definition);
                    }
                }
            }
        }
        Ok(())
    }

    fn render(self) -> Result<String, AddonsError> {
        let mut template = Mapping::new();
        template.insert(
            Value::from("AWSTemplateFormatVersion"),
            Value::from(TEMPLATE_FORMAT_VERSION),
        );
        template.insert(
            Value::from("Description"),
            Value::from(format!("Additional resources for application {}", self.app)),
        );
        for (name, entries) in self.sections {
            if !entries.is_empty() {
                template.insert(Value::from(name), Value::Mapping(entries));
            }
        }
        Ok(serde_yaml::to_string(&Value::Mapping(template))?)
    }
}
