//! Package service - validate, fill in and execute `app package`
//!
//! Execution is strictly sequential: resolve the stack, write it, then
//! resolve and write addons. A missing addons directory is success; any
//! other addons failure surfaces after the stack files are already on disk.

use tracing::info;

use super::addons_resolver::AddonsResolver;
use super::artifact_writer::ArtifactWriter;
use super::stack_selector::{PackageTarget, StackSelector};
use crate::domain::ports::{InventoryService, MetadataStore, StackRenderer, Workspace};
use crate::domain::select_one;
use crate::error::{PackageError, WorkspaceError};

/// Values supplied on the command line; anything missing is filled in by [`PackageService::ask`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageOptions {
    pub app: Option<String>,
    pub env: Option<String>,
    pub tag: Option<String>,
}

/// What a successful package produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReport {
    pub target: PackageTarget,
    pub addons_written: bool,
}

pub struct PackageService<'a> {
    workspace: &'a dyn Workspace,
    store: &'a dyn MetadataStore,
    selector: StackSelector<'a>,
    addons: AddonsResolver<'a>,
}

impl<'a> PackageService<'a> {
    pub fn new(
        workspace: &'a dyn Workspace,
        store: &'a dyn MetadataStore,
        inventory: &'a dyn InventoryService,
        renderer: &'a dyn StackRenderer,
    ) -> Self {
        Self {
            workspace,
            store,
            selector: StackSelector::new(workspace, store, inventory, renderer),
            addons: AddonsResolver::new(workspace),
        }
    }

    pub fn with_log_retention(mut self, days: u32) -> Self {
        self.selector = self.selector.with_log_retention(days);
        self
    }

    /// The project this workspace is bound to
    pub async fn project(&self) -> Result<String, PackageError> {
        match self.workspace.summary().await {
            Ok(summary) if !summary.project.is_empty() => Ok(summary.project),
            Ok(_) | Err(WorkspaceError::NoProject) => Err(PackageError::NoProjectInWorkspace),
            Err(e) => Err(PackageError::Workspace(e)),
        }
    }

    /// Reject supplied names that do not exist
    pub async fn validate(&self, project: &str, opts: &PackageOptions) -> Result<(), PackageError> {
        if let Some(app) = opts.app.as_deref().filter(|a| !a.is_empty()) {
            let names = self
                .workspace
                .app_names()
                .await
                .map_err(PackageError::ListApps)?;
            if !names.iter().any(|n| n == app) {
                return Err(PackageError::UnknownApp {
                    app: app.to_string(),
                });
            }
        }
        if let Some(env) = opts.env.as_deref().filter(|e| !e.is_empty()) {
            self.store.get_environment(project, env).await?;
        }
        Ok(())
    }

    /// Fill in whatever the user left out
    ///
    /// `fallback_tag` is used when no tag was supplied, typically the short
    /// commit SHA of the working tree.
    pub async fn ask(
        &self,
        project: &str,
        opts: &PackageOptions,
        fallback_tag: Option<String>,
    ) -> Result<PackageTarget, PackageError> {
        let app = match opts.app.as_deref().filter(|a| !a.is_empty()) {
            Some(app) => app.to_string(),
            None => {
                let names = self
                    .workspace
                    .app_names()
                    .await
                    .map_err(PackageError::ListApps)?;
                select_one(None, &names, "application", "--name")?
            }
        };

        let env = match opts.env.as_deref().filter(|e| !e.is_empty()) {
            Some(env) => env.to_string(),
            None => {
                let names: Vec<String> = self
                    .store
                    .list_environments(project)
                    .await?
                    .into_iter()
                    .map(|e| e.name)
                    .collect();
                select_one(None, &names, "environment", "--env")?
            }
        };

        let tag = opts
            .tag
            .clone()
            .filter(|t| !t.is_empty())
            .or(fallback_tag)
            .ok_or(PackageError::MissingTag)?;

        Ok(PackageTarget {
            project: project.to_string(),
            app,
            env,
            tag,
        })
    }

    /// Render and write the stack, then the addons if the app has any
    pub async fn execute(
        &self,
        target: &PackageTarget,
        writer: &mut ArtifactWriter,
    ) -> Result<PackageReport, PackageError> {
        let stack = self.selector.resolve(target).await?;
        writer.write_stack(&stack)?;

        let addons_written = match self.addons.resolve(&target.app).await {
            Ok(addons) => {
                writer.write_addons(&addons)?;
                true
            }
            Err(e) if e.is_not_defined() => {
                info!("No addons defined for {}", target.app);
                false
            }
            Err(e) => return Err(PackageError::Addons(e)),
        };

        Ok(PackageReport {
            target: target.clone(),
            addons_written,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::fakes::*;
    use crate::domain::Project;
    use crate::error::{SelectionError, StackError, StoreError};
    use crate::services::artifact_writer::Destination;
    use std::path::Path;

    const FRONTEND: &str = "name: frontend\ntype: Load Balanced Web App\nimage:\n  build: Dockerfile\n  port: 80\n";
    const REPO: &str = "111111111111.dkr.ecr.us-west-2.amazonaws.com/frontend";

    fn store() -> MemoryStore {
        MemoryStore::with_project(Project::new("test", ACCOUNT, ""))
            .with_environment(test_environment("test", "test"))
    }

    fn workspace(root: &Path) -> MemoryWorkspace {
        MemoryWorkspace {
            addons_root: root.to_path_buf(),
            ..Default::default()
        }
        .with_manifest("frontend", FRONTEND)
        .bound_to("test")
    }

    fn inventory() -> StaticInventory {
        StaticInventory::default().with_repository(REGION, "frontend", REPO)
    }

    fn target() -> PackageTarget {
        PackageTarget {
            project: "test".to_string(),
            app: "frontend".to_string(),
            env: "test".to_string(),
            tag: "abc1234".to_string(),
        }
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_unbound_workspace() {
        let (store, inventory, renderer) = (store(), inventory(), RecordingRenderer::default());
        let ws = MemoryWorkspace::default();

        let err = PackageService::new(&ws, &store, &inventory, &renderer)
            .project()
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "no project associated with this workspace");
    }

    #[tokio::test]
    async fn test_validate_rejects_unknown_names() {
        let tmp = tempfile::tempdir().unwrap();
        let (store, inventory, renderer) = (store(), inventory(), RecordingRenderer::default());
        let ws = workspace(tmp.path());
        let service = PackageService::new(&ws, &store, &inventory, &renderer);

        let err = service
            .validate(
                "test",
                &PackageOptions {
                    app: Some("backend".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "application 'backend' does not exist in the workspace"
        );

        let err = service
            .validate(
                "test",
                &PackageOptions {
                    env: Some("prod".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PackageError::Store(StoreError::EnvironmentNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_ask_defaults_single_candidates() {
        let tmp = tempfile::tempdir().unwrap();
        let (store, inventory, renderer) = (store(), inventory(), RecordingRenderer::default());
        let ws = workspace(tmp.path());

        let picked = PackageService::new(&ws, &store, &inventory, &renderer)
            .ask("test", &PackageOptions::default(), Some("abc1234".to_string()))
            .await
            .unwrap();
        assert_eq!(picked, target());
    }

    #[tokio::test]
    async fn test_ask_fails_on_ambiguous_env_and_missing_tag() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store().with_environment(test_environment("test", "prod"));
        let (inventory, renderer) = (inventory(), RecordingRenderer::default());
        let ws = workspace(tmp.path());
        let service = PackageService::new(&ws, &store, &inventory, &renderer);

        let err = service
            .ask("test", &PackageOptions::default(), Some("abc".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PackageError::Selection(SelectionError::Ambiguous { .. })
        ));

        let opts = PackageOptions {
            env: Some("prod".to_string()),
            ..Default::default()
        };
        let err = service.ask("test", &opts, None).await.unwrap_err();
        assert!(matches!(err, PackageError::MissingTag));
    }

    #[tokio::test]
    async fn test_explicit_tag_beats_fallback() {
        let tmp = tempfile::tempdir().unwrap();
        let (store, inventory, renderer) = (store(), inventory(), RecordingRenderer::default());
        let ws = workspace(tmp.path());
        let opts = PackageOptions {
            tag: Some("v1.2.0".to_string()),
            ..Default::default()
        };

        let target = PackageService::new(&ws, &store, &inventory, &renderer)
            .ask("test", &opts, Some("abc1234".to_string()))
            .await
            .unwrap();
        assert_eq!(target.tag, "v1.2.0");
    }

    #[tokio::test]
    async fn test_execute_without_addons_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("infrastructure");
        let (store, inventory, renderer) = (store(), inventory(), RecordingRenderer::default());
        let ws = workspace(tmp.path());
        let mut writer = ArtifactWriter::new(Destination::Directory(out.clone()), "frontend", "test");

        let report = PackageService::new(&ws, &store, &inventory, &renderer)
            .execute(&target(), &mut writer)
            .await
            .unwrap();

        assert!(!report.addons_written);
        assert_eq!(
            file_names(&out),
            vec!["frontend-test.params.json", "frontend.stack.yml"]
        );
    }

    #[tokio::test]
    async fn test_execute_writes_addons() {
        let tmp = tempfile::tempdir().unwrap();
        let addons = tmp.path().join("frontend").join("addons");
        std::fs::create_dir_all(&addons).unwrap();
        std::fs::write(
            addons.join("bucket.yml"),
            "Resources:\n  Bucket:\n    Type: AWS::S3::Bucket\n",
        )
        .unwrap();
        let out = tmp.path().join("infrastructure");
        let (store, inventory, renderer) = (store(), inventory(), RecordingRenderer::default());
        let ws = workspace(tmp.path());
        let mut writer = ArtifactWriter::new(Destination::Directory(out.clone()), "frontend", "test");

        let report = PackageService::new(&ws, &store, &inventory, &renderer)
            .execute(&target(), &mut writer)
            .await
            .unwrap();

        assert!(report.addons_written);
        assert_eq!(
            file_names(&out),
            vec![
                "frontend-test.params.json",
                "frontend.addons.stack.yml",
                "frontend.stack.yml"
            ]
        );
    }

    #[tokio::test]
    async fn test_addons_failure_keeps_stack_files() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("frontend").join("addons")).unwrap();
        let out = tmp.path().join("infrastructure");
        let (store, inventory, renderer) = (store(), inventory(), RecordingRenderer::default());
        let ws = workspace(tmp.path());
        let mut writer = ArtifactWriter::new(Destination::Directory(out.clone()), "frontend", "test");

        let err = PackageService::new(&ws, &store, &inventory, &renderer)
            .execute(&target(), &mut writer)
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("retrieve addons template: "));
        assert_eq!(file_names(&out).len(), 2);
    }

    #[tokio::test]
    async fn test_stack_failure_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("infrastructure");
        let (store, renderer) = (store(), RecordingRenderer::default());
        let inventory = StaticInventory::default();
        let ws = workspace(tmp.path());
        let mut writer = ArtifactWriter::new(Destination::Directory(out.clone()), "frontend", "test");

        let err = PackageService::new(&ws, &store, &inventory, &renderer)
            .execute(&target(), &mut writer)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PackageError::Stack(StackError::RepoNotFound { .. })
        ));
        assert!(!out.exists());
    }
}
