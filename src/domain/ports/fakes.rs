//! In-memory collaborators for unit tests

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Mutex;

use super::*;

pub const ACCOUNT: &str = "111111111111";
pub const REGION: &str = "us-west-2";

pub fn test_environment(project: &str, name: &str) -> Environment {
    Environment {
        project: project.to_string(),
        name: name.to_string(),
        region: REGION.to_string(),
        account_id: ACCOUNT.to_string(),
        prod: false,
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub projects: Mutex<BTreeMap<String, Project>>,
    pub environments: Vec<Environment>,
    pub applications: Vec<ApplicationSummary>,
    pub create_calls: Mutex<u32>,
    /// Returned once by the next `create_project`
    pub create_error: Mutex<Option<StoreError>>,
}

impl MemoryStore {
    pub fn with_project(project: Project) -> Self {
        let store = Self::default();
        store
            .projects
            .lock()
            .unwrap()
            .insert(project.name.clone(), project);
        store
    }

    pub fn with_environment(mut self, env: Environment) -> Self {
        self.environments.push(env);
        self
    }

    pub fn with_application(mut self, project: &str, name: &str, app_type: &str) -> Self {
        self.applications.push(ApplicationSummary {
            project: project.to_string(),
            name: name.to_string(),
            app_type: app_type.to_string(),
        });
        self
    }
}

#[async_trait]
impl MetadataStore for MemoryStore {
    async fn get_project(&self, name: &str) -> Result<Project, StoreError> {
        self.projects
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::ProjectNotFound {
                project: name.to_string(),
            })
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        Ok(self.projects.lock().unwrap().values().cloned().collect())
    }

    async fn create_project(&self, project: &Project) -> Result<(), StoreError> {
        *self.create_calls.lock().unwrap() += 1;
        if let Some(err) = self.create_error.lock().unwrap().take() {
            return Err(err);
        }
        let mut projects = self.projects.lock().unwrap();
        if projects.contains_key(&project.name) {
            return Err(StoreError::ProjectAlreadyExists {
                project: project.name.clone(),
            });
        }
        projects.insert(project.name.clone(), project.clone());
        Ok(())
    }

    async fn get_environment(&self, project: &str, env: &str) -> Result<Environment, StoreError> {
        self.environments
            .iter()
            .find(|e| e.project == project && e.name == env)
            .cloned()
            .ok_or_else(|| StoreError::EnvironmentNotFound {
                project: project.to_string(),
                environment: env.to_string(),
            })
    }

    async fn list_environments(&self, project: &str) -> Result<Vec<Environment>, StoreError> {
        Ok(self
            .environments
            .iter()
            .filter(|e| e.project == project)
            .cloned()
            .collect())
    }

    async fn get_application(
        &self,
        project: &str,
        app: &str,
    ) -> Result<ApplicationSummary, StoreError> {
        self.applications
            .iter()
            .find(|a| a.project == project && a.name == app)
            .cloned()
            .ok_or_else(|| StoreError::ApplicationNotFound {
                project: project.to_string(),
                application: app.to_string(),
            })
    }

    async fn list_applications(
        &self,
        project: &str,
    ) -> Result<Vec<ApplicationSummary>, StoreError> {
        Ok(self
            .applications
            .iter()
            .filter(|a| a.project == project)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryWorkspace {
    pub manifests: BTreeMap<String, Vec<u8>>,
    pub project: Mutex<Option<String>>,
    pub fail_create: bool,
    /// `summary` fails as if `.workspace` were unreadable
    pub corrupt_summary: bool,
    pub addons_root: PathBuf,
}

impl MemoryWorkspace {
    pub fn with_manifest(mut self, app: &str, raw: &str) -> Self {
        self.manifests.insert(app.to_string(), raw.as_bytes().to_vec());
        self
    }

    pub fn bound_to(self, project: &str) -> Self {
        *self.project.lock().unwrap() = Some(project.to_string());
        self
    }
}

#[async_trait]
impl Workspace for MemoryWorkspace {
    async fn read_manifest(&self, app: &str) -> Result<Vec<u8>, WorkspaceError> {
        self.manifests
            .get(app)
            .cloned()
            .ok_or_else(|| WorkspaceError::ManifestNotFound {
                app: app.to_string(),
                path: PathBuf::from(app).join("manifest.yml"),
            })
    }

    async fn app_names(&self) -> Result<Vec<String>, WorkspaceError> {
        Ok(self.manifests.keys().cloned().collect())
    }

    async fn create(&self, project: &str) -> Result<(), WorkspaceError> {
        if self.fail_create {
            return Err(WorkspaceError::Io {
                action: "create directory",
                path: PathBuf::from("stackwright"),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            });
        }
        let mut bound = self.project.lock().unwrap();
        match bound.as_deref() {
            Some(existing) if existing != project => Err(WorkspaceError::AlreadyBound {
                existing: existing.to_string(),
            }),
            _ => {
                *bound = Some(project.to_string());
                Ok(())
            }
        }
    }

    async fn summary(&self) -> Result<WorkspaceSummary, WorkspaceError> {
        if self.corrupt_summary {
            return Err(WorkspaceError::Summary {
                path: PathBuf::from("stackwright/.workspace"),
                message: "invalid type: sequence, expected struct WorkspaceSummary".to_string(),
            });
        }
        self.project
            .lock()
            .unwrap()
            .clone()
            .map(|project| WorkspaceSummary { project })
            .ok_or(WorkspaceError::NoProject)
    }

    fn addons_dir(&self, app: &str) -> PathBuf {
        self.addons_root.join(app).join("addons")
    }
}

#[derive(Default)]
pub struct StaticInventory {
    pub by_region: HashMap<String, ResourceInventory>,
    pub unavailable: bool,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl StaticInventory {
    pub fn with_repository(mut self, region: &str, app: &str, url: &str) -> Self {
        self.by_region
            .entry(region.to_string())
            .or_default()
            .repository_urls
            .insert(app.to_string(), url.to_string());
        self
    }
}

#[async_trait]
impl InventoryService for StaticInventory {
    async fn resources_by_region(
        &self,
        project: &Project,
        region: &str,
    ) -> Result<ResourceInventory, InventoryError> {
        self.calls
            .lock()
            .unwrap()
            .push((project.name.clone(), region.to_string()));
        if self.unavailable {
            return Err(InventoryError::Unavailable {
                project: project.name.clone(),
                region: region.to_string(),
                source: crate::error::AwsCliError::Spawn {
                    command: "aws ecr describe-repositories".to_string(),
                    message: "connection refused".to_string(),
                },
            });
        }
        Ok(self.by_region.get(region).cloned().unwrap_or_default())
    }
}

/// Renders `variant=<plain|https>` plus the image so tests can see what was chosen
#[derive(Default)]
pub struct RecordingRenderer {
    pub https_flags: Mutex<Vec<bool>>,
    pub inputs: Mutex<Vec<DeploymentInput>>,
    pub fail: bool,
}

struct RecordedStack {
    input: DeploymentInput,
    is_https: bool,
}

impl StackSerializer for RecordedStack {
    fn template(&self) -> Result<String, RenderError> {
        let variant = if self.is_https { "https" } else { "plain" };
        Ok(format!("variant={}\napp={}\n", variant, self.input.app.name))
    }

    fn serialized_parameters(&self) -> Result<String, RenderError> {
        Ok(format!(
            "image={}:{}\nenv={}\n",
            self.input.image_repo_url, self.input.image_tag, self.input.env.name
        ))
    }
}

impl StackRenderer for RecordingRenderer {
    fn new_stack(
        &self,
        input: DeploymentInput,
        is_https: bool,
    ) -> Result<Box<dyn StackSerializer>, RenderError> {
        if self.fail {
            return Err(RenderError::MissingField { field: "image.port" });
        }
        self.https_flags.lock().unwrap().push(is_https);
        self.inputs.lock().unwrap().push(input.clone());
        Ok(Box::new(RecordedStack { input, is_https }))
    }
}

pub struct FixedIdentity;

#[async_trait]
impl IdentityService for FixedIdentity {
    async fn caller(&self) -> Result<Caller, IdentityError> {
        Ok(Caller {
            account: ACCOUNT.to_string(),
            arn: format!("arn:aws:iam::{}:user/test", ACCOUNT),
        })
    }
}

#[derive(Default)]
pub struct RecordingDeployer {
    pub calls: Mutex<Vec<CreateProjectInput>>,
    pub fail: bool,
}

#[async_trait]
impl ProjectDeployer for RecordingDeployer {
    async fn deploy_project(&self, input: &CreateProjectInput) -> Result<(), DeployError> {
        self.calls.lock().unwrap().push(input.clone());
        if self.fail {
            return Err(DeployError::Stack {
                stack: format!("{}-infrastructure-roles", input.project),
                source: crate::error::AwsCliError::Failed {
                    command: "aws cloudformation deploy".to_string(),
                    code: Some("ValidationError".to_string()),
                    stderr: "stack is in ROLLBACK_COMPLETE state".to_string(),
                },
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Start(String),
    Success(String),
    Failure(String),
}

#[derive(Default)]
pub struct RecordingProgress {
    pub events: Mutex<Vec<ProgressEvent>>,
}

impl ProgressReporter for RecordingProgress {
    fn start(&self, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(ProgressEvent::Start(message.to_string()));
    }

    fn success(&self, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(ProgressEvent::Success(message.to_string()));
    }

    fn failure(&self, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(ProgressEvent::Failure(message.to_string()));
    }
}

/// Deployed stacks keyed by stack name; anything else is "not deployed"
#[derive(Default)]
pub struct StaticStacks {
    pub stacks: HashMap<String, DeployedStack>,
    pub resources: HashMap<String, Vec<StackResource>>,
    pub variables: HashMap<String, Vec<(String, String)>>,
    /// Stacks whose lookup fails outright
    pub broken: Vec<String>,
    pub resource_calls: Mutex<Vec<String>>,
}

impl StaticStacks {
    pub fn with_stack(
        mut self,
        name: &str,
        parameters: &[(&str, &str)],
        outputs: &[(&str, &str)],
    ) -> Self {
        let to_map = |pairs: &[(&str, &str)]| -> BTreeMap<String, String> {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        };
        self.stacks.insert(
            name.to_string(),
            DeployedStack {
                parameters: to_map(parameters),
                outputs: to_map(outputs),
            },
        );
        self
    }

    pub fn with_variable(mut self, family: &str, name: &str, value: &str) -> Self {
        self.variables
            .entry(family.to_string())
            .or_default()
            .push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_resource(mut self, stack: &str, resource_type: &str, physical_id: &str) -> Self {
        self.resources
            .entry(stack.to_string())
            .or_default()
            .push(StackResource {
                resource_type: resource_type.to_string(),
                physical_id: physical_id.to_string(),
            });
        self
    }
}

#[async_trait]
impl StackDescriber for StaticStacks {
    async fn describe_stack(
        &self,
        stack: &str,
        _region: &str,
    ) -> Result<Option<DeployedStack>, DescribeError> {
        if self.broken.iter().any(|b| b == stack) {
            return Err(DescribeError::Stack {
                stack: stack.to_string(),
                source: crate::error::AwsCliError::Failed {
                    command: "aws cloudformation describe-stacks".to_string(),
                    code: Some("AccessDenied".to_string()),
                    stderr: "not authorized".to_string(),
                },
            });
        }
        Ok(self.stacks.get(stack).cloned())
    }

    async fn stack_resources(
        &self,
        stack: &str,
        _region: &str,
    ) -> Result<Vec<StackResource>, DescribeError> {
        self.resource_calls.lock().unwrap().push(stack.to_string());
        Ok(self.resources.get(stack).cloned().unwrap_or_default())
    }

    async fn task_variables(
        &self,
        family: &str,
        _container: &str,
        _region: &str,
    ) -> Result<Vec<(String, String)>, DescribeError> {
        Ok(self.variables.get(family).cloned().unwrap_or_default())
    }
}
