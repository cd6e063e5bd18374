//! Services layer - orchestration logic
//!
//! This module coordinates between domain logic and the collaborator
//! contracts in `domain::ports`. Concrete adapters are injected by the
//! command layer.

pub mod addons_resolver;
pub mod app_describer;
pub mod artifact_writer;
pub mod package_service;
pub mod project_bootstrapper;
pub mod project_describer;
pub mod stack_selector;

// Re-export commonly used types
pub use app_describer::AppDescriber;
pub use artifact_writer::{ArtifactWriter, Destination};
pub use package_service::{PackageOptions, PackageService};
pub use project_bootstrapper::ProjectBootstrapper;
pub use project_describer::ProjectDescriber;
