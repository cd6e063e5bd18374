//! Infrastructure layer - external I/O adapters
//!
//! This module contains all code that interacts with external systems:
//! - AWS (SSM Parameter Store, STS, ECR, CloudFormation, ECS) via the `aws` CLI
//! - The local workspace directory
//! - Git operations
//! - Embedded CloudFormation templates

pub mod aws;
pub mod deployer;
pub mod describer;
pub mod git;
pub mod identity;
pub mod inventory;
pub mod render;
pub mod store;
pub mod workspace;

// Re-export commonly used types
pub use aws::AwsCli;
pub use deployer::CloudFormationDeployer;
pub use describer::CloudFormationDescriber;
pub use git::GitClient;
pub use identity::StsIdentity;
pub use inventory::EcrInventory;
pub use render::CloudFormationRenderer;
pub use store::ParameterStore;
pub use workspace::LocalWorkspace;
