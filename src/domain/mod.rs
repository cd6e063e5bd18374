//! Domain layer - pure business logic
//!
//! This module contains business logic with no external I/O.
//! Types and functions here can be unit tested without mocking;
//! the collaborator contracts the services rely on live in [`ports`].

pub mod bootstrap;
pub mod deployment;
pub mod manifest;
pub mod ports;
pub mod project;
pub mod selection;

// Re-export commonly used types
pub use bootstrap::BootstrapRequest;
pub use deployment::{
    AddonsArtifact, Caller, CreateProjectInput, DeployedStack, DeploymentInput, RenderedArtifact,
    ResourceInventory, StackResource,
};
pub use project::{ApplicationSummary, Environment, Project};
pub use selection::select_one;
