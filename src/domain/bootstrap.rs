//! Project bootstrap domain types
//!
//! Bootstrapping is a two-stage state machine with no retries and no rollback:
//! `Uninitialized -> Registered -> Converged`, or a terminal failure.

/// Phase of a project bootstrap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapPhase {
    /// Nothing has been written yet
    Uninitialized,
    /// Project recorded in the store and bound to the workspace
    Registered,
    /// Shared infrastructure deployed
    Converged,
    /// Registration failed
    Failed,
    /// Registration succeeded but the deployment failed
    ConvergenceFailed,
}

/// What to bootstrap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapRequest {
    pub project: String,
    /// Domain to delegate to the project; empty for none
    pub domain: String,
}

/// Outcome of a successful bootstrap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    pub phase: BootstrapPhase,
    pub account_id: String,
    /// The store already held a project with this name
    pub already_registered: bool,
}

pub fn deploy_start_message(project: &str) -> String {
    format!(
        "Creating the infrastructure to manage container repositories under project {}.",
        project
    )
}

pub fn deploy_complete_message(project: &str) -> String {
    format!(
        "Created the infrastructure to manage container repositories under project {}.",
        project
    )
}

pub fn deploy_failed_message(project: &str) -> String {
    format!(
        "Failed to create the infrastructure to manage container repositories under project {}.",
        project
    )
}
