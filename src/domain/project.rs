//! Project domain types
//!
//! Projects, environments and application records as kept in the metadata store.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Maximum length of a project name
const MAX_PROJECT_NAME_LEN: usize = 255;

/// A project groups environments and applications under one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: String,
    #[serde(rename = "account")]
    pub account_id: String,
    /// Hosted zone delegated to the project; empty when DNS is not managed
    #[serde(default)]
    pub domain: String,
}

impl Project {
    pub fn new(
        name: impl Into<String>,
        account_id: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            account_id: account_id.into(),
            domain: domain.into(),
        }
    }

    /// Whether applications get an HTTPS listener and DNS records
    pub fn requires_dns_delegation(&self) -> bool {
        !self.domain.is_empty()
    }
}

/// A region/account scoped deployment target within a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub project: String,
    pub name: String,
    pub region: String,
    #[serde(rename = "accountID")]
    pub account_id: String,
    #[serde(default)]
    pub prod: bool,
}

/// An application as registered in the metadata store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSummary {
    pub project: String,
    pub name: String,
    #[serde(rename = "type")]
    pub app_type: String,
}

/// Check a user-supplied project name
///
/// Names start with a lowercase letter and contain only lowercase letters,
/// digits and hyphens.
pub fn validate_project_name(name: &str) -> Result<(), String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z][a-z0-9-]*$").expect("project name pattern is valid")
    });

    if name.is_empty() {
        return Err("project name cannot be empty".to_string());
    }
    if name.len() > MAX_PROJECT_NAME_LEN {
        return Err(format!(
            "project name must be at most {} characters",
            MAX_PROJECT_NAME_LEN
        ));
    }
    if !pattern.is_match(name) {
        return Err(format!(
            "project name {} is invalid: it must start with a letter and contain only lowercase letters, numbers, and hyphens",
            name
        ));
    }
    Ok(())
}
