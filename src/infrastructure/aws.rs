//! AWS CLI runner
//!
//! Every AWS call goes through the `aws` binary (override with `AWS_BIN`),
//! always with `--output json`. Service error codes are recovered from the
//! CLI's stderr so adapters can classify failures without string matching.

use regex::Regex;
use serde::de::DeserializeOwned;
use std::process::Stdio;
use std::sync::OnceLock;
use tokio::process::Command;
use tracing::debug;

use crate::config::AwsConfig;
use crate::error::AwsCliError;
use crate::repo::get_tool_path;

/// Runs `aws` subcommands with the configured profile and region
#[derive(Debug, Clone)]
pub struct AwsCli {
    binary: String,
    profile: Option<String>,
    region: Option<String>,
}

impl AwsCli {
    pub fn new(config: &AwsConfig) -> Self {
        Self {
            binary: get_tool_path("AWS_BIN", "aws"),
            profile: config.profile.clone(),
            region: config.region.clone(),
        }
    }

    /// Full argument list for a call; an explicit `--region` in `args` wins
    fn build_args(&self, args: &[&str]) -> Vec<String> {
        let mut full: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        full.extend(["--output".to_string(), "json".to_string()]);
        if let Some(profile) = &self.profile {
            full.extend(["--profile".to_string(), profile.clone()]);
        }
        if let Some(region) = &self.region {
            if !args.contains(&"--region") {
                full.extend(["--region".to_string(), region.clone()]);
            }
        }
        full
    }

    /// Run a subcommand and return its stdout
    pub async fn run(&self, args: &[&str]) -> Result<String, AwsCliError> {
        let full = self.build_args(args);
        let command = describe(&self.binary, args);
        debug!("Running {}", command);

        let output = Command::new(&self.binary)
            .args(&full)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| AwsCliError::Spawn {
                command: command.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(AwsCliError::Failed {
                code: error_code(&stderr),
                command,
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run a subcommand and decode its JSON output
    pub async fn run_json<T: DeserializeOwned>(&self, args: &[&str]) -> Result<T, AwsCliError> {
        let stdout = self.run(args).await?;
        decode(&describe(&self.binary, args), &stdout)
    }
}

/// `aws ssm get-parameter` style label used in errors and logs
fn describe(binary: &str, args: &[&str]) -> String {
    let verbs: Vec<&str> = args
        .iter()
        .take_while(|a| !a.starts_with("--"))
        .copied()
        .collect();
    format!("{} {}", binary, verbs.join(" "))
}

/// Decode CLI JSON output
pub fn decode<T: DeserializeOwned>(command: &str, stdout: &str) -> Result<T, AwsCliError> {
    serde_json::from_str(stdout).map_err(|e| AwsCliError::Decode {
        command: command.to_string(),
        message: e.to_string(),
    })
}

/// Extract the service error code from CLI stderr
///
/// The CLI reports service errors as
/// `An error occurred (ParameterNotFound) when calling the GetParameter operation: ...`.
pub fn error_code(stderr: &str) -> Option<String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"\(([A-Za-z0-9]+)\) when calling").expect("error code pattern is valid")
    });
    pattern
        .captures(stderr)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn cli(profile: Option<&str>, region: Option<&str>) -> AwsCli {
        AwsCli {
            binary: "aws".to_string(),
            profile: profile.map(str::to_string),
            region: region.map(str::to_string),
        }
    }

    #[test]
    fn test_error_code_extraction() {
        let stderr = "\nAn error occurred (ParameterNotFound) when calling the GetParameter operation: \n";
        assert_eq!(error_code(stderr), Some("ParameterNotFound".to_string()));
        assert_eq!(error_code("Unable to locate credentials"), None);
    }

    #[test]
    fn test_build_args_adds_output_profile_region() {
        let args = cli(Some("dev"), Some("us-east-1")).build_args(&["sts", "get-caller-identity"]);
        assert_eq!(
            args,
            vec![
                "sts",
                "get-caller-identity",
                "--output",
                "json",
                "--profile",
                "dev",
                "--region",
                "us-east-1"
            ]
        );
    }

    #[test]
    fn test_explicit_region_wins() {
        let args = cli(None, Some("us-east-1")).build_args(&[
            "ecr",
            "describe-repositories",
            "--region",
            "us-west-2",
        ]);
        assert_eq!(args.iter().filter(|a| *a == "--region").count(), 1);
        assert!(args.contains(&"us-west-2".to_string()));
        assert!(!args.contains(&"us-east-1".to_string()));
    }

    #[test]
    fn test_describe_keeps_verbs_only() {
        assert_eq!(
            describe("aws", &["ssm", "get-parameter", "--name", "/stackwright/test"]),
            "aws ssm get-parameter"
        );
    }

    #[test]
    fn test_decode_error() {
        #[derive(Debug, Deserialize)]
        struct Identity {
            #[serde(rename = "Account")]
            _account: String,
        }
        let err = decode::<Identity>("aws sts get-caller-identity", "not json").unwrap_err();
        assert!(matches!(err, AwsCliError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let cli = AwsCli {
            binary: "/nonexistent/aws-binary".to_string(),
            profile: None,
            region: None,
        };
        let err = cli.run(&["sts", "get-caller-identity"]).await.unwrap_err();
        assert!(matches!(err, AwsCliError::Spawn { .. }));
    }
}
