//! STS caller identity

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::aws::AwsCli;
use crate::domain::ports::IdentityService;
use crate::domain::Caller;
use crate::error::IdentityError;

#[derive(Debug, Deserialize)]
struct CallerIdentity {
    #[serde(rename = "Account")]
    account: String,
    #[serde(rename = "Arn")]
    arn: String,
}

impl From<CallerIdentity> for Caller {
    fn from(identity: CallerIdentity) -> Self {
        Self {
            account: identity.account,
            arn: identity.arn,
        }
    }
}

pub struct StsIdentity {
    cli: AwsCli,
}

impl StsIdentity {
    pub fn new(cli: AwsCli) -> Self {
        Self { cli }
    }
}

#[async_trait]
impl IdentityService for StsIdentity {
    async fn caller(&self) -> Result<Caller, IdentityError> {
        let identity: CallerIdentity = self.cli.run_json(&["sts", "get-caller-identity"]).await?;
        debug!("Caller is {} in account {}", identity.arn, identity.account);
        Ok(identity.into())
    }
}
