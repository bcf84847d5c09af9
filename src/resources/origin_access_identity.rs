use serde_json::{json, Value};

use super::*;
use crate::validation::validate_logical_id;

pub const ORIGIN_ACCESS_IDENTITY_COMMENT: &str = "Allows CloudFront to reach the bucket";

/// The identity cloudfront presents to S3 when fetching from the origin.
/// It has nothing to configure: it only exists to be named as the principal
/// of the bucket policy and as the credential of the distribution's origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessIdentity {
    logical_id: String,
}

impl AccessIdentity {
    pub fn new(logical_id: impl Into<String>) -> Result<Self> {
        let logical_id = logical_id.into();
        validate_logical_id(&logical_id)?;
        tracing::debug!(%logical_id, "declared origin access identity");
        Ok(Self { logical_id })
    }

    /// the principal to put in a bucket policy to grant this identity access.
    pub fn grant_principal(&self) -> Principal {
        Principal::CanonicalUser(get_att(&self.logical_id, "S3CanonicalUserId"))
    }

    /// the value of `S3OriginConfig.OriginAccessIdentity` on a distribution origin.
    pub fn origin_credential(&self) -> Value {
        join("", vec![
            json!("origin-access-identity/cloudfront/"),
            get_ref(&self.logical_id),
        ])
    }
}

impl CfnResource for AccessIdentity {
    fn logical_id(&self) -> &str {
        &self.logical_id
    }

    fn type_string(&self) -> &'static str {
        "AWS::CloudFront::CloudFrontOriginAccessIdentity"
    }

    fn properties(&self) -> Value {
        json!({
            "CloudFrontOriginAccessIdentityConfig": {
                "Comment": ORIGIN_ACCESS_IDENTITY_COMMENT,
            }
        })
    }

    fn validate(&self) -> Result<()> {
        validate_logical_id(&self.logical_id)
    }
}
