use std::collections::BTreeMap;

use serde_json::{json, Value};

use super::*;
use crate::validation::{validate_bucket_name, validate_logical_id};
use crate::Error;

/// served for `/` and, via the distribution's error fallbacks, for any
/// path the bucket doesn't have.
pub const INDEX_DOCUMENT: &str = "index.html";

/// canned ACL of the bucket. Only private buckets can be declared:
/// the only reader is the CDN, through the bucket policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessControl {
    Private,
}

impl AccessControl {
    pub fn as_cfn_str(&self) -> &'static str {
        match self {
            AccessControl::Private => "Private",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebsiteConfiguration {
    pub index_document: String,
    pub error_document: String,
}

impl Default for WebsiteConfiguration {
    fn default() -> Self {
        Self {
            index_document: INDEX_DOCUMENT.into(),
            error_document: INDEX_DOCUMENT.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum BucketSource {
    /// created and owned by the stack
    Declared {
        removal_policy: RemovalPolicy,
        resource_policy: PolicyDocument,
    },
    /// an existing bucket referenced by name. we don't own its policy.
    Imported,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorageResource {
    logical_id: String,
    bucket_name: String,
    access_control: AccessControl,
    website: WebsiteConfiguration,
    source: BucketSource,
    tags: BTreeMap<String, String>,
}

impl StorageResource {
    pub fn new(
        logical_id: impl Into<String>,
        bucket_name: &str,
        removal_policy: RemovalPolicy,
    ) -> Result<Self> {
        let logical_id = logical_id.into();
        validate_logical_id(&logical_id)?;
        validate_bucket_name(bucket_name)?;
        tracing::debug!(bucket = bucket_name, %logical_id, ?removal_policy, "declared private website bucket");
        if removal_policy == RemovalPolicy::Retain {
            tracing::warn!(bucket = bucket_name, "bucket is retained and will outlive the stack");
        }
        Ok(Self {
            logical_id,
            bucket_name: bucket_name.to_string(),
            access_control: AccessControl::Private,
            website: WebsiteConfiguration::default(),
            source: BucketSource::Declared {
                removal_policy,
                resource_policy: PolicyDocument::default(),
            },
            tags: BTreeMap::new(),
        })
    }

    /// references a bucket that already exists outside of this stack.
    /// it is never rendered into the template, and no policy can be attached to it.
    pub fn imported(bucket_name: &str) -> Result<Self> {
        validate_bucket_name(bucket_name)?;
        Ok(Self {
            logical_id: String::new(),
            bucket_name: bucket_name.to_string(),
            access_control: AccessControl::Private,
            website: WebsiteConfiguration::default(),
            source: BucketSource::Imported,
            tags: BTreeMap::new(),
        })
    }

    pub fn with_tags(mut self, tags: BTreeMap<String, String>) -> Self {
        self.tags = tags;
        self
    }

    /// seeds the bucket's resource policy with statements declared elsewhere.
    /// statements attached later are merged into this document.
    pub fn with_resource_policy(mut self, document: PolicyDocument) -> Result<Self> {
        match &mut self.source {
            BucketSource::Declared { resource_policy, .. } => {
                *resource_policy = document;
                Ok(self)
            }
            BucketSource::Imported => Err(Error::ResourcePolicyUnsupported {
                bucket: self.bucket_name.clone(),
            }),
        }
    }

    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    pub fn access_control(&self) -> AccessControl {
        self.access_control
    }

    pub fn is_private(&self) -> bool {
        self.access_control == AccessControl::Private
    }

    pub fn website(&self) -> &WebsiteConfiguration {
        &self.website
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    pub fn is_imported(&self) -> bool {
        self.source == BucketSource::Imported
    }

    /// `None` if the bucket was imported.
    pub fn resource_policy(&self) -> Option<&PolicyDocument> {
        match &self.source {
            BucketSource::Declared { resource_policy, .. } => Some(resource_policy),
            BucketSource::Imported => None,
        }
    }

    pub fn supports_resource_policy(&self) -> bool {
        self.resource_policy().is_some()
    }

    /// value usable wherever cloudformation expects the bucket name
    pub fn bucket_ref(&self) -> Value {
        match self.source {
            BucketSource::Declared { .. } => get_ref(&self.logical_id),
            BucketSource::Imported => Value::String(self.bucket_name.clone()),
        }
    }

    pub fn arn(&self) -> Value {
        match self.source {
            BucketSource::Declared { .. } => get_att(&self.logical_id, "Arn"),
            BucketSource::Imported => Value::String(format!("arn:aws:s3:::{}", self.bucket_name)),
        }
    }

    /// the arn of every object in the bucket: `<bucket arn>/*`
    pub fn objects_arn(&self) -> Value {
        join("", vec![self.arn(), json!("/*")])
    }

    pub fn regional_domain_name(&self) -> Value {
        match self.source {
            BucketSource::Declared { .. } => get_att(&self.logical_id, "RegionalDomainName"),
            BucketSource::Imported => join("", vec![
                json!(self.bucket_name),
                json!(".s3."),
                get_ref("AWS::Region"),
                json!("."),
                get_ref("AWS::URLSuffix"),
            ]),
        }
    }

    /// human readable form of `objects_arn`
    pub fn resource_pattern(&self) -> String {
        format!("{}/*", self.bucket_name)
    }
}

impl CfnResource for StorageResource {
    fn logical_id(&self) -> &str {
        &self.logical_id
    }

    fn type_string(&self) -> &'static str {
        "AWS::S3::Bucket"
    }

    fn properties(&self) -> Value {
        let mut map = serde_json::Map::new();
        map.insert("AccessControl".into(), json!(self.access_control.as_cfn_str()));
        map.insert("BucketName".into(), json!(self.bucket_name));
        map.insert("PublicAccessBlockConfiguration".into(), json!({
            "BlockPublicAcls": true,
            "BlockPublicPolicy": true,
            "IgnorePublicAcls": true,
            "RestrictPublicBuckets": true,
        }));
        map.insert("WebsiteConfiguration".into(), json!({
            "IndexDocument": self.website.index_document,
            "ErrorDocument": self.website.error_document,
        }));
        if !self.tags.is_empty() {
            map.insert("Tags".into(), tags_to_cfn(&self.tags));
        }
        Value::Object(map)
    }

    fn validate(&self) -> Result<()> {
        if self.is_imported() {
            return Err(Error::InvalidLogicalId {
                name: self.bucket_name.clone(),
                reason: "imported buckets are not declared by this stack",
            });
        }
        validate_logical_id(&self.logical_id)?;
        validate_bucket_name(&self.bucket_name)
    }

    fn removal_policy(&self) -> Option<RemovalPolicy> {
        match self.source {
            BucketSource::Declared { removal_policy, .. } => Some(removal_policy),
            BucketSource::Imported => None,
        }
    }
}
