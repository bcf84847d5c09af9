use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::resources::CfnResource;
use crate::validation::validate_logical_id;
use crate::{Error, Result};

pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedResource {
    #[serde(rename = "Type")]
    pub ty: String,
    #[serde(rename = "Properties")]
    pub properties: Value,
    #[serde(rename = "DependsOn", default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(rename = "DeletionPolicy", default, skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<String>,
    #[serde(rename = "UpdateReplacePolicy", default, skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceOutput {
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Value")]
    pub value: Value,
}

/// A cloudformation template. Maps are ordered so that rendering the same
/// stack twice produces byte for byte the same document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackTemplate {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub version: String,
    #[serde(rename = "Description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "Resources")]
    pub resources: BTreeMap<String, SavedResource>,
    #[serde(rename = "Outputs", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, ResourceOutput>,
}

impl Default for StackTemplate {
    fn default() -> Self {
        Self {
            version: TEMPLATE_FORMAT_VERSION.to_string(),
            description: None,
            resources: Default::default(),
            outputs: Default::default(),
        }
    }
}

impl StackTemplate {
    pub fn new(description: Option<String>) -> Self {
        Self {
            description,
            ..Default::default()
        }
    }

    pub fn add_resource(&mut self, resource: &dyn CfnResource) -> Result<()> {
        let name = resource.logical_id().to_string();
        if let Err(e) = resource.validate() {
            tracing::error!(resource = %name, error = %e, "resource failed validation");
            return Err(e);
        }
        if self.resources.contains_key(&name) {
            return Err(Error::DuplicateLogicalId(name));
        }
        let policy = resource.removal_policy().map(|p| p.as_cfn_str().to_string());
        let saved = SavedResource {
            ty: resource.type_string().to_string(),
            properties: resource.properties(),
            depends_on: resource.depends_on(),
            deletion_policy: policy.clone(),
            update_replace_policy: policy,
        };
        self.resources.insert(name, saved);
        Ok(())
    }

    pub fn add_output(&mut self, name: &str, description: &str, value: Value) -> Result<()> {
        validate_logical_id(name)?;
        if self.outputs.contains_key(name) {
            return Err(Error::DuplicateLogicalId(name.to_string()));
        }
        self.outputs.insert(name.to_string(), ResourceOutput {
            description: description.to_string(),
            value,
        });
        Ok(())
    }

    pub fn resources_of_type<'a>(&'a self, ty: &'a str) -> impl Iterator<Item = (&'a String, &'a SavedResource)> + 'a {
        self.resources.iter().filter(move |(_, r)| r.ty == ty)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// we make it pretty so if a user needs to look at the stack in the Cfn console, it looks nice
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// every template of an app, keyed by stack name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedStacks {
    pub templates: BTreeMap<String, StackTemplate>,
}

impl SavedStacks {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{AccessIdentity, RemovalPolicy, StorageResource};
    use serde_json::json;

    #[test]
    fn renders_resources_with_policies() {
        let bucket = StorageResource::new("S3Bucket", "my-site-assets", RemovalPolicy::Retain).unwrap();
        let identity = AccessIdentity::new("OriginAccessIdentity").unwrap();
        let mut template = StackTemplate::new(Some("test".into()));
        template.add_resource(&bucket).unwrap();
        template.add_resource(&identity).unwrap();

        let value: Value = serde_json::from_str(&template.to_json().unwrap()).unwrap();
        assert_eq!(value["AWSTemplateFormatVersion"], "2010-09-09");
        assert_eq!(value["Description"], "test");
        assert_eq!(value["Resources"]["S3Bucket"]["Type"], "AWS::S3::Bucket");
        assert_eq!(value["Resources"]["S3Bucket"]["DeletionPolicy"], "Retain");
        assert_eq!(value["Resources"]["S3Bucket"]["UpdateReplacePolicy"], "Retain");
        let oai = &value["Resources"]["OriginAccessIdentity"];
        assert!(oai.get("DeletionPolicy").is_none());
        assert!(oai.get("DependsOn").is_none());
        assert!(value.get("Outputs").is_none());
        assert_eq!(template.resources_of_type("AWS::S3::Bucket").count(), 1);
    }

    #[test]
    fn duplicate_resources_are_rejected() {
        let identity = AccessIdentity::new("OriginAccessIdentity").unwrap();
        let mut template = StackTemplate::default();
        template.add_resource(&identity).unwrap();
        assert!(matches!(template.add_resource(&identity), Err(Error::DuplicateLogicalId(_))));
        template.add_output("BucketName", "name", json!("x")).unwrap();
        assert!(template.add_output("BucketName", "name", json!("x")).is_err());
        assert!(template.add_output("Bucket-Name", "name", json!("x")).is_err());
    }

    struct Unchecked;

    impl CfnResource for Unchecked {
        fn logical_id(&self) -> &str {
            "not valid"
        }
        fn type_string(&self) -> &'static str {
            "AWS::CloudFront::CloudFrontOriginAccessIdentity"
        }
        fn properties(&self) -> Value {
            json!({})
        }
        fn validate(&self) -> Result<()> {
            crate::validation::validate_logical_id(self.logical_id())
        }
    }

    #[test]
    fn invalid_resources_are_rejected() {
        let mut template = StackTemplate::default();
        assert!(matches!(template.add_resource(&Unchecked), Err(Error::InvalidLogicalId { .. })));
        assert!(template.resources.is_empty());
    }

    #[test]
    fn template_round_trips() {
        let identity = AccessIdentity::new("OriginAccessIdentity").unwrap();
        let mut template = StackTemplate::default();
        template.add_resource(&identity).unwrap();
        let parsed: StackTemplate = serde_json::from_str(&template.to_json_pretty().unwrap()).unwrap();
        assert_eq!(parsed, template);
    }
}
