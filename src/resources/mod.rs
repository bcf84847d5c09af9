use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::Result;

mod s3_bucket;
pub use s3_bucket::*;
mod origin_access_identity;
pub use origin_access_identity::*;
mod bucket_policy;
pub use bucket_policy::*;
mod cloudfront;
pub use cloudfront::*;

// higher level resources:
mod static_website;
pub use static_website::*;

/// a single resource that can be rendered into the `Resources`
/// section of a cloudformation template.
pub trait CfnResource {
    fn logical_id(&self) -> &str;
    fn type_string(&self) -> &'static str;
    fn properties(&self) -> Value;
    fn validate(&self) -> Result<()> {
        Ok(())
    }
    /// `None` means the resource is left to cloudformation's default policy.
    fn removal_policy(&self) -> Option<RemovalPolicy> {
        None
    }
    fn depends_on(&self) -> Vec<String> {
        vec![]
    }
}

/// what happens to a resource when the stack that declared it is torn down
/// (or when an update replaces it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RemovalPolicy {
    Destroy,
    Retain,
}

impl RemovalPolicy {
    /// the value cloudformation expects for DeletionPolicy/UpdateReplacePolicy
    pub fn as_cfn_str(&self) -> &'static str {
        match self {
            RemovalPolicy::Destroy => "Delete",
            RemovalPolicy::Retain => "Retain",
        }
    }
}

/// `{ "Ref": logical_id }`
pub fn get_ref(logical_id: &str) -> Value {
    json!({ "Ref": logical_id })
}

/// `{ "Fn::GetAtt": [logical_id, attribute] }`
pub fn get_att(logical_id: &str, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [logical_id, attribute] })
}

/// `{ "Fn::Join": [delimiter, parts] }`
pub fn join(delimiter: &str, parts: Vec<Value>) -> Value {
    json!({ "Fn::Join": [delimiter, parts] })
}

/// builds a deterministic logical id for a construct within a stack:
/// the construct id followed by the adler32 checksum of the full path
/// so that two stacks never produce colliding ids for the same construct.
pub fn logical_id(stack_name: &str, construct_id: &str) -> String {
    let path = format!("{stack_name}/{construct_id}");
    let hash = adler32::RollingAdler32::from_buffer(path.as_bytes()).hash();
    format!("{construct_id}{:08X}", hash)
}

/// converts a tag map into cloudformation's `[{ Key, Value }]` list.
pub fn tags_to_cfn(tags: &std::collections::BTreeMap<String, String>) -> Value {
    Value::Array(
        tags.iter()
            .map(|(key, value)| json!({ "Key": key, "Value": value }))
            .collect(),
    )
}
