use std::collections::BTreeMap;

use serde_json::{json, Value};

use super::*;
use crate::validation::validate_logical_id;
use crate::Error;

pub const POLICY_VERSION: &str = "2012-10-17";
pub const GET_OBJECT: &str = "s3:GetObject";
/// statement id of the read grant this crate attaches
pub const CDN_READ_SID: &str = "AllowCloudFrontRead";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Allow,
    Deny,
}

impl Effect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Effect::Allow => "Allow",
            Effect::Deny => "Deny",
        }
    }
}

/// who a statement applies to. A document never allows anything to the
/// wildcard principal `"*"`, see [`PolicyDocument::merge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    CanonicalUser(Value),
    Aws(Value),
}

impl Principal {
    fn key(&self) -> &'static str {
        match self {
            Principal::CanonicalUser(_) => "CanonicalUser",
            Principal::Aws(_) => "AWS",
        }
    }
    fn value(&self) -> Value {
        match self {
            Principal::CanonicalUser(v) | Principal::Aws(v) => v.clone(),
        }
    }

    /// true if this principal is, or includes, anonymous access
    pub fn is_wildcard(&self) -> bool {
        match self {
            Principal::CanonicalUser(v) | Principal::Aws(v) => match v {
                Value::String(s) => s == "*",
                Value::Array(items) => items.iter().any(|item| item == "*"),
                _ => false,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyStatement {
    pub sid: String,
    pub effect: Effect,
    pub actions: Vec<String>,
    pub principals: Vec<Principal>,
    pub resources: Vec<Value>,
}

/// cloudformation accepts either a single value or a list. we emit the
/// single value when there's only one, same as the console does.
fn one_or_many(mut values: Vec<Value>) -> Value {
    if values.len() == 1 {
        values.remove(0)
    } else {
        Value::Array(values)
    }
}

impl PolicyStatement {
    pub fn to_json(&self) -> Value {
        let mut grouped: BTreeMap<&'static str, Vec<Value>> = BTreeMap::new();
        for p in &self.principals {
            grouped.entry(p.key()).or_default().push(p.value());
        }
        let principal: serde_json::Map<String, Value> = grouped
            .into_iter()
            .map(|(key, values)| (key.to_string(), one_or_many(values)))
            .collect();
        json!({
            "Sid": self.sid,
            "Effect": self.effect.as_str(),
            "Action": one_or_many(self.actions.iter().map(|a| json!(a)).collect()),
            "Principal": Value::Object(principal),
            "Resource": one_or_many(self.resources.clone()),
        })
    }
}

/// A resource policy, kept as a map of statement id to statement
/// so that attaching a statement can never drop an unrelated one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyDocument {
    statements: BTreeMap<String, PolicyStatement>,
}

impl PolicyDocument {
    /// returns a new document containing every existing statement plus `statement`.
    /// re-adding an identical statement is a no-op. A different statement
    /// under an existing sid is an error, and so is allowing anything to `"*"`:
    /// the bucket must never be declared public. Denying `"*"` is fine.
    pub fn merge(&self, statement: PolicyStatement) -> Result<PolicyDocument> {
        if statement.effect == Effect::Allow && statement.principals.iter().any(Principal::is_wildcard) {
            return Err(Error::PublicPrincipal { sid: statement.sid });
        }
        if let Some(existing) = self.statements.get(&statement.sid) {
            if *existing == statement {
                return Ok(self.clone());
            }
            return Err(Error::ConflictingStatement { sid: statement.sid });
        }
        let mut out = self.clone();
        out.statements.insert(statement.sid.clone(), statement);
        Ok(out)
    }

    pub fn statements(&self) -> impl Iterator<Item = &PolicyStatement> {
        self.statements.values()
    }

    pub fn statement(&self, sid: &str) -> Option<&PolicyStatement> {
        self.statements.get(sid)
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn to_json(&self) -> Value {
        json!({
            "Version": POLICY_VERSION,
            "Statement": self.statements().map(|s| s.to_json()).collect::<Vec<_>>(),
        })
    }
}

/// The bucket policy granting the origin access identity read access to every
/// object in the bucket. Holding one of these is what lets a distribution
/// bind to the bucket as its origin.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessPolicyBinding {
    logical_id: String,
    bucket_name: String,
    bucket_ref: Value,
    identity_logical_id: String,
    document: PolicyDocument,
}

impl AccessPolicyBinding {
    /// the single statement this binding contributes
    pub fn read_only_statement(storage: &StorageResource, identity: &AccessIdentity) -> PolicyStatement {
        PolicyStatement {
            sid: CDN_READ_SID.to_string(),
            effect: Effect::Allow,
            actions: vec![GET_OBJECT.to_string()],
            principals: vec![identity.grant_principal()],
            resources: vec![storage.objects_arn()],
        }
    }

    /// merges the read grant into the bucket's resource policy.
    /// fails if the bucket can't carry a resource policy, since without it
    /// the CDN has no way to read a private bucket.
    pub fn attach(
        logical_id: impl Into<String>,
        storage: &StorageResource,
        identity: &AccessIdentity,
    ) -> Result<Self> {
        let logical_id = logical_id.into();
        validate_logical_id(&logical_id)?;
        let existing = storage.resource_policy().ok_or_else(|| Error::ResourcePolicyUnsupported {
            bucket: storage.bucket_name().to_string(),
        })?;
        let document = existing.merge(Self::read_only_statement(storage, identity))?;
        tracing::debug!(
            %logical_id,
            bucket = storage.bucket_name(),
            identity = identity.logical_id(),
            statements = document.len(),
            "attached read grant to bucket policy"
        );
        Ok(Self {
            logical_id,
            bucket_name: storage.bucket_name().to_string(),
            bucket_ref: storage.bucket_ref(),
            identity_logical_id: identity.logical_id().to_string(),
            document,
        })
    }

    pub fn document(&self) -> &PolicyDocument {
        &self.document
    }

    /// the statement granting the CDN read access
    pub fn grant(&self) -> Option<&PolicyStatement> {
        self.document.statement(CDN_READ_SID)
    }

    /// true if this binding gives `identity` read access to every object of `storage`.
    pub fn grants_read_to(&self, storage: &StorageResource, identity: &AccessIdentity) -> bool {
        if self.bucket_ref != storage.bucket_ref() || self.identity_logical_id != identity.logical_id() {
            return false;
        }
        match self.grant() {
            Some(statement) => {
                statement.effect == Effect::Allow
                    && statement.actions.iter().any(|a| a == GET_OBJECT)
                    && statement.principals.contains(&identity.grant_principal())
                    && statement.resources.contains(&storage.objects_arn())
            }
            None => false,
        }
    }

    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }
}

impl CfnResource for AccessPolicyBinding {
    fn logical_id(&self) -> &str {
        &self.logical_id
    }

    fn type_string(&self) -> &'static str {
        "AWS::S3::BucketPolicy"
    }

    fn properties(&self) -> Value {
        json!({
            "Bucket": self.bucket_ref,
            "PolicyDocument": self.document.to_json(),
        })
    }

    fn validate(&self) -> Result<()> {
        validate_logical_id(&self.logical_id)
    }
}
