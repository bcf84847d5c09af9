use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::*;
use crate::validation::validate_logical_id;
use crate::Error;

/// latest HTTP major version cloudfront lets a distribution declare
pub const HTTP_VERSION: &str = "http2";
pub const VIEWER_PROTOCOL_POLICY: &str = "redirect-to-https";
pub const DEFAULT_ORIGIN_ID: &str = "origin1";
/// where 403/404 from the bucket are rewritten to, so client side routing
/// can handle any path.
pub const FALLBACK_PAGE_PATH: &str = "/index.html";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    Get,
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
        }
    }
}

/// the only methods a static site needs. Nothing that writes to the origin.
pub const READ_ONLY_METHODS: [HttpMethod; 2] = [HttpMethod::Get, HttpMethod::Head];

/// which edge locations serve the distribution.
/// see https://docs.aws.amazon.com/AmazonCloudFront/latest/DeveloperGuide/PriceClass.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PriceClass {
    #[serde(rename = "PriceClass_100")]
    PriceClass100,
    #[default]
    #[serde(rename = "PriceClass_200")]
    PriceClass200,
    #[serde(rename = "PriceClass_All")]
    PriceClassAll,
}

impl PriceClass {
    pub fn as_cfn_str(&self) -> &'static str {
        match self {
            PriceClass::PriceClass100 => "PriceClass_100",
            PriceClass::PriceClass200 => "PriceClass_200",
            PriceClass::PriceClassAll => "PriceClass_All",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FunctionEventType {
    #[default]
    ViewerRequest,
    ViewerResponse,
    OriginRequest,
    OriginResponse,
}

impl FunctionEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionEventType::ViewerRequest => "viewer-request",
            FunctionEventType::ViewerResponse => "viewer-response",
            FunctionEventType::OriginRequest => "origin-request",
            FunctionEventType::OriginResponse => "origin-response",
        }
    }
}

impl fmt::Display for FunctionEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FunctionTarget {
    Arn(String),
    LogicalId(String),
}

/// A CloudFront Function that already exists, either deployed elsewhere
/// (referenced by ARN) or declared in the same template (referenced by logical id).
/// This crate only associates it with the distribution, it never defines one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeFunctionRef {
    target: FunctionTarget,
    event_type: FunctionEventType,
}

fn parse_function_arn(arn: &str) -> std::result::Result<(), &'static str> {
    // arn:partition:service:region:account:resource
    let parts: Vec<&str> = arn.splitn(6, ':').collect();
    if parts.len() != 6 || parts[0] != "arn" {
        return Err("Must be an ARN of the form arn:aws:cloudfront::<account-id>:function/<name>");
    }
    let (partition, service, region, account, resource) = (parts[1], parts[2], parts[3], parts[4], parts[5]);
    if !matches!(partition, "aws" | "aws-cn" | "aws-us-gov") {
        return Err("Unknown partition. Must be one of aws, aws-cn, aws-us-gov");
    }
    if service == "lambda" {
        return Err("Lambda functions are not CloudFront Functions. Only CloudFront Functions can be associated with this distribution");
    }
    if service != "cloudfront" {
        return Err("Must be a CloudFront Function ARN");
    }
    if !region.is_empty() {
        return Err("CloudFront Function ARNs are global and must not contain a region");
    }
    if account.len() != 12 || !account.chars().all(|c| c.is_ascii_digit()) {
        return Err("Account id must be 12 digits");
    }
    match resource.strip_prefix("function/") {
        Some(name) if !name.is_empty() => Ok(()),
        _ => Err("Resource must be function/<name>"),
    }
}

impl EdgeFunctionRef {
    pub fn from_arn(arn: &str) -> Result<Self> {
        parse_function_arn(arn).map_err(|reason| Error::InvalidFunctionReference {
            reference: arn.to_string(),
            reason,
        })?;
        Ok(Self {
            target: FunctionTarget::Arn(arn.to_string()),
            event_type: FunctionEventType::default(),
        })
    }

    /// a `AWS::CloudFront::Function` declared in the same template.
    pub fn from_logical_id(logical_id: &str) -> Result<Self> {
        validate_logical_id(logical_id).map_err(|_| Error::InvalidFunctionReference {
            reference: logical_id.to_string(),
            reason: "Logical ids must be 1 to 255 alphanumeric characters",
        })?;
        Ok(Self {
            target: FunctionTarget::LogicalId(logical_id.to_string()),
            event_type: FunctionEventType::default(),
        })
    }

    /// records the event the function was written for. defaults to viewer-request.
    pub fn for_event(mut self, event_type: FunctionEventType) -> Self {
        self.event_type = event_type;
        self
    }

    pub fn event_type(&self) -> FunctionEventType {
        self.event_type
    }

    pub fn name(&self) -> &str {
        match &self.target {
            FunctionTarget::Arn(s) | FunctionTarget::LogicalId(s) => s,
        }
    }

    pub fn function_arn(&self) -> Value {
        match &self.target {
            FunctionTarget::Arn(arn) => json!(arn),
            FunctionTarget::LogicalId(id) => get_att(id, "FunctionARN"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionAssociation {
    pub event_type: FunctionEventType,
    pub function_arn: Value,
}

impl FunctionAssociation {
    fn to_json(&self) -> Value {
        json!({
            "EventType": self.event_type.as_str(),
            "FunctionARN": self.function_arn,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorFallback {
    pub error_code: u16,
    pub response_code: u16,
    pub response_page_path: String,
    pub error_caching_min_ttl: u64,
}

impl ErrorFallback {
    /// serves the index document with a 200 instead of `error_code`, never cached.
    pub fn index_fallback(error_code: u16) -> Self {
        Self {
            error_code,
            response_code: 200,
            response_page_path: FALLBACK_PAGE_PATH.into(),
            error_caching_min_ttl: 0,
        }
    }

    /// S3 answers 403 for missing keys when the caller can't list the bucket,
    /// and 404 when it can. Both have to land on the index document.
    pub fn spa_fallbacks() -> Vec<Self> {
        vec![Self::index_fallback(403), Self::index_fallback(404)]
    }

    fn to_json(&self) -> Value {
        json!({
            "ErrorCachingMinTTL": self.error_caching_min_ttl,
            "ErrorCode": self.error_code,
            "ResponseCode": self.response_code,
            "ResponsePagePath": self.response_page_path,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct S3Origin {
    pub id: String,
    pub domain_name: Value,
    pub origin_access_identity: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefaultBehavior {
    pub target_origin_id: String,
    pub allowed_methods: Vec<HttpMethod>,
    pub cached_methods: Vec<HttpMethod>,
    pub forward_query_string: bool,
    pub compress: bool,
    /// `None` when no function is associated: the field is left out
    /// of the template entirely rather than rendered as an empty list.
    pub function_associations: Option<Vec<FunctionAssociation>>,
}

fn methods_json(methods: &[HttpMethod]) -> Value {
    Value::Array(methods.iter().map(|m| json!(m.as_str())).collect())
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistributionResource {
    logical_id: String,
    comment: Option<String>,
    ipv6_enabled: bool,
    default_root_object: String,
    price_class: PriceClass,
    origin: S3Origin,
    default_behavior: DefaultBehavior,
    error_fallbacks: Vec<ErrorFallback>,
    tags: BTreeMap<String, String>,
    depends_on: Vec<String>,
}

impl DistributionResource {
    /// `binding` must be the policy granting `identity` read access to `storage`.
    /// the distribution is only correct once the bucket trusts the identity it presents.
    pub fn new(
        logical_id: impl Into<String>,
        storage: &StorageResource,
        identity: &AccessIdentity,
        binding: &AccessPolicyBinding,
        function: Option<&EdgeFunctionRef>,
        price_class: PriceClass,
    ) -> Result<Self> {
        let logical_id = logical_id.into();
        validate_logical_id(&logical_id)?;
        if !binding.grants_read_to(storage, identity) {
            return Err(Error::OriginNotGranted {
                bucket: storage.bucket_name().to_string(),
                identity: identity.logical_id().to_string(),
            });
        }
        let function_associations = match function {
            Some(f) if f.event_type() != FunctionEventType::ViewerRequest => {
                return Err(Error::IncompatibleTrigger {
                    function: f.name().to_string(),
                    event_type: f.event_type(),
                });
            }
            Some(f) => Some(vec![FunctionAssociation {
                event_type: FunctionEventType::ViewerRequest,
                function_arn: f.function_arn(),
            }]),
            None => None,
        };
        let origin = S3Origin {
            id: DEFAULT_ORIGIN_ID.into(),
            domain_name: storage.regional_domain_name(),
            origin_access_identity: identity.origin_credential(),
        };
        let default_behavior = DefaultBehavior {
            target_origin_id: origin.id.clone(),
            allowed_methods: READ_ONLY_METHODS.to_vec(),
            cached_methods: READ_ONLY_METHODS.to_vec(),
            forward_query_string: false,
            compress: true,
            function_associations,
        };
        tracing::debug!(
            %logical_id,
            bucket = storage.bucket_name(),
            price_class = price_class.as_cfn_str(),
            function = function.map(|f| f.name()),
            "declared distribution"
        );
        Ok(Self {
            logical_id,
            comment: None,
            ipv6_enabled: true,
            default_root_object: INDEX_DOCUMENT.into(),
            price_class,
            origin,
            default_behavior,
            error_fallbacks: ErrorFallback::spa_fallbacks(),
            tags: BTreeMap::new(),
            depends_on: vec![binding.logical_id().to_string()],
        })
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_tags(mut self, tags: BTreeMap<String, String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn ipv6_enabled(&self) -> bool {
        self.ipv6_enabled
    }

    pub fn http_version(&self) -> &'static str {
        HTTP_VERSION
    }

    pub fn viewer_protocol_policy(&self) -> &'static str {
        VIEWER_PROTOCOL_POLICY
    }

    pub fn price_class(&self) -> PriceClass {
        self.price_class
    }

    pub fn origin(&self) -> &S3Origin {
        &self.origin
    }

    pub fn default_behavior(&self) -> &DefaultBehavior {
        &self.default_behavior
    }

    pub fn allowed_methods(&self) -> &[HttpMethod] {
        &self.default_behavior.allowed_methods
    }

    pub fn cached_methods(&self) -> &[HttpMethod] {
        &self.default_behavior.cached_methods
    }

    pub fn forwards_query_string(&self) -> bool {
        self.default_behavior.forward_query_string
    }

    /// empty when no function was supplied
    pub fn function_associations(&self) -> &[FunctionAssociation] {
        self.default_behavior.function_associations.as_deref().unwrap_or(&[])
    }

    pub fn error_fallbacks(&self) -> &[ErrorFallback] {
        &self.error_fallbacks
    }

    pub fn domain_name(&self) -> Value {
        get_att(&self.logical_id, "DomainName")
    }

    pub fn distribution_id(&self) -> Value {
        get_ref(&self.logical_id)
    }

    fn default_cache_behavior_json(&self) -> Value {
        let behavior = &self.default_behavior;
        let mut map = serde_json::Map::new();
        map.insert("AllowedMethods".into(), methods_json(&behavior.allowed_methods));
        map.insert("CachedMethods".into(), methods_json(&behavior.cached_methods));
        map.insert("Compress".into(), json!(behavior.compress));
        map.insert("ForwardedValues".into(), json!({
            "Cookies": { "Forward": "none" },
            "QueryString": behavior.forward_query_string,
        }));
        if let Some(associations) = &behavior.function_associations {
            map.insert(
                "FunctionAssociations".into(),
                Value::Array(associations.iter().map(|a| a.to_json()).collect()),
            );
        }
        map.insert("TargetOriginId".into(), json!(behavior.target_origin_id));
        map.insert("ViewerProtocolPolicy".into(), json!(VIEWER_PROTOCOL_POLICY));
        Value::Object(map)
    }
}

impl CfnResource for DistributionResource {
    fn logical_id(&self) -> &str {
        &self.logical_id
    }

    fn type_string(&self) -> &'static str {
        "AWS::CloudFront::Distribution"
    }

    fn properties(&self) -> Value {
        let mut config = serde_json::Map::new();
        if let Some(comment) = &self.comment {
            config.insert("Comment".into(), json!(comment));
        }
        config.insert(
            "CustomErrorResponses".into(),
            Value::Array(self.error_fallbacks.iter().map(|e| e.to_json()).collect()),
        );
        config.insert("DefaultCacheBehavior".into(), self.default_cache_behavior_json());
        config.insert("DefaultRootObject".into(), json!(self.default_root_object));
        config.insert("Enabled".into(), json!(true));
        config.insert("HttpVersion".into(), json!(HTTP_VERSION));
        config.insert("IPV6Enabled".into(), json!(self.ipv6_enabled));
        config.insert("Origins".into(), json!([{
            "DomainName": self.origin.domain_name,
            "Id": self.origin.id,
            "S3OriginConfig": {
                "OriginAccessIdentity": self.origin.origin_access_identity,
            },
        }]));
        config.insert("PriceClass".into(), json!(self.price_class.as_cfn_str()));
        config.insert("ViewerCertificate".into(), json!({ "CloudFrontDefaultCertificate": true }));

        let mut map = serde_json::Map::new();
        map.insert("DistributionConfig".into(), Value::Object(config));
        if !self.tags.is_empty() {
            map.insert("Tags".into(), tags_to_cfn(&self.tags));
        }
        Value::Object(map)
    }

    fn validate(&self) -> Result<()> {
        validate_logical_id(&self.logical_id)
    }

    fn depends_on(&self) -> Vec<String> {
        self.depends_on.clone()
    }
}
