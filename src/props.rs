use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::resources::{EdgeFunctionRef, FunctionEventType, PriceClass, RemovalPolicy};
use crate::{Error, Result};

pub const DEFAULT_STACK_NAME: &str = "StaticSiteHostingStack";

/// Inputs of one static site stack. One of these exists per environment.
///
/// `bucket_name` and `bucket_removal_policy` have no defaults: they decide
/// the bucket's identity and whether its data survives a teardown.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticSiteHostingProps {
    pub stack_name: String,
    pub description: Option<String>,
    /// shown next to the distribution in the cloudfront console
    pub comment: Option<String>,
    pub bucket_name: String,
    pub bucket_removal_policy: RemovalPolicy,
    /// CloudFront Function to run on every viewer request, if any.
    pub function: Option<EdgeFunctionRef>,
    pub price_class: PriceClass,
    /// applied to the bucket and the distribution
    pub tags: BTreeMap<String, String>,
}

impl StaticSiteHostingProps {
    pub fn new(bucket_name: impl Into<String>, bucket_removal_policy: RemovalPolicy) -> Self {
        Self {
            stack_name: DEFAULT_STACK_NAME.into(),
            description: None,
            comment: None,
            bucket_name: bucket_name.into(),
            bucket_removal_policy,
            function: None,
            price_class: PriceClass::default(),
            tags: BTreeMap::new(),
        }
    }

    pub fn with_stack_name(mut self, stack_name: impl Into<String>) -> Self {
        self.stack_name = stack_name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_function(mut self, function: EdgeFunctionRef) -> Self {
        self.function = Some(function);
        self
    }

    pub fn with_price_class(mut self, price_class: PriceClass) -> Self {
        self.price_class = price_class;
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// reads props from a toml document, eg:
    /// ```toml
    /// stack_name = "prod-site"
    /// comment = "production site"
    /// bucket_name = "my-site-assets"
    /// bucket_removal_policy = "RETAIN"
    /// price_class = "PriceClass_100"
    ///
    /// [function]
    /// arn = "arn:aws:cloudfront::123456789012:function/rewrite-index"
    ///
    /// [tags]
    /// env = "prod"
    /// ```
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let raw: RawProps = toml::from_str(s)?;
        raw.into_props()
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading static site props");
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFunction {
    arn: Option<String>,
    logical_id: Option<String>,
    event_type: Option<FunctionEventType>,
}

impl RawFunction {
    fn into_function(self) -> Result<EdgeFunctionRef> {
        let function = match (self.arn, self.logical_id) {
            (Some(arn), None) => EdgeFunctionRef::from_arn(&arn)?,
            (None, Some(id)) => EdgeFunctionRef::from_logical_id(&id)?,
            (Some(arn), Some(_)) => {
                return Err(Error::InvalidFunctionReference {
                    reference: arn,
                    reason: "Provide either arn or logical_id, not both",
                })
            }
            (None, None) => {
                return Err(Error::InvalidFunctionReference {
                    reference: String::new(),
                    reason: "Must provide the function's arn or logical_id",
                })
            }
        };
        Ok(match self.event_type {
            Some(event_type) => function.for_event(event_type),
            None => function,
        })
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawProps {
    stack_name: Option<String>,
    description: Option<String>,
    comment: Option<String>,
    bucket_name: Option<String>,
    bucket_removal_policy: Option<RemovalPolicy>,
    price_class: Option<PriceClass>,
    function: Option<RawFunction>,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

impl RawProps {
    fn into_props(self) -> Result<StaticSiteHostingProps> {
        let raw = self;
        let bucket_name = raw
            .bucket_name
            .filter(|name| !name.is_empty())
            .ok_or(Error::MissingInput("bucket_name"))?;
        let removal_policy = raw
            .bucket_removal_policy
            .ok_or(Error::MissingInput("bucket_removal_policy"))?;
        let mut props = StaticSiteHostingProps::new(bucket_name, removal_policy);
        if let Some(stack_name) = raw.stack_name {
            props.stack_name = stack_name;
        }
        props.description = raw.description;
        props.comment = raw.comment;
        props.price_class = raw.price_class.unwrap_or_default();
        props.function = raw.function.map(RawFunction::into_function).transpose()?;
        props.tags = raw.tags;
        Ok(props)
    }
}
