use super::*;
use crate::props::StaticSiteHostingProps;
use crate::template::StackTemplate;
use crate::validation::validate_stack_name;
use crate::Error;

pub const BUCKET_CONSTRUCT_ID: &str = "S3Bucket";
pub const IDENTITY_CONSTRUCT_ID: &str = "OriginAccessIdentity";
pub const BUCKET_POLICY_CONSTRUCT_ID: &str = "S3BucketPolicy";
pub const DISTRIBUTION_CONSTRUCT_ID: &str = "WebDistribution";

/// A private S3 bucket served through cloudfront.
///
/// The bucket is never public: the distribution reads from it as an origin
/// access identity that the bucket policy grants `s3:GetObject` to. 403 and 404
/// from the bucket are answered with `/index.html` so single page apps can
/// route any path client side.
///
/// Building one has no side effects. The declarations are built in dependency
/// order (bucket, identity, bucket policy, distribution) and never change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticSiteHostingStack {
    stack_name: String,
    description: Option<String>,
    bucket: StorageResource,
    identity: AccessIdentity,
    bucket_policy: AccessPolicyBinding,
    distribution: DistributionResource,
}

impl StaticSiteHostingStack {
    pub fn new(props: &StaticSiteHostingProps) -> Result<Self> {
        let stack_name = props.stack_name.as_str();
        validate_stack_name(stack_name)?;
        if props.bucket_name.is_empty() {
            return Err(Error::MissingInput("bucket_name"));
        }

        let bucket = StorageResource::new(
            logical_id(stack_name, BUCKET_CONSTRUCT_ID),
            &props.bucket_name,
            props.bucket_removal_policy,
        )?
        .with_tags(props.tags.clone());

        let identity = AccessIdentity::new(logical_id(stack_name, IDENTITY_CONSTRUCT_ID))?;

        let bucket_policy = AccessPolicyBinding::attach(
            logical_id(stack_name, BUCKET_POLICY_CONSTRUCT_ID),
            &bucket,
            &identity,
        )?;

        let distribution = DistributionResource::new(
            logical_id(stack_name, DISTRIBUTION_CONSTRUCT_ID),
            &bucket,
            &identity,
            &bucket_policy,
            props.function.as_ref(),
            props.price_class,
        )?
        .with_tags(props.tags.clone());
        let distribution = match &props.comment {
            Some(comment) => distribution.with_comment(comment.as_str()),
            None => distribution,
        };

        tracing::info!(
            stack = stack_name,
            bucket = %props.bucket_name,
            has_function = props.function.is_some(),
            "declared static site stack"
        );
        Ok(Self {
            stack_name: stack_name.to_string(),
            description: props.description.clone(),
            bucket,
            identity,
            bucket_policy,
            distribution,
        })
    }

    pub fn stack_name(&self) -> &str {
        &self.stack_name
    }

    pub fn bucket(&self) -> &StorageResource {
        &self.bucket
    }

    pub fn identity(&self) -> &AccessIdentity {
        &self.identity
    }

    pub fn bucket_policy(&self) -> &AccessPolicyBinding {
        &self.bucket_policy
    }

    pub fn distribution(&self) -> &DistributionResource {
        &self.distribution
    }

    /// every declaration of the stack, in dependency order
    pub fn resources(&self) -> [&dyn CfnResource; 4] {
        [&self.bucket, &self.identity, &self.bucket_policy, &self.distribution]
    }

    pub fn template(&self) -> Result<StackTemplate> {
        let mut template = StackTemplate::new(self.description.clone());
        for resource in self.resources() {
            template.add_resource(resource)?;
        }
        template.add_output(
            "BucketName",
            "Name of the bucket holding the site's assets",
            self.bucket.bucket_ref(),
        )?;
        template.add_output(
            "DistributionId",
            "Id of the cloudfront distribution serving the site",
            self.distribution.distribution_id(),
        )?;
        template.add_output(
            "DistributionDomainName",
            "Domain name the site is served from",
            self.distribution.domain_name(),
        )?;
        tracing::debug!(
            stack = %self.stack_name,
            resources = template.resources.len(),
            outputs = template.outputs.len(),
            "rendered template"
        );
        Ok(template)
    }
}
