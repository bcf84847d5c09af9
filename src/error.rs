use crate::resources::FunctionEventType;

pub type Result<T> = std::result::Result<T, Error>;

/// every error here is a configuration error detected while declaring
/// resources. nothing in this crate talks to AWS, so nothing can fail transiently.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid bucket name {name:?}\n{reason}")]
    InvalidBucketName { name: String, reason: &'static str },

    #[error("Bucket name {0:?} is declared by more than one stack")]
    DuplicateBucketName(String),

    #[error("Invalid stack name {name:?}\n{reason}")]
    InvalidStackName { name: String, reason: &'static str },

    #[error("Stack {0:?} was already added to this app")]
    DuplicateStackName(String),

    #[error("Invalid resource name {name:?}\n{reason}")]
    InvalidLogicalId { name: String, reason: &'static str },

    #[error("Resource {0:?} is already declared in this template")]
    DuplicateLogicalId(String),

    #[error("Missing required input '{0}'")]
    MissingInput(&'static str),

    #[error("Edge function {function} was written for {event_type} but can only be associated at viewer-request")]
    IncompatibleTrigger {
        function: String,
        event_type: FunctionEventType,
    },

    #[error("Invalid edge function reference {reference:?}\n{reason}")]
    InvalidFunctionReference { reference: String, reason: &'static str },

    #[error("Bucket {bucket:?} does not support a resource policy. Cannot grant the CDN read access to it")]
    ResourcePolicyUnsupported { bucket: String },

    #[error("Policy statement {sid:?} already exists with different content")]
    ConflictingStatement { sid: String },

    #[error("Policy statement {sid:?} allows access to the wildcard principal. The bucket must not be public")]
    PublicPrincipal { sid: String },

    #[error("Bucket {bucket:?} has not granted read access to origin access identity {identity:?}. Attach the bucket policy before creating the distribution")]
    OriginNotGranted { bucket: String, identity: String },

    #[error("Failed to parse configuration\n{0}")]
    Config(#[from] toml::de::Error),

    #[error("Failed to read configuration file\n{0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize template\n{0}")]
    Serialize(#[from] serde_json::Error),
}
