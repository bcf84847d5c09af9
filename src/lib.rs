//! Declares the infrastructure for a static website served from a private
//! S3 bucket through cloudfront, and renders it as a cloudformation template.
//!
//! ```no_run
//! use static_site_hosting::{StaticSiteHostingProps, StaticSiteHostingStack, RemovalPolicy};
//!
//! let props = StaticSiteHostingProps::new("my-site-assets", RemovalPolicy::Destroy);
//! let stack = StaticSiteHostingStack::new(&props)?;
//! println!("{}", stack.template()?.to_json_pretty()?);
//! # Ok::<(), static_site_hosting::Error>(())
//! ```

mod error;
pub use error::*;

mod validation;
pub use validation::{validate_bucket_name, validate_stack_name};

mod props;
pub use props::*;

mod resources;
pub use resources::*;

mod template;
pub use template::*;

mod app;
pub use app::*;

#[cfg(test)]
mod module_testing;
