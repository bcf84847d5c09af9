use crate::props::StaticSiteHostingProps;
use crate::resources::StaticSiteHostingStack;
use crate::template::SavedStacks;
use crate::{Error, Result};

/// Holds the stacks of every environment a site is deployed to,
/// eg: one for staging and one for production.
/// Stack names and bucket names must be unique across the app.
#[derive(Debug, Clone, Default)]
pub struct App {
    stacks: Vec<StaticSiteHostingStack>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_stack(&mut self, props: &StaticSiteHostingProps) -> Result<&StaticSiteHostingStack> {
        if self.stacks.iter().any(|s| s.stack_name() == props.stack_name) {
            return Err(Error::DuplicateStackName(props.stack_name.clone()));
        }
        if self.stacks.iter().any(|s| s.bucket().bucket_name() == props.bucket_name) {
            return Err(Error::DuplicateBucketName(props.bucket_name.clone()));
        }
        let stack = StaticSiteHostingStack::new(props)?;
        self.stacks.push(stack);
        let index = self.stacks.len() - 1;
        Ok(&self.stacks[index])
    }

    pub fn stacks(&self) -> &[StaticSiteHostingStack] {
        &self.stacks
    }

    pub fn stack(&self, stack_name: &str) -> Option<&StaticSiteHostingStack> {
        self.stacks.iter().find(|s| s.stack_name() == stack_name)
    }

    /// renders the template of every stack
    pub fn synth(&self) -> Result<SavedStacks> {
        let mut out = SavedStacks::default();
        for stack in &self.stacks {
            out.templates.insert(stack.stack_name().to_string(), stack.template()?);
        }
        tracing::info!(stacks = out.templates.len(), "synthesized app");
        Ok(out)
    }
}
