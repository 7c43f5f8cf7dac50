//! The processor chain.
//!
//! A [`Pipeline`] applies an ordered list of [`Processor`]s to an API forest,
//! then optionally hands the result to a [`Renderer`]. The renderer is asked
//! for its [`Resolver`] up front so every processor in the chain can link into
//! the output it will produce.

use crate::{
    apitree::ApiObject,
    error::DocmarkError,
    interfaces::{Loader, Processor, Renderer, Resolver},
    processors::PROCESSORS,
};

/// Ordered chain of processors applied to a tree before rendering.
#[derive(Default)]
pub struct Pipeline {
    processors: Vec<Box<dyn Processor>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Pipeline::default()
    }

    pub fn with_processor(mut self, processor: Box<dyn Processor>) -> Self {
        self.processors.push(processor);
        self
    }

    pub fn push(&mut self, processor: Box<dyn Processor>) {
        self.processors.push(processor);
    }

    /// Build a chain from registered processor names, in order. Unknown names
    /// are a configuration error.
    pub fn from_names(names: &[String]) -> Result<Self, DocmarkError> {
        let mut pipeline = Pipeline::new();
        for name in names {
            let processor = PROCESSORS.get(name).ok_or_else(|| {
                DocmarkError::Config(format!(
                    "no processor registered under '{name}' (available: {})",
                    PROCESSORS.names().join(", ")
                ))
            })?;
            pipeline.push(processor);
        }
        Ok(pipeline)
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Run every processor over the forest with the given resolver.
    pub fn process(
        &mut self,
        modules: &mut [ApiObject],
        resolver: Option<&dyn Resolver>,
    ) -> Result<(), DocmarkError> {
        let total = self.processors.len();
        for (index, processor) in self.processors.iter_mut().enumerate() {
            tracing::debug!("Running processor {}/{}", index + 1, total);
            processor.process(modules, resolver)?;
        }
        Ok(())
    }

    /// Full pipeline run: process the forest with the renderer's resolver,
    /// give the renderer its own processing pass, then render.
    pub fn run(
        &mut self,
        modules: &mut [ApiObject],
        renderer: &mut dyn Renderer,
    ) -> Result<(), DocmarkError> {
        let resolver = renderer.get_resolver(modules);
        self.process(modules, resolver.as_deref())?;
        renderer.process(modules, resolver.as_deref())?;
        renderer.render(modules)
    }

    /// Load a forest and push it through [`Pipeline::run`].
    pub fn run_with_loader(
        &mut self,
        loader: &dyn Loader,
        renderer: &mut dyn Renderer,
    ) -> Result<Vec<ApiObject>, DocmarkError> {
        let mut modules = loader.load()?;
        tracing::debug!("Loaded {} root module(s)", modules.len());
        self.run(&mut modules, renderer)?;
        Ok(modules)
    }
}
