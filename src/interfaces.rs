//! The trait seams between pipeline stages.
//!
//! A documentation run wires together a [`Loader`] that produces the API tree,
//! a chain of [`Processor`]s that transform docstrings, and a [`Renderer`] that
//! turns the final tree into output files. Only already-constructed instances
//! cross these seams; how implementations are discovered and configured is the
//! embedding application's concern.
//!
//! Resolution is modeled as two independent capabilities, [`Resolver`] and
//! [`ResolverV2`]. A processor may be handed zero, one, or both; the richer
//! one is always tried first. Both distinguish an ordinary lookup miss
//! (`Ok(None)`) from an internal malfunction (`Err`), which aborts the run.

use crate::{
    apitree::{ApiObject, ApiRef, ApiSuite},
    error::DocmarkError,
};

/// Produces the API object forest from some documentation source.
pub trait Loader: Send {
    fn load(&self) -> Result<Vec<ApiObject>, DocmarkError>;
}

/// Maps a reference name, as written in a docstring, to a navigable address.
///
/// Scope-sensitive behavior (for example resolving a bare name relative to the
/// referencing module) is entirely the implementation's responsibility.
pub trait Resolver: Send {
    fn resolve_ref(
        &self,
        scope: &ApiObject,
        reference: &str,
    ) -> Result<Option<String>, DocmarkError>;
}

/// Richer resolution capability: returns the resolved node itself rather than
/// an address string, so the caller can emit a renderer-neutral structured
/// link instead of a bare URL.
pub trait ResolverV2: Send {
    fn resolve_reference(
        &self,
        suite: &ApiSuite,
        scope: &ApiObject,
        reference: &str,
    ) -> Result<Option<ApiRef>, DocmarkError>;
}

/// Transforms an API forest in place, usually by rewriting docstrings.
pub trait Processor: Send {
    fn process(
        &mut self,
        modules: &mut [ApiObject],
        resolver: Option<&dyn Resolver>,
    ) -> Result<(), DocmarkError>;
}

/// Terminal pipeline stage: takes the processed forest and produces output.
///
/// A renderer is itself a [`Processor`] so that it can perform its own
/// pre-render transformations, and it may supply the [`Resolver`] the rest of
/// the chain uses to build links into its output.
pub trait Renderer: Processor {
    /// The resolver other processors should use to link into this renderer's
    /// output, if it supports one.
    fn get_resolver(&self, _modules: &[ApiObject]) -> Option<Box<dyn Resolver>> {
        None
    }

    fn render(&mut self, modules: &[ApiObject]) -> Result<(), DocmarkError>;
}
