//! # docmark-core
//!
//! A processor-pipeline documentation generator: load a structured
//! representation of an API (modules, classes, functions, docstrings), run it
//! through a chain of processors, and render it to output files.
//!
//! The heart of the crate is the cross-reference subsystem: docstrings may
//! reference other API objects with inline `#`-tokens, and the `crossref`
//! processor rewrites every token into a linkable or fallback form while
//! collecting the ones nothing could resolve.
//!
//! ## Reference syntax
//!
//! ```text
//! This is a ref to another class: #Config
//! You can rename a ref like #this~Config
//! And you can reference a sub-member like this: #Config#timeout
//! A callable is written #load()
//! ```
//!
//! A period immediately after a bare reference is treated as sentence
//! punctuation: it is excluded from the lookup and re-attached after the
//! substitution.
//!
//! ## Quick start
//!
//! Without any resolver configured, every reference degrades gracefully to
//! inline code and is reported in one aggregated warning:
//!
//! ```rust
//! use docmark_core::{
//!     apitree::{ApiKind, ApiObject},
//!     processors::CrossrefProcessor,
//! };
//!
//! let mut module = ApiObject::new(ApiKind::Module, "mypkg");
//! module.push_child(
//!     ApiObject::new(ApiKind::Function, "load").with_docstring("Builds a #Config."),
//! );
//! let mut modules = vec![module];
//!
//! let processor = CrossrefProcessor::new();
//! let report = processor.apply(&mut modules, None)?;
//!
//! assert_eq!(
//!     modules[0].children[0].docstring.as_ref().unwrap().content,
//!     "Builds a `Config`."
//! );
//! assert_eq!(report.get("mypkg.load").unwrap().references, vec!["Config"]);
//! # Ok::<(), docmark_core::DocmarkError>(())
//! ```
//!
//! ## Resolution
//!
//! Two resolver capabilities exist and either, both, or neither may be
//! configured:
//!
//! - [`interfaces::Resolver`]: maps `(scope, reference)` to an address
//!   string; matches become inline Markdown hyperlinks. Usually supplied by
//!   the renderer at the end of the pipeline.
//! - [`interfaces::ResolverV2`]: maps `(suite, scope, reference)` to the
//!   resolved node itself; matches become structured `{@link}` directives a
//!   renderer can interpret. Configured directly on
//!   [`processors::CrossrefProcessor`] and always tried first.
//!   [`apitree::SuiteResolver`] is a ready-made implementation backed by the
//!   [`apitree::ApiSuite`] name index.
//!
//! A resolver returning `Ok(None)` is the normal "not found" outcome; an
//! `Err` is a malfunction and aborts the run.
//!
//! ## Module Guide
//!
//! - [`apitree`]: the API object forest, visitors, and the suite index
//! - [`refs`]: the inline reference grammar
//! - [`processors`]: docstring processors and their registry
//! - [`diagnostic`]: the unresolved-reference report and sinks
//! - [`pipeline`]: the processor chain and full-run orchestration
//! - [`config`]: TOML-backed pipeline configuration
//! - [`interfaces`]: the traits wiring the stages together

pub mod apitree;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod interfaces;
pub mod pipeline;
pub mod processors;
pub mod refs;

pub use error::*;
