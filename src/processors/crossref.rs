//! Cross-reference resolution: the `crossref` processor.
//!
//! Scans every docstring in the forest for inline reference tokens (see
//! [`crate::refs`]), resolves each against the configured resolver
//! capabilities, and rewrites the docstring in place. Tokens nothing can
//! resolve degrade to inline code and are collected into an
//! [`UnresolvedReport`] for one aggregated warning at the end of the run.

use serde::{Deserialize, Serialize};

use crate::{
    apitree::{visit_mut, ApiObject, ApiSuite},
    diagnostic::{DiagnosticSink, LogSink, UnresolvedReport},
    error::DocmarkError,
    interfaces::{Processor, Resolver, ResolverV2},
    refs::scan_references,
};

/// The serialized options block embedded in a structured link directive.
/// Currently carries only the display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkOptions {
    pub text: String,
}

/// Finds references to other objects in docstrings and produces links to
/// their documentation.
///
/// Three substitution forms exist, in priority order:
///
/// 1. with a [`ResolverV2`] configured, a structured `{@link}` directive
///    carrying the target's fully-qualified name and the display text;
/// 2. otherwise, with a caller-supplied [`Resolver`], an inline Markdown
///    hyperlink to the resolved address;
/// 3. otherwise the display text in inline code, recorded as unresolved.
///
/// The priority is keyed on configuration, not on lookup results: when a
/// typed resolver is configured, a miss from it does not fall through to the
/// basic resolver.
#[derive(Default)]
pub struct CrossrefProcessor {
    resolver_v2: Option<Box<dyn ResolverV2>>,
    sink: Option<Box<dyn DiagnosticSink>>,
}

impl CrossrefProcessor {
    pub fn new() -> Self {
        CrossrefProcessor::default()
    }

    /// Configure the typed resolver. It is tried instead of the basic
    /// resolver passed to [`Processor::process`], and matches are rendered as
    /// `{@link}` directives.
    pub fn with_resolver_v2(mut self, resolver: Box<dyn ResolverV2>) -> Self {
        self.resolver_v2 = Some(resolver);
        self
    }

    /// Replace the default `tracing`-backed sink for the end-of-run report.
    pub fn with_sink(mut self, sink: Box<dyn DiagnosticSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Rewrite every docstring in the forest and return the unresolved
    /// references, keyed by the containing node's fully-qualified id in
    /// traversal order. The report is not handed to any sink; callers that
    /// want the aggregated warning use the [`Processor`] impl instead.
    pub fn apply(
        &self,
        modules: &mut [ApiObject],
        resolver: Option<&dyn Resolver>,
    ) -> Result<UnresolvedReport, DocmarkError> {
        let suite = ApiSuite::new(modules);
        let mut report = UnresolvedReport::default();
        visit_mut(modules, &mut |node| {
            let Some(content) = node.docstring.as_ref().map(|d| d.content.clone()) else {
                return Ok(());
            };
            let rewritten =
                self.rewrite_docstring(node, &content, &suite, resolver, &mut report)?;
            if let Some(docstring) = node.docstring.as_mut() {
                docstring.content = rewritten;
            }
            Ok(())
        })?;
        Ok(report)
    }

    /// Substitute every token in one docstring, left to right. Substituted
    /// text is never re-scanned.
    fn rewrite_docstring(
        &self,
        scope: &ApiObject,
        content: &str,
        suite: &ApiSuite,
        resolver: Option<&dyn Resolver>,
        report: &mut UnresolvedReport,
    ) -> Result<String, DocmarkError> {
        let mut out = String::with_capacity(content.len());
        let mut cursor = 0;
        for found in scan_references(content) {
            out.push_str(&content[cursor..found.range.start]);
            cursor = found.range.end;

            let token = &found.token;
            let text = token.display_text();
            let mut resolved = None;
            if let Some(typed) = self.resolver_v2.as_deref() {
                if let Some(target) = typed.resolve_reference(suite, scope, &token.target)? {
                    let options = toml::to_string(&LinkOptions { text: text.clone() })?;
                    resolved = Some(format_link_directive(&target.fqid(), options.trim_end()));
                }
            } else if let Some(basic) = resolver {
                if let Some(href) = basic.resolve_ref(scope, &token.target)? {
                    resolved = Some(format!("[`{text}`]({href})"));
                }
            }

            let mut substitution = match resolved {
                Some(linked) => linked,
                None => {
                    report.record(&scope.fqid(), token.target.clone());
                    format!("`{text}`")
                }
            };
            if token.trailing_period {
                substitution.push('.');
            }
            out.push_str(&substitution);
        }
        out.push_str(&content[cursor..]);
        Ok(out)
    }
}

impl Processor for CrossrefProcessor {
    fn process(
        &mut self,
        modules: &mut [ApiObject],
        resolver: Option<&dyn Resolver>,
    ) -> Result<(), DocmarkError> {
        let report = self.apply(modules, resolver)?;
        if !report.is_empty() {
            match self.sink.as_mut() {
                Some(sink) => sink.unresolved(&report),
                None => LogSink.unresolved(&report),
            }
        }
        Ok(())
    }
}

fn format_link_directive(fqid: &str, options: &str) -> String {
    format!("{{@link api:{fqid} :with {options}}}")
}

/// Recover the link target and options block from a directive emitted by the
/// typed-resolver path. Returns `None` for text that is not a well-formed
/// directive.
pub fn parse_link_directive(directive: &str) -> Option<(String, LinkOptions)> {
    let inner = directive
        .strip_prefix("{@link api:")?
        .strip_suffix('}')?;
    let (target, options) = inner.split_once(" :with ")?;
    let options = toml::from_str(options).ok()?;
    Some((target.to_string(), options))
}
