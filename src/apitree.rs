//! The API object tree: the structured representation of documented code that
//! processors operate on.
//!
//! A tree is a forest of [`ApiObject`]s (modules containing classes, functions,
//! and variables). Each node owns its children outright and carries a
//! precomputed `path` of names from the root down to itself, so a node's
//! fully-qualified id is always derivable without a parent back-pointer.
//!
//! [`ApiSuite`] is an owned name index over a whole forest. It is built once
//! before a processing pass and handed to [`ResolverV2`] implementations, which
//! return owned [`ApiRef`] descriptors instead of borrows into the tree. That
//! keeps resolution usable while the pass is mutating docstrings in place.

use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter},
};

use crate::{
    error::DocmarkError,
    interfaces::ResolverV2,
};

/// The kind of API entity a tree node describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKind {
    Module,
    Class,
    Function,
    Variable,
}

impl Display for ApiKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiKind::Module => write!(f, "module"),
            ApiKind::Class => write!(f, "class"),
            ApiKind::Function => write!(f, "function"),
            ApiKind::Variable => write!(f, "variable"),
        }
    }
}

/// Free-text documentation attached to an [`ApiObject`].
///
/// The content is plain text with inline reference tokens, not pre-rendered
/// Markdown. Processors rewrite `content` in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Docstring {
    pub content: String,
}

impl From<&str> for Docstring {
    fn from(content: &str) -> Self {
        Docstring {
            content: content.to_string(),
        }
    }
}

impl From<String> for Docstring {
    fn from(content: String) -> Self {
        Docstring { content }
    }
}

/// A node in the API tree.
///
/// Invariant: `path` is exactly the ancestors' names followed by `name`. The
/// constructors and [`ApiObject::push_child`] maintain this; trees assembled
/// from serialized data should call [`ApiObject::rebuild_paths`] on each root
/// before processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiObject {
    pub name: String,
    pub kind: ApiKind,
    #[serde(default)]
    pub path: Vec<String>,
    #[serde(default)]
    pub docstring: Option<Docstring>,
    #[serde(default)]
    pub children: Vec<ApiObject>,
}

impl ApiObject {
    /// Create a root-level node. Its path is just its own name until it is
    /// pushed under a parent.
    pub fn new(kind: ApiKind, name: impl Into<String>) -> Self {
        let name = name.into();
        ApiObject {
            path: vec![name.clone()],
            name,
            kind,
            docstring: None,
            children: vec![],
        }
    }

    pub fn with_docstring(mut self, content: impl Into<String>) -> Self {
        self.docstring = Some(Docstring {
            content: content.into(),
        });
        self
    }

    /// Attach a child, re-rooting the child's subtree so the path invariant
    /// holds for every transitively owned node.
    pub fn push_child(&mut self, mut child: ApiObject) {
        child.reroot(&self.path);
        self.children.push(child);
    }

    /// Recompute `path` for this node and all descendants, treating this node
    /// as a root. Needed after deserializing a tree whose paths were omitted.
    pub fn rebuild_paths(&mut self) {
        self.reroot(&[]);
    }

    fn reroot(&mut self, prefix: &[String]) {
        let mut path = prefix.to_vec();
        path.push(self.name.clone());
        self.path = path;
        let prefix = self.path.clone();
        for child in &mut self.children {
            child.reroot(&prefix);
        }
    }

    /// Dot-joined sequence of names from the tree root to this node.
    pub fn fqid(&self) -> String {
        self.path.join(".")
    }
}

/// Depth-first pre-order visit over a forest.
pub fn visit<F>(objects: &[ApiObject], f: &mut F)
where
    F: FnMut(&ApiObject),
{
    for node in objects {
        f(node);
        visit(&node.children, f);
    }
}

/// Depth-first pre-order visit with mutable access. The first callback error
/// aborts the traversal.
pub fn visit_mut<F>(objects: &mut [ApiObject], f: &mut F) -> Result<(), DocmarkError>
where
    F: FnMut(&mut ApiObject) -> Result<(), DocmarkError>,
{
    for node in objects {
        f(node)?;
        visit_mut(&mut node.children, f)?;
    }
    Ok(())
}

/// An owned descriptor of a node in the tree, detached from the tree's
/// lifetime. This is what typed resolvers hand back to the crossref engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiRef {
    pub path: Vec<String>,
    pub kind: ApiKind,
}

impl ApiRef {
    pub fn name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    /// Dot-joined fully-qualified name.
    pub fn fqid(&self) -> String {
        self.path.join(".")
    }
}

impl From<&ApiObject> for ApiRef {
    fn from(node: &ApiObject) -> Self {
        ApiRef {
            path: node.path.clone(),
            kind: node.kind,
        }
    }
}

/// Name index over a whole forest, keyed by each node's terminal name.
///
/// The suite owns its data, so it can be consulted freely while the source
/// tree is being mutated by a processing pass.
#[derive(Debug, Default, Clone)]
pub struct ApiSuite {
    by_name: BTreeMap<String, Vec<ApiRef>>,
}

impl ApiSuite {
    pub fn new(modules: &[ApiObject]) -> Self {
        let mut by_name: BTreeMap<String, Vec<ApiRef>> = BTreeMap::new();
        visit(modules, &mut |node| {
            by_name
                .entry(node.name.clone())
                .or_default()
                .push(ApiRef::from(node));
        });
        ApiSuite { by_name }
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// All indexed nodes whose terminal name matches, in traversal order.
    pub fn candidates(&self, name: &str) -> &[ApiRef] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All nodes whose fully-qualified id ends with `fqn`, segment-aligned.
    /// `"b.C"` matches `a.b.C` but not `a.ab.C`.
    pub fn resolve_fqn(&self, fqn: &str) -> Vec<ApiRef> {
        let segments: Vec<&str> = fqn.split('.').collect();
        let Some(last) = segments.last() else {
            return vec![];
        };
        self.candidates(last)
            .iter()
            .filter(|candidate| {
                candidate.path.len() >= segments.len()
                    && candidate.path[candidate.path.len() - segments.len()..]
                        .iter()
                        .zip(&segments)
                        .all(|(a, b)| a.as_str() == *b)
            })
            .cloned()
            .collect()
    }

    /// The node whose fully-qualified id is exactly `fqn`, if any.
    pub fn resolve_exact(&self, fqn: &str) -> Option<ApiRef> {
        self.resolve_fqn(fqn)
            .into_iter()
            .find(|candidate| candidate.fqid() == fqn)
    }
}

/// A [`ResolverV2`] backed purely by the suite index.
///
/// Lookup policy, first hit wins:
/// 1. the reference spelled as an exact fully-qualified id;
/// 2. the reference relative to the referencing scope, tried innermost
///    scope first and walking outward one ancestor at a time;
/// 3. a globally unique suffix match.
///
/// An ambiguous final step (several suffix matches, none disambiguated by
/// scope) resolves to nothing, so the engine falls back to inline-code
/// rendering instead of linking to an arbitrary winner.
#[derive(Debug, Default, Clone, Copy)]
pub struct SuiteResolver;

impl ResolverV2 for SuiteResolver {
    fn resolve_reference(
        &self,
        suite: &ApiSuite,
        scope: &ApiObject,
        reference: &str,
    ) -> Result<Option<ApiRef>, DocmarkError> {
        if let Some(target) = suite.resolve_exact(reference) {
            return Ok(Some(target));
        }
        for depth in (1..=scope.path.len()).rev() {
            let mut fqn = scope.path[..depth].join(".");
            fqn.push('.');
            fqn.push_str(reference);
            if let Some(target) = suite.resolve_exact(&fqn) {
                return Ok(Some(target));
            }
        }
        let mut matches = suite.resolve_fqn(reference);
        if matches.len() == 1 {
            return Ok(Some(matches.remove(0)));
        }
        if matches.len() > 1 {
            tracing::debug!(
                "Reference '{}' from scope '{}' is ambiguous across {} candidates",
                reference,
                scope.fqid(),
                matches.len()
            );
        }
        Ok(None)
    }
}
