//! Diagnostics for cross-reference resolution.
//!
//! Unresolved references are expected, non-fatal outcomes: they degrade to
//! inline-code rendering and are reported in aggregate at the end of a
//! processing run. The report is a plain return value; emitting it is the
//! job of an explicit [`DiagnosticSink`], so the engine stays testable
//! without capturing ambient log output.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The unresolved references recorded for one API object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedEntry {
    /// Dot-joined fully-qualified id of the node whose docstring held the
    /// references.
    pub scope_id: String,
    /// Raw lookup names that no resolver could map, in docstring order.
    pub references: Vec<String>,
}

/// Aggregate of all resolution failures in one processing run.
///
/// Entries appear in traversal order of first encounter and are never merged
/// across runs; each `process` invocation builds its own report.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedReport {
    entries: Vec<UnresolvedEntry>,
}

impl UnresolvedReport {
    pub fn record(&mut self, scope_id: &str, reference: impl Into<String>) {
        match self.entries.iter_mut().find(|e| e.scope_id == scope_id) {
            Some(entry) => entry.references.push(reference.into()),
            None => self.entries.push(UnresolvedEntry {
                scope_id: scope_id.to_string(),
                references: vec![reference.into()],
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of nodes with at least one failure.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Total failed lookups across all nodes.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.references.len()).sum()
    }

    pub fn entries(&self) -> &[UnresolvedEntry] {
        &self.entries
    }

    pub fn get(&self, scope_id: &str) -> Option<&UnresolvedEntry> {
        self.entries.iter().find(|e| e.scope_id == scope_id)
    }
}

impl Display for UnresolvedReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} cross-reference(s) could not be resolved:",
            self.total()
        )?;
        let mut lines = self.entries.iter().peekable();
        while let Some(entry) = lines.next() {
            write!(f, "  {}: {}", entry.scope_id, entry.references.join(", "))?;
            if lines.peek().is_some() {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Receives the aggregated report once a processing run completes. Advisory
/// only; a sink never fails the run.
pub trait DiagnosticSink: Send {
    fn unresolved(&mut self, report: &UnresolvedReport);
}

/// Default sink: one aggregated warning through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn unresolved(&mut self, report: &UnresolvedReport) {
        tracing::warn!("{report}");
    }
}
