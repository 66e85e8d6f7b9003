//! Diagnostic markers and the per-resource marker store.
//!
//! Markers are produced by the diagnostics service (the YAML language server or the
//! built-in syntax check) and replaced wholesale for a resource on every recompute. The
//! store notifies subscribers after each replacement so views such as the problem panel can
//! rebuild themselves.

use crate::position::{Position, Range};
use std::collections::BTreeMap;

/// Marker severity levels, ordered by importance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MarkerSeverity {
    /// Hints are never shown in the problem panel.
    Hint,
    /// Informational markers.
    Info,
    /// Warning markers.
    Warning,
    /// Error markers.
    Error,
}

impl MarkerSeverity {
    /// Convert the numeric LSP `DiagnosticSeverity` (1 = error .. 4 = hint).
    pub fn from_lsp(value: u64) -> Option<Self> {
        match value {
            1 => Some(Self::Error),
            2 => Some(Self::Warning),
            3 => Some(Self::Info),
            4 => Some(Self::Hint),
            _ => None,
        }
    }

    /// Short lowercase label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Hint => "hint",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// A single diagnostic attached to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    /// Identifier of the document the marker belongs to.
    pub resource: String,
    /// Marker severity.
    pub severity: MarkerSeverity,
    /// Human-readable message.
    pub message: String,
    /// Start of the flagged span.
    pub start: Position,
    /// End of the flagged span.
    pub end: Position,
    /// Producer of the marker (e.g. `"yaml-schema: ..."`).
    pub source: Option<String>,
    /// Optional diagnostic code (stringified).
    pub code: Option<String>,
}

impl Marker {
    /// Create a marker without source/code.
    pub fn new(
        resource: impl Into<String>,
        severity: MarkerSeverity,
        message: impl Into<String>,
        start: Position,
        end: Position,
    ) -> Self {
        Self {
            resource: resource.into(),
            severity,
            message: message.into(),
            start,
            end,
            source: None,
            code: None,
        }
    }

    /// The flagged span.
    pub fn range(&self) -> Range {
        Range::new(self.start, self.end)
    }

    /// Returns true if the marker covers `line`.
    pub fn touches_line(&self, line: usize) -> bool {
        self.start.line <= line && line <= self.end.line
    }
}

/// Callback invoked with `(resource, markers)` after a resource's markers change.
pub type MarkerListener = Box<dyn FnMut(&str, &[Marker]) + Send>;

/// Markers grouped by resource, with change notification.
#[derive(Default)]
pub struct MarkerStore {
    markers: BTreeMap<String, Vec<Marker>>,
    listeners: Vec<MarkerListener>,
    version: u64,
}

impl MarkerStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a change listener.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&str, &[Marker]) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Replace every marker of `resource` and notify listeners.
    pub fn set_markers(&mut self, resource: &str, markers: Vec<Marker>) {
        self.version = self.version.wrapping_add(1);
        let stored = self.markers.entry(resource.to_string()).or_default();
        *stored = markers;

        let snapshot = stored.as_slice();
        for listener in &mut self.listeners {
            listener(resource, snapshot);
        }
    }

    /// Remove the markers of `resource` (notifies with an empty list).
    pub fn clear(&mut self, resource: &str) {
        self.set_markers(resource, Vec::new());
    }

    /// Current markers of `resource`, in the order they were supplied.
    pub fn markers(&self, resource: &str) -> &[Marker] {
        self.markers
            .get(resource)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Counts of `(errors, warnings)` for `resource`; info markers count as errors.
    pub fn problem_counts(&self, resource: &str) -> (usize, usize) {
        self.markers(resource)
            .iter()
            .fold((0, 0), |(errors, warnings), marker| match marker.severity {
                MarkerSeverity::Hint => (errors, warnings),
                MarkerSeverity::Warning => (errors, warnings + 1),
                MarkerSeverity::Info | MarkerSeverity::Error => (errors + 1, warnings),
            })
    }

    /// Incremented on every change.
    pub fn version(&self) -> u64 {
        self.version
    }
}

impl std::fmt::Debug for MarkerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkerStore")
            .field("markers", &self.markers)
            .field("listeners", &self.listeners.len())
            .field("version", &self.version)
            .finish()
    }
}
