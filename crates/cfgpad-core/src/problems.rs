//! Problem panel: markers projected into clickable rows.
//!
//! The projection ([`problem_rows`]) is pure. [`ProblemPanel`] pushes its result into a
//! [`ProblemSurface`], the thin adapter a host implements on top of its own widgets.

use crate::diagnostics::{Marker, MarkerSeverity};

/// Text of the row shown when there is nothing to report.
pub const NO_PROBLEMS_TEXT: &str = "No Problems Found";

/// Icon shown in front of a problem row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProblemIcon {
    /// Warning marker.
    Warning,
    /// Any other non-hint marker (errors and informational markers alike).
    Error,
    /// The "all clear" row.
    Check,
}

impl ProblemIcon {
    /// Icon for a marker severity. Hints have no icon because they are never shown.
    pub fn for_severity(severity: MarkerSeverity) -> Option<Self> {
        match severity {
            MarkerSeverity::Hint => None,
            MarkerSeverity::Warning => Some(Self::Warning),
            MarkerSeverity::Info | MarkerSeverity::Error => Some(Self::Error),
        }
    }

    /// Codicon class name, for hosts that style rows by class.
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::Warning => "codicon-warning",
            Self::Error => "codicon-error",
            Self::Check => "codicon-check",
        }
    }
}

/// A single rendered row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemRow {
    /// Row icon.
    pub icon: ProblemIcon,
    /// Row text (the marker message, or [`NO_PROBLEMS_TEXT`]).
    pub text: String,
    /// Source marker; `None` for the "all clear" row.
    pub marker: Option<Marker>,
}

impl ProblemRow {
    fn for_marker(marker: &Marker) -> Option<Self> {
        let icon = ProblemIcon::for_severity(marker.severity)?;
        Some(Self {
            icon,
            text: marker.message.clone(),
            marker: Some(marker.clone()),
        })
    }

    /// The "No Problems Found" row.
    pub fn all_clear() -> Self {
        Self {
            icon: ProblemIcon::Check,
            text: NO_PROBLEMS_TEXT.to_string(),
            marker: None,
        }
    }

    /// Returns true if clicking this row selects a marker.
    pub fn is_selectable(&self) -> bool {
        self.marker.is_some()
    }
}

/// Project markers into rows.
///
/// Hints are dropped, everything else keeps its input order. An empty result is replaced by
/// the single "all clear" row.
pub fn problem_rows(markers: &[Marker]) -> Vec<ProblemRow> {
    let mut rows: Vec<ProblemRow> = markers.iter().filter_map(ProblemRow::for_marker).collect();
    if rows.is_empty() {
        rows.push(ProblemRow::all_clear());
    }
    rows
}

/// A display container the panel renders into.
pub trait ProblemSurface {
    /// Remove every row.
    fn clear(&mut self);

    /// Append one row at the end.
    fn append(&mut self, row: ProblemRow);
}

/// In-memory [`ProblemSurface`]: an ordered row list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListSurface {
    rows: Vec<ProblemRow>,
}

impl ListSurface {
    /// Create an empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows currently on the surface.
    pub fn rows(&self) -> &[ProblemRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the surface has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl ProblemSurface for ListSurface {
    fn clear(&mut self) {
        self.rows.clear();
    }

    fn append(&mut self, row: ProblemRow) {
        self.rows.push(row);
    }
}

/// Problem list bound to a display surface.
#[derive(Debug)]
pub struct ProblemPanel<S: ProblemSurface> {
    surface: S,
    rows: Vec<ProblemRow>,
}

impl<S: ProblemSurface> ProblemPanel<S> {
    /// Bind a panel to `surface` and show the initial "all clear" row.
    pub fn new(surface: S) -> Self {
        let mut panel = Self {
            surface,
            rows: Vec::new(),
        };
        panel.render(&[]);
        panel
    }

    /// Rebuild the surface from `markers`.
    pub fn render(&mut self, markers: &[Marker]) {
        self.surface.clear();
        self.rows = problem_rows(markers);
        for row in &self.rows {
            self.surface.append(row.clone());
        }
    }

    /// Handle a click on row `index`.
    ///
    /// Calls `on_select` once with the row's marker. Returns false (and calls nothing) for
    /// the "all clear" row or an index past the end.
    pub fn click<F>(&self, index: usize, on_select: F) -> bool
    where
        F: FnOnce(&Marker),
    {
        match self.rows.get(index).and_then(|row| row.marker.as_ref()) {
            Some(marker) => {
                on_select(marker);
                true
            }
            None => false,
        }
    }

    /// Rows of the last render.
    pub fn rows(&self) -> &[ProblemRow] {
        &self.rows
    }

    /// Number of rows that carry a marker.
    pub fn problem_count(&self) -> usize {
        self.rows.iter().filter(|row| row.is_selectable()).count()
    }

    /// The bound surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    fn marker(severity: MarkerSeverity, message: &str) -> Marker {
        Marker::new(
            "config.yaml",
            severity,
            message,
            Position::new(1, 1),
            Position::new(1, 2),
        )
    }

    #[test]
    fn test_info_collapses_to_error_icon() {
        let rows = problem_rows(&[marker(MarkerSeverity::Info, "note")]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].icon, ProblemIcon::Error);
        assert_eq!(rows[0].icon.class_name(), "codicon-error");
    }

    #[test]
    fn test_duplicates_are_kept() {
        let m = marker(MarkerSeverity::Error, "dup");
        let rows = problem_rows(&[m.clone(), m]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], rows[1]);
    }

    #[test]
    fn test_all_clear_row_is_not_selectable() {
        let row = ProblemRow::all_clear();
        assert!(!row.is_selectable());
        assert_eq!(row.icon.class_name(), "codicon-check");
    }
}
