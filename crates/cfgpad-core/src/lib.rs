#![warn(missing_docs)]
//! `cfgpad-core` - headless model for the cfgpad YAML config editor.
//!
//! # Overview
//!
//! The crate holds everything the editor needs that does not depend on a terminal, a
//! language server or the network:
//!
//! - [`position`] - 1-based line/column positions and ranges with containment
//! - [`symbols`] - document outlines and [`symbols_at`], the cursor-containment query
//! - [`diagnostics`] - markers, severities and the per-resource [`MarkerStore`]
//! - [`problems`] - projection of markers into problem rows, bound to a [`ProblemSurface`]
//! - [`schema`] - schema-to-document association by file pattern
//! - [`document`] - rope-backed editable text with a cursor
//! - [`yaml`] - syntax check and indentation outline used without a language server
//!
//! # Quick Start
//!
//! ```rust
//! use cfgpad_core::{DocumentSymbol, Position, Range, SymbolKind, symbols_at};
//!
//! let outline = vec![
//!     DocumentSymbol::new("a", SymbolKind::Object, Range::from_coords(1, 1, 10, 1))
//!         .with_children(vec![DocumentSymbol::new(
//!             "b",
//!             SymbolKind::Key,
//!             Range::from_coords(2, 1, 3, 1),
//!         )]),
//! ];
//!
//! let names: Vec<_> = symbols_at(&outline, Position::new(2, 1))
//!     .map(|s| s.name.as_str())
//!     .collect();
//! assert_eq!(names, vec!["a", "b"]);
//! ```
//!
//! ```rust
//! use cfgpad_core::{ListSurface, Marker, MarkerSeverity, Position, ProblemPanel};
//!
//! let mut panel = ProblemPanel::new(ListSurface::new());
//! assert_eq!(panel.rows()[0].text, "No Problems Found");
//!
//! let start = Position::new(3, 5);
//! panel.render(&[Marker::new("config.yaml", MarkerSeverity::Error, "bad", start, start)]);
//!
//! let mut jumped_to = None;
//! panel.click(0, |marker| jumped_to = Some(marker.start));
//! assert_eq!(jumped_to, Some(start));
//! ```

pub mod diagnostics;
pub mod document;
pub mod position;
pub mod problems;
pub mod schema;
pub mod symbols;
pub mod yaml;

pub use diagnostics::{Marker, MarkerListener, MarkerSeverity, MarkerStore};
pub use document::Document;
pub use position::{Lines, Position, Range, split_lines};
pub use problems::{
    ListSurface, NO_PROBLEMS_TEXT, ProblemIcon, ProblemPanel, ProblemRow, ProblemSurface,
    problem_rows,
};
pub use schema::{
    DEFAULT_DOCUMENT_NAME, DEFAULT_SCHEMA_URI, SchemaAssociations, SchemaError, SchemaSettings,
};
pub use symbols::{DocumentOutline, DocumentSymbol, SymbolKind, SymbolsAt, breadcrumb, symbols_at};
