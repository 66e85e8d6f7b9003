//! Document outline model and the cursor-containment query.
//!
//! Outlines are produced by an external service (the YAML language server, or the built-in
//! indentation outline in [`crate::yaml`]) and handed over as immutable snapshots. The only
//! query the editor runs against them is [`symbols_at`]: which symbols enclose the cursor,
//! outermost first.

use crate::position::{Position, Range};
use std::iter::FusedIterator;

/// Outline entry kind. Variants 1 to 26 follow the LSP `SymbolKind` numbering; a YAML
/// server mostly reports `Key`, `Object`, `Array` and the scalar kinds.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SymbolKind {
    File,
    Module,
    Namespace,
    Package,
    Class,
    Method,
    Property,
    Field,
    Constructor,
    Enum,
    Interface,
    Function,
    Variable,
    Constant,
    String,
    Number,
    Boolean,
    Array,
    Object,
    Key,
    Null,
    EnumMember,
    Struct,
    Event,
    Operator,
    TypeParameter,
    /// Any number outside 1..=26.
    Custom(u32),
}

impl SymbolKind {
    /// Map a protocol kind number.
    pub fn from_lsp_kind(kind: u32) -> Self {
        match kind {
            1 => Self::File,
            2 => Self::Module,
            3 => Self::Namespace,
            4 => Self::Package,
            5 => Self::Class,
            6 => Self::Method,
            7 => Self::Property,
            8 => Self::Field,
            9 => Self::Constructor,
            10 => Self::Enum,
            11 => Self::Interface,
            12 => Self::Function,
            13 => Self::Variable,
            14 => Self::Constant,
            15 => Self::String,
            16 => Self::Number,
            17 => Self::Boolean,
            18 => Self::Array,
            19 => Self::Object,
            20 => Self::Key,
            21 => Self::Null,
            22 => Self::EnumMember,
            23 => Self::Struct,
            24 => Self::Event,
            25 => Self::Operator,
            26 => Self::TypeParameter,
            other => Self::Custom(other),
        }
    }

    /// Returns true for kinds that hold nested entries (mappings and sequences).
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Object | Self::Array | Self::Module | Self::Namespace)
    }
}

/// A single outline entry with its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSymbol {
    /// Symbol name (for YAML, the mapping key).
    pub name: String,
    /// Optional detail string (e.g. the scalar value).
    pub detail: Option<String>,
    /// Symbol kind.
    pub kind: SymbolKind,
    /// Full span of the entry, value included.
    pub range: Range,
    /// Span of the name only.
    pub selection_range: Range,
    /// Child symbols, expected (not required) to lie within `range`.
    pub children: Vec<DocumentSymbol>,
}

impl DocumentSymbol {
    /// Create a childless symbol whose selection range equals its range.
    pub fn new(name: impl Into<String>, kind: SymbolKind, range: Range) -> Self {
        Self {
            name: name.into(),
            detail: None,
            kind,
            range,
            selection_range: range,
            children: Vec::new(),
        }
    }

    /// Builder-style helper to attach children.
    pub fn with_children(mut self, children: Vec<DocumentSymbol>) -> Self {
        self.children = children;
        self
    }

    /// Push `self`, then every descendant, depth-first.
    pub fn flatten_preorder<'a>(&'a self, out: &mut Vec<&'a DocumentSymbol>) {
        out.push(self);
        for child in &self.children {
            child.flatten_preorder(out);
        }
    }

    /// Push every symbol in this subtree named `name`, depth-first.
    pub fn find_by_name<'a>(&'a self, name: &str, out: &mut Vec<&'a DocumentSymbol>) {
        if self.name == name {
            out.push(self);
        }
        for child in &self.children {
            child.find_by_name(name, out);
        }
    }
}

/// Lazy, restartable sequence of the symbols that contain a position.
///
/// Produced by [`symbols_at`]. Cloning the iterator yields an independent cursor over the
/// same remaining sequence.
#[derive(Debug, Clone)]
pub struct SymbolsAt<'a> {
    position: Position,
    stack: Vec<std::slice::Iter<'a, DocumentSymbol>>,
}

impl<'a> Iterator for SymbolsAt<'a> {
    type Item = &'a DocumentSymbol;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(siblings) = self.stack.last_mut() {
            match siblings.next() {
                Some(symbol) if symbol.range.contains_position(self.position) => {
                    // Descend before moving on to the next sibling.
                    if !symbol.children.is_empty() {
                        self.stack.push(symbol.children.iter());
                    }
                    return Some(symbol);
                }
                // Non-containing symbols are skipped together with their children.
                Some(_) => {}
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}

impl FusedIterator for SymbolsAt<'_> {}

/// Return the symbols whose range contains `position`, depth-first, outermost first.
///
/// Siblings are visited in their original order; a matching symbol is yielded before its
/// matching descendants. Children of a non-matching symbol are never visited.
pub fn symbols_at(symbols: &[DocumentSymbol], position: Position) -> SymbolsAt<'_> {
    SymbolsAt {
        position,
        stack: vec![symbols.iter()],
    }
}

/// Names of the symbols containing `position`, outermost first.
pub fn breadcrumb(symbols: &[DocumentSymbol], position: Position) -> Vec<&str> {
    symbols_at(symbols, position)
        .map(|symbol| symbol.name.as_str())
        .collect()
}

/// A document outline (top-level symbol list).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentOutline {
    /// Top-level symbols.
    pub symbols: Vec<DocumentSymbol>,
}

impl DocumentOutline {
    /// Wrap top-level symbols.
    pub fn new(symbols: Vec<DocumentSymbol>) -> Self {
        Self { symbols }
    }

    /// True when the server reported no symbols.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols containing `position`; see [`symbols_at`].
    pub fn symbols_at(&self, position: Position) -> SymbolsAt<'_> {
        symbols_at(&self.symbols, position)
    }

    /// Names of the symbols containing `position`; see [`breadcrumb`].
    pub fn breadcrumb(&self, position: Position) -> Vec<&str> {
        breadcrumb(&self.symbols, position)
    }

    /// Every symbol, depth-first.
    pub fn flatten_preorder(&self) -> Vec<&DocumentSymbol> {
        let mut out = Vec::new();
        self.symbols.iter().for_each(|s| s.flatten_preorder(&mut out));
        out
    }

    /// Every symbol named `name`, depth-first.
    pub fn find_by_name(&self, name: &str) -> Vec<&DocumentSymbol> {
        let mut out = Vec::new();
        self.symbols.iter().for_each(|s| s.find_by_name(name, &mut out));
        out
    }
}
