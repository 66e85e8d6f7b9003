//! Conversion of LSP payloads into `cfgpad-core` markers and outlines.
//!
//! LSP positions are 0-based with UTF-16 columns; core positions are 1-based with character
//! columns. [`LineTable`] holds the line texts needed for the column conversion and must
//! describe the same document version the server answered for.
//!
//! Like the rest of this crate, only the subset of the protocol that is used gets parsed;
//! `lsp-types` is not pulled in.

use cfgpad_core::{
    DocumentOutline, DocumentSymbol, Marker, MarkerSeverity, Position, Range, SymbolKind,
    split_lines,
};
use serde_json::{Value, json};

/// Line texts of a document snapshot, for UTF-16 column conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineTable {
    lines: Vec<String>,
}

impl LineTable {
    /// Split `text` at `\n`, `\r\n` and lone `\r`, the breaks LSP line numbers count.
    pub fn new(text: &str) -> Self {
        Self {
            lines: split_lines(text).map(str::to_string).collect(),
        }
    }

    /// Text of 0-based `line`, or `""` past the end.
    pub fn line(&self, line: usize) -> &str {
        self.lines.get(line).map(String::as_str).unwrap_or("")
    }

    /// Convert an LSP `(line, character)` pair into a core position.
    pub fn position_from_lsp(&self, line: u32, character: u32) -> Position {
        let text = self.line(line as usize);
        let column = utf16_to_char_offset(text, character as usize);
        Position::new(line as usize + 1, column + 1)
    }

    /// Convert a core position into an LSP `Position` JSON value.
    pub fn position_to_lsp(&self, position: Position) -> Value {
        let line = position.line.saturating_sub(1);
        let character = char_offset_to_utf16(self.line(line), position.column.saturating_sub(1));
        json!({ "line": line, "character": character })
    }
}

/// Number of UTF-16 code units in the first `char_offset` characters of `text`.
pub fn char_offset_to_utf16(text: &str, char_offset: usize) -> usize {
    text.chars().take(char_offset).map(char::len_utf16).sum()
}

/// Number of characters covering the first `utf16_offset` UTF-16 code units of `text`.
///
/// An offset pointing into the middle of a surrogate pair rounds up to the whole character.
pub fn utf16_to_char_offset(text: &str, utf16_offset: usize) -> usize {
    let mut units = 0;
    let mut chars = 0;
    for ch in text.chars() {
        if units >= utf16_offset {
            break;
        }
        units += ch.len_utf16();
        chars += 1;
    }
    chars
}

fn parse_range(lines: &LineTable, value: &Value) -> Option<Range> {
    let pos = |v: &Value| -> Option<Position> {
        let line = u32::try_from(v.get("line")?.as_u64()?).ok()?;
        let character = u32::try_from(v.get("character")?.as_u64()?).ok()?;
        Some(lines.position_from_lsp(line, character))
    };
    Some(Range::new(pos(value.get("start")?)?, pos(value.get("end")?)?))
}

fn stringify_code(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Convert one LSP `Diagnostic` for `resource` into a marker.
///
/// A missing severity is treated as an error.
pub fn marker_from_lsp_diagnostic(
    resource: &str,
    lines: &LineTable,
    value: &Value,
) -> Option<Marker> {
    let range = parse_range(lines, value.get("range")?)?;
    let message = value.get("message")?.as_str()?.to_string();
    let severity = value
        .get("severity")
        .and_then(Value::as_u64)
        .and_then(MarkerSeverity::from_lsp)
        .unwrap_or(MarkerSeverity::Error);

    let mut marker = Marker::new(resource, severity, message, range.start, range.end);
    marker.source = value
        .get("source")
        .and_then(Value::as_str)
        .map(str::to_string);
    marker.code = value.get("code").and_then(stringify_code);
    Some(marker)
}

/// Convert `textDocument/publishDiagnostics` params into `(uri, markers)`.
///
/// Diagnostics that do not parse are dropped; marker order follows the server's order.
pub fn markers_from_publish_diagnostics(
    lines: &LineTable,
    params: &Value,
) -> Option<(String, Vec<Marker>)> {
    let uri = params.get("uri")?.as_str()?.to_string();
    let markers = params
        .get("diagnostics")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| marker_from_lsp_diagnostic(&uri, lines, item))
                .collect()
        })
        .unwrap_or_default();
    Some((uri, markers))
}

fn parse_document_symbol(lines: &LineTable, value: &Value) -> Option<DocumentSymbol> {
    let name = value.get("name")?.as_str()?.to_string();
    let kind = u32::try_from(value.get("kind")?.as_u64()?).ok()?;
    let range = parse_range(lines, value.get("range")?)?;
    let selection_range = parse_range(lines, value.get("selectionRange")?)?;

    let children = value
        .get("children")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|child| parse_document_symbol(lines, child))
                .collect()
        })
        .unwrap_or_default();

    Some(DocumentSymbol {
        name,
        detail: value
            .get("detail")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        kind: SymbolKind::from_lsp_kind(kind),
        range,
        selection_range,
        children,
    })
}

fn parse_symbol_information(lines: &LineTable, value: &Value) -> Option<DocumentSymbol> {
    let name = value.get("name")?.as_str()?;
    let kind = u32::try_from(value.get("kind")?.as_u64()?).ok()?;
    let range = parse_range(lines, value.get("location")?.get("range")?)?;
    Some(DocumentSymbol::new(
        name,
        SymbolKind::from_lsp_kind(kind),
        range,
    ))
}

/// Convert a `textDocument/documentSymbol` result into an outline.
///
/// Accepts both the hierarchical `DocumentSymbol[]` and the flat `SymbolInformation[]` shape;
/// anything else yields an empty outline.
pub fn outline_from_document_symbols(lines: &LineTable, result: &Value) -> DocumentOutline {
    let Some(items) = result.as_array() else {
        return DocumentOutline::default();
    };

    let symbols = items
        .iter()
        .filter_map(|item| {
            parse_document_symbol(lines, item).or_else(|| parse_symbol_information(lines, item))
        })
        .collect();
    DocumentOutline::new(symbols)
}
