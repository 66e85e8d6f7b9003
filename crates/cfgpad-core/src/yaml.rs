//! Built-in YAML checks used when no language server is available.
//!
//! - [`syntax_markers`] reports parse errors (including duplicate keys) as error markers.
//! - [`indent_outline`] derives an outline of block-mapping keys from indentation alone.
//!
//! Neither validates against a schema; that stays with the language server.

use crate::diagnostics::{Marker, MarkerSeverity};
use crate::position::{Position, Range, split_lines};
use crate::symbols::{DocumentOutline, DocumentSymbol, SymbolKind};
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

/// Marker source used by [`syntax_markers`].
pub const SYNTAX_SOURCE: &str = "yaml-syntax";

/// Parse every document in `text` and report the first error as a marker.
///
/// The parser cannot resume after an error, so at most one marker is produced.
pub fn syntax_markers(resource: &str, text: &str) -> Vec<Marker> {
    for document in serde_yaml::Deserializer::from_str(text) {
        if let Err(err) = serde_yaml::Value::deserialize(document) {
            return vec![marker_from_error(resource, &err)];
        }
    }
    Vec::new()
}

fn marker_from_error(resource: &str, err: &serde_yaml::Error) -> Marker {
    let start = err
        .location()
        .map(|loc| Position::new(loc.line().max(1), loc.column().max(1)))
        .unwrap_or_else(Position::origin);
    let end = Position::new(start.line, start.column + 1);

    let mut marker = Marker::new(
        resource,
        MarkerSeverity::Error,
        err.to_string(),
        start,
        end,
    );
    marker.source = Some(SYNTAX_SOURCE.to_string());
    marker
}

fn key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"^\s*(?:-\s+)?(?P<key>"[^"]*"|'[^']*'|[^\s#"'\-][^:#]*?)\s*:(?:\s+(?P<value>[^#]*?))?\s*(?:#.*)?$"#,
        )
        .expect("static outline regex")
    })
}

struct OpenSymbol {
    indent: usize,
    symbol: DocumentSymbol,
}

#[derive(Clone, Copy)]
struct LastContent {
    line: usize,
    len: usize,
}

/// Build an outline of block-mapping keys from indentation.
///
/// Each `key:` line becomes a symbol spanning up to the last non-blank line nested below it.
/// Sequence items (`- key: value`) nest under the enclosing key. Flow collections,
/// multi-line scalars and anchors are not interpreted.
pub fn indent_outline(text: &str) -> DocumentOutline {
    let mut roots = Vec::new();
    let mut stack: Vec<OpenSymbol> = Vec::new();
    let mut last = LastContent { line: 1, len: 0 };

    for (idx, line) in split_lines(text).enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let indent = line.chars().take_while(|c| c.is_whitespace()).count();
        if indent == 0 && trimmed.starts_with("---") {
            close_until(&mut stack, &mut roots, 0, last);
            continue;
        }

        let is_item = trimmed == "-" || trimmed.starts_with("- ");
        // `- ` items may sit at the same indentation as their parent key.
        let threshold = if is_item { indent + 1 } else { indent };
        close_until(&mut stack, &mut roots, threshold, last);

        if is_item
            && let Some(top) = stack.last_mut()
            && top.symbol.detail.is_none()
        {
            top.symbol.kind = SymbolKind::Array;
        }

        if let Some(caps) = key_regex().captures(line)
            && let Some(key) = caps.name("key")
        {
            let key_column = line[..key.start()].chars().count() + 1;
            let key_len = key.as_str().chars().count();
            let line_len = line.chars().count();
            let value = caps
                .name("value")
                .map(|m| m.as_str().trim())
                .filter(|v| !v.is_empty());

            let name = key.as_str().trim_matches(|c| c == '"' || c == '\'');
            let mut symbol = DocumentSymbol::new(
                name,
                kind_for_value(value),
                Range::from_coords(line_no, key_column, line_no, line_len + 1),
            );
            symbol.selection_range =
                Range::from_coords(line_no, key_column, line_no, key_column + key_len);
            symbol.detail = value.map(str::to_string);

            stack.push(OpenSymbol {
                indent: key_column - 1,
                symbol,
            });
        }

        last = LastContent {
            line: line_no,
            len: line.chars().count(),
        };
    }

    close_until(&mut stack, &mut roots, 0, last);
    DocumentOutline::new(roots)
}

fn close_until(
    stack: &mut Vec<OpenSymbol>,
    roots: &mut Vec<DocumentSymbol>,
    threshold: usize,
    last: LastContent,
) {
    while stack.last().is_some_and(|open| open.indent >= threshold) {
        let Some(mut open) = stack.pop() else {
            break;
        };
        if last.line > open.symbol.range.start.line {
            open.symbol.range.end = Position::new(last.line, last.len + 1);
        }
        match stack.last_mut() {
            Some(parent) => parent.symbol.children.push(open.symbol),
            None => roots.push(open.symbol),
        }
    }
}

fn kind_for_value(value: Option<&str>) -> SymbolKind {
    let Some(value) = value else {
        return SymbolKind::Object;
    };
    match value {
        "true" | "false" | "yes" | "no" | "on" | "off" => SymbolKind::Boolean,
        "null" | "~" => SymbolKind::Null,
        v if v.parse::<f64>().is_ok() => SymbolKind::Number,
        v if v.starts_with('[') => SymbolKind::Array,
        v if v.starts_with('{') => SymbolKind::Object,
        _ => SymbolKind::String,
    }
}
