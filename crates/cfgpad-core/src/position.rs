//! Line/column coordinates shared by outlines, markers and the document model.
//!
//! Both coordinates are 1-based, matching what the problem panel displays and what the
//! cursor reports. Columns count Unicode scalar values (`char`), not bytes or UTF-16 units;
//! protocol adapters convert at the boundary.
//!
//! Lines end at `\n`, `\r\n` or a lone `\r`, the same breaks LSP counts. [`split_lines`] and
//! the document rope both follow that rule, so outline, marker and cursor lines agree.

use std::cmp::Ordering;

/// A 1-based `(line, column)` position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column, in characters.
    pub column: usize,
}

impl Position {
    /// Create a new position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// The first position of a document.
    pub fn origin() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then(self.column.cmp(&other.column))
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A `(start, end)` span in line/column coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    /// Range start.
    pub start: Position,
    /// Range end.
    pub end: Position,
}

impl Range {
    /// Create a range from two positions.
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Create a range from `(start_line, start_column, end_line, end_column)`.
    pub fn from_coords(
        start_line: usize,
        start_column: usize,
        end_line: usize,
        end_column: usize,
    ) -> Self {
        Self {
            start: Position::new(start_line, start_column),
            end: Position::new(end_line, end_column),
        }
    }

    /// Returns true if `position` lies inside this range.
    ///
    /// Both ends are inclusive: a cursor sitting right after the last character of a symbol
    /// still belongs to it.
    pub fn contains_position(&self, position: Position) -> bool {
        if position.line < self.start.line || position.line > self.end.line {
            return false;
        }
        if position.line == self.start.line && position.column < self.start.column {
            return false;
        }
        if position.line == self.end.line && position.column > self.end.column {
            return false;
        }
        true
    }

    /// Returns true if `other` lies entirely within this range.
    pub fn contains_range(&self, other: &Range) -> bool {
        self.contains_position(other.start) && self.contains_position(other.end)
    }

    /// Returns true if the range covers no characters.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Split `text` at `\n`, `\r\n` and lone `\r`, dropping the breaks.
///
/// A trailing break yields a final empty line, so the count equals the document's line count.
pub fn split_lines(text: &str) -> Lines<'_> {
    Lines { rest: Some(text) }
}

/// Iterator returned by [`split_lines`].
#[derive(Debug, Clone)]
pub struct Lines<'a> {
    rest: Option<&'a str>,
}

impl<'a> Iterator for Lines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let rest = self.rest?;
        let Some(idx) = rest.find(['\n', '\r']) else {
            self.rest = None;
            return Some(rest);
        };
        let break_len = if rest[idx..].starts_with("\r\n") { 2 } else { 1 };
        self.rest = Some(&rest[idx + break_len..]);
        Some(&rest[..idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering() {
        assert!(Position::new(1, 5) < Position::new(2, 1));
        assert!(Position::new(2, 1) < Position::new(2, 2));
        assert!(Position::new(3, 1) >= Position::new(3, 1));
    }

    #[test]
    fn test_contains_position_is_inclusive() {
        let range = Range::from_coords(2, 3, 4, 5);

        assert!(range.contains_position(Position::new(2, 3)));
        assert!(range.contains_position(Position::new(4, 5)));
        assert!(range.contains_position(Position::new(3, 100)));
        assert!(!range.contains_position(Position::new(2, 2)));
        assert!(!range.contains_position(Position::new(4, 6)));
        assert!(!range.contains_position(Position::new(1, 10)));
        assert!(!range.contains_position(Position::new(5, 1)));
    }

    #[test]
    fn test_single_line_range() {
        let range = Range::from_coords(7, 1, 7, 4);
        assert!(range.contains_position(Position::new(7, 1)));
        assert!(range.contains_position(Position::new(7, 4)));
        assert!(!range.contains_position(Position::new(7, 5)));
        assert!(range.contains_range(&Range::from_coords(7, 2, 7, 3)));
        assert!(!range.contains_range(&Range::from_coords(7, 2, 8, 1)));
    }

    #[test]
    fn test_split_lines_breaks() {
        let lines: Vec<_> = split_lines("a\nb\r\nc\rd").collect();
        assert_eq!(lines, vec!["a", "b", "c", "d"]);

        let lines: Vec<_> = split_lines("a\r\r\n").collect();
        assert_eq!(lines, vec!["a", "", ""]);
        assert_eq!(split_lines("").collect::<Vec<_>>(), vec![""]);
    }

    #[test]
    fn test_split_lines_keeps_unicode_separators() {
        let lines: Vec<_> = split_lines("a: \"x\u{2028}y\"\u{85}z\nb").collect();
        assert_eq!(lines, vec!["a: \"x\u{2028}y\"\u{85}z", "b"]);
    }
}
