//! Position and line map utilities.
//!
//! The lexer and AST track byte offsets; diagnostics presentation wants
//! line/column pairs. `LineMap` converts between the two, matching the
//! `(start_offset, length, line, column)` token range spec §3.1 requires.

use crate::span::Span;

/// A 0-indexed line/column position in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    #[must_use]
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A fully resolved source range: byte span plus start/end line/column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRange {
    pub span: Span,
    pub start: Position,
    pub end: Position,
}

/// Maps byte offsets to line/column positions in O(log n).
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Starting byte offset of each line; `line_starts[0]` is always 0.
    line_starts: Vec<u32>,
}

impl LineMap {
    #[must_use]
    pub fn build(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (i, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
            }
        }
        Self { line_starts }
    }

    #[must_use]
    pub fn offset_to_position(&self, offset: u32) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert_point) => insert_point.saturating_sub(1),
        };
        let line_start = self.line_starts.get(line).copied().unwrap_or(0);
        Position::new(u32::try_from(line).unwrap_or(u32::MAX), offset.saturating_sub(line_start))
    }

    #[must_use]
    pub fn to_source_range(&self, span: Span) -> SourceRange {
        SourceRange {
            span,
            start: self.offset_to_position(span.start),
            end: self.offset_to_position(span.end),
        }
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_positions() {
        let map = LineMap::build("abc");
        assert_eq!(map.offset_to_position(0), Position::new(0, 0));
        assert_eq!(map.offset_to_position(2), Position::new(0, 2));
    }

    #[test]
    fn multi_line_positions() {
        let map = LineMap::build("ab\ncd\nef");
        assert_eq!(map.offset_to_position(0), Position::new(0, 0));
        assert_eq!(map.offset_to_position(3), Position::new(1, 0));
        assert_eq!(map.offset_to_position(4), Position::new(1, 1));
        assert_eq!(map.offset_to_position(6), Position::new(2, 0));
        assert_eq!(map.line_count(), 3);
    }
}
