// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Source location tracking.

/// A byte range in the source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Where a token or node sits in the source: 1-based line and column of its
/// first byte, its byte offset and its length in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
    pub offset: usize,
    pub length: usize,
}

impl SourceLocation {
    pub fn new(line: u32, column: u32, offset: usize, length: usize) -> Self {
        Self { line, column, offset, length }
    }

    /// Byte offset one past the last byte covered.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    pub fn span(&self) -> Span {
        Span::new(self.offset, self.end())
    }

    /// Same start, stretched (or shrunk) to end at `end`.
    pub fn extend_to(self, end: usize) -> Self {
        Self { length: end.saturating_sub(self.offset), ..self }
    }

    /// Zero-length location at the start of `self`.
    pub fn point(self) -> Self {
        Self { length: 0, ..self }
    }
}

/// Precomputed line-start offsets for O(log n) byte-offset → line:col lookup.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Byte offset of the start of each line. line_starts[0] is always 0.
    line_starts: Vec<usize>,
}

impl LineMap {
    /// Build a line map by scanning source for newlines. O(n).
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| i + 1),
        );
        LineMap { line_starts }
    }

    /// Convert byte offset to (line, col), both 1-based. O(log n).
    pub fn offset_to_line_col(&self, offset: usize) -> (u32, u32) {
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let col = offset - self.line_starts[line_idx] + 1;
        ((line_idx + 1) as u32, col as u32)
    }

    /// Location of `span`, with line and column of its start.
    pub fn locate(&self, span: Span) -> SourceLocation {
        let (line, column) = self.offset_to_line_col(span.start);
        SourceLocation::new(line, column, span.start, span.len())
    }

    /// Get the source text of a 1-based line number, without its newline.
    pub fn line_text<'a>(&self, source: &'a str, line: u32) -> Option<&'a str> {
        let idx = (line as usize).checked_sub(1)?;
        let start = *self.line_starts.get(idx)?;
        let end = self
            .line_starts
            .get(idx + 1)
            .map(|&s| s.saturating_sub(1))
            .unwrap_or(source.len());
        source.get(start..end).map(|l| l.strip_suffix('\r').unwrap_or(l))
    }

    /// Number of lines in the source.
    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source() {
        let lm = LineMap::new("");
        assert_eq!(lm.offset_to_line_col(0), (1, 1));
        assert_eq!(lm.line_count(), 1);
    }

    #[test]
    fn multi_line() {
        let src = "fun\nmain()\n{}";
        let lm = LineMap::new(src);
        assert_eq!(lm.line_count(), 3);
        assert_eq!(lm.offset_to_line_col(0), (1, 1));
        assert_eq!(lm.offset_to_line_col(2), (1, 3));
        assert_eq!(lm.offset_to_line_col(4), (2, 1));
        assert_eq!(lm.offset_to_line_col(8), (2, 5));
        assert_eq!(lm.offset_to_line_col(11), (3, 1));

        assert_eq!(lm.line_text(src, 1), Some("fun"));
        assert_eq!(lm.line_text(src, 2), Some("main()"));
        assert_eq!(lm.line_text(src, 3), Some("{}"));
        assert_eq!(lm.line_text(src, 4), None);
    }

    #[test]
    fn offset_at_newline() {
        let src = "ab\ncd\n";
        let lm = LineMap::new(src);
        // The '\n' belongs to the line it ends
        assert_eq!(lm.offset_to_line_col(2), (1, 3));
        assert_eq!(lm.offset_to_line_col(3), (2, 1));
        assert_eq!(lm.offset_to_line_col(5), (2, 3));
        assert_eq!(lm.line_text(src, 3), Some(""));
    }

    #[test]
    fn crlf_lines_strip_carriage_return() {
        let src = "let a;\r\nlet b;\r\n";
        let lm = LineMap::new(src);
        assert_eq!(lm.line_text(src, 1), Some("let a;"));
        assert_eq!(lm.offset_to_line_col(8), (2, 1));
    }

    #[test]
    fn locate_and_extend() {
        let src = "x\n  foo(1)";
        let lm = LineMap::new(src);
        let loc = lm.locate(Span::new(4, 7));
        assert_eq!(loc, SourceLocation::new(2, 3, 4, 3));
        assert_eq!(loc.end(), 7);
        let wider = loc.extend_to(10);
        assert_eq!(wider.span(), Span::new(4, 10));
        assert_eq!(wider.line, 2);
        assert_eq!(wider.point().length, 0);
    }
}
