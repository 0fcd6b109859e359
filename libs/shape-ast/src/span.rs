//! # Source Span
//!
//! Represents a range in the source code for error reporting and source
//! mapping. Spans are preserved through the entire pipeline from lexing to
//! scene assembly.
//!
//! ## Usage
//!
//! ```rust
//! use shape_ast::Span;
//!
//! let span = Span::new(0, 10);
//! assert_eq!(span.start(), 0);
//! assert_eq!(span.end(), 10);
//! assert_eq!(span.len(), 10);
//! ```

use serde::{Deserialize, Serialize};

/// A half-open range in the source code, represented as byte offsets.
///
/// Used for error reporting, diagnostics, and mapping geometry back to
/// source.
///
/// # Example
///
/// ```rust
/// use shape_ast::Span;
///
/// // For source "cube 10" the span of "cube" would be:
/// let span = Span::new(0, 4);
/// assert_eq!(span.len(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    /// Starting byte offset (inclusive)
    start: usize,
    /// Ending byte offset (exclusive)
    end: usize,
}

impl Span {
    /// Creates a new span from start and end byte offsets.
    #[inline]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Creates an empty span anchored at a single offset.
    #[inline]
    pub fn at(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Returns the starting byte offset.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Returns the ending byte offset.
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Returns the length of the span in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the span has zero length.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Creates a span that encompasses both this span and another.
    ///
    /// # Example
    ///
    /// ```rust
    /// use shape_ast::Span;
    ///
    /// let merged = Span::new(0, 5).merge(&Span::new(10, 15));
    /// assert_eq!(merged.start(), 0);
    /// assert_eq!(merged.end(), 15);
    /// ```
    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Checks if this span contains a byte offset.
    #[inline]
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Returns the 1-based line number of `offset` within `source`.
    ///
    /// Line boundaries are `\n`, `\r`, and `\r\n` (a `\r\n` pair counts as a
    /// single boundary).
    ///
    /// # Example
    ///
    /// ```rust
    /// use shape_ast::Span;
    ///
    /// let source = "cube\nsphere";
    /// assert_eq!(Span::line_index(source, 0), 1);
    /// assert_eq!(Span::line_index(source, 5), 2);
    /// ```
    pub fn line_index(source: &str, offset: usize) -> usize {
        let offset = offset.min(source.len());
        let mut line = 1;
        let bytes = source.as_bytes();
        let mut i = 0;
        while i < offset {
            match bytes[i] {
                b'\n' => line += 1,
                b'\r' => {
                    line += 1;
                    // \r\n counts as one boundary
                    if i + 1 < offset && bytes[i + 1] == b'\n' {
                        i += 1;
                    }
                }
                _ => {}
            }
            i += 1;
        }
        line
    }

    /// Returns the 1-based `(line, column)` of `offset` within `source`.
    ///
    /// The column counts characters, not bytes, so multibyte source text
    /// reports sensible caret positions.
    pub fn line_and_column(source: &str, offset: usize) -> (usize, usize) {
        let offset = offset.min(source.len());
        let line = Self::line_index(source, offset);
        let line_span = Self::line_range(source, offset, true);
        let column = source[line_span.start()..offset].chars().count() + 1;
        (line, column)
    }

    /// Returns the span of the whole line containing `offset`, without its
    /// terminator.
    ///
    /// With `include_indent == false` the span starts after leading spaces
    /// and tabs.
    pub fn line_range(source: &str, offset: usize, include_indent: bool) -> Span {
        let offset = offset.min(source.len());
        let bytes = source.as_bytes();
        let mut start = offset;
        while start > 0 && bytes[start - 1] != b'\n' && bytes[start - 1] != b'\r' {
            start -= 1;
        }
        let mut end = offset;
        while end < bytes.len() && bytes[end] != b'\n' && bytes[end] != b'\r' {
            end += 1;
        }
        if !include_indent {
            while start < end && (bytes[start] == b' ' || bytes[start] == b'\t') {
                start += 1;
            }
        }
        Span { start, end }
    }

    /// Returns the text of the line containing `offset`, without its
    /// terminator.
    pub fn line_at(source: &str, offset: usize) -> &str {
        let span = Self::line_range(source, offset, true);
        &source[span.start()..span.end()]
    }
}
