//! # Diagnostics
//!
//! Shared machinery for human-facing error output: Levenshtein-based
//! "did you mean" suggestions, the common-alias table, and caret-highlighted
//! source snippets.
//!
//! Error *types* live with the components that raise them (lexer, parser,
//! evaluator); this module only knows how to present them.
//!
//! ## Example
//!
//! ```rust
//! use shape_ast::diagnostic::suggest_with_aliases;
//!
//! let names = ["color", "colon", "cube"];
//! let hit = suggest_with_aliases("colour", names.iter().copied());
//! assert_eq!(hit.as_deref(), Some("color"));
//! ```

use crate::span::Span;
use std::fmt::Write;

// =============================================================================
// EDIT DISTANCE
// =============================================================================

/// Classic dynamic-programming Levenshtein distance, case-sensitive.
///
/// An empty string is `n` edits from an `n`-character string.
///
/// ## Example
///
/// ```rust
/// use shape_ast::diagnostic::edit_distance;
///
/// assert_eq!(edit_distance("foo", "foob"), 1);
/// assert_eq!(edit_distance("FOO", "foo"), 3);
/// assert_eq!(edit_distance("", "foo"), 3);
/// ```
pub fn edit_distance(lhs: &str, rhs: &str) -> usize {
    let lhs: Vec<char> = lhs.chars().collect();
    let rhs: Vec<char> = rhs.chars().collect();
    if lhs.is_empty() {
        return rhs.len();
    }
    if rhs.is_empty() {
        return lhs.len();
    }

    // Single rolling row keeps the table allocation linear.
    let mut row: Vec<usize> = (0..=rhs.len()).collect();
    for (i, &lc) in lhs.iter().enumerate() {
        let mut previous_diagonal = row[0];
        row[0] = i + 1;
        for (j, &rc) in rhs.iter().enumerate() {
            let substitution = previous_diagonal + usize::from(lc != rc);
            previous_diagonal = row[j + 1];
            row[j + 1] = substitution.min(row[j] + 1).min(row[j + 1] + 1);
        }
    }
    row[rhs.len()]
}

// =============================================================================
// SUGGESTIONS
// =============================================================================

/// Common misspellings and cross-dialect aliases, checked before the
/// edit-distance search.
const ALIASES: &[(&str, &str)] = &[
    ("colour", "color"),
    ("&&", "and"),
    ("||", "or"),
    ("!", "not"),
    ("==", "="),
    ("!=", "<>"),
    (":=", "="),
    ("grey", "gray"),
    ("elseif", "else if"),
    ("elif", "else if"),
];

/// Looks up a hard-coded alias for `name`.
pub fn alias(name: &str) -> Option<&'static str> {
    ALIASES
        .iter()
        .find(|(from, _)| *from == name)
        .map(|(_, to)| *to)
}

/// Suggests the closest candidate to `name` by edit distance.
///
/// A candidate is accepted when its distance is at most ⌈len/2⌉ of the
/// unknown name. Ties resolve deterministically to the lexicographically
/// smallest candidate.
pub fn suggest<'a>(name: &str, candidates: impl Iterator<Item = &'a str>) -> Option<String> {
    let budget = name.chars().count().div_ceil(2);
    candidates
        .filter_map(|candidate| {
            let distance = edit_distance(name, candidate);
            (distance <= budget && distance > 0).then_some((distance, candidate))
        })
        .min_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)))
        .map(|(_, candidate)| candidate.to_string())
}

/// Suggests a replacement for `name`, consulting the alias table first and
/// falling back to the edit-distance search over `candidates`.
pub fn suggest_with_aliases<'a>(
    name: &str,
    candidates: impl Iterator<Item = &'a str>,
) -> Option<String> {
    if let Some(hit) = alias(name) {
        return Some(hit.to_string());
    }
    suggest(name, candidates)
}

// =============================================================================
// SNIPPET RENDERING
// =============================================================================

/// Renders a caret-highlighted snippet for `span` within `source`.
///
/// The output is the offending line followed by a caret line underlining the
/// span, e.g.:
///
/// ```text
/// color 1 0 0 0 0
///       ^^^^^^^^^
/// ```
pub fn snippet(source: &str, span: Span) -> String {
    let line_span = Span::line_range(source, span.start(), true);
    let line = &source[line_span.start()..line_span.end()];
    let prefix = &source[line_span.start()..span.start().min(line_span.end())];
    let indent: String = prefix
        .chars()
        .map(|c| if c == '\t' { '\t' } else { ' ' })
        .collect();
    let highlighted = span.len().min(line_span.end().saturating_sub(span.start()));
    let carets = "^".repeat(highlighted.max(1));
    format!("{line}\n{indent}{carets}")
}

/// Formats a full diagnostic report: message, `line:column` pointer, the
/// caret snippet, and the optional hint/suggestion sentences.
///
/// The message carries no trailing period; hints are complete sentences.
pub fn report(
    source: &str,
    span: Span,
    message: &str,
    hint: Option<&str>,
    suggestion: Option<&str>,
) -> String {
    let (line, column) = Span::line_and_column(source, span.start());
    let mut out = String::new();
    let _ = writeln!(out, "error: {message}");
    let _ = writeln!(out, "  --> line {line}:{column}");
    for snippet_line in snippet(source, span).lines() {
        let _ = writeln!(out, "  | {snippet_line}");
    }
    if let Some(suggestion) = suggestion {
        let _ = writeln!(out, "  = did you mean '{suggestion}'?");
    }
    if let Some(hint) = hint {
        let _ = writeln!(out, "  = hint: {hint}");
    }
    out
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_distance_basics() {
        assert_eq!(edit_distance("foo", "foo"), 0);
        assert_eq!(edit_distance("foo", "foob"), 1);
        assert_eq!(edit_distance("foob", "foo"), 1);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn test_edit_distance_is_case_sensitive() {
        assert_eq!(edit_distance("FOO", "foo"), 3);
    }

    #[test]
    fn test_edit_distance_empty() {
        assert_eq!(edit_distance("", "foo"), 3);
        assert_eq!(edit_distance("foo", ""), 3);
        assert_eq!(edit_distance("", ""), 0);
    }

    #[test]
    fn test_suggest_within_budget() {
        let names = ["color", "cube", "cylinder"];
        assert_eq!(
            suggest("colr", names.iter().copied()).as_deref(),
            Some("color")
        );
    }

    #[test]
    fn test_suggest_rejects_distant_names() {
        let names = ["sphere"];
        assert_eq!(suggest("zz", names.iter().copied()), None);
    }

    #[test]
    fn test_suggest_never_returns_exact_match() {
        // An exact match is not a suggestion; the caller already rejected it.
        let names = ["color"];
        assert_eq!(suggest("color", names.iter().copied()), None);
    }

    #[test]
    fn test_alias_table() {
        assert_eq!(alias("colour"), Some("color"));
        assert_eq!(alias("&&"), Some("and"));
        assert_eq!(alias("=="), Some("="));
        assert_eq!(alias("nope"), None);
    }

    #[test]
    fn test_alias_wins_over_edit_distance() {
        let names = ["colon"];
        assert_eq!(
            suggest_with_aliases("colour", names.iter().copied()).as_deref(),
            Some("color")
        );
    }

    #[test]
    fn test_snippet_carets() {
        let source = "cube 1\nspere 2\n";
        let out = snippet(source, Span::new(7, 12));
        assert_eq!(out, "spere 2\n^^^^^");
    }

    #[test]
    fn test_report_contains_position() {
        let source = "cube 1\nspere 2\n";
        let out = report(source, Span::new(7, 12), "unknown symbol 'spere'", None, Some("sphere"));
        assert!(out.contains("line 2:1"));
        assert!(out.contains("did you mean 'sphere'?"));
    }
}
