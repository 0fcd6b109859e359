//! # Lexer and Parser Errors
//!
//! Error types shared by both language front ends. The OpenSCAD-style
//! translator reports through these same types so the evaluator sees a
//! single diagnostics surface.
//!
//! Messages carry no trailing period; hints are complete sentences.

use shape_ast::diagnostic;
use shape_ast::Span;
use thiserror::Error;

// =============================================================================
// LEX ERROR
// =============================================================================

/// A tokenization error with location information.
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    /// Error kind with details.
    pub kind: LexErrorKind,
    /// Source location of the error.
    pub span: Span,
}

impl LexError {
    /// Create a new lex error.
    pub const fn new(kind: LexErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Short message without position information.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// Replacement token suggestion, from the common-alias table.
    pub fn suggestion(&self) -> Option<&'static str> {
        match &self.kind {
            LexErrorKind::UnexpectedToken { text } => diagnostic::alias(text),
            _ => None,
        }
    }

    /// Optional full-sentence hint.
    pub fn hint(&self) -> Option<String> {
        match &self.kind {
            LexErrorKind::UnterminatedString => {
                Some("Try adding a closing \" (double quote) at the end of the line.".to_string())
            }
            LexErrorKind::InvalidEscapeSequence { sequence } => Some(format!(
                "The escape sequence '{sequence}' is not supported; valid escapes are \\n, \\\\ and \\\".",
            )),
            _ => None,
        }
    }
}

/// Kinds of tokenization errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexErrorKind {
    /// A malformed numeric literal like `1.2.3`.
    #[error("invalid numeric literal '{text}'")]
    InvalidNumber {
        /// The offending text.
        text: String,
    },

    /// A character or operator with no meaning in the language.
    #[error("unexpected token '{text}'")]
    UnexpectedToken {
        /// The offending text.
        text: String,
    },

    /// A string literal that ends at a newline or at end of input.
    #[error("unterminated string literal")]
    UnterminatedString,

    /// An unsupported backslash escape inside a string.
    #[error("invalid escape sequence '{sequence}'")]
    InvalidEscapeSequence {
        /// The offending escape text.
        sequence: String,
    },
}

// =============================================================================
// PARSE ERROR
// =============================================================================

/// A parse error with location information.
///
/// Lex errors are promoted into parse errors at the crate boundary so that
/// embedders handle a single error type per front end.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// Error kind with details.
    pub kind: ParseErrorKind,
    /// Source location of the error.
    pub span: Span,
    /// Optional single-token replacement suggestion.
    pub suggestion: Option<String>,
    /// Optional full-sentence hint.
    pub hint: Option<String>,
}

impl ParseError {
    /// Create a new parse error.
    pub const fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self {
            kind,
            span,
            suggestion: None,
            hint: None,
        }
    }

    /// Create an unexpected-token error.
    pub fn unexpected_token(found: impl Into<String>, expected: Option<&str>, span: Span) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedToken {
                found: found.into(),
                expected: expected.map(str::to_string),
            },
            span,
        )
    }

    /// Create a custom error with a free-form message.
    pub fn custom(message: impl Into<String>, span: Span) -> Self {
        Self::new(
            ParseErrorKind::Custom {
                message: message.into(),
            },
            span,
        )
    }

    /// Attach a replacement suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach a hint sentence.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Short message without position information.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// Render a full report with a caret-highlighted snippet of `source`.
    pub fn report(&self, source: &str) -> String {
        diagnostic::report(
            source,
            self.span,
            &self.message(),
            self.hint.as_deref(),
            self.suggestion.as_deref(),
        )
    }
}

impl From<LexError> for ParseError {
    fn from(error: LexError) -> Self {
        let suggestion = error.suggestion().map(str::to_string);
        let hint = error.hint();
        Self {
            kind: ParseErrorKind::Lex(error.kind),
            span: error.span,
            suggestion,
            hint,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at offset {}", self.kind, self.span.start())
    }
}

impl std::error::Error for ParseError {}

/// Kinds of parse errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// A token that does not fit the grammar at this position.
    UnexpectedToken {
        /// Display text of the token that was found.
        found: String,
        /// Description of what was expected, if known.
        expected: Option<String>,
    },

    /// A free-form grammar error.
    Custom {
        /// The error message.
        message: String,
    },

    /// A tokenization error surfaced through the parser.
    Lex(LexErrorKind),
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedToken { found, expected } => {
                write!(f, "unexpected token '{found}'")?;
                if let Some(expected) = expected {
                    write!(f, ", expected {expected}")?;
                }
                Ok(())
            }
            Self::Custom { message } => write!(f, "{message}"),
            Self::Lex(kind) => write!(f, "{kind}"),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
