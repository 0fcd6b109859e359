//! # Runtime Errors
//!
//! The closed set of evaluation errors. Every error carries a source span;
//! unknown-symbol and unknown-member errors also carry the candidate names
//! that were in scope, which drive "did you mean" suggestions.

use shape_ast::diagnostic;
use shape_ast::Span;
use thiserror::Error;

/// A runtime error with location information.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    /// Error kind with details.
    pub kind: RuntimeErrorKind,
    /// Source location of the error.
    pub span: Span,
}

impl RuntimeError {
    /// Create a new runtime error.
    pub const fn new(kind: RuntimeErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Short message without position information.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// Replacement suggestion for misspelled names.
    pub fn suggestion(&self) -> Option<String> {
        match &self.kind {
            RuntimeErrorKind::UnknownSymbol { name, options }
            | RuntimeErrorKind::UnknownMember { name, options, .. } => {
                diagnostic::suggest_with_aliases(name, options.iter().map(String::as_str))
            }
            _ => None,
        }
    }

    /// Optional full-sentence hint.
    pub fn hint(&self) -> Option<String> {
        match &self.kind {
            RuntimeErrorKind::UnusedValue => {
                Some("The enclosing block cannot consume a value of this type.".to_string())
            }
            RuntimeErrorKind::MissingArgument { expected, .. } => {
                Some(format!("Expected an argument of type {expected}."))
            }
            RuntimeErrorKind::ImportError { error, .. } => Some(error.message()),
            _ => None,
        }
    }

    /// Render a full report with a caret-highlighted snippet of `source`.
    pub fn report(&self, source: &str) -> String {
        diagnostic::report(
            source,
            self.span,
            &self.message(),
            self.hint().as_deref(),
            self.suggestion().as_deref(),
        )
    }
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at offset {}", self.kind, self.span.start())
    }
}

impl std::error::Error for RuntimeError {}

/// Kinds of runtime errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeErrorKind {
    /// A name that resolves to nothing in the current scope.
    #[error("unknown symbol '{name}'")]
    UnknownSymbol {
        /// The unresolved name.
        name: String,
        /// Names that were in scope, for suggestions.
        options: Vec<String>,
    },

    /// A member that the receiver type does not expose.
    #[error("unknown member '{name}' of {of}")]
    UnknownMember {
        /// The unresolved member name.
        name: String,
        /// Display name of the receiver type.
        of: &'static str,
        /// Valid member names, for suggestions.
        options: Vec<String>,
    },

    /// An argument of the wrong type.
    #[error("type mismatch for {for_name}: expected {expected}, got {got}")]
    TypeMismatch {
        /// The command or context that rejected the value.
        for_name: String,
        /// Zero-based argument index.
        index: usize,
        /// Display name of the expected type.
        expected: &'static str,
        /// Display name of the supplied type.
        got: &'static str,
    },

    /// A required argument that was not supplied.
    #[error("missing argument for {for_name}")]
    MissingArgument {
        /// The command that was invoked.
        for_name: String,
        /// Zero-based index of the missing argument.
        index: usize,
        /// Display name of the expected type.
        expected: &'static str,
    },

    /// More arguments than the command accepts.
    #[error("unexpected argument for {for_name}")]
    UnexpectedArgument {
        /// The command that was invoked.
        for_name: String,
        /// Maximum number of values accepted.
        max: usize,
    },

    /// A failed language-level assertion, e.g. runaway recursion.
    #[error("{message}")]
    AssertionFailure {
        /// The assertion message.
        message: String,
    },

    /// An import path that resolves to no file.
    #[error("file '{path}' not found")]
    FileNotFound {
        /// The offending path.
        path: String,
    },

    /// An import path outside the sandbox.
    #[error("file '{path}' is not accessible")]
    FileAccessRestricted {
        /// The offending path.
        path: String,
    },

    /// An imported file whose contents have the wrong type.
    #[error("file '{path}' is not a valid geometry file")]
    FileTypeMismatch {
        /// The offending path.
        path: String,
    },

    /// An imported source file that failed to parse.
    #[error("error parsing file '{path}'")]
    FileParsingError {
        /// The imported file.
        path: String,
        /// The rendered inner parse error.
        message: String,
    },

    /// A runtime error inside an imported file.
    #[error("error in imported file '{path}'")]
    ImportError {
        /// The imported file.
        path: String,
        /// The inner error.
        error: Box<RuntimeError>,
    },

    /// A value produced where the enclosing scope cannot consume one.
    #[error("unused value")]
    UnusedValue,

    /// A font name the text system does not know.
    #[error("unknown font '{name}'")]
    UnknownFont {
        /// The offending font name.
        name: String,
    },
}

// =============================================================================
// TESTS
// =============================================================================
