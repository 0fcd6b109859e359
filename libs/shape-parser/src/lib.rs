//! # ShapeScript Parser
//!
//! Tokenizer and recursive descent parser for the primary ShapeScript
//! dialect.
//!
//! ## Architecture
//!
//! ```text
//! Source Text → Lexer → Tokens → Parser → shape-ast AST
//! ```
//!
//! ## Example
//!
//! ```rust
//! use shape_parser::parse;
//!
//! let statements = parse("cube { size 2 }").unwrap();
//! assert_eq!(statements.len(), 1);
//! ```
//!
//! Parsing halts at the first error; the language has no error-recovery
//! mode, so a failed parse never yields a partial program.

pub mod error;
pub mod lexer;
pub mod parser;

pub use error::{LexError, LexErrorKind, ParseError, ParseErrorKind};
pub use lexer::{Keyword, Lexer, Token, TokenKind};

use shape_ast::Statement;

/// Parse ShapeScript source into a statement list.
///
/// This is the main entry point for the primary dialect.
///
/// ## Example
///
/// ```rust
/// let statements = shape_parser::parse("print 1 2 3").unwrap();
/// assert_eq!(statements.len(), 1);
/// ```
pub fn parse(source: &str) -> Result<Vec<Statement>, ParseError> {
    let tokens = Lexer::new(source).tokenize()?;
    parser::Parser::new(tokens).parse()
}

// =============================================================================
// TESTS
// =============================================================================
