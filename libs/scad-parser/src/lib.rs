//! # OpenSCAD-style Front End
//!
//! Lexer and parser for the OpenSCAD-style dialect, plus the AST-to-AST
//! lowering that rewrites it into the ShapeScript AST so both front ends
//! share one evaluator.
//!
//! ## Architecture
//!
//! ```text
//! .scad Source → Lexer → Tokens → Parser → SCAD AST → lower → shape-ast AST
//! ```
//!
//! Source spans survive the lowering verbatim, so runtime errors in
//! translated programs still point at the original `.scad` text.
//!
//! ## Example
//!
//! ```rust
//! let statements = scad_parser::parse_and_lower("cube(10);").unwrap();
//! assert_eq!(statements.len(), 1);
//! ```

pub mod ast;
pub mod lexer;
pub mod lower;
pub mod parser;

pub use ast::{ScadArgument, ScadExpression, ScadParameter, ScadStatement};
pub use lexer::{ScadKeyword, ScadLexer, ScadToken, ScadTokenKind};
pub use lower::lower;

use shape_ast::Statement;
use shape_parser::ParseError;

/// Parse OpenSCAD-style source into its dialect AST.
pub fn parse(source: &str) -> Result<Vec<ScadStatement>, ParseError> {
    let tokens = ScadLexer::new(source).tokenize()?;
    parser::ScadParser::new(tokens).parse()
}

/// Parse OpenSCAD-style source and lower it to the ShapeScript AST.
///
/// This is the entry point used by the evaluator for `.scad` files.
pub fn parse_and_lower(source: &str) -> Result<Vec<Statement>, ParseError> {
    let statements = parse(source)?;
    lower(&statements)
}

// =============================================================================
// TESTS
// =============================================================================
