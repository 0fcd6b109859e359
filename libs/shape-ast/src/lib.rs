//! # ShapeScript AST
//!
//! Source spans, syntax tree types, canonical printing, and diagnostics for
//! the ShapeScript language.
//!
//! ## Architecture
//!
//! ```text
//! Source Text → Lexer → Tokens → Parser → AST (this crate) → Evaluator
//! ```
//!
//! Both language front ends (the ShapeScript parser and the OpenSCAD-style
//! translator) produce the AST defined here, so a single evaluator serves
//! both dialects.

pub mod ast;
pub mod diagnostic;
pub mod printer;
pub mod span;

pub use ast::{
    Block, Definition, Expression, ExpressionKind, Identifier, InfixOp, PrefixOp, Statement,
    StatementKind,
};
pub use diagnostic::{edit_distance, suggest, suggest_with_aliases};
pub use printer::print_statements;
pub use span::Span;
