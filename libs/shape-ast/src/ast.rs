//! # AST Types
//!
//! Abstract Syntax Tree node types for the ShapeScript language.
//!
//! Every node carries a [`Span`] into the source it was parsed from; the
//! OpenSCAD-style translator reuses these nodes with the spans of the
//! original `.scad` source, so diagnostics always point at real text.
//!
//! ## Example
//!
//! ```rust
//! use shape_ast::{Expression, ExpressionKind, Span};
//!
//! let one = Expression::new(ExpressionKind::Number(1.0), Span::new(0, 1));
//! assert_eq!(one.span, Span::new(0, 1));
//! ```

use crate::span::Span;
use serde::{Deserialize, Serialize};

// =============================================================================
// IDENTIFIER
// =============================================================================

/// A name with its source span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identifier {
    /// The identifier text.
    pub name: String,
    /// Source span.
    pub span: Span,
}

impl Identifier {
    /// Create a new identifier.
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

// =============================================================================
// STATEMENT
// =============================================================================

/// A statement with its source span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// Statement variant.
    pub kind: StatementKind,
    /// Source span.
    pub span: Span,
}

impl Statement {
    /// Create a new statement.
    pub fn new(kind: StatementKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Statement variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StatementKind {
    /// Name-headed command like `color 1 0 0` or `translate 1`.
    ///
    /// Adjacent argument expressions are collected into a single implicit
    /// tuple by the parser, so `argument` is `None`, a plain expression, or
    /// a tuple.
    Command {
        /// Command name.
        name: Identifier,
        /// Optional argument expression.
        argument: Option<Expression>,
    },

    /// A bare expression whose value flows into the enclosing block.
    Expression(Expression),

    /// Constant or custom-block definition like `define x 1`.
    Define {
        /// Defined name.
        name: Identifier,
        /// Expression or block body.
        definition: Definition,
    },

    /// Formal parameter of a custom block, like `option radius 1`.
    Option {
        /// Option name.
        name: Identifier,
        /// Default value expression.
        default: Expression,
    },

    /// For loop like `for i in 1 to 5 { ... }`; the index is optional.
    ForLoop {
        /// Optional loop variable.
        index: Option<Identifier>,
        /// Range or tuple to iterate.
        sequence: Expression,
        /// Loop body.
        body: Block,
    },

    /// Conditional like `if x > 1 { ... } else { ... }`.
    IfElse {
        /// Condition expression; must evaluate to a boolean.
        condition: Expression,
        /// Then branch.
        body: Block,
        /// Optional else branch (an else-if chain is a block containing a
        /// single nested `IfElse`).
        else_body: Option<Block>,
    },

    /// Import of another source file or geometry asset.
    Import(Expression),

    /// A bare braced block.
    Block(Block),
}

/// The right-hand side of a `define` statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Definition {
    /// `define x <expression>`, evaluated once at the definition site.
    Expression(Expression),
    /// `define x { ... }`, a custom block re-evaluated per invocation.
    Block(Block),
}

/// A brace-delimited sequence of statements forming a lexical scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Statements in source order.
    pub statements: Vec<Statement>,
    /// Source span including the braces.
    pub span: Span,
}

impl Block {
    /// Create a new block.
    pub fn new(statements: Vec<Statement>, span: Span) -> Self {
        Self { statements, span }
    }
}

// =============================================================================
// EXPRESSION
// =============================================================================

/// An expression with its source span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    /// Expression variant.
    pub kind: ExpressionKind,
    /// Source span.
    pub span: Span,
}

impl Expression {
    /// Create a new expression.
    pub fn new(kind: ExpressionKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Expression variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpressionKind {
    /// Number literal like `1.5`.
    Number(f64),
    /// String literal like `"hello"` (escapes already resolved).
    String(String),
    /// Hex color literal like `#f00` or `#ff000080`, stored without the `#`.
    HexColor(String),
    /// Identifier reference.
    Identifier(String),
    /// Tuple of juxtaposed or comma-separated expressions.
    Tuple(Vec<Expression>),
    /// Prefix operation like `-x` or `not done`.
    Prefix {
        /// Operator.
        op: PrefixOp,
        /// Operand.
        rhs: Box<Expression>,
    },
    /// Infix operation like `a + b`.
    Infix {
        /// Left operand.
        lhs: Box<Expression>,
        /// Operator.
        op: InfixOp,
        /// Right operand.
        rhs: Box<Expression>,
    },
    /// Member access like `v.x`.
    Member {
        /// Receiver expression.
        lhs: Box<Expression>,
        /// Member name.
        name: Identifier,
    },
    /// Range expression like `1 to 5 step 2`.
    ///
    /// `to` is absent for a bare `<range-value> step s` expression, which
    /// re-steps an existing range value.
    Range {
        /// Start expression.
        from: Box<Expression>,
        /// Optional end expression.
        to: Option<Box<Expression>>,
        /// Optional step expression.
        step: Option<Box<Expression>>,
    },
    /// Block invocation like `cube { size 2 }`.
    Block {
        /// Block symbol name.
        name: Identifier,
        /// Invocation body.
        block: Block,
    },
}

// =============================================================================
// OPERATORS
// =============================================================================

/// Infix operators, in the primary dialect's surface syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InfixOp {
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `=`
    Equal,
    /// `<>`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `and`
    And,
    /// `or`
    Or,
}

impl InfixOp {
    /// Surface syntax for error messages and printing.
    pub const fn display(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Equal => "=",
            Self::NotEqual => "<>",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrefixOp {
    /// `-`
    Minus,
    /// `+`
    Plus,
    /// `not`
    Not,
}

impl PrefixOp {
    /// Surface syntax for error messages and printing.
    pub const fn display(&self) -> &'static str {
        match self {
            Self::Minus => "-",
            Self::Plus => "+",
            Self::Not => "not",
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_new() {
        let ident = Identifier::new("cube", Span::new(0, 4));
        assert_eq!(ident.name, "cube");
        assert_eq!(ident.span.len(), 4);
    }

    #[test]
    fn test_operator_display() {
        assert_eq!(InfixOp::NotEqual.display(), "<>");
        assert_eq!(InfixOp::And.display(), "and");
        assert_eq!(PrefixOp::Not.display(), "not");
    }

    #[test]
    fn test_statement_round_trips_through_serde() {
        let stmt = Statement::new(
            StatementKind::Expression(Expression::new(
                ExpressionKind::Number(2.0),
                Span::new(0, 1),
            )),
            Span::new(0, 1),
        );
        let json = serde_json::to_string(&stmt).unwrap();
        let back: Statement = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stmt);
    }
}
