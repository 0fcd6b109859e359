//! # SCAD AST Types
//!
//! Syntax tree for the OpenSCAD-style dialect. This tree is an intermediate
//! form: the evaluator never sees it, because `lower` rewrites it into the
//! ShapeScript AST.

use shape_ast::Span;

// =============================================================================
// STATEMENT
// =============================================================================

/// A statement in the OpenSCAD-style dialect.
#[derive(Debug, Clone, PartialEq)]
pub enum ScadStatement {
    /// Module call like `cube(10);` or `translate(v) cube(5);`.
    ///
    /// Transform chains store the chained statement(s) in `children`.
    Command {
        /// Module name.
        name: String,
        /// Call arguments, positional or named.
        args: Vec<ScadArgument>,
        /// Chained child statements, if any.
        children: Vec<ScadStatement>,
        /// Source span of the call head.
        span: Span,
    },

    /// Variable assignment like `x = 10;`.
    Assignment {
        /// Variable name.
        name: String,
        /// Assigned value.
        value: ScadExpression,
        /// Source span.
        span: Span,
    },

    /// Module definition like `module foo(a, b = 2) { ... }`.
    ModuleDefinition {
        /// Module name.
        name: String,
        /// Formal parameters.
        params: Vec<ScadParameter>,
        /// Body statements.
        body: Vec<ScadStatement>,
        /// Source span.
        span: Span,
    },

    /// Function definition like `function f(x) = x * 2;`.
    FunctionDefinition {
        /// Function name.
        name: String,
        /// Formal parameters.
        params: Vec<ScadParameter>,
        /// Body expression.
        body: ScadExpression,
        /// Source span.
        span: Span,
    },

    /// For loop like `for (i = [0:10]) { ... }`.
    ForLoop {
        /// Loop variable.
        variable: String,
        /// Range or vector to iterate.
        sequence: ScadExpression,
        /// Body statements.
        body: Vec<ScadStatement>,
        /// Source span.
        span: Span,
    },

    /// If/else statement.
    IfElse {
        /// Condition expression.
        condition: ScadExpression,
        /// Then branch.
        body: Vec<ScadStatement>,
        /// Optional else branch.
        else_body: Option<Vec<ScadStatement>>,
        /// Source span.
        span: Span,
    },

    /// Let statement like `let (a = 1) cube(a);`.
    Let {
        /// Bindings, in order.
        bindings: Vec<(String, ScadExpression)>,
        /// Body statements.
        body: Vec<ScadStatement>,
        /// Source span.
        span: Span,
    },

    /// Braced block of statements.
    Block {
        /// Statements in the block.
        statements: Vec<ScadStatement>,
        /// Source span.
        span: Span,
    },
}

impl ScadStatement {
    /// Source span of this statement.
    pub fn span(&self) -> Span {
        match self {
            Self::Command { span, .. }
            | Self::Assignment { span, .. }
            | Self::ModuleDefinition { span, .. }
            | Self::FunctionDefinition { span, .. }
            | Self::ForLoop { span, .. }
            | Self::IfElse { span, .. }
            | Self::Let { span, .. }
            | Self::Block { span, .. } => *span,
        }
    }
}

// =============================================================================
// EXPRESSION
// =============================================================================

/// An expression in the OpenSCAD-style dialect.
#[derive(Debug, Clone, PartialEq)]
pub enum ScadExpression {
    /// Number literal.
    Number(f64, Span),
    /// Boolean literal.
    Boolean(bool, Span),
    /// The `undef` literal.
    Undefined(Span),
    /// String literal, escapes resolved.
    String(String, Span),
    /// Identifier reference, `$` prefix included for special variables.
    Identifier(String, Span),
    /// Vector literal like `[1, 2, 3]`.
    Vector(Vec<ScadExpression>, Span),
    /// Range literal `[lo : hi]` or `[lo : step : hi]`.
    Range {
        /// Start expression.
        start: Box<ScadExpression>,
        /// Optional step expression.
        step: Option<Box<ScadExpression>>,
        /// End expression.
        end: Box<ScadExpression>,
        /// Source span including the brackets.
        span: Span,
    },
    /// Function call like `f(1, b = 2)`.
    Call {
        /// Function name.
        name: String,
        /// Call arguments.
        args: Vec<ScadArgument>,
        /// Source span.
        span: Span,
    },
    /// Prefix operation like `-x` or `!done`.
    Prefix {
        /// Operator.
        op: ScadPrefixOp,
        /// Operand.
        expr: Box<ScadExpression>,
        /// Source span.
        span: Span,
    },
    /// Infix operation.
    Infix {
        /// Left operand.
        lhs: Box<ScadExpression>,
        /// Operator.
        op: ScadInfixOp,
        /// Right operand.
        rhs: Box<ScadExpression>,
        /// Source span.
        span: Span,
    },
    /// Member access like `v.x`.
    Member {
        /// Receiver expression.
        expr: Box<ScadExpression>,
        /// Member name.
        name: String,
        /// Source span.
        span: Span,
    },
}

impl ScadExpression {
    /// Source span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Number(_, span)
            | Self::Boolean(_, span)
            | Self::Undefined(span)
            | Self::String(_, span)
            | Self::Identifier(_, span)
            | Self::Vector(_, span) => *span,
            Self::Range { span, .. }
            | Self::Call { span, .. }
            | Self::Prefix { span, .. }
            | Self::Infix { span, .. }
            | Self::Member { span, .. } => *span,
        }
    }
}

/// Infix operators of the OpenSCAD-style dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScadInfixOp {
    /// `||`
    Or,
    /// `&&`
    And,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `%`
    Modulo,
    /// `^`
    Power,
}

/// Prefix operators of the OpenSCAD-style dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScadPrefixOp {
    /// `-`
    Negate,
    /// `+`
    Plus,
    /// `!`
    Not,
}

// =============================================================================
// ARGUMENTS & PARAMETERS
// =============================================================================

/// A call-site argument, positional or named.
#[derive(Debug, Clone, PartialEq)]
pub struct ScadArgument {
    /// Argument name for `name = value` arguments.
    pub name: Option<String>,
    /// Argument value.
    pub value: ScadExpression,
}

impl ScadArgument {
    /// A positional argument.
    pub fn positional(value: ScadExpression) -> Self {
        Self { name: None, value }
    }

    /// A named argument.
    pub fn named(name: impl Into<String>, value: ScadExpression) -> Self {
        Self {
            name: Some(name.into()),
            value,
        }
    }
}

/// A formal parameter of a module or function definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ScadParameter {
    /// Parameter name.
    pub name: String,
    /// Optional default value.
    pub default: Option<ScadExpression>,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_span_accessor() {
        let stmt = ScadStatement::Assignment {
            name: "x".to_string(),
            value: ScadExpression::Number(1.0, Span::new(4, 5)),
            span: Span::new(0, 6),
        };
        assert_eq!(stmt.span(), Span::new(0, 6));
    }

    #[test]
    fn test_argument_constructors() {
        let arg = ScadArgument::named("center", ScadExpression::Boolean(true, Span::default()));
        assert_eq!(arg.name.as_deref(), Some("center"));
        let arg = ScadArgument::positional(ScadExpression::Number(1.0, Span::default()));
        assert!(arg.name.is_none());
    }
}
