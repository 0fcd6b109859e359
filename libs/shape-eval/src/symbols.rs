//! # Symbols
//!
//! Symbol table entries and the per-block-type visibility rules.
//!
//! Built-ins are a closed set known at compile time; user programs add
//! `Constant` and `Custom` entries through `define`. Which built-ins are
//! visible depends on the *block type* of the current context: `position`
//! means nothing at the root, `point` only exists inside `path`, and so on.
//! Pure symbols (constants, math functions, `print`) are visible everywhere.

use crate::context::EvaluationContext;
use crate::error::RuntimeError;
use crate::value::{Value, ValueType};
use shape_ast::{Span, Statement};
use std::rc::Rc;

/// A command implementation.
pub type CommandFn = fn(&mut EvaluationContext, Value, Span) -> Result<Value, RuntimeError>;
/// A property read.
pub type GetterFn = fn(&EvaluationContext) -> Value;
/// A property write.
pub type SetterFn = fn(&mut EvaluationContext, Value, Span) -> Result<(), RuntimeError>;
/// A built-in block body: reads the invocation frame, returns the result.
pub type BuilderFn = fn(&mut EvaluationContext, Span) -> Result<Value, RuntimeError>;

// =============================================================================
// SYMBOL
// =============================================================================

/// A symbol table entry.
#[derive(Clone)]
pub enum Symbol {
    /// A fixed value, e.g. `pi` or a `define`d expression result.
    Constant(Value),

    /// A statement-callable command with a typed argument.
    Command {
        /// Argument type the command expects.
        expected: ValueType,
        /// Implementation.
        func: CommandFn,
    },

    /// Read/write ambient state, e.g. `color` or `detail`.
    Property {
        /// Value type the setter expects.
        expected: ValueType,
        /// Write implementation.
        setter: SetterFn,
        /// Read implementation.
        getter: GetterFn,
    },

    /// A built-in block like `cube` or `difference`.
    Block {
        /// The scope rules the block's body runs under.
        block_type: BlockType,
        /// Builds the block's result from its evaluated frame.
        builder: BuilderFn,
    },

    /// A user-defined block (`define name { ... }`).
    Custom(Rc<CustomBlock>),

    /// A settable option name inside a custom block invocation body.
    OptionSlot,
}

impl std::fmt::Debug for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Constant(value) => write!(f, "Constant({value})"),
            Self::Command { expected, .. } => write!(f, "Command({})", expected.display()),
            Self::Property { expected, .. } => write!(f, "Property({})", expected.display()),
            Self::Block { block_type, .. } => write!(f, "Block({block_type:?})"),
            Self::Custom(_) => write!(f, "Custom"),
            Self::OptionSlot => write!(f, "OptionSlot"),
        }
    }
}

/// A stored custom block definition.
#[derive(Debug)]
pub struct CustomBlock {
    /// Names declared by `option` statements in the body.
    pub options: Vec<String>,
    /// The definition body.
    pub body: Vec<Statement>,
}

impl CustomBlock {
    /// Build a definition from a block body, collecting its option names.
    pub fn new(body: Vec<Statement>) -> Self {
        let options = body
            .iter()
            .filter_map(|statement| match &statement.kind {
                shape_ast::StatementKind::Option { name, .. } => Some(name.name.clone()),
                _ => None,
            })
            .collect();
        Self { options, body }
    }
}

// =============================================================================
// BLOCK TYPES
// =============================================================================

/// The closed set of scope flavors, controlling symbol visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    /// Top level of a program.
    Root,
    /// `group { ... }`.
    Group,
    /// Leaf shapes: `cube`, `sphere`, `cylinder`, `cone`.
    Primitive,
    /// Path-consuming builders: `extrude`, `lathe`, `loft`, `fill`.
    Builder,
    /// Boolean operations: `union`, `difference`, ...
    Csg,
    /// A user-defined block invocation.
    Custom,
    /// Path construction: `path`, `circle`, `square`.
    Path,
}

/// Whether a *scoped* built-in symbol is visible in a block type.
///
/// Names not listed here (constants, math functions, `print`, `debug`, and
/// ambient material properties) are visible everywhere and never reach this
/// check.
pub fn allowed_in(block_type: BlockType, name: &str) -> bool {
    use BlockType::*;
    match name {
        // Mesh-producing blocks. They resolve inside builders too, where
        // their value then fails as unused rather than as an unknown name.
        "cube" | "sphere" | "cylinder" | "cone" | "group" | "union" | "difference"
        | "intersection" | "xor" | "stencil" | "hull" | "extrude" | "lathe" | "loft" | "fill" => {
            matches!(block_type, Root | Group | Csg | Custom | Builder)
        }
        // Path-producing blocks nest in builders and other paths too.
        "circle" | "square" | "path" => {
            matches!(block_type, Root | Group | Csg | Custom | Builder | Path)
        }
        // Placement properties of a block, meaningless at the root.
        "name" | "position" | "orientation" | "size" => !matches!(block_type, Root),
        // Builder-only options.
        "twist" | "along" => matches!(block_type, Builder),
        // Path construction commands.
        "point" | "curve" | "close" => matches!(block_type, Path),
        // Child transforms make no sense inside a leaf primitive.
        "translate" | "rotate" | "scale" => !matches!(block_type, Primitive),
        "import" => !matches!(block_type, Primitive | Path),
        _ => true,
    }
}

/// True for names subject to [`allowed_in`] filtering.
pub fn is_scoped(name: &str) -> bool {
    matches!(
        name,
        "cube"
            | "sphere"
            | "cylinder"
            | "cone"
            | "group"
            | "union"
            | "difference"
            | "intersection"
            | "xor"
            | "stencil"
            | "hull"
            | "extrude"
            | "lathe"
            | "loft"
            | "fill"
            | "circle"
            | "square"
            | "path"
            | "name"
            | "position"
            | "orientation"
            | "size"
            | "twist"
            | "along"
            | "point"
            | "curve"
            | "close"
            | "translate"
            | "rotate"
            | "scale"
            | "import"
    )
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_not_allowed_at_root() {
        assert!(!allowed_in(BlockType::Root, "position"));
        assert!(allowed_in(BlockType::Group, "position"));
        assert!(allowed_in(BlockType::Primitive, "position"));
    }

    #[test]
    fn test_shapes_not_allowed_in_primitives() {
        assert!(!allowed_in(BlockType::Primitive, "sphere"));
        assert!(allowed_in(BlockType::Csg, "sphere"));
    }

    #[test]
    fn test_paths_allowed_in_builders() {
        assert!(allowed_in(BlockType::Builder, "circle"));
        assert!(allowed_in(BlockType::Builder, "cube"));
        assert!(!allowed_in(BlockType::Primitive, "circle"));
    }

    #[test]
    fn test_point_only_in_paths() {
        assert!(allowed_in(BlockType::Path, "point"));
        assert!(!allowed_in(BlockType::Group, "point"));
    }

    #[test]
    fn test_unscoped_names_always_allowed() {
        assert!(!is_scoped("color"));
        assert!(!is_scoped("pi"));
        assert!(is_scoped("size"));
    }

    #[test]
    fn test_custom_block_collects_options() {
        use shape_ast::{Expression, ExpressionKind, Identifier, StatementKind};
        let span = Span::new(0, 1);
        let body = vec![
            Statement::new(
                StatementKind::Option {
                    name: Identifier::new("spokes", span),
                    default: Expression::new(ExpressionKind::Number(5.0), span),
                },
                span,
            ),
            Statement::new(
                StatementKind::Expression(Expression::new(ExpressionKind::Number(1.0), span)),
                span,
            ),
        ];
        let custom = CustomBlock::new(body);
        assert_eq!(custom.options, vec!["spokes".to_string()]);
    }
}
