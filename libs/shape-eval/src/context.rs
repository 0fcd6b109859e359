//! # Evaluation Context
//!
//! The evaluator's mutable state: a stack of *frames* (one per block
//! context), each carrying its own symbol layers, transforms, material,
//! detail level, RNG, and collected children.
//!
//! Two scope mechanisms coexist, with different rules:
//!
//! - **Scopes** (`push_scope`/`pop_scope`) are used for `for`/`if` bodies
//!   and bare blocks: symbol definitions roll back on exit, but property
//!   writes (color, transforms, detail) persist in the frame.
//! - **Frames** (`push_frame`/`pop_frame`) are used for block invocations:
//!   the child copies material/detail/font/RNG from its parent, collects
//!   its own children, and on exit writes the RNG state back, except for
//!   custom-definition frames, which leave the parent's RNG untouched.

use crate::delegate::Delegate;
use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::geometry::{Geometry, GeometryBuilder, GeometryKind, Path, PathPoint};
use crate::rng::Rng;
use crate::symbols::{allowed_in, is_scoped, BlockType, Symbol};
use crate::transform::{Material, Transform};
use crate::value::Value;
use config::constants::{DEFAULT_DETAIL, MAX_RECURSION_DEPTH};
use shape_ast::{Span, Statement};
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

/// A value produced inside a block, tagged with its source span.
#[derive(Debug, Clone)]
pub struct Child {
    /// The produced value.
    pub value: Value,
    /// Where it was produced.
    pub span: Span,
}

// =============================================================================
// FRAME
// =============================================================================

/// One block context on the evaluation stack.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Scope rules for this frame.
    pub block_type: BlockType,
    /// Symbol layers, innermost last.
    layers: Vec<HashMap<String, Symbol>>,
    /// The block's own placement (`position`/`orientation`/`size`).
    pub local: Transform,
    /// The `orientation` property as written, mirrored for its getter.
    pub orientation: crate::value::Rotation,
    /// The child cursor advanced by `translate`/`rotate`/`scale`.
    pub cursor: Transform,
    /// Current material.
    pub material: Material,
    /// Current detail level.
    pub detail: u32,
    /// Current font, if set.
    pub font: Option<String>,
    /// Deterministic random generator.
    pub rng: Rng,
    /// The block's `name` property.
    pub name: Option<String>,
    /// Extrusion twist in half-turns.
    pub twist: f64,
    /// Paths to extrude along.
    pub along: Vec<Path>,
    /// Points collected by `point`/`curve` inside a `path` block.
    pub path_points: Vec<PathPoint>,
    /// Whether `close` was called inside a `path` block.
    pub path_closed: bool,
    /// URL of the file this frame evaluates, for import resolution.
    pub base_url: Option<PathBuf>,
    /// Values produced in this frame.
    pub children: Vec<Child>,
    /// Option values supplied by a custom invocation's caller body.
    pub option_values: HashMap<String, Value>,
}

impl Frame {
    fn root(base_url: Option<PathBuf>) -> Self {
        Self {
            block_type: BlockType::Root,
            layers: vec![HashMap::new()],
            local: Transform::identity(),
            orientation: crate::value::Rotation::default(),
            cursor: Transform::identity(),
            material: Material::default(),
            detail: DEFAULT_DETAIL,
            font: None,
            rng: Rng::default(),
            name: None,
            twist: 0.0,
            along: Vec::new(),
            path_points: Vec::new(),
            path_closed: false,
            base_url,
            children: Vec::new(),
            option_values: HashMap::new(),
        }
    }

    /// A child frame inheriting ambient state.
    fn child(&self, block_type: BlockType) -> Self {
        Self {
            block_type,
            layers: vec![HashMap::new()],
            local: Transform::identity(),
            orientation: crate::value::Rotation::default(),
            cursor: Transform::identity(),
            material: self.material.clone(),
            detail: self.detail,
            font: self.font.clone(),
            rng: self.rng,
            name: None,
            twist: 0.0,
            along: Vec::new(),
            path_points: Vec::new(),
            path_closed: false,
            base_url: self.base_url.clone(),
            children: Vec::new(),
            option_values: HashMap::new(),
        }
    }
}

// =============================================================================
// CONTEXT
// =============================================================================

/// The evaluator's full mutable state.
pub struct EvaluationContext<'a> {
    /// The embedder's collaborator.
    pub(crate) delegate: &'a dyn Delegate,
    /// The geometry collaborator.
    pub(crate) builder: &'a mut dyn GeometryBuilder,
    /// Cooperative cancellation poll.
    pub(crate) cancel: Option<&'a dyn Fn() -> bool>,
    /// Frame stack; never empty.
    frames: Vec<Frame>,
    /// Parsed programs by absolute URL, shared across nested imports.
    pub(crate) import_cache: HashMap<PathBuf, Rc<Vec<Statement>>>,
    /// Current block-invocation depth, for the recursion guard.
    depth: usize,
}

impl<'a> EvaluationContext<'a> {
    /// Create a context with a root frame.
    pub fn new(
        delegate: &'a dyn Delegate,
        builder: &'a mut dyn GeometryBuilder,
        cancel: Option<&'a dyn Fn() -> bool>,
        base_url: Option<PathBuf>,
    ) -> Self {
        Self {
            delegate,
            builder,
            cancel,
            frames: vec![Frame::root(base_url)],
            import_cache: HashMap::new(),
            depth: 0,
        }
    }

    /// The current (innermost) frame.
    pub fn frame(&self) -> &Frame {
        self.frames.last().expect("frame stack is never empty")
    }

    /// The current frame, mutably.
    pub fn frame_mut(&mut self) -> &mut Frame {
        self.frames.last_mut().expect("frame stack is never empty")
    }

    // =========================================================================
    // FRAMES & SCOPES
    // =========================================================================

    /// Enter a block context.
    pub fn push_frame(&mut self, block_type: BlockType) {
        let child = self.frame().child(block_type);
        self.frames.push(child);
    }

    /// Leave a block context, returning its frame.
    ///
    /// With `write_back_rng`, the parent adopts the child's generator state
    /// so random sequences behave as if the block ran inline. Definition
    /// frames pass `false`.
    pub fn pop_frame(&mut self, write_back_rng: bool) -> Frame {
        let frame = self.frames.pop().expect("pop_frame without push_frame");
        if write_back_rng {
            let parent = self.frame_mut();
            parent.rng = frame.rng;
        }
        frame
    }

    /// Enter a lexical scope within the current frame.
    pub fn push_scope(&mut self) {
        self.frame_mut().layers.push(HashMap::new());
    }

    /// Leave a lexical scope, discarding its symbol definitions.
    pub fn pop_scope(&mut self) {
        let frame = self.frame_mut();
        if frame.layers.len() > 1 {
            frame.layers.pop();
        }
    }

    /// Guard a block invocation against runaway recursion.
    pub fn enter_call(&mut self, span: Span) -> Result<(), RuntimeError> {
        self.depth += 1;
        if self.depth > MAX_RECURSION_DEPTH {
            return Err(RuntimeError::new(
                RuntimeErrorKind::AssertionFailure {
                    message: "Too much recursion".to_string(),
                },
                span,
            ));
        }
        Ok(())
    }

    /// Balance an `enter_call`.
    pub fn exit_call(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Raise a cancellation failure when the embedder's poll fires.
    pub fn check_cancelled(&self, span: Span) -> Result<(), RuntimeError> {
        if self.cancel.map(|poll| poll()).unwrap_or(false) {
            return Err(RuntimeError::new(
                RuntimeErrorKind::AssertionFailure {
                    message: "Cancelled".to_string(),
                },
                span,
            ));
        }
        Ok(())
    }

    // =========================================================================
    // SYMBOLS
    // =========================================================================

    /// Define a symbol in the innermost scope.
    pub fn define(&mut self, name: impl Into<String>, symbol: Symbol) {
        self.frame_mut()
            .layers
            .last_mut()
            .expect("frame has at least one layer")
            .insert(name.into(), symbol);
    }

    /// Resolve a symbol: local layers first (innermost frame outwards),
    /// then the built-ins permitted for the current block type.
    pub fn lookup(&self, name: &str) -> Option<Symbol> {
        for frame in self.frames.iter().rev() {
            for layer in frame.layers.iter().rev() {
                if let Some(symbol) = layer.get(name) {
                    return Some(symbol.clone());
                }
            }
        }
        let block_type = self.frame().block_type;
        if is_scoped(name) && !allowed_in(block_type, name) {
            return None;
        }
        crate::builtins::builtin(name)
    }

    /// Every name currently in scope, for suggestions.
    pub fn candidates(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for frame in &self.frames {
            for layer in &frame.layers {
                names.extend(layer.keys().cloned());
            }
        }
        let block_type = self.frame().block_type;
        names.extend(
            crate::builtins::builtin_names()
                .into_iter()
                .filter(|name| !is_scoped(name) || allowed_in(block_type, name))
                .map(str::to_string),
        );
        names.sort();
        names.dedup();
        names
    }

    // =========================================================================
    // CHILDREN
    // =========================================================================

    /// Record a produced value in the current frame.
    ///
    /// Meshes and paths pick up the frame's child cursor so that
    /// `translate`/`rotate`/`scale` position later children.
    pub fn push_child(&mut self, value: Value, span: Span) {
        let cursor = self.frame().cursor;
        let value = if cursor.is_identity() {
            value
        } else {
            match value {
                Value::Mesh(mesh) => {
                    let material = Material::default();
                    let wrapped = self.builder.build(
                        GeometryKind::Group,
                        cursor.matrix(),
                        &material,
                        None,
                        vec![mesh],
                        span,
                    );
                    Value::Mesh(wrapped)
                }
                Value::Path(path) => Value::Path(Rc::new(path.transformed(cursor.matrix()))),
                other => other,
            }
        };
        self.frame_mut().children.push(Child { value, span });
    }

    /// The meshes and paths of the current frame as geometry children,
    /// failing with `unusedValue` on anything else.
    pub fn geometry_children(&mut self) -> Result<Vec<Rc<Geometry>>, RuntimeError> {
        let children = std::mem::take(&mut self.frame_mut().children);
        let mut nodes = Vec::with_capacity(children.len());
        for child in children {
            match child.value {
                Value::Mesh(mesh) => nodes.push(mesh),
                Value::Path(path) => {
                    let material = self.frame().material.clone();
                    nodes.push(self.builder.build(
                        GeometryKind::Path {
                            path: (*path).clone(),
                        },
                        glam::DMat4::IDENTITY,
                        &material,
                        None,
                        Vec::new(),
                        child.span,
                    ));
                }
                _ => {
                    return Err(RuntimeError::new(RuntimeErrorKind::UnusedValue, child.span));
                }
            }
        }
        Ok(nodes)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delegate::LogDelegate;
    use crate::geometry::SceneGraphBuilder;

    fn with_context(run: impl FnOnce(&mut EvaluationContext)) {
        let delegate = LogDelegate::new();
        let mut builder = SceneGraphBuilder;
        let mut ctx = EvaluationContext::new(&delegate, &mut builder, None, None);
        run(&mut ctx);
    }

    #[test]
    fn test_scope_rolls_back_symbols() {
        with_context(|ctx| {
            ctx.define("x", Symbol::Constant(Value::Number(1.0)));
            ctx.push_scope();
            ctx.define("x", Symbol::Constant(Value::Number(2.0)));
            ctx.define("y", Symbol::Constant(Value::Number(3.0)));
            assert!(matches!(
                ctx.lookup("x"),
                Some(Symbol::Constant(Value::Number(n))) if n == 2.0
            ));
            ctx.pop_scope();
            assert!(matches!(
                ctx.lookup("x"),
                Some(Symbol::Constant(Value::Number(n))) if n == 1.0
            ));
            assert!(ctx.lookup("y").is_none());
        });
    }

    #[test]
    fn test_frame_sees_outer_symbols() {
        with_context(|ctx| {
            ctx.define("r", Symbol::Constant(Value::Number(5.0)));
            ctx.push_frame(BlockType::Group);
            assert!(ctx.lookup("r").is_some());
            ctx.pop_frame(true);
        });
    }

    #[test]
    fn test_frame_symbols_discarded_on_pop() {
        with_context(|ctx| {
            ctx.push_frame(BlockType::Group);
            ctx.define("inner", Symbol::Constant(Value::Number(1.0)));
            ctx.pop_frame(true);
            assert!(ctx.lookup("inner").is_none());
        });
    }

    #[test]
    fn test_rng_write_back_for_blocks() {
        with_context(|ctx| {
            let mut inline = Rng::default();
            inline.next_double();
            inline.next_double();

            ctx.push_frame(BlockType::Group);
            ctx.frame_mut().rng.next_double();
            ctx.frame_mut().rng.next_double();
            ctx.pop_frame(true);

            assert_eq!(ctx.frame().rng, inline);
        });
    }

    #[test]
    fn test_rng_unchanged_for_definitions() {
        with_context(|ctx| {
            let before = ctx.frame().rng;
            ctx.push_frame(BlockType::Custom);
            ctx.frame_mut().rng.next_double();
            ctx.frame_mut().rng.next_double();
            ctx.pop_frame(false);
            assert_eq!(ctx.frame().rng, before);
        });
    }

    #[test]
    fn test_block_type_gates_builtins() {
        with_context(|ctx| {
            // `position` resolves inside a primitive but not at the root.
            assert!(ctx.lookup("position").is_none());
            ctx.push_frame(BlockType::Primitive);
            assert!(ctx.lookup("position").is_some());
            ctx.pop_frame(true);
        });
    }

    #[test]
    fn test_recursion_guard_trips() {
        with_context(|ctx| {
            let span = Span::new(0, 3);
            let mut tripped = false;
            for _ in 0..=MAX_RECURSION_DEPTH {
                if ctx.enter_call(span).is_err() {
                    tripped = true;
                    break;
                }
            }
            assert!(tripped);
        });
    }

    #[test]
    fn test_unused_value_child() {
        with_context(|ctx| {
            ctx.push_frame(BlockType::Group);
            ctx.push_child(Value::Number(42.0), Span::new(0, 2));
            let error = ctx.geometry_children().unwrap_err();
            assert!(matches!(error.kind, RuntimeErrorKind::UnusedValue));
        });
    }
}
