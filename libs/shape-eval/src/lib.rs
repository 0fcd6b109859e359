//! # ShapeScript Evaluator
//!
//! Tree-walking evaluator for the ShapeScript language: the typed value
//! system, scoped symbol table, deterministic randomness, import
//! resolution, and scene assembly.
//!
//! ## Architecture
//!
//! ```text
//! .shape source → shape-parser ─┐
//!                               ├─ shape-ast AST → evaluator → Scene
//! .scad source  → scad-parser ──┘         (lowered)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use shape_eval::{evaluate, parse, LogDelegate};
//!
//! let program = parse("cube { size 2 }", None).unwrap();
//! let delegate = LogDelegate::new();
//! let scene = evaluate(&program, &delegate, None).unwrap();
//! assert_eq!(scene.children.len(), 1);
//! ```
//!
//! The evaluator is single-threaded and cooperative: pass a cancellation
//! poll to `evaluate` to abort long-running programs between statements.

pub mod builtins;
pub mod context;
pub mod delegate;
pub mod error;
pub mod evaluator;
pub mod geometry;
pub mod member;
pub mod rng;
pub mod symbols;
pub mod transform;
pub mod value;

pub use context::EvaluationContext;
pub use delegate::{Delegate, FileSystemDelegate, LogDelegate, ResolveError};
pub use error::{RuntimeError, RuntimeErrorKind};
pub use geometry::{Geometry, GeometryBuilder, GeometryKind, Path, SceneGraphBuilder};
pub use shape_parser::ParseError;
pub use value::{Color, Value, ValueType};

use shape_ast::Statement;
use std::path::PathBuf;
use std::rc::Rc;
use thiserror::Error;

// =============================================================================
// PROGRAM & SCENE
// =============================================================================

/// A parsed, immutable program.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// The original source text.
    pub source: String,
    /// The file the source came from, when known.
    pub file_url: Option<PathBuf>,
    /// Parsed statements (the `.scad` dialect arrives already lowered).
    pub statements: Vec<Statement>,
}

/// The result of evaluating a program: the root scene children.
#[derive(Debug, Clone)]
pub struct Scene {
    /// Top-level geometry nodes.
    pub children: Vec<Rc<Geometry>>,
}

// =============================================================================
// ERRORS
// =============================================================================

/// Any error a program can produce, from tokenization through evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A lex or parse error.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// An evaluation error.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl Error {
    /// The source span the error points at.
    pub fn span(&self) -> shape_ast::Span {
        match self {
            Self::Parse(error) => error.span,
            Self::Runtime(error) => error.span,
        }
    }

    /// Render a full report with a caret-highlighted snippet of `source`.
    pub fn report(&self, source: &str) -> String {
        match self {
            Self::Parse(error) => error.report(source),
            Self::Runtime(error) => error.report(source),
        }
    }
}

// =============================================================================
// EMBEDDER API
// =============================================================================

/// Parse source into a [`Program`].
///
/// The dialect is chosen by the file extension of `file_url`: `.scad`
/// parses through the OpenSCAD-style front end and lowers to the shared
/// AST; everything else is ShapeScript.
pub fn parse(source: &str, file_url: Option<PathBuf>) -> Result<Program, Error> {
    let is_scad = file_url
        .as_deref()
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("scad"));
    let statements = if is_scad {
        scad_parser::parse_and_lower(source)?
    } else {
        shape_parser::parse(source)?
    };
    Ok(Program {
        source: source.to_string(),
        file_url,
        statements,
    })
}

/// Evaluate a program with the default scene-graph geometry builder.
pub fn evaluate(
    program: &Program,
    delegate: &dyn Delegate,
    cancel: Option<&dyn Fn() -> bool>,
) -> Result<Scene, Error> {
    let mut builder = SceneGraphBuilder;
    evaluate_with_builder(program, delegate, cancel, &mut builder)
}

/// Evaluate a program against a custom geometry builder.
pub fn evaluate_with_builder(
    program: &Program,
    delegate: &dyn Delegate,
    cancel: Option<&dyn Fn() -> bool>,
    builder: &mut dyn GeometryBuilder,
) -> Result<Scene, Error> {
    tracing::debug!(
        target: "shapescript::eval",
        statements = program.statements.len(),
        "evaluating program"
    );
    let mut ctx = EvaluationContext::new(delegate, builder, cancel, program.file_url.clone());
    evaluator::evaluate_statements(&mut ctx, &program.statements)?;
    let children = ctx.geometry_children()?;
    Ok(Scene { children })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_evaluate_cube() {
        let program = parse("cube { size 2 }", None).unwrap();
        let delegate = LogDelegate::new();
        let scene = evaluate(&program, &delegate, None).unwrap();
        assert_eq!(scene.children.len(), 1);
        assert_eq!(scene.children[0].kind.tag(), "cube");
    }

    #[test]
    fn test_parse_scad_by_extension() {
        let program = parse("cube(2);", Some(PathBuf::from("model.scad"))).unwrap();
        let delegate = LogDelegate::new();
        let scene = evaluate(&program, &delegate, None).unwrap();
        assert_eq!(scene.children.len(), 1);
    }

    #[test]
    fn test_unused_value_at_root() {
        let program = parse("42", None).unwrap();
        let delegate = LogDelegate::new();
        let error = evaluate(&program, &delegate, None).unwrap_err();
        assert!(matches!(
            error,
            Error::Runtime(RuntimeError {
                kind: RuntimeErrorKind::UnusedValue,
                ..
            })
        ));
    }

    #[test]
    fn test_cancellation() {
        let program = parse("for i in 1 to 100 { cube }", None).unwrap();
        let delegate = LogDelegate::new();
        let cancel = || true;
        let error = evaluate(&program, &delegate, Some(&cancel)).unwrap_err();
        match error {
            Error::Runtime(error) => {
                assert!(error.message().contains("Cancelled"));
            }
            other => panic!("expected runtime error, got {other:?}"),
        }
    }

    #[test]
    fn test_error_report_renders_snippet() {
        let source = "spere";
        let program = parse(source, None).unwrap();
        let delegate = LogDelegate::new();
        let error = evaluate(&program, &delegate, None).unwrap_err();
        let report = error.report(source);
        assert!(report.contains("unknown symbol 'spere'"));
        assert!(report.contains("did you mean 'sphere'?"));
    }
}
