//! # Import Resolution
//!
//! Evaluates `import` statements. Source files (`.shape`, `.scad`) parse
//! through their front end and evaluate in the current context, so their
//! definitions become available to the importer; any other extension
//! goes to the delegate's geometry importer. Parsed programs are cached by
//! absolute URL for the duration of one evaluation.

use crate::context::EvaluationContext;
use crate::delegate::ResolveError;
use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::symbols::allowed_in;
use crate::value::{coerce, Value, ValueType};
use config::constants::{STACK_GROWTH_BYTES, STACK_RED_ZONE_BYTES};
use shape_ast::{Expression, Span, Statement};
use std::path::PathBuf;
use std::rc::Rc;

use super::{evaluate_expression, evaluate_statements};

/// Evaluate an `import` statement.
pub fn import(
    ctx: &mut EvaluationContext,
    expr: &Expression,
    span: Span,
) -> Result<(), RuntimeError> {
    let block_type = ctx.frame().block_type;
    if !allowed_in(block_type, "import") {
        return Err(RuntimeError::new(
            RuntimeErrorKind::UnknownSymbol {
                name: "import".to_string(),
                options: ctx.candidates(),
            },
            span,
        ));
    }

    let value = evaluate_expression(ctx, expr)?;
    let value = coerce(value, ValueType::String, "import", expr.span)?;
    let Value::String(path) = value else {
        unreachable!("coerced to a string");
    };

    let base = ctx.frame().base_url.clone();
    let url = ctx
        .delegate
        .resolve_url(&path, base.as_deref())
        .map_err(|error| resolve_error(error, &path, span))?;

    tracing::debug!(target: "shapescript::import", url = %url.display(), "importing");

    let extension = url
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("shape") | Some("scad") => import_source(ctx, url, span),
        _ => import_geometry(ctx, url, span),
    }
}

/// Parse (or fetch from cache) and evaluate a source file.
fn import_source(
    ctx: &mut EvaluationContext,
    url: PathBuf,
    span: Span,
) -> Result<(), RuntimeError> {
    let display = url.display().to_string();

    let statements: Rc<Vec<Statement>> = match ctx.import_cache.get(&url) {
        Some(cached) => cached.clone(),
        None => {
            let source = ctx
                .delegate
                .read_source(&url)
                .map_err(|error| resolve_error(error, &display, span))?;
            let is_scad = url
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("scad"));
            let parsed = if is_scad {
                scad_parser::parse_and_lower(&source)
            } else {
                shape_parser::parse(&source)
            }
            .map_err(|error| {
                RuntimeError::new(
                    RuntimeErrorKind::FileParsingError {
                        path: display.clone(),
                        message: error.report(&source),
                    },
                    span,
                )
            })?;
            let parsed = Rc::new(parsed);
            ctx.import_cache.insert(url.clone(), parsed.clone());
            parsed
        }
    };

    // Imported statements run in the current context so their definitions
    // become available; only the base URL switches for nested imports.
    // Nested evaluation counts against the call-depth guard, so a cyclic
    // import (a file importing itself, directly or via another file) trips
    // the recursion failure instead of recursing without bound.
    ctx.enter_call(span)?;
    let saved = ctx.frame().base_url.clone();
    ctx.frame_mut().base_url = Some(url);
    let result = stacker::maybe_grow(STACK_RED_ZONE_BYTES, STACK_GROWTH_BYTES, || {
        evaluate_statements(ctx, &statements)
    });
    ctx.frame_mut().base_url = saved;
    ctx.exit_call();

    result.map_err(|inner| {
        RuntimeError::new(
            RuntimeErrorKind::ImportError {
                path: display,
                error: Box::new(inner),
            },
            span,
        )
    })
}

/// Import a non-source file through the delegate.
fn import_geometry(
    ctx: &mut EvaluationContext,
    url: PathBuf,
    span: Span,
) -> Result<(), RuntimeError> {
    let display = url.display().to_string();
    match ctx.delegate.import_geometry(&url) {
        Ok(Some(geometry)) => {
            ctx.push_child(Value::Mesh(geometry), span);
            Ok(())
        }
        Ok(None) => Err(RuntimeError::new(
            RuntimeErrorKind::FileTypeMismatch { path: display },
            span,
        )),
        Err(error) => Err(resolve_error(error, &display, span)),
    }
}

fn resolve_error(error: ResolveError, path: &str, span: Span) -> RuntimeError {
    let kind = match error {
        ResolveError::NotFound => RuntimeErrorKind::FileNotFound {
            path: path.to_string(),
        },
        ResolveError::AccessRestricted => RuntimeErrorKind::FileAccessRestricted {
            path: path.to_string(),
        },
    };
    RuntimeError::new(kind, span)
}
