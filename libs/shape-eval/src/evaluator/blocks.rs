//! # Block Invocation
//!
//! Runs built-in blocks (`cube { ... }`) and custom blocks
//! (`define wheel { ... }` + `wheel { spokes 6 }`).
//!
//! Custom invocation order: the caller's body runs first with the declared
//! option names registered as settable slots; then the definition body runs
//! in two passes: option statements bind (caller value or default), then the
//! remaining statements execute. Custom frames never write the RNG back.

use crate::context::EvaluationContext;
use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::symbols::{BlockType, CustomBlock, Symbol};
use crate::value::Value;
use config::constants::{STACK_GROWTH_BYTES, STACK_RED_ZONE_BYTES};
use shape_ast::{Block, Span, StatementKind};

use super::{evaluate_expression, evaluate_statement, evaluate_statements};

/// Invoke a block symbol with an optional caller body.
///
/// Deeply nested invocations (the depth guard allows 1000) can outgrow the
/// native stack, so the recursion point grows it on demand.
pub fn invoke_block(
    ctx: &mut EvaluationContext,
    name: &str,
    symbol: &Symbol,
    body: Option<&Block>,
    span: Span,
) -> Result<Value, RuntimeError> {
    ctx.enter_call(span)?;
    tracing::trace!(target: "shapescript::eval", block = name, "invoke");
    let result = stacker::maybe_grow(STACK_RED_ZONE_BYTES, STACK_GROWTH_BYTES, || {
        match symbol {
            Symbol::Block {
                block_type,
                builder,
            } => invoke_builtin(ctx, *block_type, *builder, body, span),
            Symbol::Custom(custom) => invoke_custom(ctx, custom, body, span),
            _ => Err(RuntimeError::new(
                RuntimeErrorKind::TypeMismatch {
                    for_name: name.to_string(),
                    index: 0,
                    expected: "block",
                    got: "symbol",
                },
                span,
            )),
        }
    });
    ctx.exit_call();
    result
}

/// Run a built-in block: evaluate the body, then hand the frame to the
/// block's builder.
fn invoke_builtin(
    ctx: &mut EvaluationContext,
    block_type: BlockType,
    builder: crate::symbols::BuilderFn,
    body: Option<&Block>,
    span: Span,
) -> Result<Value, RuntimeError> {
    ctx.push_frame(block_type);
    let result = (|| {
        if let Some(block) = body {
            evaluate_statements(ctx, &block.statements)?;
        }
        builder(ctx, span)
    })();
    ctx.pop_frame(true);
    result
}

/// Run a custom block invocation.
fn invoke_custom(
    ctx: &mut EvaluationContext,
    custom: &CustomBlock,
    body: Option<&Block>,
    _span: Span,
) -> Result<Value, RuntimeError> {
    ctx.push_frame(BlockType::Custom);
    let result = (|| {
        // The caller body may set declared options by name.
        for option in &custom.options {
            ctx.define(option.clone(), Symbol::OptionSlot);
        }
        if let Some(block) = body {
            evaluate_statements(ctx, &block.statements)?;
        }

        // First pass: bind every option to the caller's value or the
        // evaluated default.
        for statement in &custom.body {
            if let StatementKind::Option { name, default } = &statement.kind {
                let value = match ctx.frame_mut().option_values.remove(&name.name) {
                    Some(value) => value,
                    None => evaluate_expression(ctx, default)?,
                };
                ctx.define(name.name.clone(), Symbol::Constant(value));
            }
        }

        // Second pass: the remaining statements.
        for statement in &custom.body {
            if matches!(statement.kind, StatementKind::Option { .. }) {
                continue;
            }
            ctx.check_cancelled(statement.span)?;
            evaluate_statement(ctx, statement)?;
        }
        Ok(())
    })();

    // Definition contexts never write the RNG back.
    let frame = ctx.pop_frame(false);
    result?;

    let mut children = frame.children;
    Ok(match children.len() {
        0 => Value::void(),
        1 => children.pop().expect("one child").value,
        _ => Value::Tuple(children.into_iter().map(|child| child.value).collect()),
    })
}
