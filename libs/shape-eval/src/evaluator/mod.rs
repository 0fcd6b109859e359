//! # Evaluator
//!
//! Tree-walk over the AST. Statements evaluate in source order; every
//! produced value lands in the current frame's children, and block
//! invocations collapse their frame's children into a single result value.

mod blocks;
mod expressions;
mod imports;

pub use blocks::invoke_block;
pub use expressions::evaluate_expression;

use crate::context::EvaluationContext;
use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::symbols::{CustomBlock, Symbol};
use crate::value::{coerce, Value, ValueType};
use shape_ast::{Definition, Expression, Identifier, Statement, StatementKind};
use std::rc::Rc;

/// Evaluate a statement list in the current context.
pub fn evaluate_statements(
    ctx: &mut EvaluationContext,
    statements: &[Statement],
) -> Result<(), RuntimeError> {
    for statement in statements {
        ctx.check_cancelled(statement.span)?;
        evaluate_statement(ctx, statement)?;
    }
    Ok(())
}

/// Evaluate a single statement.
pub fn evaluate_statement(
    ctx: &mut EvaluationContext,
    statement: &Statement,
) -> Result<(), RuntimeError> {
    match &statement.kind {
        StatementKind::Command { name, argument } => {
            evaluate_command(ctx, name, argument.as_ref(), statement.span)
        }

        StatementKind::Expression(expr) => {
            let value = evaluate_expression(ctx, expr)?;
            if !value.is_void() {
                ctx.push_child(value, expr.span);
            }
            Ok(())
        }

        StatementKind::Define { name, definition } => {
            let symbol = match definition {
                Definition::Expression(expr) => {
                    Symbol::Constant(evaluate_expression(ctx, expr)?)
                }
                Definition::Block(block) => {
                    Symbol::Custom(Rc::new(CustomBlock::new(block.statements.clone())))
                }
            };
            ctx.define(name.name.clone(), symbol);
            Ok(())
        }

        // Option statements are consumed by the custom-block invocation's
        // binding pass; reaching one here means it appeared outside a
        // definition body.
        StatementKind::Option { name, .. } => Err(RuntimeError::new(
            RuntimeErrorKind::AssertionFailure {
                message: format!(
                    "Option '{}' is only valid inside a block definition",
                    name.name
                ),
            },
            statement.span,
        )),

        StatementKind::ForLoop {
            index,
            sequence,
            body,
        } => {
            let sequence_value = evaluate_expression(ctx, sequence)?;
            let sequence_value = coerce(sequence_value, ValueType::Sequence, "for", sequence.span)?;
            let elements: Vec<Value> = match sequence_value {
                Value::Range(range) => range.iter().map(Value::Number).collect(),
                Value::Tuple(values) => values,
                _ => unreachable!("coerced to a sequence"),
            };
            for element in elements {
                ctx.check_cancelled(statement.span)?;
                ctx.push_scope();
                if let Some(index) = index {
                    ctx.define(index.name.clone(), Symbol::Constant(element));
                }
                let result = evaluate_statements(ctx, &body.statements);
                ctx.pop_scope();
                result?;
            }
            Ok(())
        }

        StatementKind::IfElse {
            condition,
            body,
            else_body,
        } => {
            let value = evaluate_expression(ctx, condition)?;
            let value = coerce(value, ValueType::Boolean, "if", condition.span)?;
            let Value::Boolean(truthy) = value else {
                unreachable!("coerced to a boolean");
            };
            let branch = if truthy {
                Some(body)
            } else {
                else_body.as_ref()
            };
            if let Some(branch) = branch {
                ctx.push_scope();
                let result = evaluate_statements(ctx, &branch.statements);
                ctx.pop_scope();
                result?;
            }
            Ok(())
        }

        StatementKind::Import(expr) => imports::import(ctx, expr, statement.span),

        StatementKind::Block(block) => {
            ctx.push_scope();
            let result = evaluate_statements(ctx, &block.statements);
            ctx.pop_scope();
            result
        }
    }
}

/// Evaluate a command statement: resolve the symbol and dispatch.
fn evaluate_command(
    ctx: &mut EvaluationContext,
    name: &Identifier,
    argument: Option<&Expression>,
    span: shape_ast::Span,
) -> Result<(), RuntimeError> {
    let Some(symbol) = ctx.lookup(&name.name) else {
        return Err(unknown_symbol(ctx, name));
    };

    match symbol {
        // A declared option being set by a custom invocation's caller body.
        Symbol::OptionSlot => {
            let Some(expr) = argument else {
                return Err(RuntimeError::new(
                    RuntimeErrorKind::MissingArgument {
                        for_name: name.name.clone(),
                        index: 0,
                        expected: ValueType::Any.display(),
                    },
                    span,
                ));
            };
            let value = evaluate_expression(ctx, expr)?;
            ctx.frame_mut()
                .option_values
                .insert(name.name.clone(), value);
            Ok(())
        }

        Symbol::Command { expected, func } => {
            let value = match argument {
                Some(expr) => evaluate_expression(ctx, expr)?,
                None => Value::void(),
            };
            if value.is_void() && !matches!(expected, ValueType::Void | ValueType::Any) {
                return Err(RuntimeError::new(
                    RuntimeErrorKind::MissingArgument {
                        for_name: name.name.clone(),
                        index: 0,
                        expected: expected.display(),
                    },
                    span,
                ));
            }
            let arg_span = argument.map(|e| e.span).unwrap_or(span);
            let value = coerce(value, expected, &name.name, arg_span)?;
            let result = func(ctx, value, span)?;
            if !result.is_void() {
                ctx.push_child(result, span);
            }
            Ok(())
        }

        Symbol::Property { expected, setter, .. } => {
            let Some(expr) = argument else {
                return Err(RuntimeError::new(
                    RuntimeErrorKind::MissingArgument {
                        for_name: name.name.clone(),
                        index: 0,
                        expected: expected.display(),
                    },
                    span,
                ));
            };
            let value = evaluate_expression(ctx, expr)?;
            let value = coerce(value, expected, &name.name, expr.span)?;
            setter(ctx, value, span)
        }

        // A bare block name invokes the block with an empty body.
        Symbol::Block { .. } | Symbol::Custom(_) => {
            if argument.is_some() {
                return Err(RuntimeError::new(
                    RuntimeErrorKind::UnexpectedArgument {
                        for_name: name.name.clone(),
                        max: 0,
                    },
                    span,
                ));
            }
            let value = invoke_block(ctx, &name.name, &symbol, None, span)?;
            if !value.is_void() {
                ctx.push_child(value, span);
            }
            Ok(())
        }

        Symbol::Constant(value) => {
            if argument.is_some() {
                return Err(RuntimeError::new(
                    RuntimeErrorKind::UnexpectedArgument {
                        for_name: name.name.clone(),
                        max: 0,
                    },
                    span,
                ));
            }
            ctx.push_child(value, span);
            Ok(())
        }
    }
}

/// Build an unknown-symbol error with suggestion candidates.
pub(crate) fn unknown_symbol(ctx: &EvaluationContext, name: &Identifier) -> RuntimeError {
    RuntimeError::new(
        RuntimeErrorKind::UnknownSymbol {
            name: name.name.clone(),
            options: ctx.candidates(),
        },
        name.span,
    )
}
