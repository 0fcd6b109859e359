//! # Expression Evaluation
//!
//! Evaluates expressions to values. The interesting rule lives in tuple
//! evaluation: an identifier that names a command consumes the remaining
//! tuple elements as its argument, which is how `print cos pi` computes
//! `cos(π)` instead of printing two symbols.

use crate::context::EvaluationContext;
use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::member;
use crate::symbols::Symbol;
use crate::value::{arithmetic, coerce, compare, negate, Color, RangeValue, Value, ValueType};
use shape_ast::{Expression, ExpressionKind, Identifier, InfixOp, PrefixOp, Span};

use super::{invoke_block, unknown_symbol};

/// Evaluate an expression to a value.
pub fn evaluate_expression(
    ctx: &mut EvaluationContext,
    expr: &Expression,
) -> Result<Value, RuntimeError> {
    match &expr.kind {
        ExpressionKind::Number(n) => Ok(Value::Number(*n)),

        ExpressionKind::String(s) => Ok(Value::String(s.clone())),

        ExpressionKind::HexColor(digits) => match Color::from_hex(digits) {
            Some(color) => Ok(Value::Color(color)),
            None => Err(RuntimeError::new(
                RuntimeErrorKind::TypeMismatch {
                    for_name: "color literal".to_string(),
                    index: 0,
                    expected: "color",
                    got: "string",
                },
                expr.span,
            )),
        },

        ExpressionKind::Identifier(name) => {
            let ident = Identifier::new(name.clone(), expr.span);
            evaluate_identifier(ctx, &ident)
        }

        ExpressionKind::Tuple(elements) => evaluate_tuple(ctx, elements, expr.span),

        ExpressionKind::Prefix { op, rhs } => {
            let value = evaluate_expression(ctx, rhs)?;
            match op {
                PrefixOp::Minus => negate(&value, expr.span),
                PrefixOp::Plus => match value {
                    Value::Number(_) | Value::Vector(_) | Value::Tuple(_) => Ok(value),
                    other => Err(RuntimeError::new(
                        RuntimeErrorKind::TypeMismatch {
                            for_name: "operator '+'".to_string(),
                            index: 0,
                            expected: "number",
                            got: other.type_name(),
                        },
                        expr.span,
                    )),
                },
                PrefixOp::Not => match value {
                    Value::Boolean(b) => Ok(Value::Boolean(!b)),
                    other => Err(RuntimeError::new(
                        RuntimeErrorKind::TypeMismatch {
                            for_name: "operator 'not'".to_string(),
                            index: 0,
                            expected: "boolean",
                            got: other.type_name(),
                        },
                        expr.span,
                    )),
                },
            }
        }

        ExpressionKind::Infix { lhs, op, rhs } => evaluate_infix(ctx, lhs, *op, rhs, expr.span),

        ExpressionKind::Member { lhs, name } => {
            let value = evaluate_expression(ctx, lhs)?;
            member::lookup(&value, &name.name, name.span)
        }

        ExpressionKind::Range { from, to, step } => evaluate_range(ctx, from, to, step, expr.span),

        ExpressionKind::Block { name, block } => {
            let Some(symbol) = ctx.lookup(&name.name) else {
                return Err(unknown_symbol(ctx, name));
            };
            match symbol {
                Symbol::Block { .. } | Symbol::Custom(_) => {
                    invoke_block(ctx, &name.name, &symbol, Some(block), expr.span)
                }
                _ => Err(RuntimeError::new(
                    RuntimeErrorKind::TypeMismatch {
                        for_name: name.name.clone(),
                        index: 0,
                        expected: "block",
                        got: "symbol",
                    },
                    name.span,
                )),
            }
        }
    }
}

/// Evaluate an identifier reference.
fn evaluate_identifier(
    ctx: &mut EvaluationContext,
    name: &Identifier,
) -> Result<Value, RuntimeError> {
    let Some(symbol) = ctx.lookup(&name.name) else {
        return Err(unknown_symbol(ctx, name));
    };
    match symbol {
        Symbol::Constant(value) => Ok(value),
        Symbol::Property { getter, .. } => Ok(getter(ctx)),
        Symbol::Command { expected, func } => {
            // A bare reference works only for argument-less commands
            // (`rnd`); anything else is missing its argument.
            if matches!(expected, ValueType::Void) {
                func(ctx, Value::void(), name.span)
            } else {
                Err(RuntimeError::new(
                    RuntimeErrorKind::MissingArgument {
                        for_name: name.name.clone(),
                        index: 0,
                        expected: expected.display(),
                    },
                    name.span,
                ))
            }
        }
        Symbol::Block { .. } | Symbol::Custom(_) => {
            invoke_block(ctx, &name.name, &symbol, None, name.span)
        }
        Symbol::OptionSlot => Err(unknown_symbol(ctx, name)),
    }
}

/// Evaluate a tuple, letting command identifiers consume the rest.
fn evaluate_tuple(
    ctx: &mut EvaluationContext,
    elements: &[Expression],
    span: Span,
) -> Result<Value, RuntimeError> {
    let mut values = Vec::with_capacity(elements.len());
    let mut index = 0;
    while index < elements.len() {
        let element = &elements[index];
        if let ExpressionKind::Identifier(name) = &element.kind {
            if let Some(Symbol::Command { expected, func }) = ctx.lookup(name) {
                let rest = &elements[index + 1..];
                let argument = if rest.is_empty() {
                    Value::void()
                } else {
                    evaluate_tuple(ctx, rest, span)?
                };
                if argument.is_void() && !matches!(expected, ValueType::Void | ValueType::Any) {
                    return Err(RuntimeError::new(
                        RuntimeErrorKind::MissingArgument {
                            for_name: name.clone(),
                            index: 0,
                            expected: expected.display(),
                        },
                        element.span,
                    ));
                }
                let argument = coerce(argument, expected, name, element.span)?;
                let result = func(ctx, argument, element.span)?;
                if !result.is_void() {
                    values.push(result);
                }
                break;
            }
        }
        let value = evaluate_expression(ctx, element)?;
        if !value.is_void() {
            values.push(value);
        }
        index += 1;
    }

    if values.len() == 1 {
        Ok(values.pop().expect("one value"))
    } else {
        Ok(Value::Tuple(values))
    }
}

/// Evaluate an infix operation.
fn evaluate_infix(
    ctx: &mut EvaluationContext,
    lhs: &Expression,
    op: InfixOp,
    rhs: &Expression,
    span: Span,
) -> Result<Value, RuntimeError> {
    // Logical operators short-circuit.
    if matches!(op, InfixOp::And | InfixOp::Or) {
        let lhs_value = evaluate_expression(ctx, lhs)?;
        let Value::Boolean(left) = lhs_value else {
            return Err(logic_mismatch(op, &lhs_value, lhs.span));
        };
        match (op, left) {
            (InfixOp::And, false) => return Ok(Value::Boolean(false)),
            (InfixOp::Or, true) => return Ok(Value::Boolean(true)),
            _ => {}
        }
        let rhs_value = evaluate_expression(ctx, rhs)?;
        let Value::Boolean(right) = rhs_value else {
            return Err(logic_mismatch(op, &rhs_value, rhs.span));
        };
        return Ok(Value::Boolean(right));
    }

    let lhs_value = evaluate_expression(ctx, lhs)?;
    let rhs_value = evaluate_expression(ctx, rhs)?;

    match op {
        InfixOp::Add => arithmetic("+", &lhs_value, &rhs_value, span, |a, b| a + b),
        InfixOp::Subtract => arithmetic("-", &lhs_value, &rhs_value, span, |a, b| a - b),
        InfixOp::Multiply => arithmetic("*", &lhs_value, &rhs_value, span, |a, b| a * b),
        InfixOp::Divide => arithmetic("/", &lhs_value, &rhs_value, span, |a, b| a / b),
        InfixOp::Equal => Ok(Value::Boolean(lhs_value == rhs_value)),
        InfixOp::NotEqual => Ok(Value::Boolean(lhs_value != rhs_value)),
        InfixOp::Less => compare("<", &lhs_value, &rhs_value, span, |o| o.is_lt()),
        InfixOp::LessEqual => compare("<=", &lhs_value, &rhs_value, span, |o| o.is_le()),
        InfixOp::Greater => compare(">", &lhs_value, &rhs_value, span, |o| o.is_gt()),
        InfixOp::GreaterEqual => compare(">=", &lhs_value, &rhs_value, span, |o| o.is_ge()),
        InfixOp::And | InfixOp::Or => unreachable!("handled above"),
    }
}

fn logic_mismatch(op: InfixOp, value: &Value, span: Span) -> RuntimeError {
    RuntimeError::new(
        RuntimeErrorKind::TypeMismatch {
            for_name: format!("operator '{}'", op.display()),
            index: 0,
            expected: "boolean",
            got: value.type_name(),
        },
        span,
    )
}

/// Evaluate a range expression, or re-step an existing range value.
fn evaluate_range(
    ctx: &mut EvaluationContext,
    from: &Expression,
    to: &Option<Box<Expression>>,
    step: &Option<Box<Expression>>,
    _span: Span,
) -> Result<Value, RuntimeError> {
    let from_value = evaluate_expression(ctx, from)?;
    let to_value = match to {
        Some(to_expr) => {
            let value = evaluate_expression(ctx, to_expr)?;
            Some(coerce(value, ValueType::Number, "range", to_expr.span)?)
        }
        None => None,
    };
    let step_value = match step {
        Some(step_expr) => {
            let value = evaluate_expression(ctx, step_expr)?;
            let value = coerce(value, ValueType::Number, "step", step_expr.span)?;
            let step_value = value.as_number().expect("coerced to a number");
            if step_value == 0.0 {
                return Err(RuntimeError::new(
                    RuntimeErrorKind::AssertionFailure {
                        message: "Step value must be nonzero".to_string(),
                    },
                    step_expr.span,
                ));
            }
            Some(step_value)
        }
        None => None,
    };

    match to_value {
        Some(to_value) => {
            let from_value = coerce(from_value, ValueType::Number, "range", from.span)?;
            Ok(Value::Range(RangeValue {
                from: from_value.as_number().expect("coerced to a number"),
                to: to_value.as_number().expect("coerced to a number"),
                step: step_value,
            }))
        }
        // `<range> step s` replaces the step of an existing range value.
        None => match from_value {
            Value::Range(range) => Ok(Value::Range(RangeValue {
                step: step_value.or(range.step),
                ..range
            })),
            other => Err(RuntimeError::new(
                RuntimeErrorKind::TypeMismatch {
                    for_name: "step".to_string(),
                    index: 0,
                    expected: "range",
                    got: other.type_name(),
                },
                from.span,
            )),
        },
    }
}
