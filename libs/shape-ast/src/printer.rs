//! Canonical source printer for the primary AST.
//!
//! Printing is span-free, so `print ∘ parse` is idempotent: feeding the
//! printed text back through the parser yields an identical canonical form.
//! Operands are parenthesized whenever they are not atomic, which keeps the
//! reparse structurally equal without tracking precedence here.

use crate::ast::*;

/// Prints a statement list in canonical form, one statement per line.
pub fn print_statements(statements: &[Statement]) -> String {
    statements
        .iter()
        .map(|s| print_statement(s, 0))
        .collect::<Vec<_>>()
        .join("\n")
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn print_statement(statement: &Statement, depth: usize) -> String {
    let pad = indent(depth);
    match &statement.kind {
        StatementKind::Command { name, argument } => match argument {
            Some(arg) => format!("{pad}{} {}", name.name, print_operand(arg, depth)),
            None => format!("{pad}{}", name.name),
        },
        StatementKind::Expression(expr) => format!("{pad}{}", print_expr(expr, depth)),
        StatementKind::Define { name, definition } => match definition {
            Definition::Expression(expr) => {
                format!("{pad}define {} {}", name.name, print_operand(expr, depth))
            }
            Definition::Block(block) => {
                format!("{pad}define {} {}", name.name, print_block(block, depth))
            }
        },
        StatementKind::Option { name, default } => {
            format!("{pad}option {} {}", name.name, print_operand(default, depth))
        }
        StatementKind::ForLoop {
            index,
            sequence,
            body,
        } => {
            let head = match index {
                Some(ident) => format!("for {} in ", ident.name),
                None => "for ".to_string(),
            };
            format!(
                "{pad}{head}{} {}",
                print_operand(sequence, depth),
                print_block(body, depth)
            )
        }
        StatementKind::IfElse {
            condition,
            body,
            else_body,
        } => {
            let mut out = format!(
                "{pad}if {} {}",
                print_operand(condition, depth),
                print_block(body, depth)
            );
            if let Some(else_block) = else_body {
                // An else-if chain is stored as a block holding one IfElse.
                if let [only] = else_block.statements.as_slice() {
                    if matches!(only.kind, StatementKind::IfElse { .. }) {
                        out.push_str(" else ");
                        out.push_str(print_statement(only, depth).trim_start());
                        return out;
                    }
                }
                out.push_str(" else ");
                out.push_str(&print_block(else_block, depth));
            }
            out
        }
        StatementKind::Import(expr) => format!("{pad}import {}", print_operand(expr, depth)),
        StatementKind::Block(block) => format!("{pad}{}", print_block(block, depth)),
    }
}

fn print_block(block: &Block, depth: usize) -> String {
    if block.statements.is_empty() {
        return "{}".to_string();
    }
    let body = block
        .statements
        .iter()
        .map(|s| print_statement(s, depth + 1))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{{\n{body}\n{}}}", indent(depth))
}

fn print_expr(expr: &Expression, depth: usize) -> String {
    match &expr.kind {
        ExpressionKind::Number(n) => print_number(*n),
        ExpressionKind::String(s) => print_string(s),
        ExpressionKind::HexColor(hex) => format!("#{hex}"),
        ExpressionKind::Identifier(name) => name.clone(),
        ExpressionKind::Tuple(elements) => elements
            .iter()
            .map(|e| print_operand(e, depth))
            .collect::<Vec<_>>()
            .join(" "),
        ExpressionKind::Prefix { op, rhs } => match op {
            PrefixOp::Not => format!("not {}", print_operand(rhs, depth)),
            _ => format!("{}{}", op.display(), print_operand(rhs, depth)),
        },
        ExpressionKind::Infix { lhs, op, rhs } => format!(
            "{} {} {}",
            print_operand(lhs, depth),
            op.display(),
            print_operand(rhs, depth)
        ),
        ExpressionKind::Member { lhs, name } => {
            format!("{}.{}", print_operand(lhs, depth), name.name)
        }
        ExpressionKind::Range { from, to, step } => {
            let mut out = print_operand(from, depth);
            if let Some(to) = to {
                out.push_str(" to ");
                out.push_str(&print_operand(to, depth));
            }
            if let Some(step) = step {
                out.push_str(" step ");
                out.push_str(&print_operand(step, depth));
            }
            out
        }
        ExpressionKind::Block { name, block } => {
            format!("{} {}", name.name, print_block(block, depth))
        }
    }
}

/// Prints an expression in operand position, wrapping non-atoms in parens.
fn print_operand(expr: &Expression, depth: usize) -> String {
    let text = print_expr(expr, depth);
    if is_atomic(expr) {
        text
    } else {
        format!("({text})")
    }
}

fn is_atomic(expr: &Expression) -> bool {
    match &expr.kind {
        ExpressionKind::Number(n) => *n >= 0.0,
        ExpressionKind::String(_)
        | ExpressionKind::HexColor(_)
        | ExpressionKind::Identifier(_)
        | ExpressionKind::Block { .. } => true,
        ExpressionKind::Member { lhs, .. } => is_atomic(lhs),
        _ => false,
    }
}

fn print_number(n: f64) -> String {
    format!("{n}")
}

fn print_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;

    fn num(n: f64) -> Expression {
        Expression::new(ExpressionKind::Number(n), Span::default())
    }

    #[test]
    fn test_print_command_with_tuple() {
        let stmt = Statement::new(
            StatementKind::Command {
                name: Identifier::new("color", Span::default()),
                argument: Some(Expression::new(
                    ExpressionKind::Tuple(vec![num(1.0), num(0.0), num(0.0)]),
                    Span::default(),
                )),
            },
            Span::default(),
        );
        assert_eq!(print_statements(&[stmt]), "color (1 0 0)");
    }

    #[test]
    fn test_print_nested_infix_parenthesizes() {
        let product = Expression::new(
            ExpressionKind::Infix {
                lhs: Box::new(num(2.0)),
                op: InfixOp::Multiply,
                rhs: Box::new(num(3.0)),
            },
            Span::default(),
        );
        let sum = Expression::new(
            ExpressionKind::Infix {
                lhs: Box::new(num(1.0)),
                op: InfixOp::Add,
                rhs: Box::new(product),
            },
            Span::default(),
        );
        let stmt = Statement::new(StatementKind::Expression(sum), Span::default());
        assert_eq!(print_statements(&[stmt]), "1 + (2 * 3)");
    }

    #[test]
    fn test_print_string_escapes() {
        assert_eq!(print_string("a\"b\\c\nd"), "\"a\\\"b\\\\c\\nd\"");
    }

    #[test]
    fn test_print_block_statement() {
        let block = Block::new(
            vec![Statement::new(
                StatementKind::Command {
                    name: Identifier::new("size", Span::default()),
                    argument: Some(num(2.0)),
                },
                Span::default(),
            )],
            Span::default(),
        );
        let stmt = Statement::new(
            StatementKind::Expression(Expression::new(
                ExpressionKind::Block {
                    name: Identifier::new("cube", Span::default()),
                    block,
                },
                Span::default(),
            )),
            Span::default(),
        );
        assert_eq!(print_statements(&[stmt]), "cube {\n    size 2\n}");
    }
}
