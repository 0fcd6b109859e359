//! # AST-to-AST Lowering
//!
//! Rewrites the OpenSCAD-style AST into the ShapeScript AST. The translation
//! is purely syntactic and deterministic; source spans carry over verbatim so
//! evaluation errors point at the original `.scad` text.
//!
//! Representative rules:
//!
//! ```text
//! translate(v) next;          →  group { translate v  <next> }
//! rotate(a) next;             →  group { define r a / -180
//!                                        rotate r.z r.y r.x  <next> }
//! cube(s, center)             →  cube { size s
//!                                       if center = false { position size / 2 } }
//! linear_extrude(h) { body }  →  extrude { size 1 1 h ... body }
//! module m(a = 1) { ... }     →  define m { option a 1 ... }
//! m(2);                       →  m { a 2 }
//! echo(x)                     →  print x
//! ```
//!
//! Several OpenSCAD features have no ShapeScript counterpart and are
//! rejected with a translation error naming the construct: `mirror`,
//! `multmatrix`, `resize`, `offset`, `minkowski`, `polygon`, and
//! `children()`.

use crate::ast::{
    ScadArgument, ScadExpression, ScadInfixOp, ScadPrefixOp, ScadParameter, ScadStatement,
};
use shape_ast::{
    Block, Definition, Expression, ExpressionKind, Identifier, InfixOp, PrefixOp, Span, Statement,
    StatementKind,
};
use shape_parser::ParseError;
use std::collections::HashMap;

/// Names of the evaluator's standard symbols. A user definition that
/// collides with one of these is suffixed with `_`.
const STANDARD_SYMBOLS: &[&str] = &[
    "pi", "true", "false", "black", "white", "gray", "grey", "red", "green", "blue", "yellow",
    "cyan", "magenta", "orange", "abs", "floor", "ceil", "round", "sqrt", "cos", "sin", "tan",
    "acos", "asin", "atan", "min", "max", "pow", "rnd", "color", "opacity", "texture", "detail",
    "font", "seed", "name", "position", "orientation", "size", "twist", "along", "translate",
    "rotate", "scale", "print", "debug", "cube", "sphere", "cylinder", "cone", "extrude", "lathe",
    "loft", "fill", "union", "difference", "intersection", "xor", "stencil", "hull", "group",
    "circle", "square", "path", "point", "curve", "close",
];

/// SCAD builtins that are recognized but not translatable.
const UNSUPPORTED_MODULES: &[&str] = &[
    "mirror",
    "multmatrix",
    "resize",
    "offset",
    "minkowski",
    "polygon",
    "polyhedron",
    "children",
    "text",
    "surface",
    "projection",
];

/// Lower a SCAD statement list to the ShapeScript AST.
///
/// ## Example
///
/// ```rust
/// let scad = scad_parser::parse("cube(10);").unwrap();
/// let statements = scad_parser::lower(&scad).unwrap();
/// assert_eq!(statements.len(), 1);
/// ```
pub fn lower(statements: &[ScadStatement]) -> Result<Vec<Statement>, ParseError> {
    let mut translator = Translator::new();
    translator.lower_statements(statements, false)
}

// =============================================================================
// TRANSLATOR
// =============================================================================

/// Translation state: user definitions seen so far, so that positional
/// arguments can be matched to parameter names.
struct Translator {
    /// Known module parameter lists, keyed by raw (unmangled) name.
    modules: HashMap<String, Vec<ScadParameter>>,
    /// Known function parameter lists, keyed by raw name.
    functions: HashMap<String, Vec<ScadParameter>>,
}

impl Translator {
    fn new() -> Self {
        Self {
            modules: HashMap::new(),
            functions: HashMap::new(),
        }
    }

    /// Lower a statement list. `in_2d` is true inside extrusion bodies,
    /// where 2D shapes lower to bare path blocks instead of being wrapped
    /// in an `extrude`.
    fn lower_statements(
        &mut self,
        statements: &[ScadStatement],
        in_2d: bool,
    ) -> Result<Vec<Statement>, ParseError> {
        // Pre-register definitions so forward calls can resolve positional
        // arguments.
        for statement in statements {
            match statement {
                ScadStatement::ModuleDefinition { name, params, .. } => {
                    self.modules.insert(name.clone(), params.clone());
                }
                ScadStatement::FunctionDefinition { name, params, .. } => {
                    self.functions.insert(name.clone(), params.clone());
                }
                _ => {}
            }
        }

        statements
            .iter()
            .map(|statement| self.lower_statement(statement, in_2d))
            .collect()
    }

    fn lower_statement(
        &mut self,
        statement: &ScadStatement,
        in_2d: bool,
    ) -> Result<Statement, ParseError> {
        match statement {
            ScadStatement::Command {
                name,
                args,
                children,
                span,
            } => self.lower_command(name, args, children, *span, in_2d),

            ScadStatement::Assignment { name, value, span } => {
                // A global `$fn` assignment is the ambient detail level.
                if name == "$fn" {
                    return Ok(command("detail", self.lower_expression(value)?, *span));
                }
                Ok(Statement::new(
                    StatementKind::Define {
                        name: Identifier::new(mangle(name), *span),
                        definition: Definition::Expression(self.lower_expression(value)?),
                    },
                    *span,
                ))
            }

            ScadStatement::ModuleDefinition {
                name,
                params,
                body,
                span,
            } => {
                let mut statements = self.lower_parameters(params, *span)?;
                statements.extend(self.lower_statements(body, in_2d)?);
                Ok(Statement::new(
                    StatementKind::Define {
                        name: Identifier::new(mangle(name), *span),
                        definition: Definition::Block(Block::new(statements, *span)),
                    },
                    *span,
                ))
            }

            ScadStatement::FunctionDefinition {
                name,
                params,
                body,
                span,
            } => {
                let mut statements = self.lower_parameters(params, *span)?;
                let value = self.lower_expression(body)?;
                let value_span = value.span;
                statements.push(Statement::new(StatementKind::Expression(value), value_span));
                Ok(Statement::new(
                    StatementKind::Define {
                        name: Identifier::new(mangle(name), *span),
                        definition: Definition::Block(Block::new(statements, *span)),
                    },
                    *span,
                ))
            }

            ScadStatement::ForLoop {
                variable,
                sequence,
                body,
                span,
            } => {
                let sequence = self.lower_expression(sequence)?;
                let body = Block::new(self.lower_statements(body, in_2d)?, *span);
                Ok(Statement::new(
                    StatementKind::ForLoop {
                        index: Some(Identifier::new(mangle(variable), *span)),
                        sequence,
                        body,
                    },
                    *span,
                ))
            }

            ScadStatement::IfElse {
                condition,
                body,
                else_body,
                span,
            } => {
                let condition = self.lower_expression(condition)?;
                let body = Block::new(self.lower_statements(body, in_2d)?, *span);
                let else_body = match else_body {
                    Some(statements) => Some(Block::new(
                        self.lower_statements(statements, in_2d)?,
                        *span,
                    )),
                    None => None,
                };
                Ok(Statement::new(
                    StatementKind::IfElse {
                        condition,
                        body,
                        else_body,
                    },
                    *span,
                ))
            }

            ScadStatement::Let {
                bindings,
                body,
                span,
            } => {
                let mut statements = Vec::with_capacity(bindings.len() + body.len());
                for (name, value) in bindings {
                    let value = self.lower_expression(value)?;
                    statements.push(Statement::new(
                        StatementKind::Define {
                            name: Identifier::new(mangle(name), *span),
                            definition: Definition::Expression(value),
                        },
                        *span,
                    ));
                }
                statements.extend(self.lower_statements(body, in_2d)?);
                Ok(group_block(statements, *span))
            }

            ScadStatement::Block { statements, span } => {
                let statements = self.lower_statements(statements, in_2d)?;
                Ok(group_block(statements, *span))
            }
        }
    }

    // =========================================================================
    // COMMANDS
    // =========================================================================

    fn lower_command(
        &mut self,
        name: &str,
        args: &[ScadArgument],
        children: &[ScadStatement],
        span: Span,
        in_2d: bool,
    ) -> Result<Statement, ParseError> {
        // Leaf shapes never take chained children.
        if !children.is_empty()
            && matches!(name, "cube" | "square" | "sphere" | "circle" | "cylinder" | "echo")
        {
            return Err(ParseError::custom(
                format!("'{name}' does not take children"),
                span,
            ));
        }

        match name {
            "translate" | "scale" => {
                let vector = self.required_arg(args, 0, "v", name, span)?;
                let mut statements = vec![command(name, vector, span)];
                statements.extend(self.lower_statements(children, in_2d)?);
                Ok(group_block(statements, span))
            }

            "rotate" => {
                let mut statements = self.lower_rotate(args, span)?;
                statements.extend(self.lower_statements(children, in_2d)?);
                Ok(group_block(statements, span))
            }

            "color" => {
                let color = self.lower_color_argument(args, span)?;
                let mut statements = vec![command("color", color, span)];
                statements.extend(self.lower_statements(children, in_2d)?);
                Ok(group_block(statements, span))
            }

            "cube" => self.lower_cube_like("cube", args, span),
            "square" => {
                let block = self.lower_cube_like("square", args, span)?;
                Ok(self.wrap_2d(block, span, in_2d))
            }

            "sphere" => {
                let mut statements = vec![command(
                    "size",
                    self.lower_diameter(args, span)?,
                    span,
                )];
                if let Some(detail) = self.optional_detail(args)? {
                    statements.push(command("detail", detail, span));
                }
                Ok(invocation("sphere", statements, span))
            }

            "circle" => {
                let mut statements = vec![command(
                    "size",
                    self.lower_diameter(args, span)?,
                    span,
                )];
                if let Some(detail) = self.optional_detail(args)? {
                    statements.push(command("detail", detail, span));
                }
                let block = invocation("circle", statements, span);
                Ok(self.wrap_2d(block, span, in_2d))
            }

            "cylinder" => self.lower_cylinder(args, span),

            "linear_extrude" => self.lower_linear_extrude(args, children, span),

            "rotate_extrude" => {
                if find_arg(args, usize::MAX, "angle").is_some() {
                    return Err(unsupported("rotate_extrude with an angle", span));
                }
                let mut statements = self.lower_statements(children, true)?;
                if let Some(detail) = self.optional_detail(args)? {
                    statements.push(command("detail", detail, span));
                }
                Ok(invocation("lathe", statements, span))
            }

            "union" | "difference" | "intersection" | "hull" | "group" => {
                let statements = self.lower_statements(children, in_2d)?;
                Ok(invocation(name, statements, span))
            }

            "echo" => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.lower_expression(&arg.value)?);
                }
                let argument = match values.len() {
                    0 => None,
                    1 => Some(values.pop().expect("one value")),
                    _ => Some(Expression::new(ExpressionKind::Tuple(values), span)),
                };
                Ok(Statement::new(
                    StatementKind::Command {
                        name: Identifier::new("print", span),
                        argument,
                    },
                    span,
                ))
            }

            _ if UNSUPPORTED_MODULES.contains(&name) => Err(unsupported(name, span)),

            // User-defined modules invoke the corresponding custom block.
            _ => {
                let Some(params) = self.modules.get(name).cloned() else {
                    return Err(ParseError::custom(
                        format!("unknown module '{name}'"),
                        span,
                    ));
                };
                if !children.is_empty() {
                    return Err(unsupported("module children", span));
                }
                let settings = self.lower_call_arguments(name, &params, args)?;
                Ok(invocation(&mangle(name), settings, span))
            }
        }
    }

    /// Lower `rotate(a)` to half-turn roll/pitch/yaw form.
    ///
    /// OpenSCAD applies `Rz(z)·Ry(y)·Rx(x)` in degrees; dividing by -180 and
    /// reversing the component order yields the same matrix here.
    fn lower_rotate(
        &mut self,
        args: &[ScadArgument],
        span: Span,
    ) -> Result<Vec<Statement>, ParseError> {
        let angles = match find_arg(args, 0, "a") {
            Some(expr) => expr,
            None => return Err(missing("rotate", "a", span)),
        };
        let half_turns = |expr: Expression| {
            Expression::new(
                ExpressionKind::Infix {
                    lhs: Box::new(expr),
                    op: InfixOp::Divide,
                    rhs: Box::new(Expression::new(ExpressionKind::Number(-180.0), span)),
                },
                span,
            )
        };

        match angles {
            // A literal vector rotates around each axis; components reverse.
            ScadExpression::Vector(items, _) if items.len() == 3 => {
                let x = half_turns(self.lower_expression(&items[0])?);
                let y = half_turns(self.lower_expression(&items[1])?);
                let z = half_turns(self.lower_expression(&items[2])?);
                Ok(vec![command(
                    "rotate",
                    Expression::new(ExpressionKind::Tuple(vec![z, y, x]), span),
                    span,
                )])
            }
            // A literal scalar rotates around the Z axis only.
            ScadExpression::Number(..) => {
                let roll = half_turns(self.lower_expression(angles)?);
                Ok(vec![command("rotate", roll, span)])
            }
            // Anything else is scaled once and swizzled through members.
            _ => {
                let angles = self.lower_expression(angles)?;
                let define = Statement::new(
                    StatementKind::Define {
                        name: Identifier::new("rotation_", span),
                        definition: Definition::Expression(half_turns(angles)),
                    },
                    span,
                );
                let member = |axis: &str| {
                    Expression::new(
                        ExpressionKind::Member {
                            lhs: Box::new(Expression::new(
                                ExpressionKind::Identifier("rotation_".to_string()),
                                span,
                            )),
                            name: Identifier::new(axis, span),
                        },
                        span,
                    )
                };
                let rotate = command(
                    "rotate",
                    Expression::new(
                        ExpressionKind::Tuple(vec![member("z"), member("y"), member("x")]),
                        span,
                    ),
                    span,
                );
                Ok(vec![define, rotate])
            }
        }
    }

    /// Lower `cube`/`square`: corner-origin geometry recenters through the
    /// block's own `size` property.
    fn lower_cube_like(
        &mut self,
        block: &str,
        args: &[ScadArgument],
        span: Span,
    ) -> Result<Statement, ParseError> {
        let size = match find_arg(args, 0, "size") {
            Some(expr) => self.lower_expression(expr)?,
            None => Expression::new(ExpressionKind::Number(1.0), span),
        };
        let center = match find_arg(args, 1, "center") {
            Some(expr) => self.lower_expression(expr)?,
            None => Expression::new(ExpressionKind::Identifier("false".to_string()), span),
        };

        let size_read = Expression::new(ExpressionKind::Identifier("size".to_string()), span);
        let reposition = command(
            "position",
            Expression::new(
                ExpressionKind::Infix {
                    lhs: Box::new(size_read),
                    op: InfixOp::Divide,
                    rhs: Box::new(Expression::new(ExpressionKind::Number(2.0), span)),
                },
                span,
            ),
            span,
        );
        let recenter = Statement::new(
            StatementKind::IfElse {
                condition: Expression::new(
                    ExpressionKind::Infix {
                        lhs: Box::new(center),
                        op: InfixOp::Equal,
                        rhs: Box::new(Expression::new(
                            ExpressionKind::Identifier("false".to_string()),
                            span,
                        )),
                    },
                    span,
                ),
                body: Block::new(vec![reposition], span),
                else_body: None,
            },
            span,
        );

        Ok(invocation(block, vec![command("size", size, span), recenter], span))
    }

    /// Lower `cylinder(...)` to a `cylinder` or `cone` block.
    fn lower_cylinder(
        &mut self,
        args: &[ScadArgument],
        span: Span,
    ) -> Result<Statement, ParseError> {
        let height = match find_arg(args, 0, "h") {
            Some(expr) => self.lower_expression(expr)?,
            None => Expression::new(ExpressionKind::Number(1.0), span),
        };

        let r2_is_zero = matches!(
            find_arg(args, usize::MAX, "r2"),
            Some(ScadExpression::Number(n, _)) if *n == 0.0
        ) || matches!(
            find_arg(args, usize::MAX, "d2"),
            Some(ScadExpression::Number(n, _)) if *n == 0.0
        );

        let (block, diameter_args): (&str, &[(&str, f64)]) = if r2_is_zero {
            ("cone", &[("d1", 1.0), ("r1", 2.0)])
        } else {
            if find_arg(args, usize::MAX, "r2").is_some() || find_arg(args, usize::MAX, "d2").is_some()
            {
                return Err(unsupported("cylinder with differing radii", span));
            }
            ("cylinder", &[("d", 1.0), ("r", 2.0), ("d1", 1.0), ("r1", 2.0)])
        };

        // Search the accepted spellings for a diameter; radii are doubled.
        let mut diameter = None;
        for (key, factor) in diameter_args {
            let positional = if *key == "r" { 1 } else { usize::MAX };
            if let Some(expr) = find_arg(args, positional, key) {
                let lowered = self.lower_expression(expr)?;
                diameter = Some(if *factor == 1.0 {
                    lowered
                } else {
                    Expression::new(
                        ExpressionKind::Infix {
                            lhs: Box::new(lowered),
                            op: InfixOp::Multiply,
                            rhs: Box::new(Expression::new(ExpressionKind::Number(*factor), span)),
                        },
                        span,
                    )
                });
                break;
            }
        }
        let diameter = diameter.unwrap_or(Expression::new(ExpressionKind::Number(2.0), span));

        let mut statements = vec![command(
            "size",
            Expression::new(
                ExpressionKind::Tuple(vec![diameter.clone(), diameter, height.clone()]),
                span,
            ),
            span,
        )];

        // SCAD cylinders sit on the XY plane unless centered.
        let center = match find_arg(args, usize::MAX, "center") {
            Some(expr) => self.lower_expression(expr)?,
            None => Expression::new(ExpressionKind::Identifier("false".to_string()), span),
        };
        let lift = command(
            "position",
            Expression::new(
                ExpressionKind::Tuple(vec![
                    Expression::new(ExpressionKind::Number(0.0), span),
                    Expression::new(ExpressionKind::Number(0.0), span),
                    Expression::new(
                        ExpressionKind::Infix {
                            lhs: Box::new(height),
                            op: InfixOp::Divide,
                            rhs: Box::new(Expression::new(ExpressionKind::Number(2.0), span)),
                        },
                        span,
                    ),
                ]),
                span,
            ),
            span,
        );
        statements.push(Statement::new(
            StatementKind::IfElse {
                condition: Expression::new(
                    ExpressionKind::Infix {
                        lhs: Box::new(center),
                        op: InfixOp::Equal,
                        rhs: Box::new(Expression::new(
                            ExpressionKind::Identifier("false".to_string()),
                            span,
                        )),
                    },
                    span,
                ),
                body: Block::new(vec![lift], span),
                else_body: None,
            },
            span,
        ));

        if let Some(detail) = self.optional_detail(args)? {
            statements.push(command("detail", detail, span));
        }

        Ok(invocation(block, statements, span))
    }

    /// Lower `linear_extrude(height, twist?, slices?, center?) { body }`.
    fn lower_linear_extrude(
        &mut self,
        args: &[ScadArgument],
        children: &[ScadStatement],
        span: Span,
    ) -> Result<Statement, ParseError> {
        if find_arg(args, usize::MAX, "scale").is_some() {
            return Err(unsupported("linear_extrude with a scale", span));
        }

        let height = match find_arg(args, 0, "height") {
            Some(expr) => self.lower_expression(expr)?,
            None => Expression::new(ExpressionKind::Number(1.0), span),
        };

        let mut statements = vec![command(
            "size",
            Expression::new(
                ExpressionKind::Tuple(vec![
                    Expression::new(ExpressionKind::Number(1.0), span),
                    Expression::new(ExpressionKind::Number(1.0), span),
                    height.clone(),
                ]),
                span,
            ),
            span,
        )];

        let center = match find_arg(args, usize::MAX, "center") {
            Some(expr) => self.lower_expression(expr)?,
            None => Expression::new(ExpressionKind::Identifier("false".to_string()), span),
        };
        let lift = command(
            "position",
            Expression::new(
                ExpressionKind::Tuple(vec![
                    Expression::new(ExpressionKind::Number(0.0), span),
                    Expression::new(ExpressionKind::Number(0.0), span),
                    Expression::new(
                        ExpressionKind::Infix {
                            lhs: Box::new(height),
                            op: InfixOp::Divide,
                            rhs: Box::new(Expression::new(ExpressionKind::Number(2.0), span)),
                        },
                        span,
                    ),
                ]),
                span,
            ),
            span,
        );
        statements.push(Statement::new(
            StatementKind::IfElse {
                condition: Expression::new(
                    ExpressionKind::Infix {
                        lhs: Box::new(center),
                        op: InfixOp::Equal,
                        rhs: Box::new(Expression::new(
                            ExpressionKind::Identifier("false".to_string()),
                            span,
                        )),
                    },
                    span,
                ),
                body: Block::new(vec![lift], span),
                else_body: None,
            },
            span,
        ));

        if let Some(twist) = find_arg(args, usize::MAX, "twist") {
            let twist = self.lower_expression(twist)?;
            statements.push(command(
                "twist",
                Expression::new(
                    ExpressionKind::Infix {
                        lhs: Box::new(twist),
                        op: InfixOp::Divide,
                        rhs: Box::new(Expression::new(ExpressionKind::Number(180.0), span)),
                    },
                    span,
                ),
                span,
            ));
        }

        statements.extend(self.lower_statements(children, true)?);

        if let Some(slices) = find_arg(args, usize::MAX, "slices") {
            let slices = self.lower_expression(slices)?;
            statements.push(command(
                "detail",
                Expression::new(
                    ExpressionKind::Infix {
                        lhs: Box::new(slices),
                        op: InfixOp::Multiply,
                        rhs: Box::new(Expression::new(ExpressionKind::Number(4.0), span)),
                    },
                    span,
                ),
                span,
            ));
        }

        Ok(invocation("extrude", statements, span))
    }

    /// Wrap a 2D shape in an `extrude` when it stands in mesh position.
    fn wrap_2d(&self, block: Statement, span: Span, in_2d: bool) -> Statement {
        if in_2d {
            block
        } else {
            invocation("extrude", vec![block], span)
        }
    }

    // =========================================================================
    // ARGUMENT HELPERS
    // =========================================================================

    /// Lower `option`-style statements for definition parameters.
    fn lower_parameters(
        &mut self,
        params: &[ScadParameter],
        span: Span,
    ) -> Result<Vec<Statement>, ParseError> {
        params
            .iter()
            .map(|param| {
                let default = match &param.default {
                    Some(expr) => self.lower_expression(expr)?,
                    // OpenSCAD parameters without defaults bind to 0.
                    None => Expression::new(ExpressionKind::Number(0.0), span),
                };
                Ok(Statement::new(
                    StatementKind::Option {
                        name: Identifier::new(mangle(&param.name), span),
                        default,
                    },
                    span,
                ))
            })
            .collect()
    }

    /// Lower call arguments into option-setting commands.
    fn lower_call_arguments(
        &mut self,
        callee: &str,
        params: &[ScadParameter],
        args: &[ScadArgument],
    ) -> Result<Vec<Statement>, ParseError> {
        let mut statements = Vec::with_capacity(args.len());
        let mut position = 0usize;
        for arg in args {
            let name = match &arg.name {
                Some(name) => name.clone(),
                None => {
                    let Some(param) = params.get(position) else {
                        return Err(ParseError::custom(
                            format!("too many arguments for '{callee}'"),
                            arg.value.span(),
                        ));
                    };
                    position += 1;
                    param.name.clone()
                }
            };
            let value = self.lower_expression(&arg.value)?;
            statements.push(command(&mangle(&name), value, arg.value.span()));
        }
        Ok(statements)
    }

    /// First `r`/`d`-style argument as a diameter expression.
    fn lower_diameter(
        &mut self,
        args: &[ScadArgument],
        span: Span,
    ) -> Result<Expression, ParseError> {
        if let Some(expr) = find_arg(args, usize::MAX, "d") {
            return self.lower_expression(expr);
        }
        let radius = match find_arg(args, 0, "r") {
            Some(expr) => self.lower_expression(expr)?,
            None => Expression::new(ExpressionKind::Number(1.0), span),
        };
        let radius_span = radius.span;
        Ok(Expression::new(
            ExpressionKind::Infix {
                lhs: Box::new(radius),
                op: InfixOp::Multiply,
                rhs: Box::new(Expression::new(ExpressionKind::Number(2.0), span)),
            },
            radius_span,
        ))
    }

    /// Optional `$fn` argument, lowered for a `detail` property write.
    fn optional_detail(&mut self, args: &[ScadArgument]) -> Result<Option<Expression>, ParseError> {
        match find_arg(args, usize::MAX, "$fn") {
            Some(expr) => Ok(Some(self.lower_expression(expr)?)),
            None => Ok(None),
        }
    }

    /// `color(c, alpha?)`: string colors become identifiers or hex literals.
    fn lower_color_argument(
        &mut self,
        args: &[ScadArgument],
        span: Span,
    ) -> Result<Expression, ParseError> {
        let color = match find_arg(args, 0, "c") {
            Some(ScadExpression::String(name, string_span)) => {
                if let Some(digits) = name.strip_prefix('#') {
                    Expression::new(ExpressionKind::HexColor(digits.to_string()), *string_span)
                } else {
                    Expression::new(
                        ExpressionKind::Identifier(name.to_lowercase()),
                        *string_span,
                    )
                }
            }
            Some(expr) => self.lower_expression(expr)?,
            None => return Err(missing("color", "c", span)),
        };

        match find_arg(args, 1, "alpha") {
            Some(alpha) => {
                let alpha = self.lower_expression(alpha)?;
                Ok(Expression::new(
                    ExpressionKind::Tuple(vec![color, alpha]),
                    span,
                ))
            }
            None => Ok(color),
        }
    }

    /// Required positional-or-named argument.
    fn required_arg(
        &mut self,
        args: &[ScadArgument],
        position: usize,
        name: &str,
        callee: &str,
        span: Span,
    ) -> Result<Expression, ParseError> {
        match find_arg(args, position, name) {
            Some(expr) => self.lower_expression(expr),
            None => Err(missing(callee, name, span)),
        }
    }

    // =========================================================================
    // EXPRESSIONS
    // =========================================================================

    fn lower_expression(&mut self, expr: &ScadExpression) -> Result<Expression, ParseError> {
        match expr {
            ScadExpression::Number(value, span) => {
                Ok(Expression::new(ExpressionKind::Number(*value), *span))
            }
            ScadExpression::Boolean(value, span) => Ok(Expression::new(
                ExpressionKind::Identifier(if *value { "true" } else { "false" }.to_string()),
                *span,
            )),
            // `undef` becomes the empty tuple, the evaluator's void value.
            ScadExpression::Undefined(span) => {
                Ok(Expression::new(ExpressionKind::Tuple(Vec::new()), *span))
            }
            ScadExpression::String(value, span) => {
                Ok(Expression::new(ExpressionKind::String(value.clone()), *span))
            }
            ScadExpression::Identifier(name, span) => {
                // OpenSCAD spells the circle constant in capitals.
                let name = if name == "PI" {
                    "pi".to_string()
                } else {
                    mangle(name)
                };
                Ok(Expression::new(ExpressionKind::Identifier(name), *span))
            }
            ScadExpression::Vector(items, span) => {
                let items = items
                    .iter()
                    .map(|item| self.lower_expression(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Expression::new(ExpressionKind::Tuple(items), *span))
            }
            ScadExpression::Range {
                start,
                step,
                end,
                span,
            } => {
                let from = Box::new(self.lower_expression(start)?);
                let to = Some(Box::new(self.lower_expression(end)?));
                let step = match step {
                    Some(step) => Some(Box::new(self.lower_expression(step)?)),
                    None => None,
                };
                Ok(Expression::new(
                    ExpressionKind::Range { from, to, step },
                    *span,
                ))
            }
            ScadExpression::Call { name, args, span } => self.lower_call(name, args, *span),
            ScadExpression::Prefix { op, expr, span } => {
                let rhs = Box::new(self.lower_expression(expr)?);
                let op = match op {
                    ScadPrefixOp::Negate => PrefixOp::Minus,
                    ScadPrefixOp::Plus => PrefixOp::Plus,
                    ScadPrefixOp::Not => PrefixOp::Not,
                };
                Ok(Expression::new(ExpressionKind::Prefix { op, rhs }, *span))
            }
            ScadExpression::Infix { lhs, op, rhs, span } => self.lower_infix(lhs, *op, rhs, *span),
            ScadExpression::Member { expr, name, span } => {
                let lhs = Box::new(self.lower_expression(expr)?);
                Ok(Expression::new(
                    ExpressionKind::Member {
                        lhs,
                        name: Identifier::new(name.clone(), *span),
                    },
                    *span,
                ))
            }
        }
    }

    fn lower_infix(
        &mut self,
        lhs: &ScadExpression,
        op: ScadInfixOp,
        rhs: &ScadExpression,
        span: Span,
    ) -> Result<Expression, ParseError> {
        let lhs = self.lower_expression(lhs)?;
        let rhs = self.lower_expression(rhs)?;

        let op = match op {
            ScadInfixOp::Or => InfixOp::Or,
            ScadInfixOp::And => InfixOp::And,
            ScadInfixOp::Equal => InfixOp::Equal,
            ScadInfixOp::NotEqual => InfixOp::NotEqual,
            ScadInfixOp::Less => InfixOp::Less,
            ScadInfixOp::LessEqual => InfixOp::LessEqual,
            ScadInfixOp::Greater => InfixOp::Greater,
            ScadInfixOp::GreaterEqual => InfixOp::GreaterEqual,
            ScadInfixOp::Add => InfixOp::Add,
            ScadInfixOp::Subtract => InfixOp::Subtract,
            ScadInfixOp::Multiply => InfixOp::Multiply,
            ScadInfixOp::Divide => InfixOp::Divide,
            // `a % b` has no operator here; it expands to a - floor(a/b) * b.
            ScadInfixOp::Modulo => {
                let quotient = Expression::new(
                    ExpressionKind::Infix {
                        lhs: Box::new(lhs.clone()),
                        op: InfixOp::Divide,
                        rhs: Box::new(rhs.clone()),
                    },
                    span,
                );
                let floored = Expression::new(
                    ExpressionKind::Tuple(vec![
                        Expression::new(ExpressionKind::Identifier("floor".to_string()), span),
                        quotient,
                    ]),
                    span,
                );
                let product = Expression::new(
                    ExpressionKind::Infix {
                        lhs: Box::new(floored),
                        op: InfixOp::Multiply,
                        rhs: Box::new(rhs),
                    },
                    span,
                );
                return Ok(Expression::new(
                    ExpressionKind::Infix {
                        lhs: Box::new(lhs),
                        op: InfixOp::Subtract,
                        rhs: Box::new(product),
                    },
                    span,
                ));
            }
            // `a ^ b` calls the pow builtin.
            ScadInfixOp::Power => {
                return Ok(Expression::new(
                    ExpressionKind::Tuple(vec![
                        Expression::new(ExpressionKind::Identifier("pow".to_string()), span),
                        lhs,
                        rhs,
                    ]),
                    span,
                ));
            }
        };

        Ok(Expression::new(
            ExpressionKind::Infix {
                lhs: Box::new(lhs),
                op,
                rhs: Box::new(rhs),
            },
            span,
        ))
    }

    /// Lower a function call: user functions become block invocations,
    /// math builtins become command tuples.
    fn lower_call(
        &mut self,
        name: &str,
        args: &[ScadArgument],
        span: Span,
    ) -> Result<Expression, ParseError> {
        if let Some(params) = self.functions.get(name).cloned() {
            let settings = self.lower_call_arguments(name, &params, args)?;
            return Ok(Expression::new(
                ExpressionKind::Block {
                    name: Identifier::new(mangle(name), span),
                    block: Block::new(settings, span),
                },
                span,
            ));
        }

        const MATH_BUILTINS: &[&str] = &[
            "abs", "floor", "ceil", "round", "sqrt", "acos", "asin", "atan", "min", "max", "pow",
        ];
        const TRIG_BUILTINS: &[&str] = &["sin", "cos", "tan"];

        let is_trig = TRIG_BUILTINS.contains(&name);
        if is_trig || MATH_BUILTINS.contains(&name) {
            let mut elements = vec![Expression::new(
                ExpressionKind::Identifier(name.to_string()),
                span,
            )];
            for arg in args {
                let mut value = self.lower_expression(&arg.value)?;
                if is_trig {
                    // Degrees to radians at the call site.
                    let value_span = value.span;
                    value = Expression::new(
                        ExpressionKind::Infix {
                            lhs: Box::new(Expression::new(
                                ExpressionKind::Infix {
                                    lhs: Box::new(value),
                                    op: InfixOp::Multiply,
                                    rhs: Box::new(Expression::new(
                                        ExpressionKind::Identifier("pi".to_string()),
                                        value_span,
                                    )),
                                },
                                value_span,
                            )),
                            op: InfixOp::Divide,
                            rhs: Box::new(Expression::new(
                                ExpressionKind::Number(180.0),
                                value_span,
                            )),
                        },
                        value_span,
                    );
                }
                elements.push(value);
            }
            return Ok(Expression::new(ExpressionKind::Tuple(elements), span));
        }

        Err(ParseError::custom(
            format!("unknown function '{name}'"),
            span,
        ))
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Mangle a SCAD identifier into the ShapeScript namespace: `$fn` becomes
/// `dollar_fn`, a leading underscore becomes `underscore_`, and collisions
/// with standard symbols gain a trailing `_`.
fn mangle(name: &str) -> String {
    let name = if let Some(rest) = name.strip_prefix('$') {
        format!("dollar_{rest}")
    } else if let Some(rest) = name.strip_prefix('_') {
        format!("underscore_{rest}")
    } else {
        name.to_string()
    };
    if STANDARD_SYMBOLS.contains(&name.as_str()) {
        format!("{name}_")
    } else {
        name
    }
}

/// Find an argument by name, or by position for unnamed arguments.
fn find_arg<'a>(args: &'a [ScadArgument], position: usize, name: &str) -> Option<&'a ScadExpression> {
    if let Some(arg) = args.iter().find(|arg| arg.name.as_deref() == Some(name)) {
        return Some(&arg.value);
    }
    args.iter()
        .filter(|arg| arg.name.is_none())
        .nth(position)
        .map(|arg| &arg.value)
}

fn command(name: &str, argument: Expression, span: Span) -> Statement {
    Statement::new(
        StatementKind::Command {
            name: Identifier::new(name, span),
            argument: Some(argument),
        },
        span,
    )
}

fn invocation(name: &str, statements: Vec<Statement>, span: Span) -> Statement {
    Statement::new(
        StatementKind::Expression(Expression::new(
            ExpressionKind::Block {
                name: Identifier::new(name, span),
                block: Block::new(statements, span),
            },
            span,
        )),
        span,
    )
}

fn group_block(statements: Vec<Statement>, span: Span) -> Statement {
    invocation("group", statements, span)
}

fn unsupported(name: &str, span: Span) -> ParseError {
    ParseError::custom(format!("'{name}' is not supported"), span).with_hint(
        "This OpenSCAD feature has no ShapeScript translation yet.".to_string(),
    )
}

fn missing(callee: &str, arg: &str, span: Span) -> ParseError {
    ParseError::custom(format!("missing argument '{arg}' for '{callee}'"), span)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use shape_ast::print_statements;

    fn lowered(source: &str) -> Vec<Statement> {
        lower(&parse(source).unwrap()).unwrap()
    }

    fn printed(source: &str) -> String {
        print_statements(&lowered(source))
    }

    #[test]
    fn test_lower_translate_chain() {
        let text = printed("translate([1, 2, 3]) cube(10);");
        assert!(text.starts_with("group {"), "got: {text}");
        assert!(text.contains("translate (1 2 3)"), "got: {text}");
        assert!(text.contains("cube {"), "got: {text}");
    }

    #[test]
    fn test_lower_cube_recenters_unless_centered() {
        let text = printed("cube([2, 2, 2]);");
        assert!(text.contains("size (2 2 2)"), "got: {text}");
        assert!(text.contains("if (false = false)"), "got: {text}");
        assert!(text.contains("position (size / 2)"), "got: {text}");
    }

    #[test]
    fn test_lower_sphere_diameter_and_detail() {
        let text = printed("sphere(r = 5, $fn = 12);");
        assert!(text.contains("sphere {"), "got: {text}");
        assert!(text.contains("size (5 * 2)"), "got: {text}");
        assert!(text.contains("detail 12"), "got: {text}");
    }

    #[test]
    fn test_lower_rotate_vector_literal() {
        let text = printed("rotate([90, 0, 45]) cube(1);");
        assert!(
            text.contains("rotate ((45 / (-180)) (0 / (-180)) (90 / (-180)))"),
            "got: {text}"
        );
    }

    #[test]
    fn test_lower_rotate_general_expression() {
        let text = printed("rotate(a) cube(1);");
        assert!(text.contains("define rotation_ (a / (-180))"), "got: {text}");
        assert!(
            text.contains("rotate (rotation_.z rotation_.y rotation_.x)"),
            "got: {text}"
        );
    }

    #[test]
    fn test_lower_circle_wrapped_outside_extrusion() {
        let text = printed("circle(5);");
        assert!(text.starts_with("extrude {"), "got: {text}");
        assert!(text.contains("circle {"), "got: {text}");
    }

    #[test]
    fn test_lower_circle_bare_inside_extrusion() {
        let text = printed("linear_extrude(height = 2) circle(5);");
        assert!(text.starts_with("extrude {"), "got: {text}");
        assert!(!text.contains("    extrude {"), "got: {text}");
    }

    #[test]
    fn test_lower_linear_extrude_shape() {
        let text = printed("linear_extrude(height = 3, twist = 90, slices = 10) square(1);");
        assert!(text.contains("size (1 1 3)"), "got: {text}");
        assert!(text.contains("twist (90 / 180)"), "got: {text}");
        assert!(text.contains("detail (10 * 4)"), "got: {text}");
    }

    #[test]
    fn test_lower_module_and_call() {
        let text = printed("module wheel(r = 1) { cylinder(h = 1, r = r); } wheel(2);");
        assert!(text.contains("define wheel {"), "got: {text}");
        assert!(text.contains("option r 1"), "got: {text}");
        assert!(text.contains("wheel {\n    r 2\n}"), "got: {text}");
    }

    #[test]
    fn test_lower_forward_module_call_positional() {
        // Pre-registration makes positional args work for forward calls.
        let text = printed("wheel(2); module wheel(r = 1) { sphere(r); }");
        assert!(text.contains("wheel {\n    r 2\n}"), "got: {text}");
    }

    #[test]
    fn test_lower_function_call_expression() {
        let text = printed("function double(x) = x * 2; y = double(4);");
        assert!(text.contains("define double {"), "got: {text}");
        assert!(text.contains("define y double {\n    x 4\n}"), "got: {text}");
    }

    #[test]
    fn test_lower_echo_and_trig_degrees() {
        let text = printed("echo(cos(60));");
        assert!(text.starts_with("print"), "got: {text}");
        assert!(text.contains("cos"), "got: {text}");
        assert!(text.contains("pi"), "got: {text}");
        assert!(text.contains("180"), "got: {text}");
    }

    #[test]
    fn test_lower_identifier_mangling() {
        let text = printed("$fn = 32; _x = 1; size = 2; y = size + _x;");
        assert!(text.contains("detail 32"), "got: {text}");
        assert!(text.contains("define underscore_x 1"), "got: {text}");
        assert!(text.contains("define size_ 2"), "got: {text}");
        assert!(text.contains("size_ + underscore_x"), "got: {text}");
    }

    #[test]
    fn test_lower_undef_is_empty_tuple() {
        let statements = lowered("x = undef;");
        match &statements[0].kind {
            StatementKind::Define { definition, .. } => match definition {
                Definition::Expression(expr) => {
                    assert!(matches!(&expr.kind, ExpressionKind::Tuple(t) if t.is_empty()));
                }
                other => panic!("expected expression, got {other:?}"),
            },
            other => panic!("expected define, got {other:?}"),
        }
    }

    #[test]
    fn test_lower_unsupported_features_error() {
        for source in [
            "mirror([1, 0, 0]) cube(1);",
            "minkowski() { cube(1); sphere(1); }",
            "offset(r = 1) circle(2);",
        ] {
            let error = lower(&parse(source).unwrap()).unwrap_err();
            assert!(error.message().contains("not supported"), "{source}");
        }
    }

    #[test]
    fn test_lower_unknown_module_errors() {
        let error = lower(&parse("widget(1);").unwrap()).unwrap_err();
        assert!(error.message().contains("unknown module"));
    }

    #[test]
    fn test_lower_preserves_spans() {
        let source = "translate([1, 2, 3]) cube(10);";
        let statements = lowered(source);
        let span = statements[0].span;
        assert!(span.end() <= source.len());
        assert!(!span.is_empty());
    }

    #[test]
    fn test_lower_modulo_expansion() {
        let text = printed("x = 7 % 3;");
        assert!(text.contains("floor"), "got: {text}");
    }

    #[test]
    fn test_lower_power_calls_pow() {
        let text = printed("x = 2 ^ 8;");
        assert!(text.contains("pow 2 8"), "got: {text}");
    }
}
