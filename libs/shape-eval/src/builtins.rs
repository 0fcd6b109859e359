//! # Built-in Symbols
//!
//! The root symbol set: constants, named colors, math functions, transform
//! commands, ambient properties, and the shape/CSG/path blocks. This is a
//! closed registry; programs extend the symbol table only through `define`.

use crate::context::EvaluationContext;
use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::geometry::{GeometryKind, Path, PathPoint};
use crate::symbols::{BlockType, Symbol};
use crate::transform::quaternion;
use crate::value::{Color, Rotation, Texture, Value, ValueType};
use glam::DVec3;
use shape_ast::Span;
use std::collections::HashMap;
use std::rc::Rc;

thread_local! {
    static BUILTINS: HashMap<&'static str, Symbol> = build_registry();
}

/// Look up a built-in symbol by name.
pub fn builtin(name: &str) -> Option<Symbol> {
    BUILTINS.with(|registry| registry.get(name).cloned())
}

/// All built-in names.
pub fn builtin_names() -> Vec<&'static str> {
    BUILTINS.with(|registry| registry.keys().copied().collect())
}

// =============================================================================
// REGISTRY
// =============================================================================

fn build_registry() -> HashMap<&'static str, Symbol> {
    let mut registry = HashMap::new();

    let constant = |registry: &mut HashMap<&'static str, Symbol>, name, value| {
        registry.insert(name, Symbol::Constant(value));
    };

    // Constants.
    constant(&mut registry, "pi", Value::Number(std::f64::consts::PI));
    constant(&mut registry, "true", Value::Boolean(true));
    constant(&mut registry, "false", Value::Boolean(false));

    // Named colors.
    let colors: &[(&'static str, Color)] = &[
        ("black", Color::new(0.0, 0.0, 0.0, 1.0)),
        ("white", Color::new(1.0, 1.0, 1.0, 1.0)),
        ("gray", Color::new(0.5, 0.5, 0.5, 1.0)),
        ("grey", Color::new(0.5, 0.5, 0.5, 1.0)),
        ("red", Color::new(1.0, 0.0, 0.0, 1.0)),
        ("green", Color::new(0.0, 1.0, 0.0, 1.0)),
        ("blue", Color::new(0.0, 0.0, 1.0, 1.0)),
        ("yellow", Color::new(1.0, 1.0, 0.0, 1.0)),
        ("cyan", Color::new(0.0, 1.0, 1.0, 1.0)),
        ("magenta", Color::new(1.0, 0.0, 1.0, 1.0)),
        ("orange", Color::new(1.0, 0.5, 0.0, 1.0)),
    ];
    for (name, color) in colors {
        constant(&mut registry, name, Value::Color(*color));
    }

    // Math commands.
    let unary = |registry: &mut HashMap<&'static str, Symbol>,
                 name: &'static str,
                 func: crate::symbols::CommandFn| {
        registry.insert(
            name,
            Symbol::Command {
                expected: ValueType::Number,
                func,
            },
        );
    };
    unary(&mut registry, "abs", cmd_abs);
    unary(&mut registry, "floor", cmd_floor);
    unary(&mut registry, "ceil", cmd_ceil);
    unary(&mut registry, "round", cmd_round);
    unary(&mut registry, "sqrt", cmd_sqrt);
    unary(&mut registry, "cos", cmd_cos);
    unary(&mut registry, "sin", cmd_sin);
    unary(&mut registry, "tan", cmd_tan);
    unary(&mut registry, "acos", cmd_acos);
    unary(&mut registry, "asin", cmd_asin);
    unary(&mut registry, "atan", cmd_atan);

    let binary = |registry: &mut HashMap<&'static str, Symbol>,
                  name: &'static str,
                  func: crate::symbols::CommandFn| {
        registry.insert(
            name,
            Symbol::Command {
                expected: ValueType::NumberPair,
                func,
            },
        );
    };
    binary(&mut registry, "min", cmd_min);
    binary(&mut registry, "max", cmd_max);
    binary(&mut registry, "pow", cmd_pow);

    registry.insert(
        "rnd",
        Symbol::Command {
            expected: ValueType::Void,
            func: cmd_rnd,
        },
    );

    // Output commands.
    registry.insert(
        "print",
        Symbol::Command {
            expected: ValueType::Any,
            func: cmd_print,
        },
    );
    registry.insert(
        "debug",
        Symbol::Command {
            expected: ValueType::Any,
            func: cmd_debug,
        },
    );

    // Child transforms.
    registry.insert(
        "translate",
        Symbol::Command {
            expected: ValueType::Vector,
            func: cmd_translate,
        },
    );
    registry.insert(
        "rotate",
        Symbol::Command {
            expected: ValueType::Rotation,
            func: cmd_rotate,
        },
    );
    registry.insert(
        "scale",
        Symbol::Command {
            expected: ValueType::Size,
            func: cmd_scale,
        },
    );

    // Path construction commands.
    registry.insert(
        "point",
        Symbol::Command {
            expected: ValueType::Vector,
            func: cmd_point,
        },
    );
    registry.insert(
        "curve",
        Symbol::Command {
            expected: ValueType::Vector,
            func: cmd_curve,
        },
    );
    registry.insert(
        "close",
        Symbol::Command {
            expected: ValueType::Void,
            func: cmd_close,
        },
    );

    // Ambient properties.
    let property = |registry: &mut HashMap<&'static str, Symbol>,
                    name: &'static str,
                    expected: ValueType,
                    setter: crate::symbols::SetterFn,
                    getter: crate::symbols::GetterFn| {
        registry.insert(
            name,
            Symbol::Property {
                expected,
                setter,
                getter,
            },
        );
    };
    property(&mut registry, "color", ValueType::Color, set_color, get_color);
    property(
        &mut registry,
        "opacity",
        ValueType::Number,
        set_opacity,
        get_opacity,
    );
    property(
        &mut registry,
        "texture",
        ValueType::Texture,
        set_texture,
        get_texture,
    );
    property(
        &mut registry,
        "detail",
        ValueType::Number,
        set_detail,
        get_detail,
    );
    property(&mut registry, "font", ValueType::String, set_font, get_font);
    property(&mut registry, "seed", ValueType::Number, set_seed, get_seed);
    property(&mut registry, "name", ValueType::String, set_name, get_name);
    property(
        &mut registry,
        "position",
        ValueType::Vector,
        set_position,
        get_position,
    );
    property(
        &mut registry,
        "orientation",
        ValueType::Rotation,
        set_orientation,
        get_orientation,
    );
    property(&mut registry, "size", ValueType::Size, set_size, get_size);
    property(&mut registry, "twist", ValueType::Number, set_twist, get_twist);
    property(&mut registry, "along", ValueType::Paths, set_along, get_along);

    // Blocks.
    let block = |registry: &mut HashMap<&'static str, Symbol>,
                 name: &'static str,
                 block_type: BlockType,
                 builder: crate::symbols::BuilderFn| {
        registry.insert(
            name,
            Symbol::Block {
                block_type,
                builder,
            },
        );
    };
    block(&mut registry, "cube", BlockType::Primitive, build_cube);
    block(&mut registry, "sphere", BlockType::Primitive, build_sphere);
    block(
        &mut registry,
        "cylinder",
        BlockType::Primitive,
        build_cylinder,
    );
    block(&mut registry, "cone", BlockType::Primitive, build_cone);
    block(&mut registry, "group", BlockType::Group, build_group);
    block(&mut registry, "union", BlockType::Csg, build_union);
    block(
        &mut registry,
        "difference",
        BlockType::Csg,
        build_difference,
    );
    block(
        &mut registry,
        "intersection",
        BlockType::Csg,
        build_intersection,
    );
    block(&mut registry, "xor", BlockType::Csg, build_xor);
    block(&mut registry, "stencil", BlockType::Csg, build_stencil);
    block(&mut registry, "hull", BlockType::Csg, build_hull);
    block(&mut registry, "extrude", BlockType::Builder, build_extrude);
    block(&mut registry, "lathe", BlockType::Builder, build_lathe);
    block(&mut registry, "loft", BlockType::Builder, build_loft);
    block(&mut registry, "fill", BlockType::Builder, build_fill);
    block(&mut registry, "circle", BlockType::Path, build_circle);
    block(&mut registry, "square", BlockType::Path, build_square);
    block(&mut registry, "path", BlockType::Path, build_path);

    registry
}

// =============================================================================
// HELPERS
// =============================================================================

/// Extract the number from an already-coerced argument.
fn number(value: &Value) -> f64 {
    value.as_number().expect("argument was coerced to a number")
}

fn number_pair(value: &Value) -> (f64, f64) {
    match value {
        Value::Tuple(values) if values.len() == 2 => (number(&values[0]), number(&values[1])),
        _ => unreachable!("argument was coerced to a number pair"),
    }
}

fn vector(value: &Value) -> DVec3 {
    match value {
        Value::Vector(v) | Value::Size(v) => *v,
        _ => unreachable!("argument was coerced to a vector"),
    }
}

fn rotation(value: &Value) -> Rotation {
    match value {
        Value::Rotation(r) => *r,
        _ => unreachable!("argument was coerced to a rotation"),
    }
}

// =============================================================================
// MATH COMMANDS
// =============================================================================

fn cmd_abs(_: &mut EvaluationContext, v: Value, _: Span) -> Result<Value, RuntimeError> {
    Ok(Value::Number(number(&v).abs()))
}

fn cmd_floor(_: &mut EvaluationContext, v: Value, _: Span) -> Result<Value, RuntimeError> {
    Ok(Value::Number(number(&v).floor()))
}

fn cmd_ceil(_: &mut EvaluationContext, v: Value, _: Span) -> Result<Value, RuntimeError> {
    Ok(Value::Number(number(&v).ceil()))
}

fn cmd_round(_: &mut EvaluationContext, v: Value, _: Span) -> Result<Value, RuntimeError> {
    Ok(Value::Number(number(&v).round()))
}

fn cmd_sqrt(_: &mut EvaluationContext, v: Value, _: Span) -> Result<Value, RuntimeError> {
    Ok(Value::Number(number(&v).sqrt()))
}

fn cmd_cos(_: &mut EvaluationContext, v: Value, _: Span) -> Result<Value, RuntimeError> {
    Ok(Value::Number(number(&v).cos()))
}

fn cmd_sin(_: &mut EvaluationContext, v: Value, _: Span) -> Result<Value, RuntimeError> {
    Ok(Value::Number(number(&v).sin()))
}

fn cmd_tan(_: &mut EvaluationContext, v: Value, _: Span) -> Result<Value, RuntimeError> {
    Ok(Value::Number(number(&v).tan()))
}

fn cmd_acos(_: &mut EvaluationContext, v: Value, _: Span) -> Result<Value, RuntimeError> {
    Ok(Value::Number(number(&v).acos()))
}

fn cmd_asin(_: &mut EvaluationContext, v: Value, _: Span) -> Result<Value, RuntimeError> {
    Ok(Value::Number(number(&v).asin()))
}

fn cmd_atan(_: &mut EvaluationContext, v: Value, _: Span) -> Result<Value, RuntimeError> {
    Ok(Value::Number(number(&v).atan()))
}

fn cmd_min(_: &mut EvaluationContext, v: Value, _: Span) -> Result<Value, RuntimeError> {
    let (a, b) = number_pair(&v);
    Ok(Value::Number(a.min(b)))
}

fn cmd_max(_: &mut EvaluationContext, v: Value, _: Span) -> Result<Value, RuntimeError> {
    let (a, b) = number_pair(&v);
    Ok(Value::Number(a.max(b)))
}

fn cmd_pow(_: &mut EvaluationContext, v: Value, _: Span) -> Result<Value, RuntimeError> {
    let (base, exponent) = number_pair(&v);
    Ok(Value::Number(base.powf(exponent)))
}

fn cmd_rnd(ctx: &mut EvaluationContext, _: Value, _: Span) -> Result<Value, RuntimeError> {
    Ok(Value::Number(ctx.frame_mut().rng.next_double()))
}

// =============================================================================
// OUTPUT COMMANDS
// =============================================================================

fn cmd_print(ctx: &mut EvaluationContext, v: Value, _: Span) -> Result<Value, RuntimeError> {
    ctx.delegate.log(v.to_string());
    Ok(Value::void())
}

fn cmd_debug(ctx: &mut EvaluationContext, v: Value, _: Span) -> Result<Value, RuntimeError> {
    match v {
        Value::Mesh(mesh) => {
            let mut marked = (*mesh).clone();
            marked.debug = true;
            Ok(Value::Mesh(Rc::new(marked)))
        }
        other => {
            ctx.delegate.log(other.to_string());
            Ok(other)
        }
    }
}

// =============================================================================
// TRANSFORM COMMANDS
// =============================================================================

fn cmd_translate(ctx: &mut EvaluationContext, v: Value, _: Span) -> Result<Value, RuntimeError> {
    let v = vector(&v);
    ctx.frame_mut().cursor.translate(v);
    Ok(Value::void())
}

fn cmd_rotate(ctx: &mut EvaluationContext, v: Value, _: Span) -> Result<Value, RuntimeError> {
    let r = rotation(&v);
    ctx.frame_mut().cursor.rotate(r);
    Ok(Value::void())
}

fn cmd_scale(ctx: &mut EvaluationContext, v: Value, _: Span) -> Result<Value, RuntimeError> {
    let v = vector(&v);
    ctx.frame_mut().cursor.scale_by(v);
    Ok(Value::void())
}

// =============================================================================
// PATH COMMANDS
// =============================================================================

fn cmd_point(ctx: &mut EvaluationContext, v: Value, _: Span) -> Result<Value, RuntimeError> {
    let position = ctx.frame().cursor.apply(vector(&v));
    ctx.frame_mut().path_points.push(PathPoint::corner(position));
    Ok(Value::void())
}

fn cmd_curve(ctx: &mut EvaluationContext, v: Value, _: Span) -> Result<Value, RuntimeError> {
    let position = ctx.frame().cursor.apply(vector(&v));
    ctx.frame_mut().path_points.push(PathPoint::curve(position));
    Ok(Value::void())
}

fn cmd_close(ctx: &mut EvaluationContext, _: Value, _: Span) -> Result<Value, RuntimeError> {
    ctx.frame_mut().path_closed = true;
    Ok(Value::void())
}

// =============================================================================
// PROPERTIES
// =============================================================================

fn set_color(ctx: &mut EvaluationContext, v: Value, _: Span) -> Result<(), RuntimeError> {
    if let Value::Color(color) = v {
        ctx.frame_mut().material.color = Some(color);
    }
    Ok(())
}

fn get_color(ctx: &EvaluationContext) -> Value {
    Value::Color(
        ctx.frame()
            .material
            .color
            .unwrap_or(Color::new(1.0, 1.0, 1.0, 1.0)),
    )
}

fn set_opacity(ctx: &mut EvaluationContext, v: Value, _: Span) -> Result<(), RuntimeError> {
    ctx.frame_mut().material.opacity = number(&v).clamp(0.0, 1.0);
    Ok(())
}

fn get_opacity(ctx: &EvaluationContext) -> Value {
    Value::Number(ctx.frame().material.opacity)
}

fn set_texture(ctx: &mut EvaluationContext, v: Value, _: Span) -> Result<(), RuntimeError> {
    if let Value::Texture(texture) = v {
        let url = ctx
            .delegate
            .resolve_url(&texture.name, ctx.frame().base_url.as_deref())
            .ok();
        ctx.frame_mut().material.texture = Some(Texture {
            name: texture.name,
            url,
        });
    }
    Ok(())
}

fn get_texture(ctx: &EvaluationContext) -> Value {
    match &ctx.frame().material.texture {
        Some(texture) => Value::Texture(texture.clone()),
        None => Value::void(),
    }
}

fn set_detail(ctx: &mut EvaluationContext, v: Value, _: Span) -> Result<(), RuntimeError> {
    ctx.frame_mut().detail = number(&v).max(0.0) as u32;
    Ok(())
}

fn get_detail(ctx: &EvaluationContext) -> Value {
    Value::Number(f64::from(ctx.frame().detail))
}

fn set_font(ctx: &mut EvaluationContext, v: Value, span: Span) -> Result<(), RuntimeError> {
    let Value::String(name) = v else {
        unreachable!("argument was coerced to a string");
    };
    if name.trim().is_empty() {
        return Err(RuntimeError::new(
            RuntimeErrorKind::UnknownFont { name },
            span,
        ));
    }
    ctx.frame_mut().font = Some(name);
    Ok(())
}

fn get_font(ctx: &EvaluationContext) -> Value {
    Value::String(ctx.frame().font.clone().unwrap_or_default())
}

fn set_seed(ctx: &mut EvaluationContext, v: Value, _: Span) -> Result<(), RuntimeError> {
    ctx.frame_mut().rng.reseed(number(&v));
    Ok(())
}

fn get_seed(ctx: &EvaluationContext) -> Value {
    Value::Number(ctx.frame().rng.seed())
}

fn set_name(ctx: &mut EvaluationContext, v: Value, _: Span) -> Result<(), RuntimeError> {
    if let Value::String(name) = v {
        ctx.frame_mut().name = Some(name);
    }
    Ok(())
}

fn get_name(ctx: &EvaluationContext) -> Value {
    Value::String(ctx.frame().name.clone().unwrap_or_default())
}

fn set_position(ctx: &mut EvaluationContext, v: Value, _: Span) -> Result<(), RuntimeError> {
    ctx.frame_mut().local.offset = vector(&v);
    Ok(())
}

fn get_position(ctx: &EvaluationContext) -> Value {
    Value::Vector(ctx.frame().local.offset)
}

fn set_orientation(ctx: &mut EvaluationContext, v: Value, _: Span) -> Result<(), RuntimeError> {
    let r = rotation(&v);
    let frame = ctx.frame_mut();
    frame.orientation = r;
    frame.local.rotation = quaternion(r);
    Ok(())
}

fn get_orientation(ctx: &EvaluationContext) -> Value {
    Value::Rotation(ctx.frame().orientation)
}

fn set_size(ctx: &mut EvaluationContext, v: Value, _: Span) -> Result<(), RuntimeError> {
    ctx.frame_mut().local.scale = vector(&v);
    Ok(())
}

fn get_size(ctx: &EvaluationContext) -> Value {
    Value::Size(ctx.frame().local.scale)
}

fn set_twist(ctx: &mut EvaluationContext, v: Value, _: Span) -> Result<(), RuntimeError> {
    ctx.frame_mut().twist = number(&v);
    Ok(())
}

fn get_twist(ctx: &EvaluationContext) -> Value {
    Value::Number(ctx.frame().twist)
}

fn set_along(ctx: &mut EvaluationContext, v: Value, _: Span) -> Result<(), RuntimeError> {
    let paths = match v {
        Value::Path(path) => vec![(*path).clone()],
        Value::Tuple(values) => values
            .into_iter()
            .filter_map(|value| match value {
                Value::Path(path) => Some((*path).clone()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    ctx.frame_mut().along = paths;
    Ok(())
}

fn get_along(ctx: &EvaluationContext) -> Value {
    let paths: Vec<Value> = ctx
        .frame()
        .along
        .iter()
        .map(|path| Value::Path(Rc::new(path.clone())))
        .collect();
    match paths.len() {
        0 => Value::void(),
        1 => paths.into_iter().next().expect("one path"),
        _ => Value::Tuple(paths),
    }
}

// =============================================================================
// BLOCK BUILDERS
// =============================================================================

fn reject_children(ctx: &mut EvaluationContext) -> Result<(), RuntimeError> {
    if let Some(child) = ctx.frame().children.first() {
        return Err(RuntimeError::new(RuntimeErrorKind::UnusedValue, child.span));
    }
    Ok(())
}

/// Build a leaf primitive from the invocation frame.
fn build_leaf(
    ctx: &mut EvaluationContext,
    kind: GeometryKind,
    span: Span,
) -> Result<Value, RuntimeError> {
    reject_children(ctx)?;
    let frame = ctx.frame();
    let matrix = frame.local.matrix();
    let material = frame.material.clone();
    let name = frame.name.clone();
    let node = ctx
        .builder
        .build(kind, matrix, &material, name, Vec::new(), span);
    Ok(Value::Mesh(node))
}

fn build_cube(ctx: &mut EvaluationContext, span: Span) -> Result<Value, RuntimeError> {
    build_leaf(ctx, GeometryKind::Cube, span)
}

fn build_sphere(ctx: &mut EvaluationContext, span: Span) -> Result<Value, RuntimeError> {
    let segments = ctx.frame().detail;
    build_leaf(ctx, GeometryKind::Sphere { segments }, span)
}

fn build_cylinder(ctx: &mut EvaluationContext, span: Span) -> Result<Value, RuntimeError> {
    let segments = ctx.frame().detail;
    build_leaf(ctx, GeometryKind::Cylinder { segments }, span)
}

fn build_cone(ctx: &mut EvaluationContext, span: Span) -> Result<Value, RuntimeError> {
    let segments = ctx.frame().detail;
    build_leaf(ctx, GeometryKind::Cone { segments }, span)
}

/// Build a container (group or CSG) that wraps its mesh children.
fn build_container(
    ctx: &mut EvaluationContext,
    kind: GeometryKind,
    span: Span,
) -> Result<Value, RuntimeError> {
    let children = ctx.geometry_children()?;
    let frame = ctx.frame();
    let matrix = frame.local.matrix();
    let material = frame.material.clone();
    let name = frame.name.clone();
    let node = ctx
        .builder
        .build(kind, matrix, &material, name, children, span);
    Ok(Value::Mesh(node))
}

fn build_group(ctx: &mut EvaluationContext, span: Span) -> Result<Value, RuntimeError> {
    build_container(ctx, GeometryKind::Group, span)
}

fn build_union(ctx: &mut EvaluationContext, span: Span) -> Result<Value, RuntimeError> {
    build_container(ctx, GeometryKind::Union, span)
}

fn build_difference(ctx: &mut EvaluationContext, span: Span) -> Result<Value, RuntimeError> {
    build_container(ctx, GeometryKind::Difference, span)
}

fn build_intersection(ctx: &mut EvaluationContext, span: Span) -> Result<Value, RuntimeError> {
    build_container(ctx, GeometryKind::Intersection, span)
}

fn build_xor(ctx: &mut EvaluationContext, span: Span) -> Result<Value, RuntimeError> {
    build_container(ctx, GeometryKind::Xor, span)
}

fn build_stencil(ctx: &mut EvaluationContext, span: Span) -> Result<Value, RuntimeError> {
    build_container(ctx, GeometryKind::Stencil, span)
}

fn build_hull(ctx: &mut EvaluationContext, span: Span) -> Result<Value, RuntimeError> {
    build_container(ctx, GeometryKind::Hull, span)
}

/// Collect the frame's children as paths for a builder block.
fn take_paths(ctx: &mut EvaluationContext) -> Result<Vec<Path>, RuntimeError> {
    let children = std::mem::take(&mut ctx.frame_mut().children);
    let mut paths = Vec::with_capacity(children.len());
    for child in children {
        match child.value {
            Value::Path(path) => paths.push((*path).clone()),
            _ => {
                return Err(RuntimeError::new(RuntimeErrorKind::UnusedValue, child.span));
            }
        }
    }
    Ok(paths)
}

fn build_path_consumer(
    ctx: &mut EvaluationContext,
    span: Span,
    make: impl FnOnce(&crate::context::Frame, Vec<Path>) -> GeometryKind,
) -> Result<Value, RuntimeError> {
    let paths = take_paths(ctx)?;
    let frame = ctx.frame();
    let kind = make(frame, paths);
    let matrix = frame.local.matrix();
    let material = frame.material.clone();
    let name = frame.name.clone();
    let node = ctx
        .builder
        .build(kind, matrix, &material, name, Vec::new(), span);
    Ok(Value::Mesh(node))
}

fn build_extrude(ctx: &mut EvaluationContext, span: Span) -> Result<Value, RuntimeError> {
    build_path_consumer(ctx, span, |frame, paths| GeometryKind::Extrude {
        paths,
        along: frame.along.clone(),
        twist: frame.twist,
    })
}

fn build_lathe(ctx: &mut EvaluationContext, span: Span) -> Result<Value, RuntimeError> {
    build_path_consumer(ctx, span, |frame, paths| GeometryKind::Lathe {
        paths,
        segments: frame.detail,
    })
}

fn build_loft(ctx: &mut EvaluationContext, span: Span) -> Result<Value, RuntimeError> {
    build_path_consumer(ctx, span, |_, paths| GeometryKind::Loft { paths })
}

fn build_fill(ctx: &mut EvaluationContext, span: Span) -> Result<Value, RuntimeError> {
    build_path_consumer(ctx, span, |_, paths| GeometryKind::Fill { paths })
}

/// Build a path value, baking the block's placement into the points.
fn finish_path(ctx: &mut EvaluationContext, path: Path) -> Result<Value, RuntimeError> {
    reject_children(ctx)?;
    let matrix = ctx.frame().local.matrix();
    Ok(Value::Path(Rc::new(path.transformed(matrix))))
}

fn build_circle(ctx: &mut EvaluationContext, _: Span) -> Result<Value, RuntimeError> {
    let detail = ctx.frame().detail;
    finish_path(ctx, Path::circle(1.0, detail))
}

fn build_square(ctx: &mut EvaluationContext, _: Span) -> Result<Value, RuntimeError> {
    finish_path(ctx, Path::rectangle(1.0, 1.0))
}

fn build_path(ctx: &mut EvaluationContext, _: Span) -> Result<Value, RuntimeError> {
    let frame = ctx.frame_mut();
    let path = Path {
        points: std::mem::take(&mut frame.path_points),
        closed: frame.path_closed,
    };
    finish_path(ctx, path)
}

// =============================================================================
// TESTS
// =============================================================================
