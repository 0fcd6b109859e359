//! End-to-end tests for the OpenSCAD-style dialect: `.scad` source parses
//! through the secondary front end, lowers to the shared AST, and evaluates
//! on the same evaluator.

use shape_eval::{evaluate, parse, LogDelegate, Scene};
use std::path::PathBuf;

fn scene_of(source: &str) -> Scene {
    let program = parse(source, Some(PathBuf::from("model.scad"))).expect("parse");
    let delegate = LogDelegate::new();
    evaluate(&program, &delegate, None).expect("evaluate")
}

fn log_of(source: &str) -> Vec<String> {
    let program = parse(source, Some(PathBuf::from("model.scad"))).expect("parse");
    let delegate = LogDelegate::new();
    evaluate(&program, &delegate, None).expect("evaluate");
    delegate.lines()
}

#[test]
fn cube_statement_produces_a_cube() {
    let scene = scene_of("cube(2);");
    assert_eq!(scene.children.len(), 1);
    assert_eq!(scene.children[0].kind.tag(), "cube");
}

#[test]
fn transform_chain_nests_groups() {
    let scene = scene_of("translate([1, 2, 3]) rotate([0, 0, 90]) cube(1);");
    assert_eq!(scene.children.len(), 1);
    let outer = &scene.children[0];
    assert_eq!(outer.kind.tag(), "group");
    assert_eq!(outer.children.len(), 1);
    assert_eq!(outer.children[0].kind.tag(), "group");
}

#[test]
fn union_collects_children() {
    let scene = scene_of("union() { cube(1); sphere(1); }");
    assert_eq!(scene.children[0].kind.tag(), "union");
    assert_eq!(scene.children[0].children.len(), 2);
}

#[test]
fn echo_maps_to_print() {
    assert_eq!(log_of("echo(1 + 2);"), vec!["3".to_string()]);
}

#[test]
fn trig_uses_degrees() {
    let expected = (60f64 * std::f64::consts::PI / 180.0).cos();
    assert_eq!(log_of("echo(cos(60));"), vec![format!("{expected}")]);
}

#[test]
fn modulo_and_power_lower_to_builtins() {
    assert_eq!(log_of("echo(7 % 3);"), vec!["1".to_string()]);
    assert_eq!(log_of("echo(2 ^ 8);"), vec!["256".to_string()]);
}

#[test]
fn modules_become_custom_blocks() {
    let scene = scene_of("module box(s = 1) { cube(s); } box(2); box();");
    assert_eq!(scene.children.len(), 2);
}

#[test]
fn functions_return_values() {
    assert_eq!(
        log_of("function double(x) = x * 2; echo(double(21));"),
        vec!["42".to_string()]
    );
}

#[test]
fn for_loop_over_scad_range() {
    assert_eq!(
        log_of("for (i = [1:3]) echo(i);"),
        vec!["1".to_string(), "2".to_string(), "3".to_string()]
    );
}

#[test]
fn for_loop_over_scad_vector() {
    assert_eq!(
        log_of("for (i = [3, 1, 4]) echo(i);"),
        vec!["3".to_string(), "1".to_string(), "4".to_string()]
    );
}

#[test]
fn if_else_translates() {
    assert_eq!(
        log_of("x = 2; if (x == 2) echo(1); else echo(0);"),
        vec!["1".to_string()]
    );
}

#[test]
fn let_bindings_scope_defines() {
    assert_eq!(log_of("let (a = 1, b = 2) echo(a + b);"), vec!["3".to_string()]);
}

#[test]
fn global_fn_sets_detail() {
    let scene = scene_of("$fn = 12; sphere(1);");
    // The extrude wrapper does not apply to spheres; detail flows through.
    match &scene.children[0].kind {
        shape_eval::GeometryKind::Sphere { segments } => assert_eq!(*segments, 12),
        other => panic!("expected sphere, got {other:?}"),
    }
}

#[test]
fn circles_wrap_in_extrude_at_top_level() {
    let scene = scene_of("circle(5);");
    assert_eq!(scene.children[0].kind.tag(), "extrude");
}

#[test]
fn identifier_mangling_keeps_programs_working() {
    assert_eq!(
        log_of("size = 2; _pad = 1; echo(size + _pad);"),
        vec!["3".to_string()]
    );
}

#[test]
fn unsupported_features_fail_to_parse() {
    let result = parse(
        "mirror([1, 0, 0]) cube(1);",
        Some(PathBuf::from("model.scad")),
    );
    assert!(result.is_err());
}
