//! End-to-end scenarios: parse + evaluate against a log-capturing delegate
//! and assert on the recorded `print` emissions.

use shape_eval::{evaluate, parse, Error, LogDelegate, RuntimeErrorKind};

/// Evaluate `source` and return the delegate log.
fn log_of(source: &str) -> Vec<String> {
    let program = parse(source, None).expect("parse");
    let delegate = LogDelegate::new();
    evaluate(&program, &delegate, None).expect("evaluate");
    delegate.lines()
}

/// Evaluate `source` expecting a runtime error.
fn error_of(source: &str) -> shape_eval::RuntimeError {
    let program = parse(source, None).expect("parse");
    let delegate = LogDelegate::new();
    match evaluate(&program, &delegate, None) {
        Err(Error::Runtime(error)) => error,
        Err(other) => panic!("expected runtime error, got {other:?}"),
        Ok(_) => panic!("expected error for {source:?}"),
    }
}

// =============================================================================
// FUNCTIONS & CONSTANTS
// =============================================================================

#[test]
fn print_cos_pi() {
    assert_eq!(log_of("print cos pi"), vec!["-1".to_string()]);
}

#[test]
fn print_nested_function_calls() {
    assert_eq!(log_of("print abs -3"), vec!["3".to_string()]);
    assert_eq!(log_of("print min 2 3"), vec!["2".to_string()]);
    assert_eq!(log_of("print pow 2 8"), vec!["256".to_string()]);
}

#[test]
fn function_mid_tuple_consumes_rest() {
    assert_eq!(log_of("print 1 cos pi"), vec!["1 -1".to_string()]);
}

// =============================================================================
// COLOR STATE
// =============================================================================

#[test]
fn color_property_round_trips() {
    assert_eq!(log_of("color 1 0 0\nprint color"), vec!["1 0 0 1".to_string()]);
    assert_eq!(log_of("color #fff\nprint color"), vec!["1 1 1 1".to_string()]);
    assert_eq!(
        log_of("color (1 0 0) 0.5\nprint color"),
        vec!["1 0 0 0.5".to_string()]
    );
}

#[test]
fn named_colors_resolve() {
    assert_eq!(log_of("color red\nprint color"), vec!["1 0 0 1".to_string()]);
}

#[test]
fn color_can_be_shadowed_by_define() {
    assert_eq!(
        log_of("define color white\nprint color"),
        vec!["1 1 1 1".to_string()]
    );
}

// =============================================================================
// LOOPS & RANGES
// =============================================================================

#[test]
fn for_loop_over_range() {
    assert_eq!(
        log_of("for i in 1 to 3 { print i }"),
        vec!["1".to_string(), "2".to_string(), "3".to_string()]
    );
}

#[test]
fn reversed_range_is_empty() {
    assert_eq!(log_of("for 3 to 1 { print 0 }"), Vec::<String>::new());
}

#[test]
fn for_loop_over_tuple() {
    assert_eq!(
        log_of("for i in (3 1 4 1 5) { print i }"),
        vec!["3", "1", "4", "1", "5"]
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>()
    );
}

#[test]
fn negative_step_counts_down() {
    assert_eq!(
        log_of("for i in 3 to 1 step -1 { print i }"),
        vec!["3".to_string(), "2".to_string(), "1".to_string()]
    );
}

#[test]
fn zero_step_is_an_assertion_failure() {
    let error = error_of("for i in 1 to 3 step 0 { print i }");
    assert_eq!(error.message(), "Step value must be nonzero");
}

#[test]
fn range_redefines_step() {
    assert_eq!(
        log_of("define range 1 to 5\nprint range step 2"),
        vec!["1 to 5 step 2".to_string()]
    );
    assert_eq!(
        log_of("define range 1 to 5 step 3\nprint range step 2"),
        vec!["1 to 5 step 2".to_string()]
    );
}

#[test]
fn range_members() {
    assert_eq!(
        log_of("define r 2 to 8 step 3\nprint r.start r.end r.step"),
        vec!["2 8 3".to_string()]
    );
}

#[test]
fn loop_index_is_scoped_to_the_loop() {
    let error = error_of("for i in 1 to 3 { }\nprint i");
    assert!(matches!(error.kind, RuntimeErrorKind::UnknownSymbol { .. }));
}

// =============================================================================
// TUPLES & COMPARISON
// =============================================================================

#[test]
fn juxtaposed_comparison_pairs_neighbours() {
    assert_eq!(
        log_of("print 1 2 3 = 1 2 3"),
        vec!["1 2 false 2 3".to_string()]
    );
}

#[test]
fn parenthesized_tuples_compare_whole() {
    assert_eq!(log_of("print (1 2 3) = (1 2 3)"), vec!["true".to_string()]);
    assert_eq!(log_of("print (1 2 3) <> (1 2 4)"), vec!["true".to_string()]);
}

#[test]
fn member_access_on_tuples() {
    assert_eq!(
        log_of("define v 1 2 3\nprint v.x v.depth v.third"),
        vec!["1 3 3".to_string()]
    );
}

#[test]
fn unknown_member_suggests() {
    let error = error_of("define v 1 2 3\nprint v.widht");
    assert_eq!(error.suggestion().as_deref(), Some("width"));
}

#[test]
fn tuple_arithmetic_is_elementwise() {
    assert_eq!(log_of("print (2 4 6) / 2"), vec!["1 2 3".to_string()]);
}

// =============================================================================
// DEFINITIONS, OPTIONS, RECURSION
// =============================================================================

#[test]
fn custom_block_returns_bare_value() {
    assert_eq!(log_of("define foo { 42 }\nprint foo"), vec!["42".to_string()]);
}

#[test]
fn custom_block_options_bind_from_caller() {
    let source = "define speed { option gear 1\n gear * 10 }\nprint speed { gear 3 }\nprint speed";
    assert_eq!(log_of(source), vec!["30".to_string(), "10".to_string()]);
}

#[test]
fn option_outside_definition_fails() {
    let error = error_of("option x 1");
    assert!(matches!(
        error.kind,
        RuntimeErrorKind::AssertionFailure { .. }
    ));
}

#[test]
fn runaway_recursion_is_caught() {
    let error = error_of("define foo { foo }\nfoo");
    assert_eq!(error.message(), "Too much recursion");
}

#[test]
fn defines_inside_blocks_do_not_leak() {
    let error = error_of("group { define x 1 }\nprint x");
    assert!(matches!(error.kind, RuntimeErrorKind::UnknownSymbol { .. }));
}

// =============================================================================
// RANDOMNESS
// =============================================================================

#[test]
fn rnd_is_deterministic_from_seed_zero() {
    let first = log_of("print rnd");
    let second = log_of("print rnd");
    assert_eq!(first, second);
}

#[test]
fn seed_resets_the_sequence() {
    let log = log_of("seed 7\ndefine a rnd\nseed 7\ndefine b rnd\nprint a = b");
    assert_eq!(log, vec!["true".to_string()]);
}

#[test]
fn group_advances_parent_rng() {
    // Drawing inside a group advances the enclosing sequence, so the two
    // draws differ exactly as if they ran inline.
    let log = log_of("define a rnd\nseed 0\ngroup { define unused rnd }\ndefine b rnd\nprint a = b");
    assert_eq!(log, vec!["false".to_string()]);
}

#[test]
fn definition_does_not_advance_parent_rng() {
    let log = log_of(
        "define noisy { define unused rnd }\nseed 0\ndefine a rnd\nseed 0\nnoisy\ndefine b rnd\nprint a = b",
    );
    assert_eq!(log, vec!["true".to_string()]);
}

// =============================================================================
// CONTROL FLOW & ERRORS
// =============================================================================

#[test]
fn if_else_chains() {
    let source = "define x 2\nif x = 1 { print \"one\" } else if x = 2 { print \"two\" } else { print \"many\" }";
    assert_eq!(log_of(source), vec!["two".to_string()]);
}

#[test]
fn if_requires_boolean() {
    let error = error_of("if 1 { print 1 }");
    assert!(matches!(
        error.kind,
        RuntimeErrorKind::TypeMismatch {
            expected: "boolean",
            ..
        }
    ));
}

#[test]
fn unknown_symbol_suggests_closest() {
    let error = error_of("spere");
    assert_eq!(error.suggestion().as_deref(), Some("sphere"));
}

#[test]
fn missing_argument_reports_type() {
    let error = error_of("translate");
    assert!(matches!(
        error.kind,
        RuntimeErrorKind::MissingArgument {
            expected: "vector",
            ..
        }
    ));
}

#[test]
fn too_many_color_components() {
    let error = error_of("color 1 0 0 0 0");
    assert!(matches!(
        error.kind,
        RuntimeErrorKind::UnexpectedArgument { max: 4, .. }
    ));
}

#[test]
fn import_of_missing_file_fails() {
    let error = error_of("import \"nothing.shape\"");
    assert!(matches!(error.kind, RuntimeErrorKind::FileNotFound { .. }));
}

// =============================================================================
// SCENE ASSEMBLY
// =============================================================================

#[test]
fn primitives_collect_into_the_scene() {
    let program = parse("cube\nsphere { size 2 }\ncylinder", None).unwrap();
    let delegate = LogDelegate::new();
    let scene = evaluate(&program, &delegate, None).unwrap();
    assert_eq!(scene.children.len(), 3);
    assert_eq!(scene.children[0].kind.tag(), "cube");
    assert_eq!(scene.children[1].kind.tag(), "sphere");
}

#[test]
fn csg_wraps_children_into_one_mesh() {
    let source = "difference {\n    cube { size 2 }\n    sphere\n}";
    let program = parse(source, None).unwrap();
    let delegate = LogDelegate::new();
    let scene = evaluate(&program, &delegate, None).unwrap();
    assert_eq!(scene.children.len(), 1);
    assert_eq!(scene.children[0].kind.tag(), "difference");
    assert_eq!(scene.children[0].children.len(), 2);
}

#[test]
fn translate_positions_following_children() {
    let source = "group {\n    cube\n    translate 1 2 3\n    cube\n}";
    let program = parse(source, None).unwrap();
    let delegate = LogDelegate::new();
    let scene = evaluate(&program, &delegate, None).unwrap();
    let group = &scene.children[0];
    assert_eq!(group.children.len(), 2);
    // First cube untouched, second wrapped with the cursor transform.
    assert_eq!(group.children[0].kind.tag(), "cube");
    assert_eq!(group.children[1].kind.tag(), "group");
}

#[test]
fn extrude_consumes_path_children() {
    let source = "extrude {\n    circle { size 2 }\n}";
    let program = parse(source, None).unwrap();
    let delegate = LogDelegate::new();
    let scene = evaluate(&program, &delegate, None).unwrap();
    assert_eq!(scene.children[0].kind.tag(), "extrude");
}

#[test]
fn mesh_inside_extrude_is_unused_value() {
    let error = error_of("extrude { cube }");
    assert!(matches!(error.kind, RuntimeErrorKind::UnusedValue));
}

#[test]
fn bare_value_inside_group_is_unused() {
    let error = error_of("group { 42 }");
    assert!(matches!(error.kind, RuntimeErrorKind::UnusedValue));
}

#[test]
fn path_block_collects_points() {
    let source = "fill {\n    path {\n        point 0 0\n        point 1 0\n        point 1 1\n        close\n    }\n}";
    let program = parse(source, None).unwrap();
    let delegate = LogDelegate::new();
    let scene = evaluate(&program, &delegate, None).unwrap();
    assert_eq!(scene.children[0].kind.tag(), "fill");
}

#[test]
fn material_is_recorded_on_geometry() {
    let source = "color red\nopacity 0.5\ncube";
    let program = parse(source, None).unwrap();
    let delegate = LogDelegate::new();
    let scene = evaluate(&program, &delegate, None).unwrap();
    let cube = &scene.children[0];
    assert_eq!(cube.opacity, 0.5);
    let color = cube.color.expect("color set");
    assert_eq!((color.r, color.g, color.b), (1.0, 0.0, 0.0));
}

#[test]
fn debug_marks_geometry() {
    let source = "debug cube { size 1 }";
    let program = parse(source, None).unwrap();
    let delegate = LogDelegate::new();
    let scene = evaluate(&program, &delegate, None).unwrap();
    assert!(scene.children[0].debug);
}
