//! Round-trip tests: printing a parsed program and reparsing it reaches a
//! canonical fixed point.

use shape_ast::print_statements;
use shape_parser::parse;

/// Asserts that `print ∘ parse` is idempotent for `source`.
fn assert_round_trip(source: &str) {
    let first = print_statements(&parse(source).expect("initial parse"));
    let second = print_statements(&parse(&first).expect("reparse of printed form"));
    assert_eq!(first, second, "canonical form of {source:?} is not stable");
}

#[test]
fn round_trip_commands() {
    assert_round_trip("color 1 0 0");
    assert_round_trip("translate 1 2 3\nrotate 0.5");
    assert_round_trip("print \"hello \\\"world\\\"\"");
}

#[test]
fn round_trip_expressions() {
    assert_round_trip("print 1 + 2 * 3");
    assert_round_trip("print (1 2 3) = (1 2 3)");
    assert_round_trip("print 1 2 3 = 1 2 3");
    assert_round_trip("print -x.width");
    assert_round_trip("print #ff0080");
}

#[test]
fn round_trip_ranges() {
    assert_round_trip("for i in 1 to 10 step 2 { cube }");
    assert_round_trip("define r 1 to 5\nprint r step 2");
}

#[test]
fn round_trip_blocks_and_definitions() {
    assert_round_trip("define wheel {\n    option spokes 5\n    cylinder\n}\nwheel { spokes 6 }");
    assert_round_trip("group {\n    cube { size 1 2 3 }\n    sphere\n}");
}

#[test]
fn round_trip_control_flow() {
    assert_round_trip("if a and b { cube } else if not c { sphere } else { cone }");
    assert_round_trip("for 3 to 1 { print 0 }");
    assert_round_trip("import \"shapes.shape\"");
}

#[test]
fn parsed_spans_lie_within_source() {
    let source = "define x 1\nif x > 0 { cube { size x } }\n";
    let statements = parse(source).unwrap();
    for statement in &statements {
        assert!(!statement.span.is_empty());
        assert!(statement.span.end() <= source.len());
    }
}
