//! # Member Lookup
//!
//! Fixed member tables per value type, including the English ordinal names
//! (`first` through `ninetyninth`) that index tuples.

use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::value::Value;
use shape_ast::Span;
use std::sync::OnceLock;

/// Supported ordinal range: `first` ... `ninetyninth`.
pub const MAX_ORDINAL: usize = 99;

/// The ordinal member names, in order (`ordinals()[0] == "first"`).
pub fn ordinals() -> &'static [String] {
    static ORDINALS: OnceLock<Vec<String>> = OnceLock::new();
    ORDINALS.get_or_init(|| {
        let units = [
            "first", "second", "third", "fourth", "fifth", "sixth", "seventh", "eighth", "ninth",
        ];
        let teens = [
            "tenth",
            "eleventh",
            "twelfth",
            "thirteenth",
            "fourteenth",
            "fifteenth",
            "sixteenth",
            "seventeenth",
            "eighteenth",
            "nineteenth",
        ];
        let tens = [
            "twentieth",
            "thirtieth",
            "fortieth",
            "fiftieth",
            "sixtieth",
            "seventieth",
            "eightieth",
            "ninetieth",
        ];
        let prefixes = [
            "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
        ];

        (1..=MAX_ORDINAL)
            .map(|i| match i {
                1..=9 => units[i - 1].to_string(),
                10..=19 => teens[i - 10].to_string(),
                _ if i % 10 == 0 => tens[i / 10 - 2].to_string(),
                _ => format!("{}{}", prefixes[i / 10 - 2], units[i % 10 - 1]),
            })
            .collect()
    })
}

/// The 1-based index an ordinal name refers to.
pub fn ordinal_index(name: &str) -> Option<usize> {
    ordinals().iter().position(|o| o == name).map(|i| i + 1)
}

// =============================================================================
// LOOKUP
// =============================================================================

/// Look up a member of `value`, or fail with the valid member names.
pub fn lookup(value: &Value, name: &str, span: Span) -> Result<Value, RuntimeError> {
    let found = match value {
        Value::Tuple(values) => tuple_member(values, name),
        Value::Vector(v) | Value::Size(v) => {
            let values = [
                Value::Number(v.x),
                Value::Number(v.y),
                Value::Number(v.z),
            ];
            tuple_member(&values, name)
        }
        Value::Rotation(r) => match name {
            "roll" => Some(Value::Number(r.roll)),
            "pitch" => Some(Value::Number(r.pitch)),
            "yaw" => Some(Value::Number(r.yaw)),
            _ => None,
        },
        Value::Color(c) => match name {
            "red" => Some(Value::Number(c.r)),
            "green" => Some(Value::Number(c.g)),
            "blue" => Some(Value::Number(c.b)),
            "alpha" => Some(Value::Number(c.a)),
            _ => ordinal_index(name).and_then(|i| match i {
                1 => Some(Value::Number(c.r)),
                2 => Some(Value::Number(c.g)),
                3 => Some(Value::Number(c.b)),
                4 => Some(Value::Number(c.a)),
                _ => None,
            }),
        },
        Value::Range(r) => match name {
            "start" => Some(Value::Number(r.from)),
            "end" => Some(Value::Number(r.to)),
            "step" => Some(Value::Number(r.effective_step())),
            _ => None,
        },
        Value::Number(_) => match name {
            "first" | "x" => Some(value.clone()),
            _ => None,
        },
        _ => match name {
            "first" => Some(value.clone()),
            _ => None,
        },
    };

    found.ok_or_else(|| {
        RuntimeError::new(
            RuntimeErrorKind::UnknownMember {
                name: name.to_string(),
                of: value.type_name(),
                options: member_names(value),
            },
            span,
        )
    })
}

/// Members shared by tuples and vectors: axis names, their size and
/// rotation aliases, color aliases, and ordinals.
fn tuple_member(values: &[Value], name: &str) -> Option<Value> {
    let get = |i: usize| values.get(i).cloned();
    match name {
        "x" | "width" | "roll" | "red" => get(0),
        "y" | "height" | "pitch" | "green" => get(1),
        "z" | "depth" | "yaw" | "blue" => get(2),
        // Alpha defaults to 1 for color-like reads of short tuples.
        "alpha" => Some(get(3).unwrap_or(Value::Number(1.0))),
        _ => ordinal_index(name).and_then(|i| get(i - 1)),
    }
}

/// Valid member names of a value, for suggestions.
pub fn member_names(value: &Value) -> Vec<String> {
    let ordinal_names = |count: usize| {
        ordinals()
            .iter()
            .take(count.min(MAX_ORDINAL))
            .cloned()
            .collect::<Vec<_>>()
    };
    match value {
        Value::Tuple(values) => {
            let mut names: Vec<String> = [
                "x", "y", "z", "width", "height", "depth", "roll", "pitch", "yaw", "red", "green",
                "blue", "alpha",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect();
            names.extend(ordinal_names(values.len()));
            names
        }
        Value::Vector(_) | Value::Size(_) => {
            let mut names: Vec<String> = [
                "x", "y", "z", "width", "height", "depth", "roll", "pitch", "yaw", "red", "green",
                "blue", "alpha",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect();
            names.extend(ordinal_names(3));
            names
        }
        Value::Rotation(_) => vec!["roll".to_string(), "pitch".to_string(), "yaw".to_string()],
        Value::Color(_) => {
            let mut names = vec![
                "red".to_string(),
                "green".to_string(),
                "blue".to_string(),
                "alpha".to_string(),
            ];
            names.extend(ordinal_names(4));
            names
        }
        Value::Range(_) => vec![
            "start".to_string(),
            "end".to_string(),
            "step".to_string(),
        ],
        Value::Number(_) => vec!["first".to_string(), "x".to_string()],
        _ => vec!["first".to_string()],
    }
}

// =============================================================================
// TESTS
// =============================================================================
