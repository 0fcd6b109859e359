//! Import resolution tests against an in-memory delegate, covering both
//! dialects, the import cache, and error wrapping.

use shape_eval::{evaluate, parse, Delegate, Error, Geometry, LogDelegate, ResolveError};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// A delegate serving sources from memory and counting reads.
#[derive(Default)]
struct MemoryDelegate {
    files: HashMap<PathBuf, String>,
    log: LogDelegate,
    reads: RefCell<usize>,
}

impl MemoryDelegate {
    fn with_file(mut self, name: &str, source: &str) -> Self {
        self.files.insert(PathBuf::from(name), source.to_string());
        self
    }
}

impl Delegate for MemoryDelegate {
    fn resolve_url(&self, path: &str, _base: Option<&Path>) -> Result<PathBuf, ResolveError> {
        let url = PathBuf::from(path);
        if self.files.contains_key(&url) {
            Ok(url)
        } else {
            Err(ResolveError::NotFound)
        }
    }

    fn read_source(&self, url: &Path) -> Result<String, ResolveError> {
        *self.reads.borrow_mut() += 1;
        self.files.get(url).cloned().ok_or(ResolveError::NotFound)
    }

    fn import_geometry(&self, _url: &Path) -> Result<Option<Rc<Geometry>>, ResolveError> {
        Err(ResolveError::NotFound)
    }

    fn log(&self, message: String) {
        self.log.log(message);
    }
}

#[test]
fn imported_definitions_become_available() {
    let delegate = MemoryDelegate::default()
        .with_file("lib.shape", "define tau pi * 2");
    let program = parse("import \"lib.shape\"\nprint tau / pi", None).unwrap();
    evaluate(&program, &delegate, None).unwrap();
    assert_eq!(delegate.log.lines(), vec!["2".to_string()]);
}

#[test]
fn imported_geometry_joins_the_scene() {
    let delegate = MemoryDelegate::default().with_file("part.shape", "cube { size 2 }");
    let program = parse("import \"part.shape\"\nsphere", None).unwrap();
    let scene = evaluate(&program, &delegate, None).unwrap();
    assert_eq!(scene.children.len(), 2);
    assert_eq!(scene.children[0].kind.tag(), "cube");
}

#[test]
fn scad_files_import_through_the_lowering() {
    let delegate = MemoryDelegate::default().with_file("part.scad", "cube(2);");
    let program = parse("import \"part.scad\"", None).unwrap();
    let scene = evaluate(&program, &delegate, None).unwrap();
    assert_eq!(scene.children.len(), 1);
}

#[test]
fn repeated_imports_parse_once() {
    let delegate = MemoryDelegate::default().with_file("lib.shape", "define x 1");
    let program = parse(
        "import \"lib.shape\"\nimport \"lib.shape\"\nprint x",
        None,
    )
    .unwrap();
    evaluate(&program, &delegate, None).unwrap();
    assert_eq!(*delegate.reads.borrow(), 1);
}

#[test]
fn import_errors_wrap_the_inner_error() {
    let delegate = MemoryDelegate::default().with_file("bad.shape", "nonsense");
    let program = parse("import \"bad.shape\"", None).unwrap();
    let error = match evaluate(&program, &delegate, None) {
        Err(Error::Runtime(error)) => error,
        other => panic!("expected runtime error, got {other:?}"),
    };
    assert!(error.message().contains("bad.shape"));
    assert!(error.hint().unwrap().contains("unknown symbol"));
}

#[test]
fn cyclic_imports_trip_the_recursion_guard() {
    // A file importing itself must fail with a structured error rather
    // than recursing without bound.
    let delegate = MemoryDelegate::default().with_file("loop.shape", "import \"loop.shape\"");
    let program = parse("import \"loop.shape\"", None).unwrap();
    let error = match evaluate(&program, &delegate, None) {
        Err(Error::Runtime(error)) => error,
        other => panic!("expected runtime error, got {other:?}"),
    };
    // Unwind the nested import wrappers down to the root cause.
    let mut inner = &error;
    while let shape_eval::RuntimeErrorKind::ImportError { error, .. } = &inner.kind {
        inner = error.as_ref();
    }
    assert_eq!(inner.message(), "Too much recursion");
}

#[test]
fn mutually_recursive_imports_trip_the_recursion_guard() {
    let delegate = MemoryDelegate::default()
        .with_file("a.shape", "import \"b.shape\"")
        .with_file("b.shape", "import \"a.shape\"");
    let program = parse("import \"a.shape\"", None).unwrap();
    assert!(evaluate(&program, &delegate, None).is_err());
}

#[test]
fn import_parse_errors_are_reported() {
    let delegate = MemoryDelegate::default().with_file("broken.shape", "define");
    let program = parse("import \"broken.shape\"", None).unwrap();
    let error = match evaluate(&program, &delegate, None) {
        Err(Error::Runtime(error)) => error,
        other => panic!("expected runtime error, got {other:?}"),
    };
    assert!(error.message().contains("error parsing file"));
}

#[test]
fn import_of_non_string_is_a_type_mismatch() {
    let program = parse("import 42", None).unwrap();
    let delegate = MemoryDelegate::default();
    assert!(evaluate(&program, &delegate, None).is_err());
}
