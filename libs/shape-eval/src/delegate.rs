//! # Delegate
//!
//! The embedder-supplied collaborator for URL resolution, file reads,
//! geometry import, and logging. The evaluator calls the delegate
//! synchronously from its own thread; there are no other suspension points.

use crate::geometry::Geometry;
use std::cell::RefCell;
use std::path::{Path as FsPath, PathBuf};
use std::rc::Rc;

/// Why a path could not be resolved or read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveError {
    /// No file exists at the path.
    NotFound,
    /// The file exists but lies outside the allowed sandbox.
    AccessRestricted,
}

/// The embedder's collaborator.
pub trait Delegate {
    /// Map a source-relative path to an absolute location.
    ///
    /// `base` is the URL of the importing file, when known.
    fn resolve_url(&self, path: &str, base: Option<&FsPath>)
        -> Result<PathBuf, ResolveError>;

    /// Read a source file (`.shape` / `.scad`) as UTF-8 text.
    fn read_source(&self, url: &FsPath) -> Result<String, ResolveError>;

    /// Load a non-source file as geometry. `Ok(None)` means the file type
    /// is recognized but empty.
    fn import_geometry(&self, url: &FsPath) -> Result<Option<Rc<Geometry>>, ResolveError>;

    /// Record a `print`/`debug` emission.
    fn log(&self, message: String);
}

// =============================================================================
// FILESYSTEM DELEGATE
// =============================================================================

/// A straightforward filesystem delegate sandboxed to a root directory.
///
/// Paths that escape the sandbox resolve to [`ResolveError::AccessRestricted`].
/// Log output goes to the `tracing` subscriber.
#[derive(Debug)]
pub struct FileSystemDelegate {
    /// Sandbox root; resolved paths must stay inside it.
    root: PathBuf,
}

impl FileSystemDelegate {
    /// Create a delegate rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Delegate for FileSystemDelegate {
    fn resolve_url(
        &self,
        path: &str,
        base: Option<&FsPath>,
    ) -> Result<PathBuf, ResolveError> {
        let joined = match base.and_then(FsPath::parent) {
            Some(dir) => dir.join(path),
            None => self.root.join(path),
        };
        let resolved = joined.canonicalize().map_err(|_| ResolveError::NotFound)?;
        let root = self
            .root
            .canonicalize()
            .map_err(|_| ResolveError::NotFound)?;
        if resolved.starts_with(&root) {
            Ok(resolved)
        } else {
            Err(ResolveError::AccessRestricted)
        }
    }

    fn read_source(&self, url: &FsPath) -> Result<String, ResolveError> {
        std::fs::read_to_string(url).map_err(|_| ResolveError::NotFound)
    }

    fn import_geometry(&self, _url: &FsPath) -> Result<Option<Rc<Geometry>>, ResolveError> {
        // Mesh file decoding belongs to the geometry kernel.
        Ok(None)
    }

    fn log(&self, message: String) {
        tracing::info!(target: "shapescript", "{message}");
    }
}

// =============================================================================
// LOG DELEGATE
// =============================================================================

/// An in-memory delegate that records log lines; used by tests and handy
/// for embedders that only need `print` capture.
#[derive(Debug, Default)]
pub struct LogDelegate {
    lines: RefCell<Vec<String>>,
}

impl LogDelegate {
    /// Create an empty log delegate.
    pub fn new() -> Self {
        Self::default()
    }

    /// The log lines recorded so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }
}

impl Delegate for LogDelegate {
    fn resolve_url(
        &self,
        _path: &str,
        _base: Option<&FsPath>,
    ) -> Result<PathBuf, ResolveError> {
        Err(ResolveError::NotFound)
    }

    fn read_source(&self, _url: &FsPath) -> Result<String, ResolveError> {
        Err(ResolveError::NotFound)
    }

    fn import_geometry(&self, _url: &FsPath) -> Result<Option<Rc<Geometry>>, ResolveError> {
        Err(ResolveError::NotFound)
    }

    fn log(&self, message: String) {
        self.lines.borrow_mut().push(message);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_delegate_records_lines() {
        let delegate = LogDelegate::new();
        delegate.log("1".to_string());
        delegate.log("2".to_string());
        assert_eq!(delegate.lines(), vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_log_delegate_resolves_nothing() {
        let delegate = LogDelegate::new();
        assert_eq!(
            delegate.resolve_url("missing.shape", None),
            Err(ResolveError::NotFound)
        );
    }
}
