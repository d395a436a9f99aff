//! Error taxonomy for copy operations.
//!
//! Every error carries the path it refers to so the error hook (and the
//! caller) can report or recover per entry. Raw IO errors are lifted onto
//! the named variants whenever the `io::ErrorKind` is meaningful to policy.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Boxed error used by caller-supplied hooks.
pub type BoxError = Box<dyn Error + Send + Sync>;

pub type Result<T, E = CopyError> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum CopyError {
    /// The source path (or a child classified mid-walk) does not exist.
    NotFound { path: PathBuf },
    PermissionDenied { path: PathBuf },
    AlreadyExists { path: PathBuf },
    /// Operation not available in this configuration: special files
    /// disabled, copy method not supported on this platform, or a method
    /// incompatible with a virtual source filesystem.
    Unsupported { path: PathBuf, reason: String },
    /// A Deep symlink resolution revisited a target already on the current
    /// resolution chain.
    SymlinkLoop { path: PathBuf },
    /// A caller-supplied hook (skip predicate, preference hook) failed.
    /// Treated as a caller logic failure: always fatal, never offered to
    /// the error hook.
    Interrupted { source: BoxError },
    /// A sibling failed first; this entry's permit acquisition was
    /// cancelled before its copy started.
    Cancelled,
    Io { path: PathBuf, source: io::Error },
    /// Aggregate outcome of a traversal run in collect-all mode.
    Multiple(Vec<CopyError>),
}

impl CopyError {
    /// Lift an IO error, mapping the kinds the engine makes decisions on.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        let path = path.to_path_buf();
        match err.kind() {
            io::ErrorKind::NotFound => CopyError::NotFound { path },
            io::ErrorKind::PermissionDenied => CopyError::PermissionDenied { path },
            io::ErrorKind::AlreadyExists => CopyError::AlreadyExists { path },
            _ => CopyError::Io { path, source: err },
        }
    }

    /// The path this error refers to, when there is a single one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            CopyError::NotFound { path }
            | CopyError::PermissionDenied { path }
            | CopyError::AlreadyExists { path }
            | CopyError::Unsupported { path, .. }
            | CopyError::SymlinkLoop { path }
            | CopyError::Io { path, .. } => Some(path),
            CopyError::Interrupted { .. } | CopyError::Cancelled | CopyError::Multiple(_) => None,
        }
    }
}

impl fmt::Display for CopyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopyError::NotFound { path } => write!(f, "not found: {}", path.display()),
            CopyError::PermissionDenied { path } => {
                write!(f, "permission denied: {}", path.display())
            }
            CopyError::AlreadyExists { path } => {
                write!(f, "already exists: {}", path.display())
            }
            CopyError::Unsupported { path, reason } => {
                write!(f, "unsupported operation on {}: {}", path.display(), reason)
            }
            CopyError::SymlinkLoop { path } => {
                write!(f, "symlink cycle detected at {}", path.display())
            }
            CopyError::Interrupted { source } => write!(f, "interrupted by hook: {}", source),
            CopyError::Cancelled => write!(f, "cancelled after sibling failure"),
            CopyError::Io { path, source } => {
                write!(f, "io error on {}: {}", path.display(), source)
            }
            CopyError::Multiple(errors) => {
                write!(f, "{} entries failed", errors.len())?;
                for e in errors {
                    write!(f, "; {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl Error for CopyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CopyError::Io { source, .. } => Some(source),
            CopyError::Interrupted { source } => Some(source.as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_kinds_map_to_named_variants() {
        let p = Path::new("/tmp/x");
        let e = CopyError::from_io(p, io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(matches!(e, CopyError::NotFound { .. }));
        let e = CopyError::from_io(p, io::Error::new(io::ErrorKind::PermissionDenied, "no"));
        assert!(matches!(e, CopyError::PermissionDenied { .. }));
        let e = CopyError::from_io(p, io::Error::new(io::ErrorKind::AlreadyExists, "dup"));
        assert!(matches!(e, CopyError::AlreadyExists { .. }));
        let e = CopyError::from_io(p, io::Error::new(io::ErrorKind::Other, "misc"));
        assert!(matches!(e, CopyError::Io { .. }));
    }

    #[test]
    fn display_names_the_failing_path() {
        let e = CopyError::NotFound {
            path: PathBuf::from("/src/missing"),
        };
        assert!(e.to_string().contains("/src/missing"));
    }
}
