//! Source-side filesystem abstraction.
//!
//! The engine reads the source tree through this trait so callers can copy
//! out of embedded or in-memory trees. The destination is always the real
//! filesystem.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::classify::Entry;

pub trait SourceFs: Send + Sync {
    /// Link-aware stat. Must not follow symlinks.
    fn lstat(&self, path: &Path) -> io::Result<Entry>;

    /// Full child paths of a directory, in enumeration order. The order is
    /// whatever the underlying enumeration yields; it is not sorted.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Open a file for reading.
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>>;

    /// Read a symlink target. Virtual sources typically have none.
    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("source has no symlinks: {}", path.display()),
        ))
    }
}

/// The real filesystem; the default source.
pub struct OsFs;

impl SourceFs for OsFs {
    fn lstat(&self, path: &Path) -> io::Result<Entry> {
        let meta = fs::symlink_metadata(path)?;
        Ok(Entry::from_metadata(path.to_path_buf(), &meta))
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect()
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(fs::File::open(path)?))
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        fs::read_link(path)
    }
}
