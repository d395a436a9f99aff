//! Entry classification: one link-aware stat per entry, taken before
//! dispatch and never re-derived mid-copy.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::errors::{CopyError, Result};
use crate::vfs::SourceFs;

/// Kind of a filesystem entry. Sockets classify as `Device`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    NamedPipe,
    Device,
}

/// A classified entry: path plus the metadata snapshot routing decisions
/// are made from.
#[derive(Debug, Clone)]
pub struct Entry {
    pub path: PathBuf,
    pub kind: EntryKind,
    pub len: u64,
    /// Unix mode bits; `0o777` on platforms without them.
    pub mode: u32,
    pub mtime: SystemTime,
    pub atime: SystemTime,
    pub uid: u32,
    pub gid: u32,
}

impl Entry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Build an entry from a `symlink_metadata` result.
    pub fn from_metadata(path: PathBuf, meta: &fs::Metadata) -> Self {
        #[cfg(unix)]
        let (mode, uid, gid) = {
            use std::os::unix::fs::MetadataExt;
            (meta.mode(), meta.uid(), meta.gid())
        };
        #[cfg(not(unix))]
        let (mode, uid, gid) = (0o777u32, 0u32, 0u32);

        Self {
            path,
            kind: kind_of(meta),
            len: meta.len(),
            mode,
            mtime: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            atime: meta.accessed().unwrap_or(SystemTime::UNIX_EPOCH),
            uid,
            gid,
        }
    }
}

pub(crate) fn kind_of(meta: &fs::Metadata) -> EntryKind {
    let ft = meta.file_type();
    if ft.is_symlink() {
        return EntryKind::Symlink;
    }
    if ft.is_dir() {
        return EntryKind::Directory;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::FileTypeExt;
        if ft.is_fifo() {
            return EntryKind::NamedPipe;
        }
        if ft.is_block_device() || ft.is_char_device() || ft.is_socket() {
            return EntryKind::Device;
        }
    }
    EntryKind::File
}

/// Classify `path` through the active source filesystem. Side-effect-free;
/// does not follow symlinks.
pub fn classify(fs: &dyn SourceFs, path: &Path) -> Result<Entry> {
    fs.lstat(path).map_err(|e| CopyError::from_io(path, e))
}
