//! Copy-on-write clone strategy.
//!
//! Linux uses the FICLONE ioctl (btrfs, xfs); macOS uses clonefile.
//! Both require source and destination on the same filesystem and a real
//! (non-virtual) source; anything else is `Unsupported`.

use std::path::Path;

use crate::classify::Entry;
use crate::errors::{CopyError, Result};
use crate::methods::CopyOutcome;
use crate::options::CopyOptions;

pub(crate) fn copy(entry: &Entry, dest: &Path, opts: &CopyOptions) -> Result<CopyOutcome> {
    if opts.source_fs.is_some() {
        return Err(CopyError::Unsupported {
            path: entry.path.clone(),
            reason: "cannot reflink from a virtual source filesystem".into(),
        });
    }
    clone_file(entry, dest)
}

#[cfg(target_os = "linux")]
fn clone_file(entry: &Entry, dest: &Path) -> Result<CopyOutcome> {
    use std::io;
    use std::os::unix::io::AsRawFd;

    let src = &entry.path;
    let input = match std::fs::File::open(src) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(CopyOutcome::SourceVanished),
        Err(e) => return Err(CopyError::from_io(src, e)),
    };
    let output = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(dest)
        .map_err(|e| CopyError::from_io(dest, e))?;

    let rc = unsafe { libc::ioctl(output.as_raw_fd(), libc::FICLONE, input.as_raw_fd()) };
    if rc != 0 {
        let err = io::Error::last_os_error();
        // Do not leave the empty destination file behind.
        let _ = std::fs::remove_file(dest);
        return Err(clone_failure(src, err));
    }
    Ok(CopyOutcome::Copied(entry.len))
}

#[cfg(target_os = "macos")]
fn clone_file(entry: &Entry, dest: &Path) -> Result<CopyOutcome> {
    use std::ffi::CString;
    use std::io;
    use std::os::unix::ffi::OsStrExt;

    let src = &entry.path;
    // clonefile refuses to overwrite; clear the destination first.
    if std::fs::symlink_metadata(dest).is_ok() {
        std::fs::remove_file(dest).map_err(|e| CopyError::from_io(dest, e))?;
    }

    let c_src = CString::new(src.as_os_str().as_bytes()).map_err(|e| CopyError::Io {
        path: src.clone(),
        source: io::Error::new(io::ErrorKind::InvalidInput, e),
    })?;
    let c_dest = CString::new(dest.as_os_str().as_bytes()).map_err(|e| CopyError::Io {
        path: dest.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, e),
    })?;

    let rc = unsafe { libc::clonefile(c_src.as_ptr(), c_dest.as_ptr(), 0) };
    if rc != 0 {
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::NotFound {
            return Ok(CopyOutcome::SourceVanished);
        }
        return Err(clone_failure(src, err));
    }
    Ok(CopyOutcome::Copied(entry.len))
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn clone_file(entry: &Entry, _dest: &Path) -> Result<CopyOutcome> {
    Err(CopyError::Unsupported {
        path: entry.path.clone(),
        reason: "copy method not supported on this platform".into(),
    })
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
fn clone_failure(src: &Path, err: std::io::Error) -> CopyError {
    match err.raw_os_error() {
        Some(code) if code == libc::EXDEV || code == libc::EOPNOTSUPP || code == libc::EINVAL => {
            CopyError::Unsupported {
                path: src.to_path_buf(),
                reason: format!("filesystem cannot reflink: {}", err),
            }
        }
        _ => CopyError::from_io(src, err),
    }
}
