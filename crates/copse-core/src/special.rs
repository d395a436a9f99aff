//! Structural recreation of named pipes.

use std::path::Path;

use crate::classify::Entry;
use crate::errors::Result;

#[cfg(unix)]
pub(crate) fn make_fifo(entry: &Entry, dest: &Path) -> Result<()> {
    use std::ffi::CString;
    use std::io;
    use std::os::unix::ffi::OsStrExt;

    use crate::errors::CopyError;

    let c_dest = CString::new(dest.as_os_str().as_bytes()).map_err(|e| CopyError::Io {
        path: dest.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, e),
    })?;
    let rc = unsafe { libc::mkfifo(c_dest.as_ptr(), (entry.mode & 0o7777) as libc::mode_t) };
    if rc != 0 {
        return Err(CopyError::from_io(dest, io::Error::last_os_error()));
    }
    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn make_fifo(entry: &Entry, dest: &Path) -> Result<()> {
    let _ = dest;
    Err(crate::errors::CopyError::Unsupported {
        path: entry.path.clone(),
        reason: "named pipes are not supported on this platform".into(),
    })
}
