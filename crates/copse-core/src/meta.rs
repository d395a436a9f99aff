//! Metadata preservation: deferred permission application, ownership, and
//! timestamps. All of it runs after an entry's content operation succeeds;
//! directory modes additionally wait for the children to finish.

use std::io;
use std::path::{Path, PathBuf};

use filetime::FileTime;

use crate::classify::Entry;
use crate::errors::{CopyError, Result};
use crate::options::PermissionControl;

/// Directories are created with this working mode so children can be
/// populated even when the source mode is restrictive. The real mode is
/// restored by the guard once the directory is done.
#[cfg(unix)]
const DIR_WORKING_MODE: u32 = 0o755;

/// Deferred chmod. `finish` applies the final mode and surfaces failures;
/// if the guard is dropped on an error path instead, the mode is still
/// applied best-effort so a restrictive directory never stays writable.
pub(crate) struct ChmodGuard {
    dest: PathBuf,
    #[cfg_attr(not(unix), allow(dead_code))]
    mode: Option<u32>,
    armed: bool,
}

impl ChmodGuard {
    pub(crate) fn finish(mut self) -> Result<()> {
        self.armed = false;
        match self.apply() {
            Ok(()) => Ok(()),
            Err(e) => Err(CopyError::from_io(&self.dest, e)),
        }
    }

    fn apply(&self) -> io::Result<()> {
        #[cfg(unix)]
        if let Some(mode) = self.mode {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.dest, std::fs::Permissions::from_mode(mode))?;
        }
        Ok(())
    }
}

impl Drop for ChmodGuard {
    fn drop(&mut self) {
        if self.armed {
            if let Err(e) = self.apply() {
                log::debug!("could not restore mode on {}: {}", self.dest.display(), e);
            }
        }
    }
}

impl PermissionControl {
    fn final_mode(&self, src_mode: u32) -> Option<u32> {
        match self {
            PermissionControl::Preserve => Some(src_mode & 0o7777),
            PermissionControl::AddMode(bits) => Some((src_mode & 0o7777) | bits),
            PermissionControl::FixedMode(mode) => Some(*mode),
            PermissionControl::DoNothing => None,
        }
    }

    /// Create the destination directory (parents included) in the working
    /// mode and hand back the deferred restore action.
    pub(crate) fn prepare_dir(&self, entry: &Entry, dest: &Path) -> Result<ChmodGuard> {
        let final_mode = self.final_mode(entry.mode);
        // DoNothing keeps whatever mode the create call produces, so it
        // creates with the source mode directly instead of the working one.
        let create_mode = match final_mode {
            Some(_) => working_mode(),
            None => entry.mode & 0o7777,
        };
        make_dir_all(dest, create_mode).map_err(|e| CopyError::from_io(dest, e))?;
        Ok(ChmodGuard {
            dest: dest.to_path_buf(),
            mode: final_mode,
            armed: true,
        })
    }

    /// Deferred chmod for a copied file.
    pub(crate) fn prepare_file(&self, entry: &Entry, dest: &Path) -> ChmodGuard {
        ChmodGuard {
            dest: dest.to_path_buf(),
            mode: self.final_mode(entry.mode),
            armed: true,
        }
    }
}

#[cfg(unix)]
fn working_mode() -> u32 {
    DIR_WORKING_MODE
}

#[cfg(not(unix))]
fn working_mode() -> u32 {
    0o777
}

#[cfg(unix)]
fn make_dir_all(dest: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true).mode(mode);
    builder.create(dest)
}

#[cfg(not(unix))]
fn make_dir_all(dest: &Path, _mode: u32) -> io::Result<()> {
    std::fs::create_dir_all(dest)
}

/// Copy atime/mtime from the source snapshot. Links use the
/// non-dereferencing variant so the times land on the link itself.
pub(crate) fn copy_times(entry: &Entry, dest: &Path, symlink: bool) -> Result<()> {
    let atime = FileTime::from_system_time(entry.atime);
    let mtime = FileTime::from_system_time(entry.mtime);
    let result = if symlink {
        filetime::set_symlink_file_times(dest, atime, mtime)
    } else {
        filetime::set_file_times(dest, atime, mtime)
    };
    result.map_err(|e| CopyError::from_io(dest, e))
}

/// Copy uid/gid from the source snapshot.
#[cfg(unix)]
pub(crate) fn copy_owner(entry: &Entry, dest: &Path, symlink: bool) -> Result<()> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let c_dest = CString::new(dest.as_os_str().as_bytes()).map_err(|e| CopyError::Io {
        path: dest.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, e),
    })?;
    let rc = unsafe {
        if symlink {
            libc::lchown(c_dest.as_ptr(), entry.uid, entry.gid)
        } else {
            libc::chown(c_dest.as_ptr(), entry.uid, entry.gid)
        }
    };
    if rc != 0 {
        return Err(CopyError::from_io(dest, io::Error::last_os_error()));
    }
    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn copy_owner(_entry: &Entry, _dest: &Path, _symlink: bool) -> Result<()> {
    Ok(())
}
