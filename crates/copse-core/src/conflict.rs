//! Destination-directory conflict resolution, consulted once per directory
//! before its children are dispatched.

use std::io;
use std::path::Path;

use crate::concurrency::CopyContext;
use crate::errors::{CopyError, Result};
use crate::options::{CopyOptions, DirExistsAction};

pub(crate) enum DirPrecheck {
    Proceed,
    /// Untouchable: the directory is handled with no recursion and no
    /// metadata preservation.
    SkipSubtree,
}

/// Decide what to do about an existing destination directory.
///
/// The policy is never consulted for the top-level call's own destination
/// root: the caller chose that path explicitly, and Deep-symlink recursion
/// can re-enter it.
pub(crate) fn precheck(
    src: &Path,
    dest: &Path,
    opts: &CopyOptions,
    ctx: &CopyContext,
) -> Result<DirPrecheck> {
    match std::fs::metadata(dest) {
        Ok(_) => {
            if dest == ctx.root_dest {
                return Ok(DirPrecheck::Proceed);
            }
            let action = match &opts.on_dir_exists {
                Some(policy) => policy(src, dest),
                None => DirExistsAction::Merge,
            };
            match action {
                DirExistsAction::Merge => Ok(DirPrecheck::Proceed),
                DirExistsAction::Replace => {
                    log::debug!("replacing existing directory {}", dest.display());
                    std::fs::remove_dir_all(dest).map_err(|e| CopyError::from_io(dest, e))?;
                    Ok(DirPrecheck::Proceed)
                }
                DirExistsAction::Untouchable => Ok(DirPrecheck::SkipSubtree),
            }
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(DirPrecheck::Proceed),
        Err(e) => Err(CopyError::from_io(dest, e)),
    }
}
