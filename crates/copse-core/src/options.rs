//! Per-call configuration: policy selectors, hooks, and tuning knobs.
//!
//! Options are resolved once at call entry and read-only for the rest of
//! the traversal. Policies return enumerated variants; hooks are small
//! closures shared across worker tasks.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::classify::Entry;
use crate::errors::{BoxError, CopyError};
use crate::vfs::{OsFs, SourceFs};

/// What to do with a symlink entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymlinkAction {
    /// Recreate the link itself, pointing at the same target string.
    Shallow,
    /// Copy the link's resolved referent in place of the link.
    Deep,
    /// Omit the link with no error.
    Skip,
}

/// What to do when a nested destination directory already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirExistsAction {
    /// Proceed into the existing directory; destination-only files survive.
    Merge,
    /// Remove the destination directory and its contents, then recreate.
    Replace,
    /// Leave the directory and all its descendants unmodified.
    Untouchable,
}

/// How the final mode of a copied entry is computed from its source mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionControl {
    /// Copy the source mode verbatim.
    Preserve,
    /// Source mode with extra bits OR-ed in.
    AddMode(u32),
    /// A fixed mode, ignoring the source.
    FixedMode(u32),
    /// Leave whatever the create call produced.
    DoNothing,
}

/// Byte-level copy strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyMethod {
    /// Buffered stream copy. Works everywhere.
    Buffered,
    /// Copy-on-write clone (FICLONE / clonefile). Same-filesystem only;
    /// fails as unsupported elsewhere.
    Reflink,
}

/// Error aggregation across a directory's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorMode {
    /// First error cancels the directory's fan-out and wins.
    FailFast,
    /// Every child runs to completion; errors are collected.
    CollectAll,
}

pub type SymlinkPolicy = Arc<dyn Fn(&Path) -> SymlinkAction + Send + Sync>;
pub type DirExistsPolicy = Arc<dyn Fn(&Path, &Path) -> DirExistsAction + Send + Sync>;
/// `(entry, src, dest) -> Ok(true)` to omit the entry and its subtree. An
/// `Err` aborts the whole parent traversal.
pub type SkipPredicate = Arc<dyn Fn(&Entry, &Path, &Path) -> Result<bool, BoxError> + Send + Sync>;
/// Remap the destination path of an entry before it is routed.
pub type RenameHook = Arc<dyn Fn(&Path, &Path) -> Result<PathBuf, BoxError> + Send + Sync>;
/// Intercept a terminal error: `None` suppresses it, `Some` substitutes.
pub type ErrorHook = Arc<dyn Fn(&Path, &Path, CopyError) -> Option<CopyError> + Send + Sync>;
/// Force concurrent (`true`) or sequential (`false`) handling of one
/// directory's children. Only consulted when `workers > 1`.
pub type ConcurrencyPreference = Arc<dyn Fn(&Path, &Path) -> bool + Send + Sync>;

#[derive(Clone)]
pub struct CopyOptions {
    /// Per-link policy; absent means `Shallow`.
    pub on_symlink: Option<SymlinkPolicy>,
    /// Per-directory conflict policy; absent means `Merge`.
    pub on_dir_exists: Option<DirExistsPolicy>,
    pub skip: Option<SkipPredicate>,
    pub rename_destination: Option<RenameHook>,
    pub on_error: Option<ErrorHook>,
    pub permission_control: PermissionControl,
    pub preserve_times: bool,
    pub preserve_owner: bool,
    /// Permit-pool capacity. `<= 1` disables concurrency entirely.
    pub workers: usize,
    pub prefer_concurrent: Option<ConcurrencyPreference>,
    /// Allow device/socket entries to be copied instead of rejected.
    pub specials: bool,
    pub method: CopyMethod,
    /// Buffer capacity for the buffered method; `0` picks the default.
    pub copy_buffer_size: usize,
    /// fsync each copied file before reporting success.
    pub sync: bool,
    pub error_mode: ErrorMode,
    /// Alternate source filesystem; absent means the real one.
    pub source_fs: Option<Arc<dyn SourceFs>>,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            on_symlink: None,
            on_dir_exists: None,
            skip: None,
            rename_destination: None,
            on_error: None,
            permission_control: PermissionControl::Preserve,
            preserve_times: false,
            preserve_owner: false,
            workers: 1,
            prefer_concurrent: None,
            specials: true,
            method: CopyMethod::Buffered,
            copy_buffer_size: 0,
            sync: false,
            error_mode: ErrorMode::FailFast,
            source_fs: None,
        }
    }
}

impl CopyOptions {
    pub(crate) fn source(&self) -> &dyn SourceFs {
        match &self.source_fs {
            Some(fs) => fs.as_ref(),
            None => &OsFs,
        }
    }
}
