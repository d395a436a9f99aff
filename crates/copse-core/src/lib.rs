//! Recursive subtree replication with hook-driven policy and bounded
//! concurrency.
//!
//! `copse` copies a file, directory, symlink, or special node from a source
//! path to a destination path. Every per-entry decision is customizable:
//! whether to skip an entry, how to treat symlinks, what to do when a
//! destination directory already exists, how final permissions are computed,
//! and how many file copies run in flight at once.
//!
//! ```rust,no_run
//! use copse_core::{copy_with, CopyOptions, DirExistsAction};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), copse_core::CopyError> {
//!     let mut options = CopyOptions::default();
//!     options.workers = 4;
//!     options.preserve_times = true;
//!     options.on_dir_exists = Some(Arc::new(|_src, _dest| DirExistsAction::Replace));
//!     copy_with("assets", "build/assets", options).await
//! }
//! ```
//!
//! Copies are not transactional: a failed call may leave a partial tree at
//! the destination.

pub mod classify;
pub mod errors;
pub mod options;
pub mod vfs;

mod concurrency;
mod conflict;
mod dispatch;
mod meta;
mod methods;
mod special;
mod symlink;

pub use classify::{classify, Entry, EntryKind};
pub use dispatch::{copy, copy_with};
pub use errors::{BoxError, CopyError};
pub use options::{
    CopyMethod, CopyOptions, DirExistsAction, ErrorMode, PermissionControl, SymlinkAction,
};
pub use vfs::{OsFs, SourceFs};
