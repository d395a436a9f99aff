//! Byte-level copy strategies. Each is a thin wrapper over a platform
//! primitive; the dispatcher owns parent creation and metadata.

mod buffered;
mod reflink;

use std::path::Path;

use crate::classify::Entry;
use crate::errors::Result;
use crate::options::{CopyMethod, CopyOptions};

pub(crate) enum CopyOutcome {
    Copied(u64),
    /// The source disappeared between classification and open.
    SourceVanished,
}

pub(crate) async fn copy_bytes(
    entry: &Entry,
    dest: &Path,
    opts: &CopyOptions,
) -> Result<CopyOutcome> {
    match opts.method {
        CopyMethod::Buffered => buffered::copy(entry, dest, opts).await,
        CopyMethod::Reflink => reflink::copy(entry, dest, opts),
    }
}
