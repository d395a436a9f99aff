//! Default strategy: buffered stream copy.

use std::io::{self, Read};
use std::path::Path;

use crate::classify::Entry;
use crate::errors::{CopyError, Result};
use crate::methods::CopyOutcome;
use crate::options::CopyOptions;
use crate::vfs::SourceFs;

const DEFAULT_BUFFER: usize = 64 * 1024;

pub(crate) async fn copy(entry: &Entry, dest: &Path, opts: &CopyOptions) -> Result<CopyOutcome> {
    if let Some(source_fs) = &opts.source_fs {
        return copy_virtual(source_fs.as_ref(), &entry.path, dest, opts);
    }

    let src = &entry.path;
    let file = match tokio::fs::File::open(src).await {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(CopyOutcome::SourceVanished),
        Err(e) => return Err(CopyError::from_io(src, e)),
    };
    let mut out = tokio::fs::File::create(dest)
        .await
        .map_err(|e| CopyError::from_io(dest, e))?;

    let capacity = if opts.copy_buffer_size > 0 {
        opts.copy_buffer_size
    } else {
        DEFAULT_BUFFER
    };
    let mut reader = tokio::io::BufReader::with_capacity(capacity, file);
    let written = tokio::io::copy_buf(&mut reader, &mut out)
        .await
        .map_err(|e| CopyError::from_io(dest, e))?;

    if opts.sync {
        out.sync_all().await.map_err(|e| CopyError::from_io(dest, e))?;
    }
    Ok(CopyOutcome::Copied(written))
}

/// Virtual sources hand out plain readers; drain them synchronously. Such
/// trees are in-memory, so this stays cheap.
fn copy_virtual(
    source_fs: &dyn SourceFs,
    src: &Path,
    dest: &Path,
    opts: &CopyOptions,
) -> Result<CopyOutcome> {
    let mut reader = match source_fs.open(src) {
        Ok(reader) => reader,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(CopyOutcome::SourceVanished),
        Err(e) => return Err(CopyError::from_io(src, e)),
    };

    let mut out = std::fs::File::create(dest).map_err(|e| CopyError::from_io(dest, e))?;
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .map_err(|e| CopyError::from_io(src, e))?;
    io::Write::write_all(&mut out, &buf).map_err(|e| CopyError::from_io(dest, e))?;
    if opts.sync {
        out.sync_all().map_err(|e| CopyError::from_io(dest, e))?;
    }
    Ok(CopyOutcome::Copied(buf.len() as u64))
}
