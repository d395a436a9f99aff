//! Symlink policy resolution: Shallow, Deep, or Skip, selected per link.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::classify::classify;
use crate::concurrency::CopyContext;
use crate::dispatch::{self, Node};
use crate::errors::{CopyError, Result};
use crate::meta;
use crate::options::{CopyOptions, SymlinkAction};

pub(crate) async fn resolve(
    node: Node,
    opts: Arc<CopyOptions>,
    ctx: Arc<CopyContext>,
) -> Result<()> {
    let action = match &opts.on_symlink {
        Some(policy) => policy(&node.entry.path),
        None => SymlinkAction::Shallow,
    };
    match action {
        SymlinkAction::Shallow => shallow(&node, &opts),
        SymlinkAction::Deep => deep(node, opts, ctx).await,
        SymlinkAction::Skip => Ok(()),
    }
}

/// Recreate the link with the same target string, resolved or not.
fn shallow(node: &Node, opts: &CopyOptions) -> Result<()> {
    let src = &node.entry.path;
    let dest = &node.dest;

    let target = match opts.source().read_link(src) {
        Ok(target) => target,
        // The link vanished under us: keep an equivalent placeholder
        // pointing at the source path rather than failing the walk.
        Err(e) if e.kind() == io::ErrorKind::NotFound => src.clone(),
        Err(e) => return Err(CopyError::from_io(src, e)),
    };

    if std::fs::symlink_metadata(dest).is_ok() {
        std::fs::remove_file(dest).map_err(|e| CopyError::from_io(dest, e))?;
    }
    make_link(&target, dest)?;

    if opts.preserve_times {
        meta::copy_times(&node.entry, dest, true)?;
    }
    Ok(())
}

/// Copy the link's referent in place of the link, re-entering the
/// dispatcher with the resolution chain extended.
async fn deep(node: Node, opts: Arc<CopyOptions>, ctx: Arc<CopyContext>) -> Result<()> {
    let src = node.entry.path.clone();
    let target = opts
        .source()
        .read_link(&src)
        .map_err(|e| CopyError::from_io(&src, e))?;

    let resolved = if target.is_absolute() {
        target
    } else {
        match src.parent() {
            Some(parent) => parent.join(&target),
            None => target,
        }
    };
    let resolved_abs = absolutize(&resolved);

    if node.links.iter().any(|seen| seen == &resolved_abs) {
        return Err(CopyError::SymlinkLoop { path: src });
    }

    let entry = classify(opts.source(), &resolved)?;
    let mut links = node.links;
    links.push(resolved_abs);
    dispatch::copy_next_or_skip(
        Node {
            entry,
            dest: node.dest,
            links,
        },
        opts,
        ctx,
    )
    .await
}

/// Normal form used by the cycle guard. Canonicalization collapses `..`
/// and intermediate links so a cycle looks the same on every revisit;
/// dangling targets fall back to a plain absolute path.
fn absolutize(path: &Path) -> PathBuf {
    std::fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(unix)]
fn make_link(target: &Path, dest: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, dest).map_err(|e| CopyError::from_io(dest, e))
}

#[cfg(windows)]
fn make_link(target: &Path, dest: &Path) -> Result<()> {
    std::os::windows::fs::symlink_file(target, dest).map_err(|e| CopyError::from_io(dest, e))
}
