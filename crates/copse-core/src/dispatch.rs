//! The switchboard: routes each classified entry to the correct handler,
//! applying the rename hook, the specials gate, the skip predicate, and the
//! error hook along the way.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::classify::{classify, Entry, EntryKind};
use crate::concurrency::{self, CopyContext};
use crate::conflict::{self, DirPrecheck};
use crate::errors::{CopyError, Result};
use crate::meta;
use crate::methods::{self, CopyOutcome};
use crate::options::CopyOptions;
use crate::special;
use crate::symlink;

/// One unit of dispatch work: a classified source entry, its destination,
/// and the Deep-symlink resolution chain that led here.
pub(crate) struct Node {
    pub(crate) entry: Entry,
    pub(crate) dest: PathBuf,
    /// Absolutized targets of the Deep resolutions on this branch, used to
    /// refuse symlink cycles.
    pub(crate) links: Vec<PathBuf>,
}

/// Copy `src` to `dest` with default options.
pub async fn copy(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
    copy_with(src, dest, CopyOptions::default()).await
}

/// Copy `src` to `dest`. Works for files, directories, symlinks, and (when
/// allowed) special nodes; directories recurse.
pub async fn copy_with(
    src: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    options: CopyOptions,
) -> Result<()> {
    let src = src.as_ref().to_path_buf();
    let dest = dest.as_ref().to_path_buf();
    let opts = Arc::new(options);
    let ctx = Arc::new(CopyContext::new(&opts, dest.clone()));

    let entry = match classify(opts.source(), &src) {
        Ok(entry) => entry,
        Err(e) => return apply_error_hook(&src, &dest, Err(e), &opts),
    };
    switchboard(
        Node {
            entry,
            dest,
            links: Vec::new(),
        },
        opts,
        ctx,
    )
    .await
}

/// Consult the skip predicate, then route. Used for every non-root entry
/// (and for Deep-symlink re-entry).
pub(crate) fn copy_next_or_skip(
    node: Node,
    opts: Arc<CopyOptions>,
    ctx: Arc<CopyContext>,
) -> BoxFuture<'static, Result<()>> {
    Box::pin(async move {
        if let Some(skip) = &opts.skip {
            match skip(&node.entry, &node.entry.path, &node.dest) {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(source) => return Err(CopyError::Interrupted { source }),
            }
        }
        switchboard(node, opts, ctx).await
    })
}

/// Route one entry and pass the terminal result through the error hook.
pub(crate) fn switchboard(
    node: Node,
    opts: Arc<CopyOptions>,
    ctx: Arc<CopyContext>,
) -> BoxFuture<'static, Result<()>> {
    Box::pin(async move {
        let src = node.entry.path.clone();
        let dest = node.dest.clone();
        let result = route(node, opts.clone(), ctx).await;
        apply_error_hook(&src, &dest, result, &opts)
    })
}

async fn route(mut node: Node, opts: Arc<CopyOptions>, ctx: Arc<CopyContext>) -> Result<()> {
    if let Some(rename) = &opts.rename_destination {
        node.dest = rename(&node.entry.path, &node.dest).map_err(|source| CopyError::Io {
            path: node.entry.path.clone(),
            source: std::io::Error::other(source),
        })?;
    }

    if node.entry.kind == EntryKind::Device && !opts.specials {
        return Err(CopyError::Unsupported {
            path: node.entry.path.clone(),
            reason: "special file copying is disabled".into(),
        });
    }

    match node.entry.kind {
        EntryKind::Symlink => symlink::resolve(node, opts, ctx).await,
        EntryKind::Directory => copy_dir(node, opts, ctx).await,
        // No content to copy; recreate an equivalent node.
        EntryKind::NamedPipe => special::make_fifo(&node.entry, &node.dest),
        EntryKind::File | EntryKind::Device => copy_file(node, opts).await,
    }
}

/// Errors the hook is not allowed to see: caller logic failures stay fatal.
fn apply_error_hook(
    src: &Path,
    dest: &Path,
    result: Result<()>,
    opts: &CopyOptions,
) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(e @ CopyError::Interrupted { .. }) => Err(e),
        Err(e) => match &opts.on_error {
            None => Err(e),
            Some(hook) => match hook(src, dest, e) {
                None => Ok(()),
                Some(substituted) => Err(substituted),
            },
        },
    }
}

async fn copy_file(node: Node, opts: Arc<CopyOptions>) -> Result<()> {
    let Node { entry, dest, .. } = node;

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| CopyError::from_io(parent, e))?;
    }

    match methods::copy_bytes(&entry, &dest, &opts).await? {
        CopyOutcome::SourceVanished => {
            // Expected under concurrent external mutation; nothing to copy.
            log::debug!("source vanished before copy: {}", entry.path.display());
            return Ok(());
        }
        CopyOutcome::Copied(bytes) => {
            log::trace!("copied {} bytes to {}", bytes, dest.display());
        }
    }

    opts.permission_control.prepare_file(&entry, &dest).finish()?;
    if opts.preserve_owner {
        meta::copy_owner(&entry, &dest, false)?;
    }
    if opts.preserve_times {
        meta::copy_times(&entry, &dest, false)?;
    }
    Ok(())
}

async fn copy_dir(node: Node, opts: Arc<CopyOptions>, ctx: Arc<CopyContext>) -> Result<()> {
    let Node { entry, dest, links } = node;

    match conflict::precheck(&entry.path, &dest, &opts, &ctx)? {
        DirPrecheck::SkipSubtree => return Ok(()),
        DirPrecheck::Proceed => {}
    }

    // Created permissive; the guard restores the real mode after the
    // children finish, on every exit path.
    let guard = opts.permission_control.prepare_dir(&entry, &dest)?;
    copy_children(&entry, &dest, links, opts.clone(), ctx).await?;
    guard.finish()?;

    if opts.preserve_owner {
        meta::copy_owner(&entry, &dest, false)?;
    }
    if opts.preserve_times {
        meta::copy_times(&entry, &dest, false)?;
    }
    Ok(())
}

async fn copy_children(
    entry: &Entry,
    dest: &Path,
    links: Vec<PathBuf>,
    opts: Arc<CopyOptions>,
    ctx: Arc<CopyContext>,
) -> Result<()> {
    let child_paths = match opts.source().read_dir(&entry.path) {
        Ok(paths) => paths,
        // A subtree that vanished mid-walk is nothing to copy, not an error.
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(CopyError::from_io(&entry.path, e)),
    };

    let mut children = Vec::with_capacity(child_paths.len());
    for child_src in child_paths {
        let Some(name) = child_src.file_name().map(|n| n.to_os_string()) else {
            continue;
        };
        let child_entry = classify(opts.source(), &child_src)?;
        children.push(Node {
            entry: child_entry,
            dest: dest.join(name),
            links: links.clone(),
        });
    }

    if concurrency::directory_concurrent(&opts, &entry.path, dest) {
        concurrency::run_concurrent(children, opts, ctx).await
    } else {
        concurrency::run_sequential(children, opts, ctx).await
    }
}
