//! Bounded fan-out of a directory's children.
//!
//! Directory recursion is never permit-gated (gating it could deadlock the
//! pool on deep trees); only leaf file copies take a permit. A cancellation
//! token is derived per fan-out: the first child error cancels it, pending
//! permit acquisitions observe the token and fail fast, and running byte
//! copies are allowed to finish. Every spawned task is joined before the
//! directory call returns.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::classify::EntryKind;
use crate::dispatch::{self, Node};
use crate::errors::{CopyError, Result};
use crate::options::{CopyOptions, ErrorMode};

/// State shared across one top-level copy call.
pub(crate) struct CopyContext {
    /// Permit pool bounding in-flight file copies. Present only when the
    /// configured worker count allows concurrency.
    pub(crate) permits: Option<Arc<Semaphore>>,
    /// The top-level destination root, exempt from the dir-exists policy.
    pub(crate) root_dest: PathBuf,
}

impl CopyContext {
    pub(crate) fn new(opts: &CopyOptions, root_dest: PathBuf) -> Self {
        let permits = if opts.workers > 1 {
            Some(Arc::new(Semaphore::new(opts.workers)))
        } else {
            None
        };
        Self { permits, root_dest }
    }
}

/// Whether this directory's children run concurrently.
pub(crate) fn directory_concurrent(opts: &CopyOptions, src: &Path, dest: &Path) -> bool {
    if opts.workers <= 1 {
        return false;
    }
    match &opts.prefer_concurrent {
        Some(prefer) => prefer(src, dest),
        None => true,
    }
}

/// Process children strictly one at a time, in enumeration order.
pub(crate) async fn run_sequential(
    children: Vec<Node>,
    opts: Arc<CopyOptions>,
    ctx: Arc<CopyContext>,
) -> Result<()> {
    let mut errors = Vec::new();
    for node in children {
        if let Err(e) = dispatch::copy_next_or_skip(node, opts.clone(), ctx.clone()).await {
            match opts.error_mode {
                ErrorMode::FailFast => return Err(e),
                ErrorMode::CollectAll => {
                    // Hook failures are caller logic errors and stay fatal
                    // even in collect mode.
                    if matches!(e, CopyError::Interrupted { .. }) {
                        return Err(e);
                    }
                    errors.push(e);
                }
            }
        }
    }
    collect_outcome(errors)
}

/// Fan every child out onto the join set and gather the outcome.
pub(crate) async fn run_concurrent(
    children: Vec<Node>,
    opts: Arc<CopyOptions>,
    ctx: Arc<CopyContext>,
) -> Result<()> {
    let cancel = CancellationToken::new();
    let mut tasks: JoinSet<Result<()>> = JoinSet::new();

    for node in children {
        let opts = opts.clone();
        let ctx = ctx.clone();
        let cancel = cancel.clone();
        tasks.spawn(async move {
            if node.entry.kind == EntryKind::Directory {
                return dispatch::copy_next_or_skip(node, opts, ctx).await;
            }
            let permit = match ctx.permits.clone() {
                Some(sem) => Some(acquire(sem, &cancel).await?),
                None => None,
            };
            let result = dispatch::copy_next_or_skip(node, opts, ctx).await;
            drop(permit);
            result
        });
    }

    let fail_fast = opts.error_mode == ErrorMode::FailFast;
    let mut first_err: Option<CopyError> = None;
    let mut errors = Vec::new();

    while let Some(joined) = tasks.join_next().await {
        let result = match joined {
            Ok(result) => result,
            // A panicked worker is a logic failure, not a filesystem one.
            Err(join_err) => Err(CopyError::Interrupted {
                source: Box::new(join_err),
            }),
        };
        if let Err(e) = result {
            if fail_fast {
                if first_err.is_none() {
                    cancel.cancel();
                    first_err = Some(e);
                }
                // Later errors, including Cancelled fallout, are discarded:
                // first error wins.
            } else if !matches!(e, CopyError::Cancelled) {
                errors.push(e);
            }
        }
    }

    if let Some(e) = first_err {
        return Err(e);
    }
    // Hook failures stay fatal in collect mode too.
    if let Some(at) = errors
        .iter()
        .position(|e| matches!(e, CopyError::Interrupted { .. }))
    {
        return Err(errors.swap_remove(at));
    }
    collect_outcome(errors)
}

/// Take one permit, unless the fan-out was already cancelled.
async fn acquire(sem: Arc<Semaphore>, cancel: &CancellationToken) -> Result<OwnedSemaphorePermit> {
    if cancel.is_cancelled() {
        return Err(CopyError::Cancelled);
    }
    tokio::select! {
        _ = cancel.cancelled() => Err(CopyError::Cancelled),
        permit = sem.acquire_owned() => permit.map_err(|_| CopyError::Cancelled),
    }
}

fn collect_outcome(mut errors: Vec<CopyError>) -> Result<()> {
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(CopyError::Multiple(errors)),
    }
}
