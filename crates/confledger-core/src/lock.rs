//! Derived namespace lock.
//!
//! Lock state is recomputed from the commit log every time it is consulted:
//! the holder is whoever appended the first commit after the scope's release
//! boundary. There is no stored lock flag, so there is no second source of
//! truth to go stale. Releasing a namespace clears the lock by moving the
//! boundary, not by writing anything here.

use crate::{
    error::InternalError,
    scope::NamespaceScope,
    store::{CommitLog, ReleaseIndex},
    types::Timestamp,
};

///
/// NamespaceLock
///
/// Transient exclusivity view: who owns the pending edits of a namespace.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NamespaceLock {
    pub scope: NamespaceScope,
    pub holder: String,
    pub acquired_at: Timestamp,
}

/// Compute the current lock for a scope, if any operator holds one.
pub fn current_lock<S>(
    store: &S,
    scope: &NamespaceScope,
) -> Result<Option<NamespaceLock>, InternalError>
where
    S: CommitLog + ReleaseIndex,
{
    let boundary = store
        .latest_active_release(scope)?
        .map(|release| release.created_at);
    let commits = store.list_since(scope, boundary)?;

    Ok(commits.first().map(|commit| NamespaceLock {
        scope: scope.clone(),
        holder: commit.operator.clone(),
        acquired_at: commit.created_at,
    }))
}

/// Reject a mutation by anyone other than the current holder. Surfaced
/// before any mutation is attempted; never retried here.
pub(crate) fn ensure_writable<S>(
    store: &S,
    enforced: bool,
    scope: &NamespaceScope,
    operator: &str,
) -> Result<(), InternalError>
where
    S: CommitLog + ReleaseIndex,
{
    if !enforced {
        return Ok(());
    }

    match current_lock(store, scope)? {
        Some(lock) if lock.holder != operator => {
            Err(InternalError::lock_conflict(scope, &lock.holder))
        }
        _ => Ok(()),
    }
}
