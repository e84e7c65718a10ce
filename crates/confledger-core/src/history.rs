//! Derived deletion history.
//!
//! Deletion history is not stored anywhere: it is recomputed by replaying
//! the commit log forward of the latest active release and extracting the
//! delete entries from each decoded change record. The log stays the single
//! source of truth, so the view is consistent with whatever commits exist
//! at query time.

use crate::{
    change::ChangeRecord,
    error::InternalError,
    item::Item,
    scope::NamespaceScope,
    store::{CommitLog, ReleaseIndex},
};

///
/// HistoryReconstructor
///

pub struct HistoryReconstructor<'a, S> {
    store: &'a S,
}

impl<'a, S> HistoryReconstructor<'a, S>
where
    S: CommitLog + ReleaseIndex,
{
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Items deleted since the scope's latest active release, in commit
    /// order. Empty when no release bounds the window and no commits exist;
    /// an unknown namespace is indistinguishable from one with no history.
    pub fn deleted_since(&self, scope: &NamespaceScope) -> Result<Vec<Item>, InternalError> {
        let boundary = self
            .store
            .latest_active_release(scope)?
            .map(|release| release.created_at);
        let commits = self.store.list_since(scope, boundary)?;

        let mut deleted = Vec::new();
        for commit in commits {
            let record = ChangeRecord::from_json(&commit.payload)?;
            deleted.extend(record.delete_items);
        }

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{change::ChangeBuilder, store::MemoryStore, types::Id};

    fn scope() -> NamespaceScope {
        NamespaceScope::new("shop", "default", "application")
    }

    fn deleted_item(key: &str) -> Item {
        Item {
            id: Id::from_parts(1, 1),
            key: key.into(),
            deleted: true,
            ..Item::default()
        }
    }

    fn append_delete_commit(store: &MemoryStore, key: &str, operator: &str) {
        let mut builder = ChangeBuilder::new();
        builder.record_delete(deleted_item(key));
        let payload = builder.build().to_json().expect("encode");
        store.append(&scope(), &payload, operator).expect("append");
    }

    #[test]
    fn empty_log_yields_empty_history() {
        let store = MemoryStore::new();
        let history = HistoryReconstructor::new(&store);
        assert!(history.deleted_since(&scope()).expect("history").is_empty());
    }

    #[test]
    fn unknown_namespace_is_empty_not_an_error() {
        let store = MemoryStore::new();
        let history = HistoryReconstructor::new(&store);
        let ghost = NamespaceScope::new("nobody", "nowhere", "nothing");
        assert!(history.deleted_since(&ghost).expect("history").is_empty());
    }

    #[test]
    fn deletes_are_flattened_in_commit_order() {
        let store = MemoryStore::new();
        append_delete_commit(&store, "first", "alice");
        append_delete_commit(&store, "second", "alice");

        let history = HistoryReconstructor::new(&store);
        let keys: Vec<_> = history
            .deleted_since(&scope())
            .expect("history")
            .into_iter()
            .map(|item| item.key)
            .collect();
        assert_eq!(keys, vec!["first", "second"]);
    }

    #[test]
    fn release_boundary_excludes_prior_deletes() {
        let store = MemoryStore::new();
        append_delete_commit(&store, "before-release", "alice");
        store.publish_release(&scope(), "r1");
        append_delete_commit(&store, "after-release", "alice");

        let history = HistoryReconstructor::new(&store);
        let keys: Vec<_> = history
            .deleted_since(&scope())
            .expect("history")
            .into_iter()
            .map(|item| item.key)
            .collect();
        assert_eq!(keys, vec!["after-release"]);
    }

    #[test]
    fn repeated_queries_are_identical() {
        let store = MemoryStore::new();
        append_delete_commit(&store, "timeout", "alice");

        let history = HistoryReconstructor::new(&store);
        let first = history.deleted_since(&scope()).expect("history");
        let second = history.deleted_since(&scope()).expect("history");
        assert_eq!(first, second);
    }
}
