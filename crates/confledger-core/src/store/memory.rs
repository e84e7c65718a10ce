use crate::{
    error::{ErrorOrigin, InternalError},
    item::Item,
    scope::NamespaceScope,
    store::{Commit, CommitLog, ItemStore, Namespace, Release, ReleaseIndex},
    types::{Id, Timestamp},
};
use std::{cell::RefCell, collections::BTreeMap};

///
/// MemoryStore
///
/// In-memory implementation of every storage contract the engine consumes.
/// Timestamps are assigned from a strictly monotonic millisecond clock so
/// commit ordering is total and deterministic under test; identifiers embed
/// the same clock plus a sequence, so id order agrees with insertion order.
///
/// Interior mutability behind `&self` keeps the trait surface read-shaped;
/// the store is intentionally not `Sync`. Cross-request isolation belongs
/// to a real backing store.
///

pub struct MemoryStore {
    inner: RefCell<MemoryInner>,
    #[cfg(test)]
    fail_next: std::cell::Cell<Option<FailPoint>>,
}

struct MemoryInner {
    clock_ms: u64,
    entropy: u128,
    namespaces: BTreeMap<NamespaceScope, Namespace>,
    items: BTreeMap<Id, Item>,
    commits: Vec<Commit>,
    releases: Vec<(NamespaceScope, Release)>,
}

/// Forced-failure sites for atomicity tests.
#[cfg(test)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailPoint {
    Insert,
    Update,
    SoftDelete,
    Append,
}

impl MemoryInner {
    fn tick(&mut self) -> Timestamp {
        self.clock_ms += 1;
        Timestamp::from_millis(self.clock_ms)
    }

    fn next_id(&mut self, at: Timestamp) -> Id {
        self.entropy += 1;
        Id::from_parts(at.as_millis(), self.entropy)
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_time(Timestamp::now())
    }

    /// Start the monotonic clock at a fixed instant (deterministic tests).
    #[must_use]
    pub fn with_base_time(base: Timestamp) -> Self {
        Self {
            inner: RefCell::new(MemoryInner {
                clock_ms: base.as_millis(),
                entropy: 0,
                namespaces: BTreeMap::new(),
                items: BTreeMap::new(),
                commits: Vec::new(),
                releases: Vec::new(),
            }),
            #[cfg(test)]
            fail_next: std::cell::Cell::new(None),
        }
    }

    /// Register a namespace for a scope; returns the existing record when
    /// the scope is already registered.
    pub fn create_namespace(&self, scope: &NamespaceScope) -> Namespace {
        let mut inner = self.inner.borrow_mut();
        if let Some(ns) = inner.namespaces.get(scope) {
            return ns.clone();
        }
        let at = inner.tick();
        let id = inner.next_id(at);
        let ns = Namespace {
            id,
            scope: scope.clone(),
        };
        inner.namespaces.insert(scope.clone(), ns.clone());
        ns
    }

    /// Mark a release for a scope at the current clock. The engine only
    /// reads releases; this exists so tests and embedders can set the replay
    /// boundary.
    pub fn publish_release(&self, scope: &NamespaceScope, key: impl Into<String>) -> Release {
        let mut inner = self.inner.borrow_mut();
        let at = inner.tick();
        let release = Release {
            key: key.into(),
            abandoned: false,
            created_at: at,
        };
        inner.releases.push((scope.clone(), release.clone()));
        release
    }

    /// Abandon the most recent release of a scope, if any.
    pub fn abandon_latest_release(&self, scope: &NamespaceScope) {
        let mut inner = self.inner.borrow_mut();
        if let Some((_, release)) = inner
            .releases
            .iter_mut()
            .rev()
            .find(|(s, release)| s == scope && !release.abandoned)
        {
            release.abandoned = true;
        }
    }

    /// Total commit count across all scopes.
    #[must_use]
    pub fn commit_count(&self) -> usize {
        self.inner.borrow().commits.len()
    }

    #[cfg(test)]
    pub(crate) fn fail_next(&self, point: FailPoint) {
        self.fail_next.set(Some(point));
    }

    #[cfg(test)]
    fn check_failpoint(&self, point: FailPoint) -> Result<(), InternalError> {
        if self.fail_next.get() == Some(point) {
            self.fail_next.set(None);
            return Err(InternalError::storage(
                ErrorOrigin::Store,
                format!("forced failure: {point:?}"),
            ));
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemStore for MemoryStore {
    fn find_namespace(&self, scope: &NamespaceScope) -> Result<Option<Namespace>, InternalError> {
        Ok(self.inner.borrow().namespaces.get(scope).cloned())
    }

    fn get(&self, id: Id) -> Result<Option<Item>, InternalError> {
        Ok(self.inner.borrow().items.get(&id).cloned())
    }

    fn find_by_key(&self, namespace_id: Id, key: &str) -> Result<Option<Item>, InternalError> {
        Ok(self
            .inner
            .borrow()
            .items
            .values()
            .find(|item| item.namespace_id == namespace_id && !item.deleted && item.key == key)
            .cloned())
    }

    fn list_namespace(&self, namespace_id: Id) -> Result<Vec<Item>, InternalError> {
        let mut items: Vec<Item> = self
            .inner
            .borrow()
            .items
            .values()
            .filter(|item| item.namespace_id == namespace_id && !item.deleted)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.line_num.cmp(&b.line_num).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    fn insert(&self, mut item: Item) -> Result<Item, InternalError> {
        #[cfg(test)]
        self.check_failpoint(FailPoint::Insert)?;

        let mut inner = self.inner.borrow_mut();
        let at = inner.tick();
        item.id = inner.next_id(at);
        item.created_at = at;
        item.last_modified_at = at;
        inner.items.insert(item.id, item.clone());
        Ok(item)
    }

    fn update(&self, mut item: Item) -> Result<Item, InternalError> {
        #[cfg(test)]
        self.check_failpoint(FailPoint::Update)?;

        let mut inner = self.inner.borrow_mut();
        if !inner.items.contains_key(&item.id) {
            return Err(InternalError::storage(
                ErrorOrigin::Store,
                format!("update target missing: {}", item.id),
            ));
        }
        let at = inner.tick();
        item.last_modified_at = at;
        inner.items.insert(item.id, item.clone());
        Ok(item)
    }

    fn soft_delete(&self, id: Id, operator: &str) -> Result<Item, InternalError> {
        #[cfg(test)]
        self.check_failpoint(FailPoint::SoftDelete)?;

        let mut inner = self.inner.borrow_mut();
        let at = inner.tick();
        let Some(item) = inner.items.get_mut(&id) else {
            return Err(InternalError::item_not_found(id));
        };
        if item.deleted {
            return Err(InternalError::item_not_found(id));
        }
        item.deleted = true;
        item.last_modified_by = operator.to_string();
        item.last_modified_at = at;
        Ok(item.clone())
    }

    fn count_non_empty(&self, namespace_id: Id) -> Result<usize, InternalError> {
        Ok(self
            .inner
            .borrow()
            .items
            .values()
            .filter(|item| {
                item.namespace_id == namespace_id && !item.deleted && item.has_non_empty_key()
            })
            .count())
    }

    fn restore(&self, item: Item) -> Result<(), InternalError> {
        if item.id.is_nil() {
            return Err(InternalError::storage(
                ErrorOrigin::Store,
                "cannot restore an item without an id",
            ));
        }
        self.inner.borrow_mut().items.insert(item.id, item);
        Ok(())
    }

    fn remove(&self, id: Id) -> Result<(), InternalError> {
        self.inner.borrow_mut().items.remove(&id);
        Ok(())
    }
}

impl CommitLog for MemoryStore {
    fn append(
        &self,
        scope: &NamespaceScope,
        payload: &str,
        operator: &str,
    ) -> Result<Commit, InternalError> {
        #[cfg(test)]
        self.check_failpoint(FailPoint::Append)?;

        let mut inner = self.inner.borrow_mut();
        let at = inner.tick();
        let commit = Commit {
            id: inner.next_id(at),
            scope: scope.clone(),
            payload: payload.to_string(),
            operator: operator.to_string(),
            created_at: at,
        };
        inner.commits.push(commit.clone());
        Ok(commit)
    }

    fn list_since(
        &self,
        scope: &NamespaceScope,
        since: Option<Timestamp>,
    ) -> Result<Vec<Commit>, InternalError> {
        let mut commits: Vec<Commit> = self
            .inner
            .borrow()
            .commits
            .iter()
            .filter(|commit| {
                commit.scope == *scope && since.is_none_or(|bound| commit.created_at > bound)
            })
            .cloned()
            .collect();
        commits.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(commits)
    }
}

impl ReleaseIndex for MemoryStore {
    fn latest_active_release(
        &self,
        scope: &NamespaceScope,
    ) -> Result<Option<Release>, InternalError> {
        Ok(self
            .inner
            .borrow()
            .releases
            .iter()
            .filter(|(s, release)| s == scope && !release.abandoned)
            .max_by_key(|(_, release)| release.created_at)
            .map(|(_, release)| release.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> NamespaceScope {
        NamespaceScope::new("shop", "default", "application")
    }

    fn draft(ns: Id, key: &str, value: &str) -> Item {
        Item {
            namespace_id: ns,
            key: key.into(),
            value: value.into(),
            created_by: "alice".into(),
            last_modified_by: "alice".into(),
            ..Item::default()
        }
    }

    #[test]
    fn insert_assigns_id_and_timestamps() {
        let store = MemoryStore::with_base_time(Timestamp::from_millis(100));
        let ns = store.create_namespace(&scope());
        let item = store.insert(draft(ns.id, "timeout", "30")).expect("insert");

        assert!(!item.id.is_nil());
        assert!(item.created_at > Timestamp::from_millis(100));
        assert_eq!(item.created_at, item.last_modified_at);
    }

    #[test]
    fn timestamps_are_strictly_monotonic() {
        let store = MemoryStore::with_base_time(Timestamp::from_millis(100));
        let ns = store.create_namespace(&scope());
        let a = store.insert(draft(ns.id, "a", "1")).expect("insert");
        let b = store.insert(draft(ns.id, "b", "2")).expect("insert");

        assert!(b.created_at > a.created_at);
        assert!(b.id > a.id);
    }

    #[test]
    fn soft_delete_leaves_record_but_hides_it() {
        let store = MemoryStore::new();
        let ns = store.create_namespace(&scope());
        let item = store.insert(draft(ns.id, "timeout", "30")).expect("insert");

        let deleted = store.soft_delete(item.id, "bob").expect("delete");
        assert!(deleted.deleted);
        assert_eq!(deleted.last_modified_by, "bob");

        assert!(store.get(item.id).expect("get").is_some_and(|i| i.deleted));
        assert!(store.find_by_key(ns.id, "timeout").expect("find").is_none());
        assert!(store.list_namespace(ns.id).expect("list").is_empty());
    }

    #[test]
    fn soft_delete_twice_reports_not_found() {
        let store = MemoryStore::new();
        let ns = store.create_namespace(&scope());
        let item = store.insert(draft(ns.id, "timeout", "30")).expect("insert");
        store.soft_delete(item.id, "bob").expect("delete");

        let err = store.soft_delete(item.id, "bob").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn count_non_empty_skips_comment_rows_and_deleted() {
        let store = MemoryStore::new();
        let ns = store.create_namespace(&scope());
        store.insert(draft(ns.id, "a", "1")).expect("insert");
        let b = store.insert(draft(ns.id, "b", "2")).expect("insert");
        store.insert(draft(ns.id, "", "")).expect("insert comment row");
        store.soft_delete(b.id, "alice").expect("delete");

        assert_eq!(store.count_non_empty(ns.id).expect("count"), 1);
    }

    #[test]
    fn list_namespace_orders_by_line_num_then_id() {
        let store = MemoryStore::new();
        let ns = store.create_namespace(&scope());
        let mut late = draft(ns.id, "late", "1");
        late.line_num = 5;
        let mut early = draft(ns.id, "early", "2");
        early.line_num = 1;
        store.insert(late).expect("insert");
        store.insert(early).expect("insert");

        let keys: Vec<_> = store
            .list_namespace(ns.id)
            .expect("list")
            .into_iter()
            .map(|item| item.key)
            .collect();
        assert_eq!(keys, vec!["early", "late"]);
    }

    #[test]
    fn list_since_is_scope_filtered_and_bounded() {
        let store = MemoryStore::new();
        let other = NamespaceScope::new("shop", "default", "db");
        store.append(&scope(), "{}", "alice").expect("append");
        let boundary = store.append(&scope(), "{}", "alice").expect("append");
        store.append(&other, "{}", "alice").expect("append");
        let after = store.append(&scope(), "{}", "bob").expect("append");

        let all = store.list_since(&scope(), None).expect("list");
        assert_eq!(all.len(), 3);

        let bounded = store
            .list_since(&scope(), Some(boundary.created_at))
            .expect("list");
        assert_eq!(bounded.len(), 1);
        assert_eq!(bounded[0].id, after.id);
    }

    #[test]
    fn latest_active_release_skips_abandoned() {
        let store = MemoryStore::new();
        let r1 = store.publish_release(&scope(), "r1");
        let r2 = store.publish_release(&scope(), "r2");
        assert!(r2.created_at > r1.created_at);

        store.abandon_latest_release(&scope());
        let latest = store
            .latest_active_release(&scope())
            .expect("lookup")
            .expect("release");
        assert_eq!(latest.key, "r1");
    }

    #[test]
    fn restore_and_remove_are_exact() {
        let store = MemoryStore::new();
        let ns = store.create_namespace(&scope());
        let item = store.insert(draft(ns.id, "timeout", "30")).expect("insert");

        store.remove(item.id).expect("remove");
        assert!(store.get(item.id).expect("get").is_none());

        store.restore(item.clone()).expect("restore");
        assert_eq!(store.get(item.id).expect("get"), Some(item));
    }
}
