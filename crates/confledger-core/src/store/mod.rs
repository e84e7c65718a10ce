//! Storage contracts consumed by the engine.
//!
//! The engine has no storage of its own: items, commits, and releases live
//! behind these traits, and the embedding system decides what durable,
//! transactional store backs them. [`memory::MemoryStore`] implements all of
//! them for tests and in-process embedding.

pub mod memory;

use crate::{
    error::InternalError,
    item::Item,
    scope::NamespaceScope,
    types::{Id, Timestamp},
};
use serde::{Deserialize, Serialize};

pub use memory::MemoryStore;

#[cfg(test)]
pub(crate) use memory::FailPoint;

///
/// Namespace
///
/// Resolved namespace record: the identifier items are bound to, plus the
/// scope it was resolved from.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Namespace {
    pub id: Id,
    pub scope: NamespaceScope,
}

///
/// Commit
///
/// The commit log's unit of storage: one serialized [`crate::ChangeRecord`]
/// with its scope, operator, and store-assigned creation time. Within a
/// scope, commits are totally ordered by `(created_at, id)` and are never
/// rewritten.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Commit {
    pub id: Id,
    pub scope: NamespaceScope,
    pub payload: String,
    pub operator: String,
    pub created_at: Timestamp,
}

///
/// Release
///
/// Read-only snapshot marker owned by the release subsystem. The engine only
/// consumes its creation time as the replay-window boundary; abandoned
/// releases do not bound anything.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Release {
    pub key: String,
    pub abandoned: bool,
    pub created_at: Timestamp,
}

///
/// ItemStore
///
/// Durable record of the current item set per namespace. The change service
/// is the only writer.
///

pub trait ItemStore {
    /// Resolve a scope to its namespace record, if it exists.
    fn find_namespace(&self, scope: &NamespaceScope) -> Result<Option<Namespace>, InternalError>;

    /// Point lookup by identifier; soft-deleted items are returned too.
    fn get(&self, id: Id) -> Result<Option<Item>, InternalError>;

    /// Live (non-deleted) item with the given key, if any.
    fn find_by_key(&self, namespace_id: Id, key: &str) -> Result<Option<Item>, InternalError>;

    /// Live items of a namespace in file order: line number, then id.
    fn list_namespace(&self, namespace_id: Id) -> Result<Vec<Item>, InternalError>;

    /// Persist a new item. The store assigns id and both timestamps.
    fn insert(&self, item: Item) -> Result<Item, InternalError>;

    /// Persist changes to an existing item, bumping its modification time.
    fn update(&self, item: Item) -> Result<Item, InternalError>;

    /// Soft-delete: flag the record and bump its modification metadata.
    /// Returns the deleted snapshot. The record is never physically removed
    /// through this path.
    fn soft_delete(&self, id: Id, operator: &str) -> Result<Item, InternalError>;

    /// Count of live items with a non-empty key (comment rows excluded).
    fn count_non_empty(&self, namespace_id: Id) -> Result<usize, InternalError>;

    /// Put back an exact prior record, timestamps included. Rollback
    /// primitive; not part of the mutation surface.
    fn restore(&self, item: Item) -> Result<(), InternalError>;

    /// Physically remove a record. Rollback primitive for undoing inserts;
    /// not part of the mutation surface.
    fn remove(&self, id: Id) -> Result<(), InternalError>;
}

///
/// CommitLog
///
/// Append-only record of change batches per scope.
///

pub trait CommitLog {
    /// Append one serialized change record; the store assigns id and time.
    fn append(
        &self,
        scope: &NamespaceScope,
        payload: &str,
        operator: &str,
    ) -> Result<Commit, InternalError>;

    /// Commits for a scope strictly after `since` (all of them when `None`),
    /// ordered by `(created_at, id)`.
    fn list_since(
        &self,
        scope: &NamespaceScope,
        since: Option<Timestamp>,
    ) -> Result<Vec<Commit>, InternalError>;
}

///
/// ReleaseIndex
///
/// Read-only view of published snapshots per scope.
///

pub trait ReleaseIndex {
    /// Most recent non-abandoned release for the scope, if any.
    fn latest_active_release(
        &self,
        scope: &NamespaceScope,
    ) -> Result<Option<Release>, InternalError>;
}
