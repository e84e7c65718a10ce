//! Core engine for confledger: namespace item change tracking and release
//! commit bookkeeping.
//!
//! Every mutation to a namespace's items flows through the
//! [`service::ChangeService`], which validates a batch up front, applies it
//! atomically against an [`store::ItemStore`], and appends at most one commit
//! to the [`store::CommitLog`]. Locks and deletion history are never stored:
//! both are recomputed from the commit log bounded by the latest active
//! release, so the log stays the single source of truth.

pub mod audit;
pub mod change;
pub mod error;
pub mod history;
pub mod item;
pub mod lock;
pub mod scope;
pub mod service;
pub mod store;
pub mod types;

pub use error::InternalError as Error;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// Stores, sinks, and internals stay behind their modules.
///

pub mod prelude {
    pub use crate::{
        change::{AppliedChangeSet, ChangeRecord, ChangeSet, ItemInput},
        error::{ErrorClass, InternalError},
        history::HistoryReconstructor,
        item::{Item, ItemType},
        lock::NamespaceLock,
        scope::NamespaceScope,
        service::{ChangeService, ServiceConfig},
        types::{Id, Timestamp},
    };
}
