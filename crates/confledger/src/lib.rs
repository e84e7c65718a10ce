//! ## Crate layout
//! - `core`: the change-tracking engine: service, stores, lock, history.
//!
//! The `prelude` module mirrors the surface embedding code actually uses;
//! storage contracts and sinks stay behind `core`'s own modules.

pub use confledger_core as core;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use core::Error;

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::core::{
        audit::AuditSink as _,
        change::{AppliedChangeSet, ChangeSet, ItemInput},
        error::{ErrorClass, InternalError},
        history::HistoryReconstructor,
        item::{Item, ItemType},
        lock::NamespaceLock,
        scope::NamespaceScope,
        service::{ChangeService, ServiceConfig},
        store::{CommitLog as _, ItemStore as _, MemoryStore, ReleaseIndex as _},
        types::{Id, Timestamp},
    };
    pub use serde::{Deserialize, Serialize};
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn version_matches_workspace() {
        assert_eq!(crate::VERSION, "0.4.2");
    }

    #[test]
    fn prelude_covers_an_end_to_end_edit() {
        let store = MemoryStore::new();
        let scope = NamespaceScope::new("shop", "default", "application");
        let ns = store.create_namespace(&scope);

        let service = ChangeService::new(&store);
        let applied = service
            .apply_change_set(
                &scope,
                ChangeSet::new("alice").create(ItemInput {
                    namespace_id: ns.id,
                    key: "timeout".into(),
                    value: "30".into(),
                    ..ItemInput::default()
                }),
            )
            .expect("apply");

        assert_eq!(applied.created.len(), 1);
        assert_eq!(store.commit_count(), 1);
    }
}
