//! The item change service: the single controlled entry point for mutating
//! a namespace's items.
//!
//! Batch and single-item paths share the same discipline: resolve the
//! namespace, consult the derived lock, validate everything, and only then
//! mutate, with every applied mutation covered by a rollback log until the
//! commit append lands. One invocation appends at most one commit.

mod apply;
mod rollback;
mod single;

use crate::{
    audit::{AuditEvent, AuditKind, AuditOp, AuditSink, NoopAuditSink},
    change::{ChangeBuilder, ItemInput},
    error::InternalError,
    item::Item,
    lock::{self, NamespaceLock},
    scope::NamespaceScope,
    store::{Commit, CommitLog, ItemStore, Namespace, ReleaseIndex},
    types::Id,
};
use rollback::RollbackLog;

static NOOP_AUDIT: NoopAuditSink = NoopAuditSink;

///
/// ServiceConfig
///

#[derive(Clone, Copy, Debug)]
pub struct ServiceConfig {
    /// Cap on live non-empty-key items per namespace; `None` disables the
    /// check entirely.
    pub item_num_limit: Option<usize>,
    /// Whether the derived namespace lock rejects other operators.
    pub lock_enforced: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            item_num_limit: None,
            lock_enforced: true,
        }
    }
}

///
/// ChangeService
///

pub struct ChangeService<'a, S> {
    store: &'a S,
    audit: &'a dyn AuditSink,
    config: ServiceConfig,
}

impl<'a, S> ChangeService<'a, S>
where
    S: ItemStore + CommitLog + ReleaseIndex,
{
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            audit: &NOOP_AUDIT,
            config: ServiceConfig::default(),
        }
    }

    #[must_use]
    pub const fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_audit(mut self, audit: &'a dyn AuditSink) -> Self {
        self.audit = audit;
        self
    }

    // ======================================================================
    // Read surface
    // ======================================================================

    /// Live item by identifier.
    pub fn get_item(&self, id: Id) -> Result<Item, InternalError> {
        self.store
            .get(id)?
            .filter(|item| !item.deleted)
            .ok_or_else(|| InternalError::item_not_found(id))
    }

    /// Live item by namespace-scoped key.
    pub fn get_item_by_key(
        &self,
        scope: &NamespaceScope,
        key: &str,
    ) -> Result<Item, InternalError> {
        let ns = self.resolve_namespace(scope)?;
        self.store
            .find_by_key(ns.id, key)?
            .ok_or_else(|| InternalError::item_key_not_found(scope, key))
    }

    /// Live items of a namespace in file order.
    pub fn list_items(&self, scope: &NamespaceScope) -> Result<Vec<Item>, InternalError> {
        let ns = self.resolve_namespace(scope)?;
        self.store.list_namespace(ns.id)
    }

    /// Current derived lock for a scope, if one is held.
    pub fn namespace_lock(
        &self,
        scope: &NamespaceScope,
    ) -> Result<Option<NamespaceLock>, InternalError> {
        lock::current_lock(self.store, scope)
    }

    // ======================================================================
    // Shared internals
    // ======================================================================

    fn resolve_namespace(&self, scope: &NamespaceScope) -> Result<Namespace, InternalError> {
        self.store
            .find_namespace(scope)?
            .ok_or_else(|| InternalError::namespace_not_found(scope))
    }

    fn ensure_writable(&self, scope: &NamespaceScope, operator: &str) -> Result<(), InternalError> {
        lock::ensure_writable(self.store, self.config.lock_enforced, scope, operator)
    }

    /// Project the live non-empty count after `creates` and `deletes` and
    /// reject when it would exceed the configured cap.
    fn check_item_limit(
        &self,
        namespace_id: Id,
        creates: usize,
        deletes: usize,
    ) -> Result<(), InternalError> {
        let Some(limit) = self.config.item_num_limit else {
            return Ok(());
        };

        let current = self.store.count_non_empty(namespace_id)?;
        let projected = (current + creates).saturating_sub(deletes);
        if projected > limit {
            return Err(InternalError::limit_exceeded(limit, projected));
        }
        Ok(())
    }

    /// Copy the mutable field allow-list onto a managed record. The key and
    /// namespace binding are never touched here.
    fn copy_mutable_fields(
        managed: &mut Item,
        input: &ItemInput,
        operator: &str,
        allow_line_num: bool,
    ) {
        managed.value = input.value.clone();
        managed.item_type = input.item_type;
        managed.comment = input.comment.clone();
        managed.last_modified_by = operator.to_string();
        if allow_line_num && let Some(line_num) = input.line_num {
            managed.line_num = line_num;
        }
    }

    /// Build an unsaved item from create input; the store assigns identity
    /// and timestamps on insert.
    fn draft_from_input(namespace_id: Id, input: &ItemInput, operator: &str) -> Item {
        Item {
            namespace_id,
            key: input.key.clone(),
            value: input.value.clone(),
            item_type: input.item_type,
            comment: input.comment.clone(),
            line_num: input.line_num.unwrap_or_default(),
            created_by: operator.to_string(),
            last_modified_by: operator.to_string(),
            ..Item::default()
        }
    }

    fn record_audit(&self, kind: AuditKind, op: AuditOp, operator: &str) {
        self.audit.record(AuditEvent::new(kind, op, operator));
    }

    /// Append the batch's single commit iff the builder recorded anything.
    /// An encode or append failure rolls back every item mutation first, so
    /// the log and the item store never diverge.
    fn append_commit(
        &self,
        unit: &mut RollbackLog,
        scope: &NamespaceScope,
        builder: ChangeBuilder,
        operator: &str,
    ) -> Result<Option<Commit>, InternalError> {
        if !builder.has_content() {
            return Ok(None);
        }

        let payload = match builder.build().to_json() {
            Ok(payload) => payload,
            Err(err) => {
                unit.rollback(self.store);
                return Err(err);
            }
        };

        match self.store.append(scope, &payload, operator) {
            Ok(commit) => Ok(Some(commit)),
            Err(err) => {
                unit.rollback(self.store);
                Err(err)
            }
        }
    }
}
