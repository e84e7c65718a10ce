use crate::{
    audit::{AuditKind, AuditOp},
    change::{AppliedChangeSet, ChangeBuilder, ChangeSet, ItemInput},
    error::InternalError,
    item::Item,
    scope::NamespaceScope,
    service::{ChangeService, rollback::RollbackLog},
    store::{CommitLog, ItemStore, ReleaseIndex},
    types::Id,
};
use std::collections::BTreeSet;

impl<S> ChangeService<'_, S>
where
    S: ItemStore + CommitLog + ReleaseIndex,
{
    /// Apply a validated batch of creates, updates, and deletes to one
    /// namespace as a single atomic unit with at most one appended commit.
    ///
    /// Every precondition is checked before anything is written; the first
    /// failing check aborts the whole batch. Processing order is fixed as
    /// creates, then updates, then deletes; deletes always resolve against
    /// pre-batch state, so a batch that deletes and recreates the same key
    /// behaves deterministically.
    pub fn apply_change_set(
        &self,
        scope: &NamespaceScope,
        change_set: ChangeSet,
    ) -> Result<AppliedChangeSet, InternalError> {
        let operator = change_set.operator.clone();
        if operator.is_empty() {
            return Err(InternalError::invalid("change set operator must not be empty"));
        }

        let ns = self.resolve_namespace(scope)?;
        self.ensure_writable(scope, &operator)?;

        let creates_non_empty = change_set
            .creates
            .iter()
            .filter(|input| input.has_non_empty_key())
            .count();
        let deletes_non_empty = change_set
            .deletes
            .iter()
            .filter(|input| input.has_non_empty_key())
            .count();
        self.check_item_limit(ns.id, creates_non_empty, deletes_non_empty)?;

        // Resolution phase: every referenced item must exist, be live, and
        // belong to the target namespace. No store writes happen here.
        let update_targets = self.resolve_targets(scope, ns.id, &change_set.updates)?;
        let delete_targets = self.resolve_targets(scope, ns.id, &change_set.deletes)?;

        let deleted_keys: BTreeSet<&str> = delete_targets
            .iter()
            .map(|(managed, _)| managed.key.as_str())
            .collect();
        self.validate_creates(scope, ns.id, &change_set.creates, &deleted_keys)?;

        // Mutation phase: every applied write records its inverse before the
        // next step runs.
        let mut unit = RollbackLog::new();
        let mut builder = ChangeBuilder::new();
        let mut applied = AppliedChangeSet {
            operator: operator.clone(),
            ..AppliedChangeSet::default()
        };

        for input in &change_set.creates {
            let draft = Self::draft_from_input(ns.id, input, &operator);
            let created = match self.store.insert(draft) {
                Ok(created) => created,
                Err(err) => {
                    unit.rollback(self.store);
                    return Err(err);
                }
            };
            unit.record_remove(created.id);
            builder.record_create(created.clone());
            applied.created.push(created);
        }
        if !change_set.creates.is_empty() {
            self.record_audit(AuditKind::ItemSet, AuditOp::Insert, &operator);
        }

        for (managed, input) in update_targets {
            let before = managed.clone();
            let mut after = managed;
            Self::copy_mutable_fields(&mut after, &input, &operator, true);
            let updated = match self.store.update(after) {
                Ok(updated) => updated,
                Err(err) => {
                    unit.rollback(self.store);
                    return Err(err);
                }
            };
            unit.record_restore(before.clone());
            builder.record_update(before, updated.clone());
            applied.updated.push(updated);
        }
        if !change_set.updates.is_empty() {
            self.record_audit(AuditKind::ItemSet, AuditOp::Update, &operator);
        }

        for (managed, _) in delete_targets {
            let before = managed.clone();
            let deleted = match self.store.soft_delete(managed.id, &operator) {
                Ok(deleted) => deleted,
                Err(err) => {
                    unit.rollback(self.store);
                    return Err(err);
                }
            };
            unit.record_restore(before);
            builder.record_delete(deleted.clone());
            applied.deleted.push(deleted);
        }
        if !change_set.deletes.is_empty() {
            self.record_audit(AuditKind::ItemSet, AuditOp::Delete, &operator);
        }

        self.append_commit(&mut unit, scope, builder, &operator)?;

        Ok(applied)
    }

    /// Resolve update/delete references to their managed records.
    fn resolve_targets(
        &self,
        scope: &NamespaceScope,
        namespace_id: Id,
        inputs: &[ItemInput],
    ) -> Result<Vec<(Item, ItemInput)>, InternalError> {
        let mut targets = Vec::with_capacity(inputs.len());
        for input in inputs {
            let id = input
                .id
                .ok_or_else(|| InternalError::invalid("change entry is missing an item id"))?;
            let managed = self
                .store
                .get(id)?
                .filter(|item| !item.deleted)
                .ok_or_else(|| InternalError::item_not_found(id))?;
            if managed.namespace_id != namespace_id {
                return Err(InternalError::scope_mismatch(scope));
            }
            targets.push((managed, input.clone()));
        }
        Ok(targets)
    }

    /// Creates must claim the target namespace and must not collide with a
    /// live key, unless that key is deleted in the same batch (the
    /// delete-and-recreate case).
    fn validate_creates(
        &self,
        scope: &NamespaceScope,
        namespace_id: Id,
        inputs: &[ItemInput],
        deleted_keys: &BTreeSet<&str>,
    ) -> Result<(), InternalError> {
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        for input in inputs {
            if input.namespace_id != namespace_id {
                return Err(InternalError::scope_mismatch(scope));
            }
            if !input.has_non_empty_key() {
                continue;
            }
            if !seen.insert(input.key.as_str()) {
                return Err(InternalError::key_exists(&input.key));
            }
            if deleted_keys.contains(input.key.as_str()) {
                continue;
            }
            if self.store.find_by_key(namespace_id, &input.key)?.is_some() {
                return Err(InternalError::key_exists(&input.key));
            }
        }
        Ok(())
    }
}
