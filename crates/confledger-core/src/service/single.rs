use crate::{
    audit::{AuditKind, AuditOp},
    change::{ChangeBuilder, ItemInput},
    error::InternalError,
    item::{Item, ItemType},
    scope::NamespaceScope,
    service::{ChangeService, rollback::RollbackLog},
    store::{CommitLog, ItemStore, ReleaseIndex},
    types::Id,
};

impl<S> ChangeService<'_, S>
where
    S: ItemStore + CommitLog + ReleaseIndex,
{
    /// Create one item and append its single-entry commit.
    ///
    /// A live item with the same non-empty key is a conflict. When the input
    /// claims a namespace id, it must match the one the scope resolves to.
    pub fn create_item(
        &self,
        scope: &NamespaceScope,
        input: &ItemInput,
        operator: &str,
    ) -> Result<Item, InternalError> {
        let ns = self.resolve_namespace(scope)?;
        if !input.namespace_id.is_nil() && input.namespace_id != ns.id {
            return Err(InternalError::scope_mismatch(scope));
        }
        self.ensure_writable(scope, operator)?;

        if input.has_non_empty_key() {
            self.check_item_limit(ns.id, 1, 0)?;
            if self.store.find_by_key(ns.id, &input.key)?.is_some() {
                return Err(InternalError::key_exists(&input.key));
            }
        }

        let draft = Self::draft_from_input(ns.id, input, operator);
        let created = self.store.insert(draft)?;

        let mut unit = RollbackLog::new();
        unit.record_remove(created.id);
        let mut builder = ChangeBuilder::new();
        builder.record_create(created.clone());
        self.append_commit(&mut unit, scope, builder, operator)?;

        self.record_audit(AuditKind::Item, AuditOp::Insert, operator);
        Ok(created)
    }

    /// Update one item in place.
    ///
    /// Only the mutable field allow-list is copied from the input; key,
    /// namespace binding, and line number stay as stored. A no-op update
    /// appends no commit and records no audit event.
    pub fn update_item(
        &self,
        scope: &NamespaceScope,
        id: Id,
        input: &ItemInput,
        operator: &str,
    ) -> Result<Item, InternalError> {
        let managed = self
            .store
            .get(id)?
            .filter(|item| !item.deleted)
            .ok_or_else(|| InternalError::item_not_found(id))?;

        let ns = self.resolve_namespace(scope)?;
        if managed.namespace_id != ns.id {
            return Err(InternalError::scope_mismatch(scope));
        }
        self.ensure_writable(scope, operator)?;

        let before = managed.clone();
        let mut after = managed;
        Self::copy_mutable_fields(&mut after, input, operator, false);

        let mut builder = ChangeBuilder::new();
        builder.record_update(before.clone(), after.clone());
        if !builder.has_content() {
            return Ok(before);
        }

        let updated = self.store.update(after)?;

        let mut unit = RollbackLog::new();
        unit.record_restore(before);
        self.append_commit(&mut unit, scope, builder, operator)?;

        self.record_audit(AuditKind::Item, AuditOp::Update, operator);
        Ok(updated)
    }

    /// Soft-delete one item and append its single-entry commit. The record
    /// stays in the store with its deleted flag set, so deletion history can
    /// replay it later.
    pub fn delete_item(
        &self,
        scope: &NamespaceScope,
        id: Id,
        operator: &str,
    ) -> Result<Item, InternalError> {
        let managed = self
            .store
            .get(id)?
            .filter(|item| !item.deleted)
            .ok_or_else(|| InternalError::item_not_found(id))?;

        let ns = self.resolve_namespace(scope)?;
        if managed.namespace_id != ns.id {
            return Err(InternalError::scope_mismatch(scope));
        }
        self.ensure_writable(scope, operator)?;

        let before = managed;
        let deleted = self.store.soft_delete(id, operator)?;

        let mut unit = RollbackLog::new();
        unit.record_restore(before);
        let mut builder = ChangeBuilder::new();
        builder.record_delete(deleted.clone());
        self.append_commit(&mut unit, scope, builder, operator)?;

        self.record_audit(AuditKind::Item, AuditOp::Delete, operator);
        Ok(deleted)
    }

    /// Create a comment row: blank key and value, non-blank comment text.
    ///
    /// Comment rows are deduplicated by comment text within the namespace;
    /// when an identical live comment row already exists it is returned as-is
    /// and nothing is written, so repeated submissions append no second
    /// commit.
    pub fn create_comment(
        &self,
        scope: &NamespaceScope,
        input: &ItemInput,
        operator: &str,
    ) -> Result<Item, InternalError> {
        if !input.key.trim().is_empty() || !input.value.trim().is_empty() {
            return Err(InternalError::invalid(
                "comment item's key or value should be blank",
            ));
        }
        if input.comment.trim().is_empty() {
            return Err(InternalError::invalid(
                "comment item's comment should not be blank",
            ));
        }

        let ns = self.resolve_namespace(scope)?;

        for existing in self.store.list_namespace(ns.id)? {
            if existing.is_comment_row() && existing.comment == input.comment {
                return Ok(existing);
            }
        }

        self.ensure_writable(scope, operator)?;

        let mut draft = Self::draft_from_input(ns.id, input, operator);
        draft.item_type = ItemType::Comment;
        let created = self.store.insert(draft)?;

        let mut unit = RollbackLog::new();
        unit.record_remove(created.id);
        let mut builder = ChangeBuilder::new();
        builder.record_create(created.clone());
        self.append_commit(&mut unit, scope, builder, operator)?;

        self.record_audit(AuditKind::Item, AuditOp::Insert, operator);
        Ok(created)
    }
}
