use crate::{
    change::record::{ChangeRecord, ItemPair},
    item::Item,
};

///
/// ChangeBuilder
///
/// Accumulates the item-level effects of one service invocation into a
/// [`ChangeRecord`]. Pure: never touches storage.
///
/// An update whose recordable fields did not change is dropped here, which is
/// what keeps "no effective change" invocations out of the commit log;
/// callers gate the append on [`Self::has_content`].
///

#[derive(Debug, Default)]
pub struct ChangeBuilder {
    create_items: Vec<Item>,
    update_items: Vec<ItemPair>,
    delete_items: Vec<Item>,
}

impl ChangeBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the post-create snapshot of a created item.
    pub fn record_create(&mut self, item: Item) {
        self.create_items.push(item);
    }

    /// Record a before/after pair; dropped when no recordable field differs.
    pub fn record_update(&mut self, before: Item, after: Item) {
        if before.mutable_fields_eq(&after) {
            return;
        }
        self.update_items.push(ItemPair { before, after });
    }

    /// Record the snapshot of a deleted item.
    pub fn record_delete(&mut self, item: Item) {
        self.delete_items.push(item);
    }

    /// True iff at least one entry was recorded. Nothing is appended to the
    /// commit log when this is false.
    #[must_use]
    pub fn has_content(&self) -> bool {
        !self.create_items.is_empty()
            || !self.update_items.is_empty()
            || !self.delete_items.is_empty()
    }

    #[must_use]
    pub fn build(self) -> ChangeRecord {
        ChangeRecord {
            version: crate::change::record::CHANGE_RECORD_VERSION,
            create_items: self.create_items,
            update_items: self.update_items,
            delete_items: self.delete_items,
        }
    }
}
