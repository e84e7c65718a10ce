use crate::{
    item::{Item, ItemType},
    types::Id,
};
use serde::{Deserialize, Serialize};

///
/// ItemInput
///
/// One client-supplied item reference inside a [`ChangeSet`]. Creates carry
/// field content and no id; updates and deletes carry the target id. The
/// claimed `namespace_id` is validated against the request scope before
/// anything is applied.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ItemInput {
    pub id: Option<Id>,
    pub namespace_id: Id,
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub item_type: ItemType,
    pub comment: String,
    pub line_num: Option<u32>,
}

impl ItemInput {
    #[must_use]
    pub fn has_non_empty_key(&self) -> bool {
        !self.key.is_empty()
    }
}

///
/// ChangeSet
///
/// A client-submitted, unvalidated batch of intended mutations against one
/// namespace. Ephemeral: consumed once by the change service; its effects,
/// not its raw form, are what gets persisted.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ChangeSet {
    pub creates: Vec<ItemInput>,
    pub updates: Vec<ItemInput>,
    pub deletes: Vec<ItemInput>,
    pub operator: String,
}

impl ChangeSet {
    #[must_use]
    pub fn new(operator: impl Into<String>) -> Self {
        Self {
            operator: operator.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn create(mut self, input: ItemInput) -> Self {
        self.creates.push(input);
        self
    }

    #[must_use]
    pub fn update(mut self, input: ItemInput) -> Self {
        self.updates.push(input);
        self
    }

    #[must_use]
    pub fn delete(mut self, input: ItemInput) -> Self {
        self.deletes.push(input);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.creates.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }
}

///
/// AppliedChangeSet
///
/// The effective, post-apply view of a batch: server-assigned identifiers
/// and timestamps are visible on every snapshot.
///

#[derive(Clone, Debug, Default)]
pub struct AppliedChangeSet {
    pub created: Vec<Item>,
    pub updated: Vec<Item>,
    pub deleted: Vec<Item>,
    pub operator: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_methods_keep_submission_order() {
        let set = ChangeSet::new("alice")
            .create(ItemInput {
                key: "a".into(),
                ..ItemInput::default()
            })
            .create(ItemInput {
                key: "b".into(),
                ..ItemInput::default()
            });

        assert_eq!(set.creates.len(), 2);
        assert_eq!(set.creates[0].key, "a");
        assert_eq!(set.creates[1].key, "b");
        assert!(set.updates.is_empty());
        assert!(!set.is_empty());
    }

    #[test]
    fn empty_set_reports_empty() {
        assert!(ChangeSet::new("alice").is_empty());
    }
}
