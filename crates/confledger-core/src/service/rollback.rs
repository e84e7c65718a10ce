use crate::{item::Item, store::ItemStore, types::Id};

///
/// RollbackOp
///
/// One undo step, recorded as data rather than a closure so the log can be
/// replayed against the store that produced it.
///

#[derive(Debug)]
enum RollbackOp {
    /// Undo an insert by physically removing the record.
    Remove(Id),
    /// Undo an update or soft-delete by putting back the exact prior record.
    Restore(Box<Item>),
}

///
/// RollbackLog
///
/// Failure cleanup for one service invocation. Every applied item mutation
/// records its inverse here before the next step runs; on a store failure
/// the log is drained in reverse, restoring pre-batch state. The commit
/// append is always the final step, so a drained log also means no commit
/// was left behind.
///

#[derive(Debug, Default)]
pub(crate) struct RollbackLog {
    ops: Vec<RollbackOp>,
}

impl RollbackLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_remove(&mut self, id: Id) {
        self.ops.push(RollbackOp::Remove(id));
    }

    pub fn record_restore(&mut self, item: Item) {
        self.ops.push(RollbackOp::Restore(Box::new(item)));
    }

    /// Undo every recorded mutation, newest first. Best-effort: a store that
    /// fails while rolling back cannot be repaired from here, so individual
    /// undo failures are not propagated.
    pub fn rollback<S: ItemStore>(&mut self, store: &S) {
        while let Some(op) = self.ops.pop() {
            let _ = match op {
                RollbackOp::Remove(id) => store.remove(id),
                RollbackOp::Restore(item) => store.restore(*item),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{scope::NamespaceScope, store::MemoryStore};

    #[test]
    fn rollback_undoes_in_reverse_order() {
        let store = MemoryStore::new();
        let ns = store.create_namespace(&NamespaceScope::new("shop", "default", "application"));

        let original = store
            .insert(Item {
                namespace_id: ns.id,
                key: "timeout".into(),
                value: "30".into(),
                ..Item::default()
            })
            .expect("insert");

        let mut log = RollbackLog::new();

        // Simulate an update: record the prior state, then overwrite.
        log.record_restore(original.clone());
        let mut changed = original.clone();
        changed.value = "60".into();
        store.update(changed).expect("update");

        // Simulate an insert: record removal of the new row.
        let extra = store
            .insert(Item {
                namespace_id: ns.id,
                key: "retries".into(),
                value: "3".into(),
                ..Item::default()
            })
            .expect("insert");
        log.record_remove(extra.id);

        log.rollback(&store);

        assert_eq!(store.get(original.id).expect("get"), Some(original));
        assert!(store.get(extra.id).expect("get").is_none());
    }

    #[test]
    fn empty_log_rollback_is_a_noop() {
        let store = MemoryStore::new();
        RollbackLog::new().rollback(&store);
    }
}
