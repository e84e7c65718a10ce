use crate::{
    error::{ErrorOrigin, InternalError},
    item::Item,
};
use serde::{Deserialize, Serialize};

/// Payload format version written by this engine.
///
/// The payload is a mini-protocol: decoding tolerates additive fields from
/// newer same-version writers, and rejects versions it does not know how to
/// interpret. Bumping this constant is a format change, not a refactor.
pub const CHANGE_RECORD_VERSION: u32 = 1;

const fn default_version() -> u32 {
    CHANGE_RECORD_VERSION
}

///
/// ItemPair
///
/// Before/after snapshot of one updated item.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ItemPair {
    pub before: Item,
    pub after: Item,
}

///
/// ChangeRecord
///
/// The durable, replayable diff appended to the commit log: exactly the
/// mutations applied in one service invocation. Immutable once built.
///
/// Unknown fields are tolerated on decode so future additive fields do not
/// break replay of historical commits; unknown *versions* are not.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ChangeRecord {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub create_items: Vec<Item>,
    #[serde(default)]
    pub update_items: Vec<ItemPair>,
    #[serde(default)]
    pub delete_items: Vec<Item>,
}

impl ChangeRecord {
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: CHANGE_RECORD_VERSION,
            create_items: Vec::new(),
            update_items: Vec::new(),
            delete_items: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.create_items.is_empty() && self.update_items.is_empty() && self.delete_items.is_empty()
    }

    /// Encode to the commit log payload form.
    pub fn to_json(&self) -> Result<String, InternalError> {
        serde_json::to_string(self).map_err(|err| {
            InternalError::storage(
                ErrorOrigin::Serialize,
                format!("change record encode failed: {err}"),
            )
        })
    }

    /// Decode a payload previously produced by [`Self::to_json`].
    pub fn from_json(payload: &str) -> Result<Self, InternalError> {
        let record: Self = serde_json::from_str(payload).map_err(|err| {
            InternalError::storage(
                ErrorOrigin::Serialize,
                format!("change record decode failed: {err}"),
            )
        })?;

        if record.version > CHANGE_RECORD_VERSION {
            return Err(InternalError::invalid(format!(
                "unsupported change record version: {} (max {CHANGE_RECORD_VERSION})",
                record.version
            )));
        }

        Ok(record)
    }
}
