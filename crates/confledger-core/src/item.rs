use crate::types::{Id, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

///
/// ItemType
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    #[default]
    Property,
    Comment,
}

impl Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Property => "property",
            Self::Comment => "comment",
        };
        write!(f, "{label}")
    }
}

///
/// Item
///
/// One configuration key within one namespace. The key and namespace binding
/// are fixed at creation; only value, type, comment, line number, and the
/// modifier may change afterwards. Removal is a soft delete: the record stays
/// but leaves the live key set.
///
/// Comment rows are the exception to key uniqueness: they carry an empty key
/// and empty value and are identified by their comment text.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Item {
    pub id: Id,
    pub namespace_id: Id,
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub item_type: ItemType,
    pub comment: String,
    pub line_num: u32,
    pub created_by: String,
    pub last_modified_by: String,
    pub created_at: Timestamp,
    pub last_modified_at: Timestamp,
    pub deleted: bool,
}

impl Item {
    /// True for rows that hold only a comment: empty key and empty value.
    #[must_use]
    pub fn is_comment_row(&self) -> bool {
        self.key.is_empty() && self.value.is_empty()
    }

    /// True for rows that count against the namespace item limit.
    #[must_use]
    pub fn has_non_empty_key(&self) -> bool {
        !self.key.is_empty()
    }

    /// Compare the recordable mutable fields (value, type, comment, modifier).
    /// Line-number shuffles are deliberately not recordable changes.
    #[must_use]
    pub fn mutable_fields_eq(&self, other: &Self) -> bool {
        self.value == other.value
            && self.item_type == other.item_type
            && self.comment == other.comment
            && self.last_modified_by == other.last_modified_by
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(key: &str, value: &str) -> Item {
        Item {
            key: key.into(),
            value: value.into(),
            ..Item::default()
        }
    }

    #[test]
    fn comment_rows_have_blank_key_and_value() {
        let mut row = item("", "");
        row.comment = "# section".into();
        assert!(row.is_comment_row());
        assert!(!item("timeout", "30").is_comment_row());
        assert!(!item("", "orphan value").is_comment_row());
    }

    #[test]
    fn mutable_field_comparison_ignores_line_num() {
        let mut a = item("timeout", "30");
        let mut b = a.clone();
        b.line_num = 99;
        assert!(a.mutable_fields_eq(&b));

        b.value = "60".into();
        assert!(!a.mutable_fields_eq(&b));

        b.value = "30".into();
        a.last_modified_by = "alice".into();
        assert!(!a.mutable_fields_eq(&b));
    }

    #[test]
    fn item_type_defaults_to_property_when_absent() {
        let json = r#"{
            "id": "00000000000000000000000000",
            "namespace_id": "00000000000000000000000000",
            "key": "timeout",
            "value": "30",
            "comment": "",
            "line_num": 1,
            "created_by": "alice",
            "last_modified_by": "alice",
            "created_at": 0,
            "last_modified_at": 0,
            "deleted": false
        }"#;
        let decoded: Item = serde_json::from_str(json).expect("decode");
        assert_eq!(decoded.item_type, ItemType::Property);
    }
}
