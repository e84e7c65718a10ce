use derive_more::{Deref, Display, FromStr};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};
use std::fmt;
use thiserror::Error as ThisError;
use ulid::Ulid;

///
/// IdError
///

#[derive(Debug, ThisError)]
pub enum IdError {
    #[error("invalid id string")]
    InvalidString,
}

///
/// Id
///
/// Store-assigned record identifier. Wraps a ULID so identifiers sort by
/// creation time with a deterministic tie-break, which is what the commit
/// log ordering contract relies on.
///

#[derive(Clone, Copy, Debug, Deref, Display, Eq, FromStr, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Id(Ulid);

impl Id {
    pub const MIN: Self = Self(Ulid::from_bytes([0x00; 16]));
    pub const MAX: Self = Self(Ulid::from_bytes([0xFF; 16]));

    #[must_use]
    pub const fn nil() -> Self {
        Self(Ulid::nil())
    }

    #[must_use]
    pub const fn is_nil(&self) -> bool {
        self.0.0 == 0
    }

    /// Build an identifier from a millisecond timestamp and an entropy value.
    /// Stores use this with a monotonic sequence so ids never collide and
    /// never sort against insertion order.
    #[must_use]
    pub const fn from_parts(timestamp_ms: u64, entropy: u128) -> Self {
        Self(Ulid::from_parts(timestamp_ms, entropy))
    }

    pub fn parse(s: &str) -> Result<Self, IdError> {
        Ulid::from_string(s).map(Self).map_err(|_| IdError::InvalidString)
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::nil()
    }
}

impl From<Ulid> for Id {
    fn from(ulid: Ulid) -> Self {
        Self(ulid)
    }
}

// Serialized as the canonical 26-char string form; payloads are JSON and
// must stay readable in place.
impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(D::Error::custom)
    }
}

///
/// Timestamp
///
/// Milliseconds since the Unix epoch. Assigned by the backing store, never
/// by callers, so per-scope commit ordering stays total.
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const EPOCH: Self = Self(0);

    #[must_use]
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Current wall-clock time.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn now() -> Self {
        let nanos = time::OffsetDateTime::now_utc().unix_timestamp_nanos();
        Self((nanos / 1_000_000).max(0) as u64)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_string_roundtrip() {
        let id = Id::from_parts(1_234_567, 42);
        let parsed = Id::parse(&id.to_string()).expect("parse");
        assert_eq!(parsed, id);
    }

    #[test]
    fn id_rejects_garbage() {
        assert!(Id::parse("not-a-ulid").is_err());
    }

    #[test]
    fn ids_order_by_timestamp_then_entropy() {
        let a = Id::from_parts(100, 1);
        let b = Id::from_parts(100, 2);
        let c = Id::from_parts(101, 0);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn id_json_form_is_a_string() {
        let id = Id::from_parts(1, 1);
        let json = serde_json::to_string(&id).expect("serialize");
        assert!(json.starts_with('"') && json.ends_with('"'));
        let back: Id = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);
    }

    #[test]
    fn timestamp_ordering_is_numeric() {
        assert!(Timestamp::from_millis(100) < Timestamp::from_millis(150));
        assert_eq!(Timestamp::EPOCH.as_millis(), 0);
    }
}
