use crate::{scope::NamespaceScope, types::Id};
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Every failure surfaced by the engine carries a class (what went wrong)
/// and an origin (which subsystem detected it).
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct a namespace-absent error for a scope.
    pub fn namespace_not_found(scope: &NamespaceScope) -> Self {
        Self::new(
            ErrorClass::NotFound,
            ErrorOrigin::Service,
            format!("namespace not found: {scope}"),
        )
    }

    /// Construct an item-absent error by identifier.
    pub fn item_not_found(id: Id) -> Self {
        Self::new(
            ErrorClass::NotFound,
            ErrorOrigin::Store,
            format!("item not found: {id}"),
        )
    }

    /// Construct an item-absent error by namespace-scoped key.
    pub fn item_key_not_found(scope: &NamespaceScope, key: &str) -> Self {
        Self::new(
            ErrorClass::NotFound,
            ErrorOrigin::Store,
            format!("item not found: {scope} '{key}'"),
        )
    }

    /// Construct a cross-namespace reference rejection.
    pub fn scope_mismatch(scope: &NamespaceScope) -> Self {
        Self::new(
            ErrorClass::ScopeMismatch,
            ErrorOrigin::Service,
            format!("referenced item does not belong to namespace: {scope}"),
        )
    }

    /// Construct an item-count cap rejection.
    pub fn limit_exceeded(limit: usize, count: usize) -> Self {
        Self::new(
            ErrorClass::LimitExceeded,
            ErrorOrigin::Service,
            format!(
                "the maximum number of items ({limit}) for this namespace has been reached, current item count is {count}"
            ),
        )
    }

    /// Construct a duplicate-key rejection on create.
    pub fn key_exists(key: &str) -> Self {
        Self::new(
            ErrorClass::Conflict,
            ErrorOrigin::Service,
            format!("item already exists: '{key}'"),
        )
    }

    /// Construct a held-by-another-operator lock rejection.
    pub fn lock_conflict(scope: &NamespaceScope, holder: &str) -> Self {
        Self::new(
            ErrorClass::LockConflict,
            ErrorOrigin::Lock,
            format!("namespace {scope} is locked by '{holder}'"),
        )
    }

    /// Construct a malformed-input rejection.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Invalid, ErrorOrigin::Service, message)
    }

    /// Construct a store-layer failure for a specific origin.
    pub fn storage(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Storage, origin, message)
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorClass
/// Failure taxonomy surfaced to callers; stable within a minor version.
///

#[remain::sorted]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Conflict,
    Invalid,
    LimitExceeded,
    LockConflict,
    NotFound,
    ScopeMismatch,
    Storage,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Conflict => "conflict",
            Self::Invalid => "invalid",
            Self::LimitExceeded => "limit_exceeded",
            Self::LockConflict => "lock_conflict",
            Self::NotFound => "not_found",
            Self::ScopeMismatch => "scope_mismatch",
            Self::Storage => "storage",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Subsystem taxonomy for runtime classification.
///

#[remain::sorted]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    CommitLog,
    Lock,
    Release,
    Serialize,
    Service,
    Store,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::CommitLog => "commit_log",
            Self::Lock => "lock",
            Self::Release => "release",
            Self::Serialize => "serialize",
            Self::Service => "service",
            Self::Store => "store",
        };
        write!(f, "{label}")
    }
}
