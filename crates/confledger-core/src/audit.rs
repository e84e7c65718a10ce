//! Audit sink boundary.
//!
//! Service logic records audit events through [`AuditSink`] and never
//! branches on the outcome: the sink is advisory observability, not an
//! authority. Implementations must swallow their own failures.

use std::{cell::RefCell, fmt};

///
/// AuditKind
/// Which mutation surface produced the event.
///

#[remain::sorted]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AuditKind {
    Item,
    ItemSet,
}

impl fmt::Display for AuditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Item => "item",
            Self::ItemSet => "item_set",
        };
        write!(f, "{label}")
    }
}

///
/// AuditOp
///

#[remain::sorted]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AuditOp {
    Delete,
    Insert,
    Update,
}

impl fmt::Display for AuditOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Delete => "delete",
            Self::Insert => "insert",
            Self::Update => "update",
        };
        write!(f, "{label}")
    }
}

///
/// AuditEvent
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuditEvent {
    pub kind: AuditKind,
    pub op: AuditOp,
    pub operator: String,
}

impl AuditEvent {
    #[must_use]
    pub fn new(kind: AuditKind, op: AuditOp, operator: impl Into<String>) -> Self {
        Self {
            kind,
            op,
            operator: operator.into(),
        }
    }
}

///
/// AuditSink
///
/// Fire-and-forget observability boundary. The signature is infallible on
/// purpose: a sink failure must never fail the mutation that produced it.
///

pub trait AuditSink {
    fn record(&self, event: AuditEvent);
}

///
/// NoopAuditSink
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: AuditEvent) {}
}

///
/// RecordingAuditSink
/// Captures events in memory; for tests and in-process inspection.
///

#[derive(Debug, Default)]
pub struct RecordingAuditSink {
    events: RefCell<Vec<AuditEvent>>,
}

impl RecordingAuditSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.borrow().clone()
    }
}

impl AuditSink for RecordingAuditSink {
    fn record(&self, event: AuditEvent) {
        self.events.borrow_mut().push(event);
    }
}
