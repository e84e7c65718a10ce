//! Change capture: what changed, separated from how it is stored.
//!
//! The builder accumulates before/after item states into a [`ChangeRecord`];
//! the record owns the payload format. The history reconstructor decodes
//! arbitrary historical commits through the same contract, which is what
//! keeps replay decoupled from the live item schema.

pub mod builder;
pub mod record;
pub mod set;

pub use builder::ChangeBuilder;
pub use record::{CHANGE_RECORD_VERSION, ChangeRecord, ItemPair};
pub use set::{AppliedChangeSet, ChangeSet, ItemInput};
