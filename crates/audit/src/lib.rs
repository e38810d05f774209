//! Audit domain module: the activity trail of administrative actions.

pub mod activity;

pub use activity::{ActivityAction, ActivityRecord, EntityKind};
