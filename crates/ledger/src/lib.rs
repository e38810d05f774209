//! Stock ledger domain module.
//!
//! The ledger is the append-only sequence of stock movements plus the derived
//! current-stock counter on the product. This crate holds the single guarded
//! transition that computes a movement's before/after snapshot; persistence
//! and atomicity live in the infra layer.

pub mod movement;

pub use movement::{Direction, MovementPlan, MovementRequest, StockMovement, replay};
