//! Storage abstractions over the inventory schema.
//!
//! One store trait covers the whole schema because the ledger's unit of work
//! spans two tables (the product stock counter and the movement insert) and
//! the referential guards span more. Implementations: [`MemoryStore`] for
//! dev/test, [`PostgresStore`] for production.

pub mod memory;
pub mod postgres;
pub mod r#trait;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use r#trait::{InventoryStore, ProductFilter, StoreError, StoreResult};
