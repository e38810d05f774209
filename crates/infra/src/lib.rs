//! Infrastructure layer: storage backends and the ledger unit of work.

pub mod store;

pub use store::{InventoryStore, MemoryStore, PostgresStore, ProductFilter, StoreError, StoreResult};

#[cfg(test)]
mod integration_tests;
