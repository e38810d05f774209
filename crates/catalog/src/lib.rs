//! Catalog domain module: products, categories, suppliers.
//!
//! This crate contains the directory entities and their validation,
//! implemented purely as deterministic domain logic (no IO, no HTTP,
//! no storage).

pub mod category;
pub mod product;
pub mod supplier;

pub use category::{Category, NewCategory};
pub use product::{NewProduct, Product, ProductPatch};
pub use supplier::{NewSupplier, Supplier, SupplierPatch};
