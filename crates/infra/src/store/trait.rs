use async_trait::async_trait;
use thiserror::Error;

use stockpile_audit::ActivityRecord;
use stockpile_auth::User;
use stockpile_catalog::{Category, Product, Supplier};
use stockpile_core::{
    CategoryId, DomainError, Page, PageParams, ProductId, SupplierId, UserId,
};
use stockpile_ledger::{MovementRequest, StockMovement};

/// Store operation error.
///
/// Domain rejections (validation, not-found, conflicts, insufficient stock)
/// pass through unchanged so the API layer can map them per the error
/// taxonomy; everything else is an infrastructure fault surfaced as
/// `Persistence` and rendered as a generic server error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("storage failure during {operation}: {message}")]
    Persistence {
        operation: &'static str,
        message: String,
    },
}

impl StoreError {
    pub fn persistence(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Persistence {
            operation,
            message: message.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::Domain(DomainError::NotFound)
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Domain(DomainError::conflict(msg))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Optional filters for the product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Case-insensitive substring match over name and SKU.
    pub search: Option<String>,
    pub category_id: Option<CategoryId>,
}

/// Persistence boundary for the whole inventory schema.
///
/// ## Ledger contract
///
/// `apply_movement` is the **only** writer of `Product.stock` after creation.
/// Implementations must execute the read-modify-write of the stock counter
/// and the movement insert as one serialized, all-or-nothing unit of work:
/// two concurrent movements against the same product must observe each
/// other's committed `stock_after`, and no partial state may survive a
/// failure of either write.
///
/// ## Uniqueness
///
/// Implementations enforce email uniqueness (users), name uniqueness
/// (categories) and SKU uniqueness (products, on create and update),
/// reporting violations as `DomainError::Conflict`.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    // ---- users ----

    async fn create_user(&self, user: User) -> StoreResult<User>;
    async fn user_by_id(&self, id: UserId) -> StoreResult<Option<User>>;
    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    /// Accounts awaiting approval (`is_active == false`).
    async fn list_pending_users(&self) -> StoreResult<Vec<User>>;
    async fn update_user(&self, user: User) -> StoreResult<User>;
    async fn delete_user(&self, id: UserId) -> StoreResult<()>;

    // ---- suppliers ----

    async fn create_supplier(&self, supplier: Supplier) -> StoreResult<Supplier>;
    async fn supplier_by_id(&self, id: SupplierId) -> StoreResult<Option<Supplier>>;
    async fn list_suppliers(&self) -> StoreResult<Vec<Supplier>>;
    async fn update_supplier(&self, supplier: Supplier) -> StoreResult<Supplier>;
    /// Rejected with a conflict while any product references the supplier.
    async fn delete_supplier(&self, id: SupplierId) -> StoreResult<()>;

    // ---- categories ----

    async fn create_category(&self, category: Category) -> StoreResult<Category>;
    async fn category_by_id(&self, id: CategoryId) -> StoreResult<Option<Category>>;
    async fn list_categories(&self) -> StoreResult<Vec<Category>>;
    async fn update_category(&self, category: Category) -> StoreResult<Category>;
    async fn delete_category(&self, id: CategoryId) -> StoreResult<()>;

    // ---- products ----

    async fn create_product(&self, product: Product) -> StoreResult<Product>;
    async fn product_by_id(&self, id: ProductId) -> StoreResult<Option<Product>>;
    async fn list_products(
        &self,
        filter: ProductFilter,
        page: PageParams,
    ) -> StoreResult<Page<Product>>;
    /// Products with `stock < min_stock`.
    async fn list_low_stock(&self) -> StoreResult<Vec<Product>>;
    async fn update_product(&self, product: Product) -> StoreResult<Product>;
    /// Removes the product and its movement history.
    async fn delete_product(&self, id: ProductId) -> StoreResult<()>;

    // ---- stock ledger ----

    /// Apply a movement: the transactional read-modify-write-insert unit of
    /// work. Returns the updated product and the appended movement.
    async fn apply_movement(
        &self,
        product_id: ProductId,
        request: MovementRequest,
    ) -> StoreResult<(Product, StockMovement)>;

    /// Movement history for a product, newest first. `NotFound` if the
    /// product does not exist; empty if it has no movements.
    async fn movement_history(&self, product_id: ProductId) -> StoreResult<Vec<StockMovement>>;

    // ---- activity log ----

    async fn append_activity(&self, record: ActivityRecord) -> StoreResult<ActivityRecord>;
    /// Activity records, newest first.
    async fn list_activities(&self, page: PageParams) -> StoreResult<Page<ActivityRecord>>;
}
