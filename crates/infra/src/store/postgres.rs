//! Postgres-backed store implementation.
//!
//! The ledger unit of work is a database transaction: the stock row is read
//! with `SELECT ... FOR UPDATE` so concurrent movements against the same
//! product serialize on the row lock, and the stock update plus the movement
//! insert commit together or not at all.
//!
//! ## Error Mapping
//!
//! Unique-constraint violations (`23505`) become domain conflicts (email,
//! category name, SKU); every other SQLx error becomes
//! `StoreError::Persistence` and is rendered by the API as a generic server
//! fault without internal detail.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use stockpile_audit::{ActivityAction, ActivityRecord, EntityKind};
use stockpile_auth::{Role, User};
use stockpile_catalog::{Category, Product, Supplier};
use stockpile_core::{
    ActivityId, CategoryId, DomainError, MovementId, Page, PageParams, ProductId, SupplierId,
    UserId,
};
use stockpile_ledger::{Direction, MovementRequest, StockMovement};

use super::r#trait::{InventoryStore, ProductFilter, StoreError, StoreResult};

/// Postgres-backed inventory store.
///
/// Cloneable; all operations go through the SQLx connection pool.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL CHECK (role IN ('admin', 'staff')),
        is_active BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS suppliers (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        contact_name TEXT NOT NULL DEFAULT '',
        phone TEXT NOT NULL DEFAULT '',
        email TEXT NOT NULL DEFAULT '',
        address TEXT NOT NULL DEFAULT '',
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        description TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id UUID PRIMARY KEY,
        sku TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        price_cents BIGINT NOT NULL CHECK (price_cents > 0),
        stock BIGINT NOT NULL CHECK (stock >= 0),
        min_stock BIGINT NOT NULL CHECK (min_stock >= 0),
        image_url TEXT,
        supplier_id UUID NOT NULL REFERENCES suppliers (id),
        category_id UUID REFERENCES categories (id),
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS stock_movements (
        id UUID PRIMARY KEY,
        product_id UUID NOT NULL REFERENCES products (id) ON DELETE CASCADE,
        direction TEXT NOT NULL CHECK (direction IN ('in', 'out')),
        quantity BIGINT NOT NULL CHECK (quantity > 0),
        note TEXT NOT NULL DEFAULT '',
        stock_before BIGINT NOT NULL,
        stock_after BIGINT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_stock_movements_product
        ON stock_movements (product_id, created_at DESC)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS activity_log (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL,
        action TEXT NOT NULL,
        entity TEXT NOT NULL,
        entity_id UUID NOT NULL,
        details TEXT NOT NULL DEFAULT '',
        created_at TIMESTAMPTZ NOT NULL
    )
    "#,
];

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create any missing tables/indexes. Idempotent; run once at startup.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        Ok(())
    }
}

fn map_sqlx_error(operation: &'static str, e: sqlx::Error) -> StoreError {
    StoreError::persistence(operation, e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

fn corrupt_row(operation: &'static str, e: DomainError) -> StoreError {
    StoreError::persistence(operation, format!("corrupt row: {e}"))
}

// -------------------------
// Row types
// -------------------------

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self, operation: &'static str) -> StoreResult<User> {
        let role: Role = self.role.parse().map_err(|e| corrupt_row(operation, e))?;
        Ok(User {
            id: UserId::from_uuid(self.id),
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            role,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(FromRow)]
struct SupplierRow {
    id: Uuid,
    name: String,
    contact_name: String,
    phone: String,
    email: String,
    address: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SupplierRow> for Supplier {
    fn from(row: SupplierRow) -> Self {
        Supplier {
            id: SupplierId::from_uuid(row.id),
            name: row.name,
            contact_name: row.contact_name,
            phone: row.phone,
            email: row.email,
            address: row.address,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    description: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: CategoryId::from_uuid(row.id),
            name: row.name,
            description: row.description,
        }
    }
}

#[derive(FromRow)]
struct ProductRow {
    id: Uuid,
    sku: String,
    name: String,
    description: String,
    price_cents: i64,
    stock: i64,
    min_stock: i64,
    image_url: Option<String>,
    supplier_id: Uuid,
    category_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: ProductId::from_uuid(row.id),
            sku: row.sku,
            name: row.name,
            description: row.description,
            price_cents: row.price_cents,
            stock: row.stock,
            min_stock: row.min_stock,
            image_url: row.image_url,
            supplier_id: SupplierId::from_uuid(row.supplier_id),
            category_id: row.category_id.map(CategoryId::from_uuid),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct MovementRow {
    id: Uuid,
    product_id: Uuid,
    direction: String,
    quantity: i64,
    note: String,
    stock_before: i64,
    stock_after: i64,
    created_at: DateTime<Utc>,
}

impl MovementRow {
    fn into_movement(self, operation: &'static str) -> StoreResult<StockMovement> {
        let direction: Direction = self
            .direction
            .parse()
            .map_err(|e| corrupt_row(operation, e))?;
        Ok(StockMovement {
            id: MovementId::from_uuid(self.id),
            product_id: ProductId::from_uuid(self.product_id),
            direction,
            quantity: self.quantity,
            note: self.note,
            stock_before: self.stock_before,
            stock_after: self.stock_after,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct ActivityRow {
    id: Uuid,
    user_id: Uuid,
    action: String,
    entity: String,
    entity_id: Uuid,
    details: String,
    created_at: DateTime<Utc>,
}

impl ActivityRow {
    fn into_record(self, operation: &'static str) -> StoreResult<ActivityRecord> {
        let action: ActivityAction = self.action.parse().map_err(|e| corrupt_row(operation, e))?;
        let entity: EntityKind = self.entity.parse().map_err(|e| corrupt_row(operation, e))?;
        Ok(ActivityRecord {
            id: ActivityId::from_uuid(self.id),
            user_id: UserId::from_uuid(self.user_id),
            action,
            entity,
            entity_id: self.entity_id,
            details: self.details,
            created_at: self.created_at,
        })
    }
}

const SELECT_USER: &str =
    "SELECT id, name, email, password_hash, role, is_active, created_at, updated_at FROM users";

const SELECT_SUPPLIER: &str =
    "SELECT id, name, contact_name, phone, email, address, created_at, updated_at FROM suppliers";

const SELECT_PRODUCT: &str = "SELECT id, sku, name, description, price_cents, stock, min_stock, \
     image_url, supplier_id, category_id, created_at, updated_at FROM products";

const SELECT_MOVEMENT: &str = "SELECT id, product_id, direction, quantity, note, stock_before, \
     stock_after, created_at FROM stock_movements";

#[async_trait]
impl InventoryStore for PostgresStore {
    // ---- users ----

    async fn create_user(&self, user: User) -> StoreResult<User> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::conflict("email already registered")
            } else {
                map_sqlx_error("create_user", e)
            }
        })?;
        Ok(user)
    }

    async fn user_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{SELECT_USER} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("user_by_id", e))?;
        row.map(|r| r.into_user("user_by_id")).transpose()
    }

    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{SELECT_USER} WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("user_by_email", e))?;
        row.map(|r| r.into_user("user_by_email")).transpose()
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!("{SELECT_USER} ORDER BY created_at ASC"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_users", e))?;
        rows.into_iter()
            .map(|r| r.into_user("list_users"))
            .collect()
    }

    async fn list_pending_users(&self) -> StoreResult<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "{SELECT_USER} WHERE is_active = FALSE ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_pending_users", e))?;
        rows.into_iter()
            .map(|r| r.into_user("list_pending_users"))
            .collect()
    }

    async fn update_user(&self, user: User) -> StoreResult<User> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = $2, password_hash = $3, role = $4, is_active = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_user", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found());
        }
        Ok(user)
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_user", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found());
        }
        Ok(())
    }

    // ---- suppliers ----

    async fn create_supplier(&self, supplier: Supplier) -> StoreResult<Supplier> {
        sqlx::query(
            r#"
            INSERT INTO suppliers (id, name, contact_name, phone, email, address, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(supplier.id.as_uuid())
        .bind(&supplier.name)
        .bind(&supplier.contact_name)
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .bind(&supplier.address)
        .bind(supplier.created_at)
        .bind(supplier.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_supplier", e))?;
        Ok(supplier)
    }

    async fn supplier_by_id(&self, id: SupplierId) -> StoreResult<Option<Supplier>> {
        let row: Option<SupplierRow> = sqlx::query_as(&format!("{SELECT_SUPPLIER} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("supplier_by_id", e))?;
        Ok(row.map(Supplier::from))
    }

    async fn list_suppliers(&self) -> StoreResult<Vec<Supplier>> {
        let rows: Vec<SupplierRow> =
            sqlx::query_as(&format!("{SELECT_SUPPLIER} ORDER BY created_at ASC"))
                .fetch_all(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("list_suppliers", e))?;
        Ok(rows.into_iter().map(Supplier::from).collect())
    }

    async fn update_supplier(&self, supplier: Supplier) -> StoreResult<Supplier> {
        let result = sqlx::query(
            r#"
            UPDATE suppliers
            SET name = $2, contact_name = $3, phone = $4, email = $5, address = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(supplier.id.as_uuid())
        .bind(&supplier.name)
        .bind(&supplier.contact_name)
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .bind(&supplier.address)
        .bind(supplier.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_supplier", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found());
        }
        Ok(supplier)
    }

    async fn delete_supplier(&self, id: SupplierId) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("delete_supplier", e))?;

        let referencing: i64 =
            sqlx::query("SELECT COUNT(*) AS count FROM products WHERE supplier_id = $1")
                .bind(id.as_uuid())
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("delete_supplier", e))?
                .try_get("count")
                .map_err(|e| map_sqlx_error("delete_supplier", e))?;

        if referencing > 0 {
            return Err(StoreError::conflict(
                "cannot delete supplier with existing products",
            ));
        }

        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_supplier", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found());
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("delete_supplier", e))
    }

    // ---- categories ----

    async fn create_category(&self, category: Category) -> StoreResult<Category> {
        sqlx::query("INSERT INTO categories (id, name, description) VALUES ($1, $2, $3)")
            .bind(category.id.as_uuid())
            .bind(&category.name)
            .bind(&category.description)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::conflict("category name already exists")
                } else {
                    map_sqlx_error("create_category", e)
                }
            })?;
        Ok(category)
    }

    async fn category_by_id(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        let row: Option<CategoryRow> =
            sqlx::query_as("SELECT id, name, description FROM categories WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("category_by_id", e))?;
        Ok(row.map(Category::from))
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let rows: Vec<CategoryRow> =
            sqlx::query_as("SELECT id, name, description FROM categories ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("list_categories", e))?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn update_category(&self, category: Category) -> StoreResult<Category> {
        let result =
            sqlx::query("UPDATE categories SET name = $2, description = $3 WHERE id = $1")
                .bind(category.id.as_uuid())
                .bind(&category.name)
                .bind(&category.description)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        StoreError::conflict("category name already exists")
                    } else {
                        map_sqlx_error("update_category", e)
                    }
                })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found());
        }
        Ok(category)
    }

    async fn delete_category(&self, id: CategoryId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_category", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found());
        }
        Ok(())
    }

    // ---- products ----

    async fn create_product(&self, product: Product) -> StoreResult<Product> {
        sqlx::query(
            r#"
            INSERT INTO products (id, sku, name, description, price_cents, stock, min_stock,
                                  image_url, supplier_id, category_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.min_stock)
        .bind(&product.image_url)
        .bind(product.supplier_id.as_uuid())
        .bind(product.category_id.map(|id| *id.as_uuid()))
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::conflict("sku already exists")
            } else {
                map_sqlx_error("create_product", e)
            }
        })?;
        Ok(product)
    }

    async fn product_by_id(&self, id: ProductId) -> StoreResult<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(&format!("{SELECT_PRODUCT} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("product_by_id", e))?;
        Ok(row.map(Product::from))
    }

    async fn list_products(
        &self,
        filter: ProductFilter,
        page: PageParams,
    ) -> StoreResult<Page<Product>> {
        let category = filter.category_id.map(|id| *id.as_uuid());

        let total: i64 = sqlx::query(
            r#"
            SELECT COUNT(*) AS count FROM products
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%' OR sku ILIKE '%' || $1 || '%')
              AND ($2::uuid IS NULL OR category_id = $2)
            "#,
        )
        .bind(&filter.search)
        .bind(category)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?
        .try_get("count")
        .map_err(|e| map_sqlx_error("list_products", e))?;

        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            r#"
            {SELECT_PRODUCT}
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%' OR sku ILIKE '%' || $1 || '%')
              AND ($2::uuid IS NULL OR category_id = $2)
            ORDER BY created_at ASC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(&filter.search)
        .bind(category)
        .bind(i64::from(page.limit))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;

        Ok(Page::new(
            rows.into_iter().map(Product::from).collect(),
            page,
            total as u64,
        ))
    }

    async fn list_low_stock(&self) -> StoreResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "{SELECT_PRODUCT} WHERE stock < min_stock ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_low_stock", e))?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn update_product(&self, product: Product) -> StoreResult<Product> {
        // Stock is deliberately absent from the SET list: the ledger unit of
        // work is the only stock writer.
        let result = sqlx::query(
            r#"
            UPDATE products
            SET sku = $2, name = $3, description = $4, price_cents = $5, min_stock = $6,
                image_url = $7, supplier_id = $8, category_id = $9, updated_at = $10
            WHERE id = $1
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.min_stock)
        .bind(&product.image_url)
        .bind(product.supplier_id.as_uuid())
        .bind(product.category_id.map(|id| *id.as_uuid()))
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::conflict("sku already exists")
            } else {
                map_sqlx_error("update_product", e)
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found());
        }

        // Re-read so the returned entity carries the ledger-owned stock.
        self.product_by_id(product.id)
            .await?
            .ok_or_else(StoreError::not_found)
    }

    async fn delete_product(&self, id: ProductId) -> StoreResult<()> {
        // Movement rows go with the product (ON DELETE CASCADE).
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found());
        }
        Ok(())
    }

    // ---- stock ledger ----

    #[instrument(
        skip(self, request),
        fields(
            product_id = %product_id,
            direction = %request.direction,
            quantity = request.quantity,
        ),
        err
    )]
    async fn apply_movement(
        &self,
        product_id: ProductId,
        request: MovementRequest,
    ) -> StoreResult<(Product, StockMovement)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("apply_movement", e))?;

        // Row lock: concurrent movements against the same product queue here,
        // so the stock each one reads reflects the previous commit.
        let row = sqlx::query("SELECT stock FROM products WHERE id = $1 FOR UPDATE")
            .bind(product_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("apply_movement", e))?;

        let stock_before: i64 = row
            .ok_or(DomainError::NotFound)?
            .try_get("stock")
            .map_err(|e| map_sqlx_error("apply_movement", e))?;

        // Guarded transition; an early return drops the transaction, which
        // rolls it back.
        let plan = request.plan(stock_before)?;

        let now = Utc::now();
        let movement = plan.into_movement(MovementId::new(), product_id, now);

        sqlx::query("UPDATE products SET stock = $2, updated_at = $3 WHERE id = $1")
            .bind(product_id.as_uuid())
            .bind(movement.stock_after)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("apply_movement", e))?;

        sqlx::query(
            r#"
            INSERT INTO stock_movements (id, product_id, direction, quantity, note,
                                         stock_before, stock_after, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(movement.id.as_uuid())
        .bind(product_id.as_uuid())
        .bind(movement.direction.as_str())
        .bind(movement.quantity)
        .bind(&movement.note)
        .bind(movement.stock_before)
        .bind(movement.stock_after)
        .bind(movement.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("apply_movement", e))?;

        let product_row: ProductRow = sqlx::query_as(&format!("{SELECT_PRODUCT} WHERE id = $1"))
            .bind(product_id.as_uuid())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("apply_movement", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("apply_movement", e))?;

        Ok((Product::from(product_row), movement))
    }

    #[instrument(skip(self), fields(product_id = %product_id), err)]
    async fn movement_history(&self, product_id: ProductId) -> StoreResult<Vec<StockMovement>> {
        let exists = sqlx::query("SELECT 1 AS one FROM products WHERE id = $1")
            .bind(product_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("movement_history", e))?;
        if exists.is_none() {
            return Err(StoreError::not_found());
        }

        // UUIDv7 ids are time-ordered; the id tiebreak keeps same-timestamp
        // movements in creation order.
        let rows: Vec<MovementRow> = sqlx::query_as(&format!(
            "{SELECT_MOVEMENT} WHERE product_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(product_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("movement_history", e))?;

        rows.into_iter()
            .map(|r| r.into_movement("movement_history"))
            .collect()
    }

    // ---- activity log ----

    async fn append_activity(&self, record: ActivityRecord) -> StoreResult<ActivityRecord> {
        sqlx::query(
            r#"
            INSERT INTO activity_log (id, user_id, action, entity, entity_id, details, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.user_id.as_uuid())
        .bind(record.action.as_str())
        .bind(record.entity.as_str())
        .bind(record.entity_id)
        .bind(&record.details)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("append_activity", e))?;
        Ok(record)
    }

    async fn list_activities(&self, page: PageParams) -> StoreResult<Page<ActivityRecord>> {
        let total: i64 = sqlx::query("SELECT COUNT(*) AS count FROM activity_log")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_activities", e))?
            .try_get("count")
            .map_err(|e| map_sqlx_error("list_activities", e))?;

        let rows: Vec<ActivityRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, action, entity, entity_id, details, created_at
            FROM activity_log
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(i64::from(page.limit))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_activities", e))?;

        let records: StoreResult<Vec<ActivityRecord>> = rows
            .into_iter()
            .map(|r| r.into_record("list_activities"))
            .collect();
        Ok(Page::new(records?, page, total as u64))
    }
}
