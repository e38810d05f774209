//! In-memory store for tests/dev.
//!
//! A single `RwLock` over the whole dataset: the ledger unit of work holds
//! the write lock across its read-modify-write-insert, which both serializes
//! concurrent movements and makes the pair of writes atomic.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use stockpile_audit::ActivityRecord;
use stockpile_auth::User;
use stockpile_catalog::{Category, Product, Supplier};
use stockpile_core::{
    CategoryId, DomainError, Page, PageParams, ProductId, SupplierId, UserId, MovementId,
};
use stockpile_ledger::{MovementRequest, StockMovement};

use super::r#trait::{InventoryStore, ProductFilter, StoreError, StoreResult};

#[derive(Debug, Default)]
struct Dataset {
    users: HashMap<UserId, User>,
    suppliers: HashMap<SupplierId, Supplier>,
    categories: HashMap<CategoryId, Category>,
    products: HashMap<ProductId, Product>,
    /// Append-only, creation order.
    movements: Vec<StockMovement>,
    /// Append-only, creation order.
    activities: Vec<ActivityRecord>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Dataset>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, Dataset>> {
        self.inner
            .read()
            .map_err(|_| StoreError::persistence("read", "store lock poisoned"))
    }

    fn write(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, Dataset>> {
        self.inner
            .write()
            .map_err(|_| StoreError::persistence("write", "store lock poisoned"))
    }
}

fn matches_filter(product: &Product, filter: &ProductFilter) -> bool {
    if let Some(category_id) = filter.category_id {
        if product.category_id != Some(category_id) {
            return false;
        }
    }
    if let Some(search) = &filter.search {
        let needle = search.to_lowercase();
        if !product.name.to_lowercase().contains(&needle)
            && !product.sku.to_lowercase().contains(&needle)
        {
            return false;
        }
    }
    true
}

fn paginate<T: Clone>(items: Vec<T>, page: PageParams) -> Page<T> {
    let total = items.len() as u64;
    let window = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit as usize)
        .collect();
    Page::new(window, page, total)
}

#[async_trait]
impl InventoryStore for MemoryStore {
    // ---- users ----

    async fn create_user(&self, user: User) -> StoreResult<User> {
        let mut inner = self.write()?;
        if inner
            .users
            .values()
            .any(|existing| existing.email == user.email)
        {
            return Err(StoreError::conflict("email already registered"));
        }
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn user_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let mut users: Vec<User> = self.read()?.users.values().cloned().collect();
        users.sort_by_key(|user| user.created_at);
        Ok(users)
    }

    async fn list_pending_users(&self) -> StoreResult<Vec<User>> {
        let mut users: Vec<User> = self
            .read()?
            .users
            .values()
            .filter(|user| !user.is_active)
            .cloned()
            .collect();
        users.sort_by_key(|user| user.created_at);
        Ok(users)
    }

    async fn update_user(&self, user: User) -> StoreResult<User> {
        let mut inner = self.write()?;
        if !inner.users.contains_key(&user.id) {
            return Err(StoreError::not_found());
        }
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<()> {
        let mut inner = self.write()?;
        inner
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or_else(StoreError::not_found)
    }

    // ---- suppliers ----

    async fn create_supplier(&self, supplier: Supplier) -> StoreResult<Supplier> {
        let mut inner = self.write()?;
        inner.suppliers.insert(supplier.id, supplier.clone());
        Ok(supplier)
    }

    async fn supplier_by_id(&self, id: SupplierId) -> StoreResult<Option<Supplier>> {
        Ok(self.read()?.suppliers.get(&id).cloned())
    }

    async fn list_suppliers(&self) -> StoreResult<Vec<Supplier>> {
        let mut suppliers: Vec<Supplier> = self.read()?.suppliers.values().cloned().collect();
        suppliers.sort_by_key(|supplier| supplier.created_at);
        Ok(suppliers)
    }

    async fn update_supplier(&self, supplier: Supplier) -> StoreResult<Supplier> {
        let mut inner = self.write()?;
        if !inner.suppliers.contains_key(&supplier.id) {
            return Err(StoreError::not_found());
        }
        inner.suppliers.insert(supplier.id, supplier.clone());
        Ok(supplier)
    }

    async fn delete_supplier(&self, id: SupplierId) -> StoreResult<()> {
        let mut inner = self.write()?;
        if !inner.suppliers.contains_key(&id) {
            return Err(StoreError::not_found());
        }
        if inner
            .products
            .values()
            .any(|product| product.supplier_id == id)
        {
            return Err(StoreError::conflict(
                "cannot delete supplier with existing products",
            ));
        }
        inner.suppliers.remove(&id);
        Ok(())
    }

    // ---- categories ----

    async fn create_category(&self, category: Category) -> StoreResult<Category> {
        let mut inner = self.write()?;
        if inner
            .categories
            .values()
            .any(|existing| existing.name == category.name)
        {
            return Err(StoreError::conflict("category name already exists"));
        }
        inner.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn category_by_id(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        Ok(self.read()?.categories.get(&id).cloned())
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let mut categories: Vec<Category> = self.read()?.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn update_category(&self, category: Category) -> StoreResult<Category> {
        let mut inner = self.write()?;
        if !inner.categories.contains_key(&category.id) {
            return Err(StoreError::not_found());
        }
        if inner
            .categories
            .values()
            .any(|existing| existing.id != category.id && existing.name == category.name)
        {
            return Err(StoreError::conflict("category name already exists"));
        }
        inner.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn delete_category(&self, id: CategoryId) -> StoreResult<()> {
        let mut inner = self.write()?;
        inner
            .categories
            .remove(&id)
            .map(|_| ())
            .ok_or_else(StoreError::not_found)
    }

    // ---- products ----

    async fn create_product(&self, product: Product) -> StoreResult<Product> {
        let mut inner = self.write()?;
        if inner
            .products
            .values()
            .any(|existing| existing.sku == product.sku)
        {
            return Err(StoreError::conflict("sku already exists"));
        }
        inner.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn product_by_id(&self, id: ProductId) -> StoreResult<Option<Product>> {
        Ok(self.read()?.products.get(&id).cloned())
    }

    async fn list_products(
        &self,
        filter: ProductFilter,
        page: PageParams,
    ) -> StoreResult<Page<Product>> {
        let mut products: Vec<Product> = self
            .read()?
            .products
            .values()
            .filter(|product| matches_filter(product, &filter))
            .cloned()
            .collect();
        products.sort_by_key(|product| product.created_at);
        Ok(paginate(products, page))
    }

    async fn list_low_stock(&self) -> StoreResult<Vec<Product>> {
        let mut products: Vec<Product> = self
            .read()?
            .products
            .values()
            .filter(|product| product.is_low_stock())
            .cloned()
            .collect();
        products.sort_by_key(|product| product.created_at);
        Ok(products)
    }

    async fn update_product(&self, product: Product) -> StoreResult<Product> {
        let mut inner = self.write()?;
        if !inner.products.contains_key(&product.id) {
            return Err(StoreError::not_found());
        }
        if inner
            .products
            .values()
            .any(|existing| existing.id != product.id && existing.sku == product.sku)
        {
            return Err(StoreError::conflict("sku already exists"));
        }
        // Stock is ledger-owned: carry the stored value over regardless of
        // what the caller passed.
        let mut product = product;
        if let Some(existing) = inner.products.get(&product.id) {
            product.stock = existing.stock;
        }
        inner.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn delete_product(&self, id: ProductId) -> StoreResult<()> {
        let mut inner = self.write()?;
        if inner.products.remove(&id).is_none() {
            return Err(StoreError::not_found());
        }
        inner.movements.retain(|movement| movement.product_id != id);
        Ok(())
    }

    // ---- stock ledger ----

    async fn apply_movement(
        &self,
        product_id: ProductId,
        request: MovementRequest,
    ) -> StoreResult<(Product, StockMovement)> {
        let mut guard = self.write()?;
        // Split-borrow the dataset so the product entry and the movement log
        // can be touched under the same lock.
        let inner = &mut *guard;

        let product = inner
            .products
            .get_mut(&product_id)
            .ok_or(DomainError::NotFound)?;

        let plan = request.plan(product.stock)?;

        let now = Utc::now();
        product.stock = plan.stock_after;
        product.updated_at = now;
        let movement = plan.into_movement(MovementId::new(), product_id, now);
        inner.movements.push(movement.clone());

        Ok((product.clone(), movement))
    }

    async fn movement_history(&self, product_id: ProductId) -> StoreResult<Vec<StockMovement>> {
        let inner = self.read()?;
        if !inner.products.contains_key(&product_id) {
            return Err(StoreError::not_found());
        }
        Ok(inner
            .movements
            .iter()
            .rev()
            .filter(|movement| movement.product_id == product_id)
            .cloned()
            .collect())
    }

    // ---- activity log ----

    async fn append_activity(&self, record: ActivityRecord) -> StoreResult<ActivityRecord> {
        self.write()?.activities.push(record.clone());
        Ok(record)
    }

    async fn list_activities(&self, page: PageParams) -> StoreResult<Page<ActivityRecord>> {
        let records: Vec<ActivityRecord> =
            self.read()?.activities.iter().rev().cloned().collect();
        Ok(paginate(records, page))
    }
}
