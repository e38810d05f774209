use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockpile_core::{CategoryId, DomainError, ProductId, SupplierId};

/// A catalog product.
///
/// `stock` is owned by the stock ledger: nothing outside the ledger's
/// apply-movement unit of work may write it after creation. `ProductPatch`
/// deliberately has no stock field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    pub description: String,
    /// Price in minor currency units (e.g. cents).
    pub price_cents: i64,
    pub stock: i64,
    /// Alert threshold: the product is "low stock" while `stock < min_stock`.
    pub min_stock: i64,
    pub image_url: Option<String>,
    pub supplier_id: SupplierId,
    pub category_id: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.stock < self.min_stock
    }
}

/// Validated input for creating a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    /// Baseline the movement ledger replays from.
    pub initial_stock: i64,
    pub min_stock: i64,
    pub image_url: Option<String>,
    pub supplier_id: SupplierId,
    pub category_id: Option<CategoryId>,
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.sku.trim().is_empty() {
            return Err(DomainError::validation("sku cannot be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.price_cents <= 0 {
            return Err(DomainError::validation("price must be positive"));
        }
        if self.initial_stock < 0 {
            return Err(DomainError::validation("initial stock cannot be negative"));
        }
        if self.min_stock < 0 {
            return Err(DomainError::validation("min stock cannot be negative"));
        }
        Ok(())
    }

    /// Validate and build the product entity.
    pub fn into_product(self, id: ProductId, now: DateTime<Utc>) -> Result<Product, DomainError> {
        self.validate()?;
        Ok(Product {
            id,
            sku: self.sku,
            name: self.name,
            description: self.description,
            price_cents: self.price_cents,
            stock: self.initial_stock,
            min_stock: self.min_stock,
            image_url: self.image_url,
            supplier_id: self.supplier_id,
            category_id: self.category_id,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub min_stock: Option<i64>,
    pub image_url: Option<String>,
    pub supplier_id: Option<SupplierId>,
    pub category_id: Option<CategoryId>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Whether the patch changes the SKU relative to `current`.
    pub fn changes_sku(&self, current: &Product) -> bool {
        self.sku.as_deref().is_some_and(|sku| sku != current.sku)
    }

    pub fn apply(self, product: &mut Product, now: DateTime<Utc>) -> Result<(), DomainError> {
        if let Some(sku) = self.sku {
            if sku.trim().is_empty() {
                return Err(DomainError::validation("sku cannot be empty"));
            }
            product.sku = sku;
        }
        if let Some(name) = self.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("name cannot be empty"));
            }
            product.name = name;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(price_cents) = self.price_cents {
            if price_cents <= 0 {
                return Err(DomainError::validation("price must be positive"));
            }
            product.price_cents = price_cents;
        }
        if let Some(min_stock) = self.min_stock {
            if min_stock < 0 {
                return Err(DomainError::validation("min stock cannot be negative"));
            }
            product.min_stock = min_stock;
        }
        if let Some(image_url) = self.image_url {
            product.image_url = Some(image_url);
        }
        if let Some(supplier_id) = self.supplier_id {
            product.supplier_id = supplier_id;
        }
        if let Some(category_id) = self.category_id {
            product.category_id = Some(category_id);
        }
        product.updated_at = now;
        Ok(())
    }
}
