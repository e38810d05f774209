use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockpile_core::{DomainError, SupplierId};

/// A supplier in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    pub contact_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a supplier. Only the name is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSupplier {
    pub name: String,
    pub contact_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
}

impl NewSupplier {
    pub fn into_supplier(
        self,
        id: SupplierId,
        now: DateTime<Utc>,
    ) -> Result<Supplier, DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name is required"));
        }
        Ok(Supplier {
            id,
            name: self.name,
            contact_name: self.contact_name,
            phone: self.phone,
            email: self.email,
            address: self.address,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierPatch {
    pub name: Option<String>,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl SupplierPatch {
    pub fn apply(self, supplier: &mut Supplier, now: DateTime<Utc>) -> Result<(), DomainError> {
        if let Some(name) = self.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("name cannot be empty"));
            }
            supplier.name = name;
        }
        if let Some(contact_name) = self.contact_name {
            supplier.contact_name = contact_name;
        }
        if let Some(phone) = self.phone {
            supplier.phone = phone;
        }
        if let Some(email) = self.email {
            supplier.email = email;
        }
        if let Some(address) = self.address {
            supplier.address = address;
        }
        supplier.updated_at = now;
        Ok(())
    }
}
