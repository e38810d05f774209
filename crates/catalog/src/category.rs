use serde::{Deserialize, Serialize};

use stockpile_core::{CategoryId, DomainError};

/// A product category. Names are unique across the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
}

/// Validated input for creating or replacing a category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub description: String,
}

impl NewCategory {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("category name is required"));
        }
        Ok(())
    }

    pub fn into_category(self, id: CategoryId) -> Result<Category, DomainError> {
        self.validate()?;
        Ok(Category {
            id,
            name: self.name,
            description: self.description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_required() {
        let input = NewCategory {
            name: "  ".to_string(),
            description: String::new(),
        };
        assert!(input.into_category(CategoryId::new()).is_err());
    }
}
