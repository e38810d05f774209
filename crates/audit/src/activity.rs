use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stockpile_core::{ActivityId, UserId};

/// What was done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Create,
    Update,
    Delete,
    Approve,
    StockIn,
    StockOut,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::Create => "create",
            ActivityAction::Update => "update",
            ActivityAction::Delete => "delete",
            ActivityAction::Approve => "approve",
            ActivityAction::StockIn => "stock_in",
            ActivityAction::StockOut => "stock_out",
        }
    }
}

impl core::str::FromStr for ActivityAction {
    type Err = stockpile_core::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(ActivityAction::Create),
            "update" => Ok(ActivityAction::Update),
            "delete" => Ok(ActivityAction::Delete),
            "approve" => Ok(ActivityAction::Approve),
            "stock_in" => Ok(ActivityAction::StockIn),
            "stock_out" => Ok(ActivityAction::StockOut),
            other => Err(stockpile_core::DomainError::validation(format!(
                "unknown activity action '{other}'"
            ))),
        }
    }
}

/// What it was done to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    User,
    Supplier,
    Category,
    Product,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::Supplier => "supplier",
            EntityKind::Category => "category",
            EntityKind::Product => "product",
        }
    }
}

impl core::str::FromStr for EntityKind {
    type Err = stockpile_core::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(EntityKind::User),
            "supplier" => Ok(EntityKind::Supplier),
            "category" => Ok(EntityKind::Category),
            "product" => Ok(EntityKind::Product),
            other => Err(stockpile_core::DomainError::validation(format!(
                "unknown entity kind '{other}'"
            ))),
        }
    }
}

/// One append-only audit row. Written best-effort alongside mutations;
/// never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: ActivityId,
    pub user_id: UserId,
    pub action: ActivityAction,
    pub entity: EntityKind,
    /// Raw id of the affected entity (entities have heterogeneous id types).
    pub entity_id: Uuid,
    pub details: String,
    pub created_at: DateTime<Utc>,
}

impl ActivityRecord {
    pub fn new(
        user_id: UserId,
        action: ActivityAction,
        entity: EntityKind,
        entity_id: Uuid,
        details: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ActivityId::new(),
            user_id,
            action,
            entity,
            entity_id,
            details: details.into(),
            created_at,
        }
    }
}
