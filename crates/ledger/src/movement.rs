use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockpile_core::{DomainError, MovementId, ProductId};

/// Movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Stock received (restock).
    In,
    /// Stock issued (sale, consumption).
    Out,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Direction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(Direction::In),
            "out" => Ok(Direction::Out),
            other => Err(DomainError::validation(format!(
                "direction must be 'in' or 'out', got '{other}'"
            ))),
        }
    }
}

/// A recorded stock movement: immutable once created.
///
/// The before/after snapshot is captured at apply time so the history reads
/// as a chain; `Product.stock` must always equal the baseline plus the signed
/// sum of its movements in creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: MovementId,
    pub product_id: ProductId,
    pub direction: Direction,
    pub quantity: i64,
    pub note: String,
    pub stock_before: i64,
    pub stock_after: i64,
    pub created_at: DateTime<Utc>,
}

impl StockMovement {
    /// The movement's contribution to the stock counter.
    pub fn signed_delta(&self) -> i64 {
        match self.direction {
            Direction::In => self.quantity,
            Direction::Out => -self.quantity,
        }
    }
}

/// A requested movement, not yet applied to any stock level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementRequest {
    pub direction: Direction,
    pub quantity: i64,
    pub note: String,
}

impl MovementRequest {
    /// The single guarded transition of the ledger.
    ///
    /// Computes the before/after snapshot for applying this request at
    /// `stock_before`. Rejects non-positive quantities and out-movements
    /// exceeding the available stock; never produces a negative
    /// `stock_after`.
    pub fn plan(&self, stock_before: i64) -> Result<MovementPlan, DomainError> {
        if self.quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }

        let stock_after = match self.direction {
            Direction::In => stock_before
                .checked_add(self.quantity)
                .ok_or_else(|| DomainError::validation("stock level overflow"))?,
            Direction::Out => {
                if stock_before < self.quantity {
                    return Err(DomainError::insufficient_stock(stock_before, self.quantity));
                }
                stock_before - self.quantity
            }
        };

        Ok(MovementPlan {
            direction: self.direction,
            quantity: self.quantity,
            note: self.note.clone(),
            stock_before,
            stock_after,
        })
    }
}

/// A planned movement: the validated outcome of [`MovementRequest::plan`],
/// ready to be persisted atomically with the product's new stock level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementPlan {
    pub direction: Direction,
    pub quantity: i64,
    pub note: String,
    pub stock_before: i64,
    pub stock_after: i64,
}

impl MovementPlan {
    pub fn into_movement(
        self,
        id: MovementId,
        product_id: ProductId,
        created_at: DateTime<Utc>,
    ) -> StockMovement {
        StockMovement {
            id,
            product_id,
            direction: self.direction,
            quantity: self.quantity,
            note: self.note,
            stock_before: self.stock_before,
            stock_after: self.stock_after,
            created_at,
        }
    }
}

/// Replay a ledger from its baseline, verifying the chain.
///
/// `movements` must be in creation order (oldest first). Returns the final
/// stock level, or a validation error naming the first movement whose
/// snapshot does not chain.
pub fn replay(baseline: i64, movements: &[StockMovement]) -> Result<i64, DomainError> {
    let mut stock = baseline;
    for movement in movements {
        if movement.stock_before != stock {
            return Err(DomainError::validation(format!(
                "movement {} breaks the chain: stock_before {} but ledger says {}",
                movement.id, movement.stock_before, stock
            )));
        }
        if movement.stock_after != movement.stock_before + movement.signed_delta() {
            return Err(DomainError::validation(format!(
                "movement {} has an inconsistent snapshot",
                movement.id
            )));
        }
        stock = movement.stock_after;
    }
    Ok(stock)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn request(direction: Direction, quantity: i64) -> MovementRequest {
        MovementRequest {
            direction,
            quantity,
            note: String::new(),
        }
    }

    #[test]
    fn in_movement_adds_quantity() {
        let plan = request(Direction::In, 5).plan(7).expect("valid in");
        assert_eq!(plan.stock_before, 7);
        assert_eq!(plan.stock_after, 12);
    }

    #[test]
    fn out_movement_subtracts_quantity() {
        let plan = request(Direction::Out, 3).plan(10).expect("valid out");
        assert_eq!(plan.stock_before, 10);
        assert_eq!(plan.stock_after, 7);
    }

    #[test]
    fn out_movement_exceeding_stock_is_rejected() {
        let err = request(Direction::Out, 10).plan(7).unwrap_err();
        assert_eq!(
            err,
            DomainError::InsufficientStock {
                available: 7,
                requested: 10
            }
        );
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        assert!(request(Direction::In, 0).plan(10).is_err());
        assert!(request(Direction::Out, -4).plan(10).is_err());
    }

    #[test]
    fn overflow_is_rejected_not_wrapped() {
        let err = request(Direction::In, 1).plan(i64::MAX).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn replay_walks_the_chain() {
        let product_id = ProductId::new();
        let now = Utc::now();
        let movements = [
            request(Direction::Out, 3)
                .plan(10)
                .unwrap()
                .into_movement(MovementId::new(), product_id, now),
            request(Direction::In, 5)
                .plan(7)
                .unwrap()
                .into_movement(MovementId::new(), product_id, now),
        ];
        assert_eq!(replay(10, &movements), Ok(12));
    }

    #[test]
    fn replay_rejects_broken_chain() {
        let product_id = ProductId::new();
        let now = Utc::now();
        let movements = [request(Direction::In, 5)
            .plan(7)
            .unwrap()
            .into_movement(MovementId::new(), product_id, now)];
        assert!(replay(10, &movements).is_err());
    }

    proptest! {
        #[test]
        fn in_movements_always_add(before in 0i64..1_000_000, qty in 1i64..1_000_000) {
            let plan = request(Direction::In, qty).plan(before).unwrap();
            prop_assert_eq!(plan.stock_after, before + qty);
        }

        #[test]
        fn out_movements_never_go_negative(before in 0i64..1_000_000, qty in 1i64..1_000_000) {
            match request(Direction::Out, qty).plan(before) {
                Ok(plan) => {
                    prop_assert!(qty <= before);
                    prop_assert_eq!(plan.stock_after, before - qty);
                    prop_assert!(plan.stock_after >= 0);
                }
                Err(DomainError::InsufficientStock { available, requested }) => {
                    prop_assert!(qty > before);
                    prop_assert_eq!(available, before);
                    prop_assert_eq!(requested, qty);
                }
                Err(other) => prop_assert!(false, "unexpected error: {other}"),
            }
        }
    }
}
