use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Internal id of the user that owns a set of items. Every item query is scoped by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(i64);

impl OwnerId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Shopping-list line item as stored in the `items` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Item {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub created_at: OffsetDateTime,
}

impl Item {
    /// `unit_price × quantity`, computed on read and never stored.
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// A validated item ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub owner: OwnerId,
    pub name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}
