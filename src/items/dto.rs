use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::items::{repo_types::Item, services::ListOverview};

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

#[derive(Debug, Serialize)]
pub struct ItemView {
    pub id: i64,
    pub name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

impl From<Item> for ItemView {
    fn from(item: Item) -> Self {
        Self {
            line_total: item.line_total(),
            id: item.id,
            name: item.name,
            quantity: item.quantity,
            unit_price: item.unit_price,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ShoppingListResponse {
    pub items: Vec<ItemView>,
    pub total: Decimal,
}

impl From<ListOverview> for ShoppingListResponse {
    fn from(o: ListOverview) -> Self {
        Self {
            items: o.items.into_iter().map(ItemView::from).collect(),
            total: o.total,
        }
    }
}
