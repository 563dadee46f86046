use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use crate::{
    error::{AppError, AppResult},
    items::{
        repo::ItemStore,
        repo_types::{Item, NewItem, OwnerId},
    },
};

/// Fractional digits of a stored unit price (`NUMERIC(10, 2)`).
pub const PRICE_SCALE: u32 = 2;

/// Exclusive upper bound of a storable unit price: 8 integer digits.
fn price_limit() -> Decimal {
    Decimal::new(100_000_000, 0)
}

/// Items of one owner together with their total.
#[derive(Debug, Clone)]
pub struct ListOverview {
    pub items: Vec<Item>,
    pub total: Decimal,
}

/// Owner-scoped shopping-list operations.
#[derive(Clone)]
pub struct ShoppingList {
    items: Arc<dyn ItemStore>,
}

impl ShoppingList {
    pub fn new(items: Arc<dyn ItemStore>) -> Self {
        Self { items }
    }

    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        owner: OwnerId,
        name: &str,
        quantity: i32,
        unit_price: Decimal,
    ) -> AppResult<Item> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::invalid("name must not be empty"));
        }
        if quantity < 0 {
            return Err(AppError::invalid("quantity must not be negative"));
        }
        let unit_price = normalize_price(unit_price)?;

        let item = self
            .items
            .insert(NewItem {
                owner,
                name: name.to_string(),
                quantity,
                unit_price,
            })
            .await?;

        info!(%owner, item_id = item.id, "item added");
        Ok(item)
    }

    pub async fn list_items(&self, owner: OwnerId) -> AppResult<Vec<Item>> {
        Ok(self.items.list_by_owner(owner).await?)
    }

    /// Silent no-op when `item_id` is unknown or owned by someone else.
    #[instrument(skip(self))]
    pub async fn delete_item(&self, owner: OwnerId, item_id: i64) -> AppResult<()> {
        let removed = self.items.delete_by_id_and_owner(item_id, owner).await?;
        if removed == 0 {
            debug!(%owner, item_id, "delete matched no owned item");
        } else {
            info!(%owner, item_id, "item deleted");
        }
        Ok(())
    }

    pub async fn total_price(&self, owner: OwnerId) -> AppResult<Decimal> {
        Ok(self.overview(owner).await?.total)
    }

    /// Lists the owner's items and totals that same snapshot.
    pub async fn overview(&self, owner: OwnerId) -> AppResult<ListOverview> {
        let items = self.list_items(owner).await?;
        let total = total_of(&items);
        Ok(ListOverview { items, total })
    }
}

/// Sum of line totals, `0.00` for an empty list.
pub fn total_of(items: &[Item]) -> Decimal {
    let mut total = items
        .iter()
        .map(Item::line_total)
        .fold(Decimal::ZERO, |acc, line| acc + line);
    total.rescale(PRICE_SCALE);
    total
}

fn normalize_price(price: Decimal) -> AppResult<Decimal> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(AppError::invalid("unit price must not be negative"));
    }
    if price.normalize().scale() > PRICE_SCALE {
        return Err(AppError::invalid(format!(
            "unit price allows at most {PRICE_SCALE} decimal places"
        )));
    }
    if price >= price_limit() {
        return Err(AppError::invalid("unit price is too large"));
    }
    let mut price = price.abs();
    price.rescale(PRICE_SCALE);
    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryItemStore;
    use rust_decimal_macros::dec;

    fn list() -> ShoppingList {
        ShoppingList::new(Arc::new(MemoryItemStore::default()))
    }

    const ALICE: OwnerId = OwnerId::new(1);
    const BOB: OwnerId = OwnerId::new(2);

    #[tokio::test]
    async fn newest_first_and_total() {
        let shop = list();
        shop.add_item(ALICE, "Milk", 2, dec!(1.50)).await.unwrap();
        shop.add_item(ALICE, "Bread", 1, dec!(2.00)).await.unwrap();

        let names: Vec<_> = shop
            .list_items(ALICE)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, ["Bread", "Milk"]);
        assert_eq!(shop.total_price(ALICE).await.unwrap(), dec!(5.00));
    }

    #[tokio::test]
    async fn empty_list_totals_exact_zero() {
        let shop = list();
        let total = shop.total_price(ALICE).await.unwrap();
        assert_eq!(total, Decimal::ZERO);
        assert_eq!(total.to_string(), "0.00");
    }

    #[tokio::test]
    async fn cross_owner_delete_is_silent_noop() {
        let shop = list();
        let milk = shop.add_item(ALICE, "Milk", 2, dec!(1.50)).await.unwrap();
        let before = shop.list_items(ALICE).await.unwrap();

        shop.delete_item(BOB, milk.id).await.expect("no error for foreign id");

        assert_eq!(shop.list_items(ALICE).await.unwrap(), before);
    }

    #[tokio::test]
    async fn owner_delete_removes_only_that_item() {
        let shop = list();
        let milk = shop.add_item(ALICE, "Milk", 2, dec!(1.50)).await.unwrap();
        shop.add_item(ALICE, "Milk", 1, dec!(1.50)).await.unwrap();

        shop.delete_item(ALICE, milk.id).await.unwrap();
        shop.delete_item(ALICE, 9_999).await.unwrap();

        let left = shop.list_items(ALICE).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_ne!(left[0].id, milk.id);
        assert_eq!(shop.total_price(ALICE).await.unwrap(), dec!(1.50));
    }

    #[tokio::test]
    async fn owners_never_see_each_others_items() {
        let shop = list();
        shop.add_item(ALICE, "Milk", 1, dec!(1.00)).await.unwrap();
        shop.add_item(BOB, "Beer", 6, dec!(0.99)).await.unwrap();

        let bobs = shop.list_items(BOB).await.unwrap();
        assert_eq!(bobs.len(), 1);
        assert!(bobs.iter().all(|i| i.owner_id == BOB.get()));
        assert_eq!(shop.total_price(BOB).await.unwrap(), dec!(5.94));
    }

    #[tokio::test]
    async fn duplicate_names_stay_distinct_rows() {
        let shop = list();
        let a = shop.add_item(ALICE, "Eggs", 6, dec!(0.30)).await.unwrap();
        let b = shop.add_item(ALICE, "Eggs", 6, dec!(0.30)).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(shop.list_items(ALICE).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn total_matches_sum_of_line_totals() {
        let shop = list();
        let cases = [(3, dec!(0.10)), (7, dec!(19.99)), (0, dec!(5.00)), (12, dec!(0.01))];
        for (qty, price) in cases {
            shop.add_item(ALICE, "x", qty, price).await.unwrap();
        }

        let overview = shop.overview(ALICE).await.unwrap();
        let expected: Decimal = cases
            .iter()
            .map(|(q, p)| Decimal::from(*q) * *p)
            .sum();
        assert_eq!(overview.total, expected);
        assert_eq!(overview.total, dec!(140.35));
        assert_eq!(overview.items.len(), cases.len());
    }

    #[tokio::test]
    async fn tenths_do_not_drift() {
        let shop = list();
        for _ in 0..10 {
            shop.add_item(ALICE, "Gum", 1, dec!(0.10)).await.unwrap();
        }
        assert_eq!(shop.total_price(ALICE).await.unwrap(), dec!(1.00));
    }

    #[tokio::test]
    async fn invalid_input_is_rejected_before_storage() {
        let shop = list();
        let bad = [
            ("Milk", -1, dec!(1.00)),
            ("Milk", 1, dec!(-0.01)),
            ("Milk", 1, dec!(1.005)),
            ("Milk", 1, dec!(100000000.00)),
            ("   ", 1, dec!(1.00)),
        ];
        for (name, qty, price) in bad {
            let err = shop.add_item(ALICE, name, qty, price).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidInput(_)), "{name:?} {qty} {price}");
        }
        assert!(shop.list_items(ALICE).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn prices_are_stored_with_two_decimals() {
        let shop = list();
        let item = shop.add_item(ALICE, " Apples ", 4, dec!(2)).await.unwrap();
        assert_eq!(item.name, "Apples");
        assert_eq!(item.unit_price.to_string(), "2.00");
        assert_eq!(item.line_total(), dec!(8.00));

        let trailing = shop.add_item(ALICE, "Pears", 1, dec!(1.2500)).await.unwrap();
        assert_eq!(trailing.unit_price.to_string(), "1.25");

        let free = shop.add_item(ALICE, "Sample", 3, dec!(0)).await.unwrap();
        assert_eq!(free.line_total(), Decimal::ZERO);
    }
}
