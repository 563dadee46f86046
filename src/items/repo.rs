use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::items::repo_types::{Item, NewItem, OwnerId};

/// Item persistence. Every method is scoped by the owner in its filter predicate.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn insert(&self, item: NewItem) -> anyhow::Result<Item>;
    /// All items of `owner`, newest (highest id) first.
    async fn list_by_owner(&self, owner: OwnerId) -> anyhow::Result<Vec<Item>>;
    /// Deletes `id` only if it belongs to `owner`; returns the number of rows removed.
    async fn delete_by_id_and_owner(&self, id: i64, owner: OwnerId) -> anyhow::Result<u64>;
}

#[derive(Clone)]
pub struct PgItemStore {
    db: PgPool,
}

impl PgItemStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ItemStore for PgItemStore {
    async fn insert(&self, item: NewItem) -> anyhow::Result<Item> {
        let mut tx = self.db.begin().await.context("begin tx")?;
        let row = sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (owner_id, name, quantity, unit_price)
            VALUES ($1, $2, $3, $4)
            RETURNING id, owner_id, name, quantity, unit_price, created_at
            "#,
        )
        .bind(item.owner.get())
        .bind(&item.name)
        .bind(item.quantity)
        .bind(item.unit_price)
        .fetch_one(&mut *tx)
        .await
        .context("insert item")?;
        tx.commit().await.context("commit tx")?;
        Ok(row)
    }

    async fn list_by_owner(&self, owner: OwnerId) -> anyhow::Result<Vec<Item>> {
        let mut tx = self.db.begin().await.context("begin tx")?;
        sqlx::query("SET TRANSACTION READ ONLY")
            .execute(&mut *tx)
            .await
            .context("set read only")?;
        let rows = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, owner_id, name, quantity, unit_price, created_at
              FROM items
             WHERE owner_id = $1
             ORDER BY id DESC
            "#,
        )
        .bind(owner.get())
        .fetch_all(&mut *tx)
        .await
        .context("list items by owner")?;
        tx.commit().await.context("commit tx")?;
        Ok(rows)
    }

    async fn delete_by_id_and_owner(&self, id: i64, owner: OwnerId) -> anyhow::Result<u64> {
        let mut tx = self.db.begin().await.context("begin tx")?;
        let result = sqlx::query(
            r#"
            DELETE FROM items
             WHERE id = $1
               AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner.get())
        .execute(&mut *tx)
        .await
        .context("delete item")?;
        tx.commit().await.context("commit tx")?;
        Ok(result.rows_affected())
    }
}
