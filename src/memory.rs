//! In-memory stores and hasher used by unit tests in place of Postgres and argon2.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::{
    auth::{
        password::CredentialHasher,
        repo::UserStore,
        repo_types::{NewUser, User},
    },
    items::{
        repo::ItemStore,
        repo_types::{Item, NewItem, OwnerId},
    },
};

#[derive(Default)]
pub struct MemoryUserStore {
    rows: Mutex<Vec<User>>,
    skip_exists_check: AtomicBool,
}

impl MemoryUserStore {
    /// Makes `exists_by_username` always answer `false`, so only the insert can catch duplicates.
    pub fn disable_exists_check(&self) {
        self.skip_exists_check.store(true, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().find(|u| u.username == username).cloned())
    }

    async fn exists_by_username(&self, username: &str) -> anyhow::Result<bool> {
        if self.skip_exists_check.load(Ordering::SeqCst) {
            return Ok(false);
        }
        let rows = self.rows.lock().await;
        Ok(rows.iter().any(|u| u.username == username))
    }

    async fn insert(&self, user: NewUser) -> anyhow::Result<Option<User>> {
        let mut rows = self.rows.lock().await;
        if rows.iter().any(|u| u.username == user.username) {
            return Ok(None);
        }
        let created = User {
            id: rows.len() as i64 + 1,
            username: user.username,
            password_hash: user.password_hash,
            role: user.role,
            created_at: OffsetDateTime::now_utc(),
        };
        rows.push(created.clone());
        Ok(Some(created))
    }
}

/// User store whose every call fails, standing in for an unreachable database.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingUserStore;

#[async_trait]
impl UserStore for FailingUserStore {
    async fn find_by_username(&self, _username: &str) -> anyhow::Result<Option<User>> {
        anyhow::bail!("db connection refused")
    }

    async fn exists_by_username(&self, _username: &str) -> anyhow::Result<bool> {
        anyhow::bail!("db connection refused")
    }

    async fn insert(&self, _user: NewUser) -> anyhow::Result<Option<User>> {
        anyhow::bail!("db connection refused")
    }
}

#[derive(Default)]
pub struct MemoryItemStore {
    rows: Mutex<(i64, Vec<Item>)>,
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn insert(&self, item: NewItem) -> anyhow::Result<Item> {
        let mut guard = self.rows.lock().await;
        let (seq, rows) = &mut *guard;
        *seq += 1;
        let created = Item {
            id: *seq,
            owner_id: item.owner.get(),
            name: item.name,
            quantity: item.quantity,
            unit_price: item.unit_price,
            created_at: OffsetDateTime::now_utc(),
        };
        rows.push(created.clone());
        Ok(created)
    }

    async fn list_by_owner(&self, owner: OwnerId) -> anyhow::Result<Vec<Item>> {
        let guard = self.rows.lock().await;
        let mut owned: Vec<Item> = guard
            .1
            .iter()
            .filter(|i| i.owner_id == owner.get())
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(owned)
    }

    async fn delete_by_id_and_owner(&self, id: i64, owner: OwnerId) -> anyhow::Result<u64> {
        let mut guard = self.rows.lock().await;
        let before = guard.1.len();
        guard.1.retain(|i| !(i.id == id && i.owner_id == owner.get()));
        Ok((before - guard.1.len()) as u64)
    }
}

/// Reversible stand-in for argon2 so tests stay fast.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeHasher;

impl CredentialHasher for FakeHasher {
    fn hash(&self, plain: &str) -> anyhow::Result<String> {
        Ok(format!("fake${plain}"))
    }

    fn verify(&self, plain: &str, hash: &str) -> anyhow::Result<bool> {
        Ok(hash.strip_prefix("fake$") == Some(plain))
    }
}
