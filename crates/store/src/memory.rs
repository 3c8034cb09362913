use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{Records, StoreResult, SubscriptionStore};
use waitlist_core::types::Subscription;

/// Volatile store. Starts empty and lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Records>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    async fn insert(&self, email: &str) -> StoreResult<Subscription> {
        Ok(self.records.write().await.push(email, Utc::now()))
    }

    async fn insert_if_absent(&self, email: &str) -> StoreResult<Subscription> {
        self.records.write().await.push_if_absent(email, Utc::now())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Subscription>> {
        Ok(self.records.read().await.find(email).cloned())
    }

    async fn list_all(&self) -> StoreResult<Vec<Subscription>> {
        Ok(self.records.read().await.list())
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.records.read().await.len())
    }
}
