use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use waitlist_core::types::Subscription;

pub mod file;
pub mod memory;
pub mod service;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use service::{ServiceError, SubscriptionService};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} is already subscribed")]
    Duplicate(String),
    #[error("store io: {0}")]
    Io(#[from] std::io::Error),
    #[error("store serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Keyed storage for subscriptions. Records are only ever added.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Stores a new record without checking for an existing email.
    async fn insert(&self, email: &str) -> StoreResult<Subscription>;

    /// Checks and inserts under one lock; fails with `StoreError::Duplicate`.
    async fn insert_if_absent(&self, email: &str) -> StoreResult<Subscription>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Subscription>>;

    /// All records in id order.
    async fn list_all(&self) -> StoreResult<Vec<Subscription>>;

    async fn count(&self) -> StoreResult<usize>;
}

/// Id-ordered records plus the next id to hand out.
#[derive(Debug)]
pub(crate) struct Records {
    by_id: BTreeMap<u64, Subscription>,
    next_id: u64,
}

impl Default for Records {
    fn default() -> Self {
        Self {
            by_id: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl Records {
    pub(crate) fn from_list(list: Vec<Subscription>) -> Self {
        let next_id = list.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        Self {
            by_id: list.into_iter().map(|s| (s.id, s)).collect(),
            next_id,
        }
    }

    pub(crate) fn push(&mut self, email: &str, now: DateTime<Utc>) -> Subscription {
        let subscription = Subscription {
            id: self.next_id,
            email: email.to_string(),
            subscribed_at: now,
        };
        self.next_id += 1;
        self.by_id.insert(subscription.id, subscription.clone());
        subscription
    }

    pub(crate) fn push_if_absent(
        &mut self,
        email: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Subscription> {
        if self.find(email).is_some() {
            return Err(StoreError::Duplicate(email.to_string()));
        }
        Ok(self.push(email, now))
    }

    pub(crate) fn remove(&mut self, id: u64) {
        self.by_id.remove(&id);
    }

    pub(crate) fn find(&self, email: &str) -> Option<&Subscription> {
        self.by_id.values().find(|s| s.email == email)
    }

    pub(crate) fn list(&self) -> Vec<Subscription> {
        self.by_id.values().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_id.len()
    }
}
