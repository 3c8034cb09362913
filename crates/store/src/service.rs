use std::sync::Arc;
use tracing::info;

use crate::{StoreError, SubscriptionStore};
use waitlist_core::export::{render_csv, render_email_list};
use waitlist_core::types::{Subscription, SubscriptionSummary};
use waitlist_core::validation::{FieldError, SubscriberEmail};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("invalid subscription request")]
    InvalidInput(Vec<FieldError>),
    #[error("{0} is already subscribed")]
    Duplicate(String),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(email) => ServiceError::Duplicate(email),
            other => ServiceError::Store(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Subscribe, count, list and export on top of an injected store.
#[derive(Clone)]
pub struct SubscriptionService {
    store: Arc<dyn SubscriptionStore>,
}

impl SubscriptionService {
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self { store }
    }

    /// `email` is `None` when the request omitted the field.
    pub async fn subscribe(&self, email: Option<&str>) -> ServiceResult<SubscriptionSummary> {
        let email =
            SubscriberEmail::parse(email).map_err(|err| ServiceError::InvalidInput(err.errors))?;
        let created = self.store.insert_if_absent(email.as_ref()).await?;
        info!(subscription_id = created.id, "subscription created");
        Ok(SubscriptionSummary::from(&created))
    }

    pub async fn count(&self) -> ServiceResult<usize> {
        Ok(self.store.count().await?)
    }

    pub async fn list_all(&self) -> ServiceResult<Vec<Subscription>> {
        Ok(self.store.list_all().await?)
    }

    pub async fn export_csv(&self) -> ServiceResult<String> {
        Ok(render_csv(&self.store.list_all().await?))
    }

    pub async fn email_list(&self) -> ServiceResult<String> {
        Ok(render_email_list(&self.store.list_all().await?))
    }
}
