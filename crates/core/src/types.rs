use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: u64,
    pub email: String,
    pub subscribed_at: DateTime<Utc>,
}

/// What a subscriber gets back after signing up. The timestamp stays private.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubscriptionSummary {
    pub id: u64,
    pub email: String,
}

impl From<&Subscription> for SubscriptionSummary {
    fn from(subscription: &Subscription) -> Self {
        Self {
            id: subscription.id,
            email: subscription.email.clone(),
        }
    }
}
