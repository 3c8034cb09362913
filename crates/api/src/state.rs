use std::sync::Arc;

use waitlist_core::auth::AdminGate;
use waitlist_store::SubscriptionService;

#[derive(Clone)]
pub struct AppState {
    pub service: SubscriptionService,
    pub gate: Arc<AdminGate>,
    pub waitlist_env: String,
}

#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Token of the admin session that authorized the request.
#[derive(Debug, Clone)]
pub struct AdminToken(pub String);
