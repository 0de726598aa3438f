use crate::subscription_service::SubscriptionService;

#[derive(Clone)]
pub struct AppState {
    pub subscriptions: SubscriptionService,
}
