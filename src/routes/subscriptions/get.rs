use crate::{
    app_state::AppState,
    domain::{Subscription, SubscriptionId},
    subscription_service::SubscriptionError,
};
use axum::{
    extract::{Path, State},
    Json,
};

#[tracing::instrument(skip(app_state))]
pub(super) async fn list_subscriptions(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Subscription>>, SubscriptionError> {
    app_state.subscriptions.list().await.map(Json)
}

#[tracing::instrument(skip(app_state))]
pub(super) async fn get_subscription(
    State(app_state): State<AppState>,
    Path(id): Path<SubscriptionId>,
) -> Result<Json<Subscription>, SubscriptionError> {
    app_state.subscriptions.get(id).await.map(Json)
}
