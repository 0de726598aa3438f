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
pub(super) async fn confirm_subscription(
    State(app_state): State<AppState>,
    Path(id): Path<SubscriptionId>,
) -> Result<Json<Subscription>, SubscriptionError> {
    app_state.subscriptions.confirm(id).await.map(Json)
}
