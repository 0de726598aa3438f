use crate::{app_state::AppState, domain::SubscriptionId, subscription_service::SubscriptionError};
use axum::extract::{Path, State};

#[tracing::instrument(skip(app_state))]
pub(super) async fn remove_subscription(
    State(app_state): State<AppState>,
    Path(id): Path<SubscriptionId>,
) -> Result<(), SubscriptionError> {
    app_state.subscriptions.remove(id).await
}
