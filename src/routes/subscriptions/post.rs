use crate::{app_state::AppState, domain::Subscription, subscription_service::SubscriptionError};
use axum::{extract::State, Json};
use serde::Deserialize;

#[tracing::instrument(skip(app_state, body))]
pub(super) async fn subscribe(
    State(app_state): State<AppState>,
    Json(body): Json<BodyData>,
) -> Result<Json<Subscription>, SubscriptionError> {
    app_state
        .subscriptions
        .subscribe(body.name, body.email)
        .await
        .map(Json)
}

#[derive(Deserialize)]
pub(super) struct BodyData {
    name: Option<String>,
    email: String,
}
