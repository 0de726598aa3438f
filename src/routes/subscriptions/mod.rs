use crate::app_state::AppState;
use axum::{routing::get, Router};
use delete::remove_subscription;
use get::{get_subscription, list_subscriptions};
use patch::confirm_subscription;
use post::subscribe;

mod delete;
mod error;
mod get;
mod patch;
mod post;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/email", get(list_subscriptions).post(subscribe))
        .route(
            "/email/:id",
            get(get_subscription)
                .patch(confirm_subscription)
                .delete(remove_subscription),
        )
}
