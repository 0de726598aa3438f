use crate::subscription_service::SubscriptionError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for SubscriptionError {
    fn into_response(self) -> Response {
        match self {
            Self::InvalidFormat(_) | Self::UnreachableDomain(_) => {
                tracing::warn!(error.cause_chain = ?self, "Rejected subscription request");
                (StatusCode::BAD_REQUEST, self.to_string()).into_response()
            }
            Self::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()).into_response(),
            Self::StorageFailure(_) => {
                tracing::error!(error.cause_chain = ?self, "Subscription store failure");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
