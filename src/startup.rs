use crate::{
    app_state::AppState,
    configuration::Settings,
    routes::{health_check, subscriptions},
    store::Store,
    subscription_service::SubscriptionService,
    telemetry::{request_span, RequestUuid, REQUEST_ID_HEADER},
};
use anyhow::Context;
use axum::{
    http::{HeaderName, Method},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

pub struct Application {
    listener: TcpListener,
    local_addr: SocketAddr,
    store: Arc<Store>,
    router: Router,
}

impl Application {
    /// Opens the store and binds the listener. A store that cannot be opened is fatal.
    pub async fn build(config: Settings) -> Result<Self, anyhow::Error> {
        let store = Arc::new(Store::open(&config.store.path)?);

        let address = format!("{}:{}", config.application.host, config.application.port);
        let listener = TcpListener::bind(address.as_str())
            .await
            .with_context(|| format!("Failed to bind {address}"))?;
        let local_addr = listener.local_addr()?;

        let app_state = AppState {
            subscriptions: SubscriptionService::new(
                Arc::clone(&store),
                config.email_validation.validator(),
            ),
        };

        Ok(Self {
            listener,
            local_addr,
            store,
            router: router(app_state),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serves until Ctrl-C, then closes the store once every handler is gone.
    pub async fn run_until_stopped(self) -> Result<(), anyhow::Error> {
        tracing::info!("Listening on {}", self.local_addr);

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server failed")?;

        match Arc::try_unwrap(self.store) {
            Ok(store) => store.close(),
            Err(_) => tracing::warn!("Subscription store is still in use and was not closed"),
        }

        Ok(())
    }
}

fn router(app_state: AppState) -> Router {
    let x_request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(health_check::router())
        .merge(subscriptions::router())
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), RequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(request_span))
                .layer(PropagateRequestIdLayer::new(x_request_id))
                .layer(cors()),
        )
        .with_state(app_state)
}

fn cors() -> CorsLayer {
    CorsLayer::new().allow_methods([
        Method::OPTIONS,
        Method::GET,
        Method::POST,
        Method::PATCH,
        Method::DELETE,
    ])
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error.cause_chain = ?e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
