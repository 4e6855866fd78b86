//! HTTP Server configuration and startup.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, patch, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use checkout_types::CheckoutRepository;

use super::auth::auth_middleware;
use super::handlers::{self, AppState};
use super::rate_limit::{RateLimiterState, rate_limit_middleware, spawn_eviction};
use crate::CheckoutService;
use crate::openapi::ApiDoc;

/// HTTP Server for the Checkout API.
pub struct HttpServer<R: CheckoutRepository> {
    state: Arc<AppState<R>>,
    rate_limiter: Arc<RateLimiterState>,
    cors: CorsLayer,
}

impl<R: CheckoutRepository> HttpServer<R> {
    /// Creates a new HTTP server with the given service.
    pub fn new(service: CheckoutService<R>) -> Self {
        Self {
            state: Arc::new(AppState { service }),
            rate_limiter: Arc::new(RateLimiterState::default()),
            cors: CorsLayer::permissive(),
        }
    }

    /// Creates a new HTTP server with custom rate limiting.
    pub fn with_rate_limit(service: CheckoutService<R>, requests_per_minute: u32) -> Self {
        Self {
            rate_limiter: Arc::new(RateLimiterState::per_minute(requests_per_minute)),
            ..Self::new(service)
        }
    }

    /// Replaces the rate limiter, e.g. one that trusts a proxy's
    /// `X-Forwarded-For`.
    pub fn with_rate_limiter(self, limiter: RateLimiterState) -> Self {
        Self {
            rate_limiter: Arc::new(limiter),
            ..self
        }
    }

    /// Restricts browser access to a single origin.
    pub fn with_cors_origin(mut self, origin: &str) -> anyhow::Result<Self> {
        let origin: HeaderValue = origin
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin {:?}: {}", origin, e))?;
        self.cors = CorsLayer::permissive().allow_origin(origin);
        Ok(self)
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        // Build HTTP metrics layer (uses globally set MeterProvider)
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        let api = Router::new()
            .route("/health", get(handlers::health))
            .route("/api/bootstrap", post(handlers::bootstrap::<R>))
            .route(
                "/api/payment-methods",
                get(handlers::list_payment_methods::<R>).post(handlers::create_payment_method::<R>),
            )
            .route(
                "/api/gateways",
                get(handlers::list_gateways::<R>).post(handlers::create_gateway::<R>),
            )
            .route(
                "/api/gateways/{id}",
                get(handlers::get_gateway::<R>)
                    .put(handlers::update_gateway::<R>)
                    .delete(handlers::delete_gateway::<R>),
            )
            .route(
                "/api/checkout/{option}/gateways",
                get(handlers::gateway_choices::<R>),
            )
            .route(
                "/api/gateways/{id}/status",
                patch(handlers::set_gateway_status::<R>),
            )
            .route(
                "/api/transactions",
                get(handlers::list_transactions::<R>).post(handlers::create_transaction::<R>),
            )
            .route("/api/admin/customers", get(handlers::list_customers::<R>))
            .route("/api/admin/invoices", get(handlers::list_invoices::<R>))
            .route(
                "/api/admin/payment-links",
                get(handlers::list_payment_links::<R>),
            )
            .route("/api/admin/sms-data", get(handlers::list_sms_data::<R>))
            .with_state(self.state.clone());

        api.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
            .layer(metrics)
            .layer(middleware::from_fn_with_state(
                self.rate_limiter.clone(),
                rate_limit_middleware,
            ))
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                auth_middleware::<R>,
            ))
            .layer(self.cors.clone())
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        let eviction = spawn_eviction(self.rate_limiter.clone());

        axum::serve(
            listener,
            self.router()
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        eviction.abort();
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
