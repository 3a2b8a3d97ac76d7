//! HTTP Server configuration and startup.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::{Method, header},
    middleware,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use smartprice_types::{IpGeolocationProvider, RateSource, ReverseGeocoder};

use super::handlers::{self, AppState};
use super::rate_limit::{RateLimiterState, rate_limit_middleware, spawn_pruner};
use crate::openapi::ApiDoc;
use crate::service::{ExchangeRateProvider, LocationResolver};

/// HTTP Server for the SmartPrice API.
pub struct HttpServer<I, G, S>
where
    I: IpGeolocationProvider,
    G: ReverseGeocoder,
    S: RateSource,
{
    state: Arc<AppState<I, G, S>>,
    requests_per_minute: u32,
    trust_forwarded: bool,
    rate_limiter: Arc<RateLimiterState>,
}

impl<I, G, S> HttpServer<I, G, S>
where
    I: IpGeolocationProvider,
    G: ReverseGeocoder,
    S: RateSource,
{
    /// Creates a new HTTP server with the default rate limit (100 req/min per client).
    pub fn new(
        resolver: LocationResolver<I, G>,
        rates: ExchangeRateProvider<S>,
        base_currency: impl Into<String>,
    ) -> Self {
        Self {
            state: Arc::new(AppState {
                resolver,
                rates,
                base_currency: base_currency.into().trim().to_uppercase(),
            }),
            requests_per_minute: 100,
            trust_forwarded: false,
            rate_limiter: Arc::new(RateLimiterState::default()),
        }
    }

    /// Replaces the per-client rate limit.
    pub fn with_rate_limit(mut self, requests_per_minute: u32) -> Self {
        self.requests_per_minute = requests_per_minute;
        self.rebuild_rate_limiter()
    }

    /// Rate-limits by the forwarded client address. Only safe behind a
    /// proxy that overwrites `X-Forwarded-For`.
    pub fn behind_trusted_proxy(mut self, trusted: bool) -> Self {
        self.trust_forwarded = trusted;
        self.rebuild_rate_limiter()
    }

    fn rebuild_rate_limiter(mut self) -> Self {
        self.rate_limiter = Arc::new(
            RateLimiterState::new(self.requests_per_minute, Duration::from_secs(60))
                .trust_forwarded_headers(self.trust_forwarded),
        );
        self
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        // Build HTTP metrics layer (uses globally set MeterProvider)
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE]);

        Router::new()
            .route("/health", get(handlers::health))
            .route("/api/location", get(handlers::detect_location::<I, G, S>))
            .route(
                "/api/location/reverse",
                post(handlers::reverse_geocode::<I, G, S>),
            )
            .route("/api/exchange-rate", get(handlers::exchange_rate::<I, G, S>))
            .route("/api/convert", get(handlers::convert::<I, G, S>))
            .route("/api/currencies", get(handlers::list_currencies))
            .with_state(self.state.clone())
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
            .layer(metrics)
            .layer(middleware::from_fn_with_state(
                self.rate_limiter.clone(),
                rate_limit_middleware,
            ))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        let pruner = spawn_pruner(&self.rate_limiter);
        let app = self.router();
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;
        pruner.abort();

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
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
