//! # SmartPrice Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Build the HTTP provider adapters
//! - Create the location and rate services
//! - Start the HTTP server

mod config;

use opentelemetry::global;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use smartprice_hex::{ExchangeRateProvider, LocationResolver, inbound::HttpServer};
use smartprice_providers::build_providers;

fn init_tracer(endpoint: &str) -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("smartprice-service"), provider))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = config::Config::from_env()?;

    // Initialize OpenTelemetry tracing when a collector is configured
    let otel = config
        .otlp_endpoint
        .as_deref()
        .map(init_tracer)
        .transpose()?;
    let telemetry = otel
        .as_ref()
        .map(|(tracer, _)| tracing_opentelemetry::layer().with_tracer(tracer.clone()));

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,smartprice_app=debug,smartprice_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    tracing::info!("Starting SmartPrice server on port {}", config.port);
    tracing::info!(
        base_currency = %config.base_currency,
        rate_limit = config.rate_limit_per_minute,
        trust_proxy_headers = config.trust_proxy_headers,
        "Configuration loaded"
    );

    // Build provider adapters
    let providers = build_providers(&config.providers)?;

    // Create the services
    let resolver = LocationResolver::new(providers.ip, providers.geocoder)
        .with_timeout(config.providers.timeout);
    let rates = ExchangeRateProvider::new(providers.rates).with_timeout(config.providers.timeout);

    // Create and run the HTTP server
    let server = HttpServer::new(resolver, rates, config.base_currency.as_str())
        .with_rate_limit(config.rate_limit_per_minute)
        .behind_trusted_proxy(config.trust_proxy_headers);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    // Ensure traces are flushed before exit
    if let Some((_, provider)) = otel {
        let _ = provider.shutdown();
    }
    Ok(())
}
