//! # Checkout Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the repository adapter
//! - Create the checkout service
//! - Start the HTTP server

mod config;

use opentelemetry::global;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use checkout_hex::{
    CheckoutService,
    inbound::{HttpServer, RateLimiterState},
};
use checkout_repo::build_repo;

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
    Ok((provider.tracer("checkout-service"), provider))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = config::Config::from_env()?;

    // OpenTelemetry export only when a collector is configured
    let otel = config.otlp_endpoint.as_deref().map(init_tracer).transpose()?;
    let (telemetry, otel_provider) = match otel {
        Some((tracer, provider)) => (
            Some(tracing_opentelemetry::layer().with_tracer(tracer)),
            Some(provider),
        ),
        None => (None, None),
    };

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,checkout_app=debug,checkout_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    tracing::info!("Starting checkout server on port {}", config.port);
    tracing::info!(
        rate_limit_per_minute = config.rate_limit_per_minute,
        otlp = otel_provider.is_some(),
        "Configuration loaded"
    );

    // Build repository (handles connection and migration)
    let repo = build_repo(&config.database_url).await?;

    // Create the checkout service
    let service = CheckoutService::new(repo);

    // Create and run the HTTP server
    let limiter = RateLimiterState::per_minute(config.rate_limit_per_minute)
        .trusting_forwarded_for(config.trust_proxy_headers);
    if config.trust_proxy_headers {
        tracing::info!("Rate limiting clients by X-Forwarded-For");
    }
    let mut server = HttpServer::new(service).with_rate_limiter(limiter);
    if let Some(origin) = &config.cors_allowed_origin {
        server = server.with_cors_origin(origin)?;
        tracing::info!(origin = %origin, "CORS restricted to a single origin");
    }
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    // Ensure traces are flushed before exit
    if let Some(provider) = otel_provider {
        let _ = provider.shutdown();
    }
    Ok(())
}
