//! OpenTelemetry export for the supervisor's tracing spans

use anyhow::Result;
use tracing_subscriber::{Layer, Registry};

/// Boxed layer stacked directly on the registry
pub type TelemetryLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Build the OpenTelemetry layer if enabled
///
/// Returns `Ok(None)` when no endpoint is configured. Runs before the
/// subscriber exists, so problems are returned instead of logged.
///
/// # Environment Variables
///
/// - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP/HTTP endpoint (e.g., http://localhost:4318)
/// - `OTEL_SERVICE_NAME`: Service name (default: overseer)
///
/// # Example
///
/// ```text
/// OTEL_EXPORTER_OTLP_ENDPOINT=http://localhost:4318 \
/// OTEL_SERVICE_NAME=overseer-dev \
///     ./overseer -m vision.camera
/// ```
pub fn layer() -> Result<Option<TelemetryLayer>> {
    let Ok(endpoint) = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT") else {
        return Ok(None);
    };

    #[cfg(feature = "telemetry")]
    return layer_impl(&endpoint).map(Some);

    #[cfg(not(feature = "telemetry"))]
    anyhow::bail!(
        "OpenTelemetry endpoint {} set but feature 'telemetry' not enabled (rebuild with: cargo build --features telemetry)",
        endpoint
    );
}

#[cfg(feature = "telemetry")]
fn layer_impl(endpoint: &str) -> Result<TelemetryLayer> {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_otlp::WithExportConfig;

    let service_name =
        std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "overseer".to_string());

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .build()?;

    let provider = opentelemetry_sdk::trace::TracerProvider::builder()
        .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
        .build();
    let tracer = provider.tracer(service_name);
    opentelemetry::global::set_tracer_provider(provider);

    Ok(tracing_opentelemetry::layer().with_tracer(tracer).boxed())
}
