//! Overseer - Main Entry Point
//! Starts a System of process and remote modules, runs until Ctrl+C

mod bootstrap;
mod settings;
mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use overseer_core::System;
use overseer_infra_http::{HttpClientConfig, ReqwestHttpClient};
use overseer_infra_system::SubprocessLauncher;

use crate::bootstrap::{build_system, Adapters, Bootstrapped};
use crate::settings::Cli;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_LOG_FILTER: &str = "overseer=info";

fn init_logging() {
    let log_format = std::env::var("OVERSEER_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let (otel_layer, otel_error) = match telemetry::layer() {
        Ok(layer) => (layer, None),
        Err(e) => (None, Some(e)),
    };

    let fmt_layer = match log_format.as_str() {
        // Production: JSON structured logging
        "json" => fmt::layer().json().boxed(),
        // Development: Pretty formatting with colors
        _ => fmt::layer().pretty().boxed(),
    };

    tracing_subscriber::registry()
        .with(otel_layer)
        .with(env_filter)
        .with(fmt_layer)
        .init();

    if let Some(e) = otel_error {
        warn!(error = ?e, "Failed to initialize OpenTelemetry (continuing without it)");
    }
}

/// Launch process modules and probe remote ones after `System::start`
async fn run_startup(bootstrapped: &mut Bootstrapped) -> Result<()> {
    let Bootstrapped { system, startup } = bootstrapped;

    for (module, invocation) in system.modules_mut().iter_mut().zip(startup.iter()) {
        if let Some(latency) = module
            .health_check()
            .await
            .with_context(|| format!("Module '{}' is unreachable", module.name()))?
        {
            info!(module = %module.name(), latency_ms = latency.as_millis_f64(), "Health check passed");
        }

        if let Some(invocation) = invocation {
            let accepted = module
                .run(invocation.clone())
                .await
                .with_context(|| format!("Module '{}' failed to run", module.name()))?;
            info!(module = %module.name(), accepted = accepted, "Startup invocation issued");
        }
    }

    Ok(())
}

async fn shutdown(system: &mut System) -> Result<()> {
    info!("Stopping system...");
    system
        .stop()
        .await
        .context("System stop failed")?;
    info!("Shutdown complete.");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Initialize logging
    init_logging();
    info!("Overseer v{} starting...", VERSION);

    // 2. Load configuration
    let config = settings::load(&cli)?;
    info!(
        system = %config.name,
        modules = config.modules.len(),
        chaos = config.chaos,
        "Configuration loaded"
    );

    // 3. Setup adapters (DI wiring)
    let adapters = Adapters {
        process_launcher: Arc::new(SubprocessLauncher::new(config.env_allowlist.clone())),
        http: Arc::new(
            ReqwestHttpClient::new(HttpClientConfig {
                request_timeout: config.http_timeout_ms.map(Duration::from_millis),
                ..Default::default()
            })
            .context("HTTP client creation failed")?,
        ),
    };

    // 4. Build and start the system
    let mut bootstrapped = build_system(&config, &adapters).context("Invalid module configuration")?;
    bootstrapped
        .system
        .start()
        .await
        .context("System start failed")?;

    // 5. Health checks and startup launches
    if let Err(e) = run_startup(&mut bootstrapped).await {
        error!(error = ?e, "Startup failed");
        shutdown(&mut bootstrapped.system).await?;
        return Err(e);
    }

    info!("✅ System ready.");
    info!("Press Ctrl+C to shutdown");

    // 6. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Exiting gracefully...");

    // 7. Graceful shutdown (detached launches are not cancelled)
    shutdown(&mut bootstrapped.system).await
}
