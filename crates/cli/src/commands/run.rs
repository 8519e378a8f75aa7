//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    info!(
        rig = %config.rig.name,
        cameras = config.cameras.len(),
        trigger_rate_hz = config.trigger.rate_hz,
        publisher = ?config.publisher.kind,
        "Configuration loaded"
    );

    let pipeline_config = PipelineConfig {
        config,
        duration: (args.duration_secs > 0).then(|| Duration::from_secs(args.duration_secs)),
        max_pairs: (args.max_pairs > 0).then_some(args.max_pairs),
        metrics_port: (args.metrics_port > 0).then_some(args.metrics_port),
        pair_tolerance: args.pair_tolerance_ms.abs() / 1000.0,
        runtime_initialized: !args.runtime_uninitialized,
    };

    info!("Starting pipeline...");

    let stats = Pipeline::new(pipeline_config)
        .run(shutdown_signal())
        .await
        .context("Pipeline execution failed")?;

    info!(
        pairs = stats.pairs,
        images = stats.images,
        unmatched = stats.unmatched,
        duration_secs = stats.duration.as_secs_f64(),
        pair_rate = format!("{:.2}", stats.pair_rate()),
        "Pipeline completed"
    );
    stats.print_summary();

    info!("Rig Sync finished");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
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
}
