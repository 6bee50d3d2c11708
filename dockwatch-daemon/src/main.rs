use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use dockwatch_core::DockwatchConfig;
use dockwatch_daemon::cli::DaemonCli;
use dockwatch_daemon::logging::init_tracing;
use dockwatch_daemon::metrics_server::install_metrics_recorder;
use dockwatch_daemon::observer::LoggingObserver;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DaemonCli::parse();

    let mut config = DockwatchConfig::load_or_default(&cli.config)
        .await
        .map_err(|e| anyhow::anyhow!("failed to load config {}: {}", cli.config.display(), e))?;
    cli.apply_overrides(&mut config.general);
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;

    if cli.validate {
        println!("configuration OK: {}", cli.config.display());
        return Ok(());
    }

    init_tracing(&config.general)?;

    let runtime = dockwatch_daemon::connect(&config).await?;

    if let Some(container) = &cli.resolve {
        let address = runtime
            .container_ip(container)
            .await
            .map_err(|e| anyhow::anyhow!("failed to resolve {}: {}", container, e))?;
        println!("{address}");
        return Ok(());
    }

    if config.metrics.enabled {
        install_metrics_recorder(&config.metrics)?;
    } else {
        tracing::info!("metrics endpoint disabled");
    }

    tracing::info!(info = %runtime.info().await, "dockwatch-daemon starting");

    let cancel = CancellationToken::new();
    let observer = Arc::new(LoggingObserver::new());
    let subscription = runtime.add_observer(observer.clone(), cancel.clone());

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");

    cancel.cancel();
    if let Err(e) = subscription.await {
        tracing::error!(error = %e, "event subscription task failed");
    }

    let (started, died) = observer.counts();
    tracing::info!(started, died, "dockwatch-daemon shut down");
    Ok(())
}
