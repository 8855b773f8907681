//! pkgagent
//!
//! Reports the host's installed Debian and RPM packages, either once or on
//! schedules read from a configs directory.

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use pkgagent_core::{
    CollectionConfig, CollectionScheduler, DefaultListerFactory, ListerFactory, collect_once,
    load_configs,
};
use pkgagent_exec::{CommandExecutor, LocalExecutor};
use pkgagent_report::Reporter;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod reporting;

use cli::Args;
use reporting::ReportingSink;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    init_tracing(args.debug, args.log_json);

    let sink = ReportingSink::new(&args.sink())?;
    let executor: Arc<dyn CommandExecutor> = Arc::new(LocalExecutor::new());
    let listers = Arc::new(DefaultListerFactory::new(executor));

    let result = match &args.configs {
        Some(dir) => run_scheduled(dir, sink.reporter(), listers).await,
        None => run_once(&args, sink.reporter(), listers.as_ref()).await,
    };

    sink.shutdown().await;
    result
}

/// Logs go to stderr; stdout is reserved for reports
fn init_tracing(debug: bool, json: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run_once(
    args: &Args,
    reporter: Arc<dyn Reporter>,
    factory: &dyn ListerFactory,
) -> Result<()> {
    let config = CollectionConfig {
        include_debian: args.include_debian,
        include_rpm: args.include_rpm,
        ..CollectionConfig::default()
    };
    collect_once(&config, factory, reporter.as_ref()).await?;
    Ok(())
}

async fn run_scheduled(
    dir: &Path,
    reporter: Arc<dyn Reporter>,
    factory: Arc<DefaultListerFactory>,
) -> Result<()> {
    let configs = load_configs(dir)?;
    if configs.is_empty() {
        warn!(dir = %dir.display(), "no collection configs found");
    }

    let cancel = CancellationToken::new();
    let handles = CollectionScheduler::new(reporter, factory).spawn_all(configs, &cancel);
    info!(count = handles.len(), "package collection started");

    let signal = shutdown_signal().await;

    cancel.cancel();
    for handle in handles {
        if let Err(e) = handle.await {
            error!(error = %e, "collection task failed");
        }
    }

    info!("shutdown complete");
    signal
}

async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        let mut terminate =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                res?;
                info!("received Ctrl+C signal");
            }
            _ = terminate.recv() => {
                info!("received terminate signal");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        info!("received Ctrl+C signal");
    }

    Ok(())
}
