mod cli;
mod config;
mod error;
mod server;

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use unifi_exporter_core::{
    Collector, CoreError, ExporterMetrics, SessionProvider, discover_sites, select_sites,
    sites_string,
};

use crate::cli::Cli;
use crate::error::CliError;
use crate::server::AppState;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let cfg = config::load(&cli)?;
    let url = cfg.controller.url.to_string();

    info!(version = env!("CARGO_PKG_VERSION"), controller = %url, "starting unifi_exporter");

    // Authenticate and resolve sites up front: any failure here is fatal.
    let session = Arc::new(SessionProvider::new(cfg.controller));
    session
        .acquire()
        .await
        .map_err(|e| CliError::from_core(e, &url))?;

    let all = discover_sites(&session)
        .await
        .map_err(|e| CliError::from_core(e, &url))?;
    let sites = select_sites(&cfg.site_filter, all.clone()).map_err(|e| match e {
        CoreError::SiteNotFound { description } => CliError::SiteNotFound {
            description,
            available: sites_string(&all),
        },
        other => CliError::from_core(other, &url),
    })?;

    let collector = Arc::new(Collector::new(
        Arc::clone(&session),
        sites,
        cfg.scrape_timeout,
    ));
    info!(sites = %sites_string(collector.sites()), "collecting metrics from UniFi sites");
    let metrics = Arc::new(ExporterMetrics::new().map_err(|e| CliError::Internal(e.to_string()))?);
    let app = server::router(AppState::new(collector, metrics), &cfg.metrics_path);

    let listener = TcpListener::bind(&cfg.listen)
        .await
        .map_err(|source| CliError::Bind {
            addr: cfg.listen.clone(),
            source,
        })?;
    info!(
        addr = %listener.local_addr()?,
        path = %cfg.metrics_path,
        "serving metrics"
    );

    server::serve(listener, app).await?;

    session.logout().await;
    Ok(())
}
