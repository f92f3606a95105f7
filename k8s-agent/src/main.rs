mod config;
mod k8s;
mod output;
mod scan;

use crate::config::Config;
use anyhow::Result;
use clap::Parser;
use tokio::{
    select,
    signal::unix::{signal, SignalKind},
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    k8s_snyk_otel::init(
        &["k8s_snyk_agent", "k8s_snyk_mapping"],
        config.log_level(),
        config.all_log_level(),
    )?;
    info!("Starting K8S Snyk image scan");
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    select! {
        _ = sigterm.recv() => {
            warn!("SIGTERM received, exiting");
            Ok(())
        }

        _ = sigint.recv() => {
            warn!("SIGINT received, exiting");
            Ok(())
        }

        result = scan::run(&config) => {
            result
        }
    }
}
