use anyhow::{Context, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use std::path::Path;
use tracing::info;

pub async fn kube_client(kube_config: Option<&Path>, context: Option<&str>) -> Result<kube::Client> {
    info!("Loading Kubernetes configuration...");
    let options = KubeConfigOptions {
        context: context.map(ToOwned::to_owned),
        ..Default::default()
    };

    let config = match kube_config {
        Some(path) => {
            info!("Using provided kube config file: {}", path.display());
            let kubeconfig = Kubeconfig::read_from(path)
                .with_context(|| format!("Failed reading kube config {}", path.display()))?;
            kube::Config::from_custom_kubeconfig(kubeconfig, &options).await?
        }
        None if context.is_some() => kube::Config::from_kubeconfig(&options).await?,
        None => kube::Config::infer()
            .await
            .context("Failed inferring Kubernetes configuration")?,
    };

    info!("Connecting to {}", config.cluster_url);
    Ok(kube::Client::try_from(config)?)
}
