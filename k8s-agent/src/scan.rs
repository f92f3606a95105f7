use crate::config::Config;
use crate::k8s::{collect_images, kube_client};
use crate::output::write_targets;
use anyhow::{Context, Result};
use k8s_snyk_mapping::{ConfigFormat, MappingPipeline, ScanConfig};
use std::path::Path;
use tracing::{info, warn};

pub async fn run(config: &Config) -> Result<()> {
    let scan_config = load_scan_config(config.config_path()).await?;
    let pipeline = MappingPipeline::new(&scan_config).with_context(|| {
        format!(
            "Invalid mapping configuration in {}",
            config.config_path().display()
        )
    })?;
    info!(
        "Mapping images to Snyk orgs on {}",
        pipeline.mapper().map_on()
    );

    let namespaces = match config.namespaces() {
        [] => scan_config.namespaces.as_slice(),
        namespaces => namespaces,
    };
    let client = kube_client(config.kube_config(), config.context()).await?;
    let images = collect_images(client, namespaces, pipeline.mapper().label_key()).await?;

    let outcome = pipeline.run(images.into_iter().collect());
    info!(
        "Discovered {} images, excluded {}, mapped {} targets",
        outcome.discovered,
        outcome.excluded,
        outcome.targets.len()
    );
    if outcome.unresolved > 0 {
        warn!(
            "{} images could not be mapped to a Snyk org and were skipped",
            outcome.unresolved
        );
    }

    let output = config
        .output()
        .unwrap_or_else(|| scan_config.targets_file_output_path());
    write_targets(&outcome.targets_file(), output).await
}

pub async fn load_scan_config(path: &Path) -> Result<ScanConfig> {
    info!("Loading config file {}", path.display());
    let format = ConfigFormat::from_path(path)?;
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Config file not found: {}", path.display()))?;
    ScanConfig::parse(&contents, format)
        .with_context(|| format!("Failed parsing config file {}", path.display()))
}
