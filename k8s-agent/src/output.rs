use anyhow::{Context, Result};
use k8s_snyk_mapping::TargetsFile;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::info;

const STDOUT: &str = "-";

pub async fn write_targets(targets: &TargetsFile, path: &Path) -> Result<()> {
    let json = targets.to_json()?;

    if path == Path::new(STDOUT) {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(json.as_bytes()).await?;
        stdout.flush().await?;
        return Ok(());
    }

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed creating directory {}", parent.display()))?;
    }
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Error writing targets file {}", path.display()))?;
    info!("Output written to {}", path.display());
    Ok(())
}
