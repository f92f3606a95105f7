use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::LevelFilter;

/// Discover container images running in Kubernetes and map them to Snyk orgs
#[derive(Debug, Parser)]
pub struct Config {
    /// Turn debug logs on
    #[clap(long)]
    debug: bool,

    /// Turn debug logs for all crates (not recommended)
    #[clap(long)]
    all_debug: bool,

    /// Mapping config file (JSON or YAML)
    #[clap(long, env = "K8S_SNYK_CONFIG", default_value = "config.yaml")]
    config: PathBuf,

    /// Kubeconfig file, inferred from the environment when omitted
    #[clap(long, env = "K8S_SNYK_KUBE_CONFIG")]
    kube_config: Option<PathBuf>,

    /// Kubeconfig context to use instead of the current one
    #[clap(long, env = "K8S_SNYK_KUBE_CONTEXT")]
    context: Option<String>,

    /// Namespace to scan, overrides the namespaces in the config file
    #[clap(long = "namespace", short = 'n')]
    namespaces: Vec<String>,

    /// Targets file to write, `-` for stdout
    #[clap(long, env = "K8S_SNYK_OUTPUT")]
    output: Option<PathBuf>,
}

impl Config {
    pub fn log_level(&self) -> LevelFilter {
        match self.debug || self.all_debug {
            true => LevelFilter::DEBUG,
            false => LevelFilter::INFO,
        }
    }

    pub fn all_log_level(&self) -> LevelFilter {
        match self.all_debug {
            true => LevelFilter::DEBUG,
            false => LevelFilter::INFO,
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config
    }

    pub fn kube_config(&self) -> Option<&Path> {
        self.kube_config.as_deref()
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}
