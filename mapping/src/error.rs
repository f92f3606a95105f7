use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unsupported config file format for {0}, must be JSON (.json) or YAML (.yaml/.yml)")]
    UnsupportedFormat(PathBuf),

    #[error("Error decoding JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Error decoding YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid regex in {field}: {source}")]
    InvalidRegex {
        field: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("snyk_org_mapping.label is required when mapping on labels")]
    MissingLabelKey,
}
