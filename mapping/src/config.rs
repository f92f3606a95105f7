use crate::serde_utils::{null_as_default, one_or_many};
use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_TARGETS_FILE: &str = "imported-targets.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            _ => Err(ConfigError::UnsupportedFormat(path.to_owned())),
        }
    }
}

/// Contents of the scanner config file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanConfig {
    /// Namespaces to scan, all namespaces when empty.
    #[serde(default, deserialize_with = "one_or_many")]
    pub namespaces: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_filter_regex_exclude: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets_file_output_path: Option<PathBuf>,

    #[serde(default)]
    pub target_name: TargetName,

    pub snyk_org_mapping: OrgMappingConfig,
}

impl ScanConfig {
    pub fn parse(contents: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        Ok(match format {
            ConfigFormat::Json => serde_json::from_str(contents)?,
            ConfigFormat::Yaml => serde_yaml::from_str(contents)?,
        })
    }

    pub fn targets_file_output_path(&self) -> &Path {
        self.targets_file_output_path
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_TARGETS_FILE))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrgMappingConfig {
    pub map_on: MapOn,

    /// Pod label holding the mapping key, required with `map_on: label`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Extracts the lookup key from the raw key: first capture group, or the
    /// whole match for patterns without groups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_regex: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub values: BTreeMap<String, OrgBinding>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<OrgBinding>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MapOn {
    Label,
    #[serde(alias = "image")]
    ImageName,
    Namespace,
}

impl fmt::Display for MapOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label => write!(f, "label"),
            Self::ImageName => write!(f, "image_name"),
            Self::Namespace => write!(f, "namespace"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub struct OrgBinding {
    #[serde(rename = "snyk_org_id")]
    pub org_id: String,
    #[serde(rename = "snyk_integration_id")]
    pub integration_id: String,
}

impl OrgBinding {
    pub fn new(org_id: impl Into<String>, integration_id: impl Into<String>) -> Self {
        Self {
            org_id: org_id.into(),
            integration_id: integration_id.into(),
        }
    }
}

impl fmt::Display for OrgBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "org={} integration={}", self.org_id, self.integration_id)
    }
}

/// How an image reference becomes the `target.name` of a manifest entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetName {
    /// The full image reference.
    #[default]
    Reference,
    /// The last two path segments, dropping the registry host
    /// (`registry.io/team/app:1.0` becomes `team/app:1.0`).
    Repository,
}

impl TargetName {
    pub fn apply<'a>(&self, image_reference: &'a str) -> &'a str {
        match self {
            Self::Reference => image_reference,
            Self::Repository => match image_reference.rmatch_indices('/').nth(1) {
                Some((index, _)) => &image_reference[index + 1..],
                None => image_reference,
            },
        }
    }
}
