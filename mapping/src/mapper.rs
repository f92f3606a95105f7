use crate::{ConfigError, ImageRecord, MapOn, OrgBinding, OrgMappingConfig};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

/// Outcome of resolving a single image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    Bound(&'a OrgBinding),
    Unbound(Unresolved),
}

impl<'a> Resolution<'a> {
    pub fn binding(&self) -> Option<&'a OrgBinding> {
        match self {
            Self::Bound(binding) => Some(*binding),
            Self::Unbound(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    pub map_on: MapOn,
    pub reason: UnresolvedReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// The pod doesn't carry the mapping label.
    MissingLabel(String),
    /// `value_regex` didn't match the raw key.
    PatternMismatch(String),
    /// Lookup key isn't in `values`.
    NoMatch(String),
}

impl fmt::Display for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            UnresolvedReason::MissingLabel(label) => {
                write!(f, "pod has no {label} label")
            }
            UnresolvedReason::PatternMismatch(raw_key) => {
                write!(f, "{} value {raw_key:?} doesn't match value_regex", self.map_on)
            }
            UnresolvedReason::NoMatch(key) => {
                write!(f, "no mapping for {} value {key:?}", self.map_on)
            }
        }
    }
}

enum KeySource {
    Label(String),
    ImageName,
    Namespace,
}

/// Validated form of `OrgMappingConfig`, shared read-only by all resolutions.
pub struct OrgMapper {
    map_on: MapOn,
    key_source: KeySource,
    value_regex: Option<Regex>,
    values: BTreeMap<String, OrgBinding>,
    default: Option<OrgBinding>,
}

impl OrgMapper {
    pub fn new(config: &OrgMappingConfig) -> Result<Self, ConfigError> {
        let key_source = match config.map_on {
            MapOn::Label => KeySource::Label(
                config
                    .label
                    .clone()
                    .filter(|label| !label.is_empty())
                    .ok_or(ConfigError::MissingLabelKey)?,
            ),
            MapOn::ImageName => KeySource::ImageName,
            MapOn::Namespace => KeySource::Namespace,
        };

        let value_regex = config
            .value_regex
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|source| ConfigError::InvalidRegex {
                field: "snyk_org_mapping.value_regex",
                source,
            })?;

        Ok(Self {
            map_on: config.map_on,
            key_source,
            value_regex,
            values: config.values.clone(),
            default: config.default.clone(),
        })
    }

    pub fn map_on(&self) -> MapOn {
        self.map_on
    }

    /// Label the collector has to read from pods, if any.
    pub fn label_key(&self) -> Option<&str> {
        match &self.key_source {
            KeySource::Label(label) => Some(label.as_str()),
            KeySource::ImageName | KeySource::Namespace => None,
        }
    }

    pub fn resolve(&self, record: &ImageRecord) -> Resolution<'_> {
        match self.lookup(record) {
            Ok(binding) => Resolution::Bound(binding),
            Err(reason) => match &self.default {
                Some(default) => Resolution::Bound(default),
                None => Resolution::Unbound(Unresolved {
                    map_on: self.map_on,
                    reason,
                }),
            },
        }
    }

    fn lookup(&self, record: &ImageRecord) -> Result<&OrgBinding, UnresolvedReason> {
        let raw_key = match &self.key_source {
            KeySource::ImageName => record.image_reference.as_str(),
            KeySource::Namespace => record.namespace.as_str(),
            KeySource::Label(label) => record
                .label(label)
                .ok_or_else(|| UnresolvedReason::MissingLabel(label.clone()))?,
        };

        let key = match &self.value_regex {
            None => raw_key,
            Some(regex) => extract(regex, raw_key)
                .ok_or_else(|| UnresolvedReason::PatternMismatch(raw_key.to_owned()))?,
        };

        self.values
            .get(key)
            .ok_or_else(|| UnresolvedReason::NoMatch(key.to_owned()))
    }
}

/// First capture group, or the whole match when the pattern has no groups.
/// A group that didn't take part in the match counts as a mismatch.
fn extract<'a>(regex: &Regex, raw_key: &'a str) -> Option<&'a str> {
    let captures = regex.captures(raw_key)?;
    let group = if captures.len() > 1 { 1 } else { 0 };
    captures.get(group).map(|mat| mat.as_str())
}
