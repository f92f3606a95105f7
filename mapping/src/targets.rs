use crate::{ImageRecord, OrgBinding, TargetName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One row of the import manifest. Ordering is (org, integration, image).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetEntry {
    pub org_id: String,
    pub integration_id: String,
    pub image_name: String,
}

impl TargetEntry {
    pub fn new(binding: &OrgBinding, image_name: impl Into<String>) -> Self {
        Self {
            org_id: binding.org_id.clone(),
            integration_id: binding.integration_id.clone(),
            image_name: image_name.into(),
        }
    }
}

/// Folds resolved images into the unique, sorted set of targets.
pub fn aggregate<'a, I>(bindings: I, target_name: TargetName) -> BTreeSet<TargetEntry>
where
    I: IntoIterator<Item = (&'a ImageRecord, &'a OrgBinding)>,
{
    bindings
        .into_iter()
        .map(|(record, binding)| {
            TargetEntry::new(binding, target_name.apply(&record.image_reference))
        })
        .collect()
}

/// The file consumed by the Snyk API import tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetsFile {
    pub targets: Vec<ImportTarget>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportTarget {
    pub org_id: String,
    pub integration_id: String,
    pub target: TargetRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRef {
    pub name: String,
}

impl From<TargetEntry> for ImportTarget {
    fn from(entry: TargetEntry) -> Self {
        Self {
            org_id: entry.org_id,
            integration_id: entry.integration_id,
            target: TargetRef {
                name: entry.image_name,
            },
        }
    }
}

impl FromIterator<TargetEntry> for TargetsFile {
    fn from_iter<T: IntoIterator<Item = TargetEntry>>(iter: T) -> Self {
        Self {
            targets: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl TargetsFile {
    /// Pretty JSON with a trailing newline.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}
