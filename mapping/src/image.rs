use std::collections::BTreeMap;
use std::fmt;

/// A container image observed in a pod, with the metadata of that pod.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageRecord {
    pub image_reference: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
}

impl ImageRecord {
    pub fn new(image_reference: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            image_reference: image_reference.into(),
            namespace: namespace.into(),
            labels: Default::default(),
        }
    }

    pub fn with_labels(mut self, labels: BTreeMap<String, String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}

impl fmt::Display for ImageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (namespace {})", self.image_reference, self.namespace)
    }
}
