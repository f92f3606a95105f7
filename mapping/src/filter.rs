use crate::{ConfigError, ImageRecord};
use regex::Regex;
use tracing::debug;

/// Drops images whose reference matches the configured exclusion pattern.
#[derive(Debug, Clone, Default)]
pub struct ExclusionFilter(Option<Regex>);

impl ExclusionFilter {
    pub fn new(pattern: Option<&str>) -> Result<Self, ConfigError> {
        let regex = pattern
            .filter(|pattern| !pattern.is_empty())
            .map(Regex::new)
            .transpose()
            .map_err(|source| ConfigError::InvalidRegex {
                field: "image_filter_regex_exclude",
                source,
            })?;
        Ok(Self(regex))
    }

    pub fn is_excluded(&self, image_reference: &str) -> bool {
        self.0
            .as_ref()
            .is_some_and(|regex| regex.is_match(image_reference))
    }

    /// Keeps the records that don't match, in their original order.
    pub fn filter(&self, images: Vec<ImageRecord>) -> Vec<ImageRecord> {
        if self.0.is_none() {
            return images;
        }
        images
            .into_iter()
            .filter(|image| {
                let excluded = self.is_excluded(&image.image_reference);
                if excluded {
                    debug!("Excluding image {}", image);
                }
                !excluded
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(refs: &[&str]) -> Vec<ImageRecord> {
        refs.iter()
            .map(|image| ImageRecord::new(*image, "default"))
            .collect()
    }

    fn references(images: &[ImageRecord]) -> Vec<&str> {
        images
            .iter()
            .map(|image| image.image_reference.as_str())
            .collect()
    }

    #[test]
    fn no_pattern_is_identity() {
        let filter = ExclusionFilter::new(None).unwrap();
        let images = records(&["nginx:debug", "nginx:1.25"]);
        assert_eq!(filter.filter(images.clone()), images);
    }

    #[test]
    fn empty_pattern_is_identity() {
        let filter = ExclusionFilter::new(Some("")).unwrap();
        let images = records(&["nginx:debug", "nginx:1.25"]);
        assert_eq!(filter.filter(images.clone()), images);
    }

    #[test]
    fn excludes_matching() {
        let filter = ExclusionFilter::new(Some(".*debug.*")).unwrap();
        let filtered = filter.filter(records(&["nginx:debug", "nginx:1.25"]));
        assert_eq!(references(&filtered), vec!["nginx:1.25"]);
    }

    #[test]
    fn match_is_not_anchored_and_order_is_kept() {
        let filter = ExclusionFilter::new(Some("sidecar")).unwrap();
        let filtered = filter.filter(records(&[
            "redis:6",
            "registry.io/istio/sidecar-proxy:1.2",
            "alpine:3",
            "busybox",
        ]));
        assert_eq!(references(&filtered), vec!["redis:6", "alpine:3", "busybox"]);
    }

    #[test]
    fn invalid_pattern() {
        let err = ExclusionFilter::new(Some("nginx:(")).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidRegex {
                field: "image_filter_regex_exclude",
                ..
            }
        ));
    }
}
