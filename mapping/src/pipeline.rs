use crate::{
    aggregate, ConfigError, ExclusionFilter, ImageRecord, OrgMapper, Resolution, ScanConfig,
    TargetEntry, TargetName, TargetsFile,
};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Filter, mapper and naming compiled from a `ScanConfig`.
pub struct MappingPipeline {
    filter: ExclusionFilter,
    mapper: OrgMapper,
    target_name: TargetName,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingOutcome {
    pub targets: BTreeSet<TargetEntry>,
    pub discovered: usize,
    pub excluded: usize,
    pub unresolved: usize,
}

impl MappingOutcome {
    pub fn targets_file(&self) -> TargetsFile {
        self.targets.iter().cloned().collect()
    }
}

impl MappingPipeline {
    pub fn new(config: &ScanConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            filter: ExclusionFilter::new(config.image_filter_regex_exclude.as_deref())?,
            mapper: OrgMapper::new(&config.snyk_org_mapping)?,
            target_name: config.target_name,
        })
    }

    pub fn mapper(&self) -> &OrgMapper {
        &self.mapper
    }

    /// Unresolvable images are logged and skipped, they never fail the run.
    pub fn run(&self, images: Vec<ImageRecord>) -> MappingOutcome {
        let discovered = images.len();
        let images = self.filter.filter(images);
        let excluded = discovered - images.len();

        let mut unresolved = 0;
        let bound = images
            .iter()
            .filter_map(|image| match self.mapper.resolve(image) {
                Resolution::Bound(binding) => {
                    debug!("Mapped {} to {}", image, binding);
                    Some((image, binding))
                }
                Resolution::Unbound(reason) => {
                    warn!(
                        image = %image.image_reference,
                        namespace = %image.namespace,
                        "Could not map image to a Snyk org: {}",
                        reason
                    );
                    unresolved += 1;
                    None
                }
            })
            .collect::<Vec<_>>();

        MappingOutcome {
            targets: aggregate(bound, self.target_name),
            discovered,
            excluded,
            unresolved,
        }
    }
}
