use anyhow::{Context, Result};
use itertools::Itertools;
use k8s_openapi::api::core::v1::Pod;
use k8s_snyk_mapping::ImageRecord;
use kube::api::{Api, ListParams};
use kube::ResourceExt;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use tracing::{debug, info};

const PAGE_SIZE: u32 = 500;

/// Lists pods in `namespaces` (all namespaces when empty) and returns the
/// distinct images they run. Only `label_key` is kept from the pod labels.
pub async fn collect_images(
    client: kube::Client,
    namespaces: &[String],
    label_key: Option<&str>,
) -> Result<BTreeSet<ImageRecord>> {
    let mut images = BTreeSet::new();

    if namespaces.is_empty() {
        info!("Scanning pods in all namespaces");
        let pods = list_pods(&Api::all(client)).await?;
        images.extend(pods.iter().flat_map(|pod| pod_images(pod, label_key)));
    } else {
        info!("Scanning pods in namespaces: {}", namespaces.iter().join(", "));
        for namespace in namespaces {
            let pods = list_pods(&Api::namespaced(client.clone(), namespace))
                .await
                .with_context(|| format!("Failed listing pods in namespace {namespace}"))?;
            images.extend(pods.iter().flat_map(|pod| pod_images(pod, label_key)));
        }
    }

    info!("Found {} distinct images", images.len());
    Ok(images)
}

async fn list_pods(api: &Api<Pod>) -> Result<Vec<Pod>> {
    let mut pods = Vec::new();
    let mut continue_token: Option<String> = None;

    loop {
        let mut list_params = ListParams::default().limit(PAGE_SIZE);
        if let Some(token) = continue_token.as_deref() {
            list_params = list_params.continue_token(token);
        }

        let page = tryhard::retry_fn(|| api.list(&list_params))
            .retries(10)
            .fixed_backoff(Duration::from_millis(500))
            .await
            .context("Failed listing pods")?;
        debug!("Got a page of {} pods", page.items.len());
        pods.extend(page.items);

        match page.metadata.continue_ {
            Some(token) if !token.is_empty() => continue_token = Some(token),
            _ => break,
        }
    }

    Ok(pods)
}

/// Images of a pod's containers and init containers.
pub fn pod_images(pod: &Pod, label_key: Option<&str>) -> Vec<ImageRecord> {
    let Some(spec) = pod.spec.as_ref() else {
        return Vec::new();
    };
    let namespace = pod.namespace().unwrap_or_default();
    let labels: BTreeMap<String, String> = match label_key {
        None => Default::default(),
        Some(key) => pod
            .labels()
            .get_key_value(key)
            .map(|(key, value)| (key.clone(), value.clone()))
            .into_iter()
            .collect(),
    };

    spec.containers
        .iter()
        .chain(spec.init_containers.iter().flatten())
        .filter_map(|container| {
            let image = container.image.as_deref().filter(|image| !image.is_empty());
            if image.is_none() {
                debug!(
                    "Container {} of pod {} has no image",
                    container.name,
                    pod.name_any()
                );
            }
            image
        })
        .map(|image| ImageRecord::new(image, namespace.clone()).with_labels(labels.clone()))
        .collect()
}
