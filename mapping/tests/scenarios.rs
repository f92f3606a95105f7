use anyhow::Result;
use k8s_snyk_mapping::{
    ConfigError, ConfigFormat, ImageRecord, MappingPipeline, OrgBinding, ScanConfig, TargetEntry,
};
use maplit::btreemap;
use serde_json::json;

fn pipeline(config: serde_json::Value) -> Result<MappingPipeline> {
    let config = ScanConfig::parse(&config.to_string(), ConfigFormat::Json)?;
    Ok(MappingPipeline::new(&config)?)
}

fn labeled(image: &str, namespace: &str, app: &str) -> ImageRecord {
    ImageRecord::new(image, namespace).with_labels(btreemap! {
        "app".to_owned() => app.to_owned(),
    })
}

#[test]
fn excluded_images_are_dropped() -> Result<()> {
    let pipeline = pipeline(json!({
        "image_filter_regex_exclude": ".*debug.*",
        "snyk_org_mapping": {
            "map_on": "namespace",
            "default": {"snyk_org_id": "O0", "snyk_integration_id": "I0"},
        },
    }))?;

    let outcome = pipeline.run(vec![
        ImageRecord::new("nginx:debug", "default"),
        ImageRecord::new("nginx:1.25", "default"),
    ]);

    assert_eq!(outcome.discovered, 2);
    assert_eq!(outcome.excluded, 1);
    assert_eq!(outcome.unresolved, 0);
    assert_eq!(
        outcome.targets.into_iter().collect::<Vec<_>>(),
        vec![TargetEntry::new(&OrgBinding::new("O0", "I0"), "nginx:1.25")]
    );
    Ok(())
}

#[test]
fn namespace_mapping() -> Result<()> {
    let pipeline = pipeline(json!({
        "snyk_org_mapping": {
            "map_on": "namespace",
            "values": {
                "production": {"snyk_org_id": "O1", "snyk_integration_id": "I1"},
            },
        },
    }))?;

    let outcome = pipeline.run(vec![
        ImageRecord::new("nginx:1.25", "production"),
        ImageRecord::new("nginx:1.25", "staging"),
    ]);

    assert_eq!(outcome.unresolved, 1);
    assert_eq!(
        outcome.targets.into_iter().collect::<Vec<_>>(),
        vec![TargetEntry::new(&OrgBinding::new("O1", "I1"), "nginx:1.25")]
    );
    Ok(())
}

#[test]
fn label_mapping_with_default_and_drops() -> Result<()> {
    let with_default = pipeline(json!({
        "snyk_org_mapping": {
            "map_on": "label",
            "label": "app",
            "values": {
                "payments": {"snyk_org_id": "O1", "snyk_integration_id": "I1"},
            },
            "default": {"snyk_org_id": "O0", "snyk_integration_id": "I0"},
        },
    }))?;
    let outcome = with_default.run(vec![labeled("checkout:2", "shop", "checkout")]);
    assert_eq!(
        outcome.targets.into_iter().collect::<Vec<_>>(),
        vec![TargetEntry::new(&OrgBinding::new("O0", "I0"), "checkout:2")]
    );

    let without_default = pipeline(json!({
        "snyk_org_mapping": {
            "map_on": "label",
            "label": "app",
            "values": {
                "payments": {"snyk_org_id": "O1", "snyk_integration_id": "I1"},
            },
        },
    }))?;
    let outcome = without_default.run(vec![
        ImageRecord::new("checkout:2", "shop"),
        labeled("payments:7", "shop", "payments"),
    ]);
    assert_eq!(outcome.unresolved, 1);
    assert_eq!(
        outcome.targets.into_iter().collect::<Vec<_>>(),
        vec![TargetEntry::new(&OrgBinding::new("O1", "I1"), "payments:7")]
    );
    Ok(())
}

#[test]
fn same_image_and_binding_emitted_once() -> Result<()> {
    let pipeline = pipeline(json!({
        "snyk_org_mapping": {
            "map_on": "image_name",
            "values": {
                "redis:6": {"snyk_org_id": "O1", "snyk_integration_id": "I1"},
            },
        },
    }))?;

    let images = vec![
        ImageRecord::new("redis:6", "cache"),
        ImageRecord::new("redis:6", "sessions"),
    ];
    let first = pipeline.run(images.clone());
    let second = pipeline.run(images);

    assert_eq!(first.targets.len(), 1);
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn value_regex_extraction() -> Result<()> {
    let pipeline = pipeline(json!({
        "snyk_org_mapping": {
            "map_on": "label",
            "label": "app",
            "value_regex": "^team-(\\w+)$",
            "values": {
                "payments": {"snyk_org_id": "O1", "snyk_integration_id": "I1"},
            },
        },
    }))?;

    let outcome = pipeline.run(vec![labeled("payments:7", "shop", "team-payments")]);
    assert_eq!(
        outcome.targets.into_iter().collect::<Vec<_>>(),
        vec![TargetEntry::new(&OrgBinding::new("O1", "I1"), "payments:7")]
    );
    Ok(())
}

#[test]
fn manifest_is_deterministic() -> Result<()> {
    let pipeline = pipeline(json!({
        "target_name": "repository",
        "snyk_org_mapping": {
            "map_on": "namespace",
            "values": {
                "a": {"snyk_org_id": "O1", "snyk_integration_id": "I1"},
                "b": {"snyk_org_id": "O2", "snyk_integration_id": "I2"},
            },
        },
    }))?;

    let images = vec![
        ImageRecord::new("registry.io/team/web:3", "b"),
        ImageRecord::new("registry.io/team/api:1", "a"),
        ImageRecord::new("registry.io/team/web:3", "a"),
    ];
    let mut reversed = images.clone();
    reversed.reverse();

    let json = pipeline.run(images).targets_file().to_json()?;
    assert_eq!(json, pipeline.run(reversed).targets_file().to_json()?);

    let manifest: serde_json::Value = serde_json::from_str(&json)?;
    assert_eq!(
        manifest,
        json!({
            "targets": [
                {"orgId": "O1", "integrationId": "I1", "target": {"name": "team/api:1"}},
                {"orgId": "O1", "integrationId": "I1", "target": {"name": "team/web:3"}},
                {"orgId": "O2", "integrationId": "I2", "target": {"name": "team/web:3"}},
            ]
        })
    );
    Ok(())
}

#[test]
fn nothing_resolved_is_an_empty_manifest() -> Result<()> {
    let pipeline = pipeline(json!({
        "snyk_org_mapping": {"map_on": "image"},
    }))?;

    let outcome = pipeline.run(vec![ImageRecord::new("alpine:3", "default")]);
    assert_eq!(outcome.unresolved, 1);
    assert_eq!(outcome.targets_file().to_json()?, "{\n  \"targets\": []\n}\n");
    Ok(())
}

#[test]
fn configuration_errors() {
    let build = |config: serde_json::Value| {
        ScanConfig::parse(&config.to_string(), ConfigFormat::Json)
            .and_then(|config| MappingPipeline::new(&config))
            .err()
    };

    assert!(matches!(
        build(json!({"snyk_org_mapping": {"map_on": "label"}})),
        Some(ConfigError::MissingLabelKey)
    ));
    assert!(matches!(
        build(json!({
            "image_filter_regex_exclude": "[",
            "snyk_org_mapping": {"map_on": "namespace"},
        })),
        Some(ConfigError::InvalidRegex { .. })
    ));
    assert!(matches!(
        build(json!({
            "snyk_org_mapping": {"map_on": "namespace", "value_regex": "("},
        })),
        Some(ConfigError::InvalidRegex { .. })
    ));
    assert!(matches!(
        build(json!({"snyk_org_mapping": {}})),
        Some(ConfigError::Json(_))
    ));
}

#[test]
fn example_config() -> Result<()> {
    let config = ScanConfig::parse(
        include_str!("../../config.example.yaml"),
        ConfigFormat::Yaml,
    )?;
    let pipeline = MappingPipeline::new(&config)?;
    assert_eq!(pipeline.mapper().label_key(), Some("team"));

    let outcome = pipeline.run(vec![
        ImageRecord::new("registry.io/payments/api:debug", "production"),
        ImageRecord::new("registry.io/payments/api:4.1", "production").with_labels(btreemap! {
            "team".to_owned() => "team-payments".to_owned(),
        }),
        ImageRecord::new("postgres:16", "default"),
    ]);
    assert_eq!(outcome.excluded, 1);
    assert_eq!(
        outcome
            .targets
            .iter()
            .map(|target| (target.org_id.as_str(), target.image_name.as_str()))
            .collect::<Vec<_>>(),
        vec![
            ("00000000-0000-0000-0000-000000000000", "postgres:16"),
            ("00000000-0000-0000-0000-000000000001", "registry.io/payments/api:4.1"),
        ]
    );
    Ok(())
}
