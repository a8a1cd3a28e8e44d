use std::fs;
use std::time::Duration;

use assert_matches::assert_matches;

use ortholog_vis::config::{Config, ConfigLoader, ResolvedConfig};
use ortholog_vis::domain::LabelOrder;
use ortholog_vis::error::VisError;

#[test]
fn resolves_file_values_over_defaults() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("ortholog-vis.json");
    fs::write(
        &path,
        r#"{
            "schema_version": 1,
            "endpoint": "https://example.org/sparql",
            "similarity_threshold": 0.1,
            "top_n": 8,
            "label_order": "first-seen",
            "normalize_rows": true,
            "prefetch": false,
            "ensembl_delay_ms": 0
        }"#,
    )
    .unwrap();

    let resolved = ConfigLoader::resolve(path.to_str()).unwrap();
    assert_eq!(resolved.endpoint, "https://example.org/sparql");
    assert_eq!(resolved.similarity_threshold, 0.1);
    assert_eq!(resolved.bubble_top_n, 8);
    assert_eq!(resolved.heatmap_top_n, 8);
    assert_eq!(resolved.label_order, LabelOrder::FirstSeen);
    assert!(resolved.normalize_rows);
    assert!(!resolved.prefetch);
    assert_eq!(resolved.ensembl_chunk_size, 50);
    assert_eq!(resolved.ensembl_delay, Duration::ZERO);
    assert_eq!(resolved.source.as_deref(), Some(path.as_path()));

    let options = resolved.pipeline_options();
    assert_eq!(options.similarity.threshold, 0.1);
    assert!(options.normalize_rows);
}

#[test]
fn total_order_spelling() {
    let config: Config = serde_json::from_str(r#"{"label_order": "total"}"#).unwrap();
    let resolved = ConfigLoader::resolve_config(config).unwrap();
    assert_eq!(resolved.label_order, LabelOrder::TotalDescending);
}

#[test]
fn explicit_missing_file_is_read_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("absent.json");
    let err = ConfigLoader::resolve(path.to_str()).unwrap_err();
    assert_matches!(err, VisError::ConfigRead(_));
}

#[test]
fn invalid_json_is_parse_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("ortholog-vis.json");
    fs::write(&path, "{ not json").unwrap();
    let err = ConfigLoader::resolve(path.to_str()).unwrap_err();
    assert_matches!(err, VisError::ConfigParse(_));
}

#[test]
fn rejects_out_of_range_values() {
    let zero_top = Config {
        top_n: Some(0),
        ..Config::default()
    };
    assert_matches!(
        ConfigLoader::resolve_config(zero_top),
        Err(VisError::ConfigValue(_))
    );

    let negative: Config = serde_json::from_str(r#"{"similarity_threshold": -0.1}"#).unwrap();
    assert_matches!(
        ConfigLoader::resolve_config(negative),
        Err(VisError::ConfigValue(_))
    );
}

#[test]
fn defaults_match_documented_values() {
    let defaults = ResolvedConfig::default();
    assert_eq!(defaults.endpoint, "https://query.wikidata.org/sparql");
    assert_eq!(defaults.similarity_threshold, 0.02);
    assert_eq!(defaults.ensembl_delay, Duration::from_millis(150));
    assert!(defaults.prefetch);
    assert_eq!(defaults.source, None);
}
