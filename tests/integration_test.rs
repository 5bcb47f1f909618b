//! End-to-end tests for file conversion and the batch driver

use std::fs;

use approx::assert_abs_diff_eq;
use proj::Proj;
use serde_json::{json, Value};
use tempfile::tempdir;

use grid_to_wgs84::batch::run_batch_with;
use grid_to_wgs84::converter::{convert_geojson, convert_geojson_with, CRS84_URN};
use grid_to_wgs84::extent::in_expected_region;
use grid_to_wgs84::{ConversionError, ConversionJob, ConversionResult, GridToWgs84, JobOutcome, LeafTransform};

fn scale(x: f64, y: f64) -> ConversionResult<(f64, f64)> {
    Ok((x / 1000.0, y / 1000.0))
}

const QUARTERS: &str = r#"{"type":"FeatureCollection","name":"Quarters","features":[{"type":"Feature","geometry":{"type":"Point","coordinates":[170000,620000]},"properties":{}}]}"#;

#[test]
fn converts_quarters_with_proj() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("Quarters.geojson");
    let output = dir.path().join("Quarters_WGS84_CORRECT.geojson");
    fs::write(&input, QUARTERS).unwrap();

    let report = convert_geojson(&input, &output).unwrap();
    assert_eq!(report.features, 1);

    let written: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written["name"], "Quarters_WGS84");
    assert_eq!(written["crs"]["properties"]["name"], CRS84_URN);

    let expected = Proj::new_known_crs("EPSG:28191", "EPSG:4326", None)
        .unwrap()
        .convert((170000.0, 620000.0))
        .unwrap();
    let coords = written["features"][0]["geometry"]["coordinates"].as_array().unwrap();
    assert_eq!(coords.len(), 2);
    assert_abs_diff_eq!(coords[0].as_f64().unwrap(), expected.0, epsilon = 1e-9);
    assert_abs_diff_eq!(coords[1].as_f64().unwrap(), expected.1, epsilon = 1e-9);
}

#[test]
fn grid_origin_lands_near_al_bireh() {
    let transformer = GridToWgs84::new().unwrap();
    // False origin of the Cassini grid
    let (lon, lat) = transformer.transform(170251.555, 126867.909).unwrap();
    assert_abs_diff_eq!(lon, 35.2121, epsilon = 0.01);
    assert_abs_diff_eq!(lat, 31.7341, epsilon = 0.01);
    assert!(in_expected_region((lon, lat)));
}

#[test]
fn output_is_pretty_and_keeps_unicode() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.geojson");
    let output = dir.path().join("out.geojson");
    fs::write(
        &input,
        r#"{"type":"FeatureCollection","name":"البيرة","features":[{"type":"Feature","properties":{"name":"حي الشرفة"},"geometry":{"type":"LineString","coordinates":[[1000,2000,15],[3000,4000,16]]}}]}"#,
    )
    .unwrap();

    convert_geojson_with(&input, &output, &scale).unwrap();
    let text = fs::read_to_string(&output).unwrap();

    assert!(text.contains("البيرة_WGS84"));
    assert!(text.contains("حي الشرفة"));
    assert!(text.starts_with("{\n  \"type\": \"FeatureCollection\""));

    let written: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        written["features"][0]["geometry"]["coordinates"],
        json!([[1.0, 2.0, 15], [3.0, 4.0, 16]])
    );
}

#[test]
fn empty_collection_writes_empty_features() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("empty.geojson");
    let output = dir.path().join("empty_out.geojson");
    fs::write(&input, r#"{"type":"FeatureCollection","features":[]}"#).unwrap();

    let report = convert_geojson_with(&input, &output, &scale).unwrap();
    assert_eq!(report.features, 0);
    assert_eq!(report.sample, None);
    assert_eq!(report.extent, None);

    let written: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written["features"], json!([]));
}

#[test]
fn missing_input_is_file_not_found() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("nope.geojson");
    let output = dir.path().join("nope_out.geojson");

    let err = convert_geojson_with(&input, &output, &scale).unwrap_err();
    assert!(matches!(err, ConversionError::FileNotFound(ref p) if *p == input));
    assert!(!output.exists());
}

#[test]
fn malformed_input_is_parse_error() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("broken.geojson");
    let output = dir.path().join("broken_out.geojson");
    fs::write(&input, "{\"features\": [").unwrap();

    let err = convert_geojson_with(&input, &output, &scale).unwrap_err();
    assert!(matches!(err, ConversionError::Parse { .. }));
    assert!(!output.exists());
}

#[test]
fn batch_continues_past_failures() {
    let dir = tempdir().unwrap();
    let missing = ConversionJob::beside(dir.path().join("missing.geojson"));
    let broken_input = dir.path().join("broken.geojson");
    fs::write(&broken_input, "not json").unwrap();
    let broken = ConversionJob::beside(&broken_input);
    let good_input = dir.path().join("Quarters.geojson");
    fs::write(&good_input, QUARTERS).unwrap();
    let good = ConversionJob::beside(&good_input);

    let summary = run_batch_with(&[missing.clone(), broken.clone(), good.clone()], &scale);

    assert_eq!(summary.total(), 3);
    assert_eq!(summary.succeeded(), 1);
    assert!(matches!(summary.outcomes[0].1, JobOutcome::FileNotFound(_)));
    assert!(matches!(summary.outcomes[1].1, JobOutcome::Failed(ConversionError::Parse { .. })));
    assert!(matches!(summary.outcomes[2].1, JobOutcome::Converted(ref r) if r.features == 1));

    assert!(!missing.output.exists());
    assert!(!broken.output.exists());
    assert_eq!(good.output, dir.path().join("Quarters_WGS84_CORRECT.geojson"));
    assert!(good.output.exists());
}

#[test]
fn transform_failure_is_reported_per_job() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("Quarters.geojson");
    fs::write(&input, QUARTERS).unwrap();
    let job = ConversionJob::beside(&input);

    let reject = |x: f64, y: f64| -> ConversionResult<(f64, f64)> {
        Err(ConversionError::Transform { x, y, reason: "outside area of use".to_string() })
    };
    let summary = run_batch_with(&[job.clone()], &reject);

    assert_eq!(summary.succeeded(), 0);
    assert!(matches!(summary.outcomes[0].1, JobOutcome::Failed(ConversionError::Transform { .. })));
    assert!(!job.output.exists());
}
