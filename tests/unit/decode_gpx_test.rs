//! Unit tests for GPX decoding.

use geojson::Value;
use std::fs;
use tracksketch::import::gpx::decode;

const MULTI_SEGMENT_GPX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test">
  <trk>
    <name>Split Ride</name>
    <trkseg>
      <trkpt lat="45.5" lon="-122.5">
        <ele>100</ele>
        <time>2024-01-01T00:00:00Z</time>
      </trkpt>
      <trkpt lat="45.51" lon="-122.51">
        <ele>110</ele>
        <time>2024-01-01T00:01:00Z</time>
      </trkpt>
    </trkseg>
    <trkseg>
      <trkpt lat="45.6" lon="-122.6">
        <ele>120</ele>
        <time>2024-01-01T00:10:00Z</time>
      </trkpt>
      <trkpt lat="45.61" lon="-122.61">
        <ele>130</ele>
        <time>2024-01-01T00:11:00Z</time>
      </trkpt>
    </trkseg>
  </trk>
</gpx>"#;

const ROUTE_GPX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test">
  <rte>
    <name>Planned Route</name>
    <rtept lat="45.5" lon="-122.5">
      <ele>100</ele>
    </rtept>
    <rtept lat="45.51" lon="-122.51">
      <ele>110</ele>
    </rtept>
  </rte>
</gpx>"#;

const WAYPOINTS_GPX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test">
  <wpt lat="45.5" lon="-122.5">
    <ele>100</ele>
    <name>Start</name>
  </wpt>
  <wpt lat="45.51" lon="-122.51">
    <ele>110</ele>
    <name>Finish</name>
  </wpt>
</gpx>"#;

fn linestring(feature: &geojson::Feature) -> &Vec<Vec<f64>> {
    match &feature.geometry.as_ref().unwrap().value {
        Value::LineString(line) => line,
        other => panic!("expected LineString, got {:?}", other),
    }
}

#[test]
fn test_multi_segment_track_becomes_two_features() {
    let result = decode(MULTI_SEGMENT_GPX.as_bytes());
    assert!(result.errors.is_empty());
    assert_eq!(result.features.len(), 2);

    assert_eq!(linestring(&result.features[0]).len(), 2);
    assert_eq!(linestring(&result.features[1]).len(), 2);

    // Both segments carry the track name.
    for feature in &result.features {
        let properties = feature.properties.as_ref().unwrap();
        assert_eq!(
            properties.get("name").and_then(|v| v.as_str()),
            Some("Split Ride")
        );
    }
}

#[test]
fn test_route_becomes_linestring() {
    let result = decode(ROUTE_GPX.as_bytes());
    assert!(result.errors.is_empty());
    assert_eq!(result.features.len(), 1);

    let line = linestring(&result.features[0]);
    assert_eq!(line.len(), 2);
    assert!((line[0][0] - (-122.5)).abs() < 0.001);
    assert!((line[0][1] - 45.5).abs() < 0.001);

    let properties = result.features[0].properties.as_ref().unwrap();
    assert_eq!(
        properties.get("name").and_then(|v| v.as_str()),
        Some("Planned Route")
    );
}

#[test]
fn test_waypoints_become_points() {
    let result = decode(WAYPOINTS_GPX.as_bytes());
    assert!(result.errors.is_empty());
    assert_eq!(result.features.len(), 2);

    for feature in &result.features {
        assert!(matches!(
            feature.geometry.as_ref().unwrap().value,
            Value::Point(_)
        ));
    }

    let properties = result.features[0].properties.as_ref().unwrap();
    assert_eq!(
        properties.get("name").and_then(|v| v.as_str()),
        Some("Start")
    );
    assert_eq!(
        properties.get("ele").and_then(|v| v.as_f64()),
        Some(100.0)
    );
}

#[test]
fn test_decode_sample_route_fixture() {
    let content = fs::read("tests/fixtures/routes/sample_route.gpx")
        .expect("Failed to read sample_route.gpx fixture");

    let result = decode(&content);
    assert!(result.errors.is_empty());
    assert_eq!(result.features.len(), 1);

    let line = linestring(&result.features[0]);
    assert_eq!(line.len(), 10);

    // First point is in the Berlin area, (longitude, latitude) order.
    assert!((line[0][0] - 13.405).abs() < 0.01);
    assert!((line[0][1] - 52.52).abs() < 0.01);
}

#[test]
fn test_decode_short_loop_fixture() {
    let content = fs::read("tests/fixtures/routes/short_loop.gpx")
        .expect("Failed to read short_loop.gpx fixture");

    let result = decode(&content);
    assert!(result.errors.is_empty());
    assert_eq!(result.features.len(), 1);

    let line = linestring(&result.features[0]);
    assert_eq!(line.len(), 5);

    // A loop: first and last positions coincide.
    let first = &line[0];
    let last = &line[line.len() - 1];
    assert!((first[0] - last[0]).abs() < 0.0001);
    assert!((first[1] - last[1]).abs() < 0.0001);
}
