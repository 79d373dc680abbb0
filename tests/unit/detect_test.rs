//! Unit tests for file format detection.

use tracksketch::import::{detect_format, DecodeError, FileFormat, TrackFile};

#[test]
fn test_detect_fit_media_type() {
    let file = TrackFile::with_media_type("morning", "application/fit", vec![]);
    assert_eq!(detect_format(&file).unwrap(), FileFormat::Fit);
}

#[test]
fn test_detect_fit_ant_media_type() {
    let file = TrackFile::with_media_type("morning", "application/vnd.ant.fit", vec![]);
    assert_eq!(detect_format(&file).unwrap(), FileFormat::Fit);
}

#[test]
fn test_detect_gpx_media_type() {
    let file = TrackFile::with_media_type("loop", "application/gpx", vec![]);
    assert_eq!(detect_format(&file).unwrap(), FileFormat::Gpx);
}

#[test]
fn test_detect_gpx_xml_media_type() {
    let file = TrackFile::with_media_type("loop", "application/gpx+xml", vec![]);
    assert_eq!(detect_format(&file).unwrap(), FileFormat::Gpx);
}

#[test]
fn test_detect_media_type_case_insensitive() {
    let file = TrackFile::with_media_type("ride", "Application/FIT", vec![]);
    assert_eq!(detect_format(&file).unwrap(), FileFormat::Fit);
}

#[test]
fn test_detect_fit_extension() {
    let file = TrackFile::new("ride.fit", vec![]);
    assert_eq!(detect_format(&file).unwrap(), FileFormat::Fit);
}

#[test]
fn test_detect_gpx_extension() {
    let file = TrackFile::new("commute.gpx", vec![]);
    assert_eq!(detect_format(&file).unwrap(), FileFormat::Gpx);
}

#[test]
fn test_detect_extension_case_insensitive() {
    let file = TrackFile::new("RIDE.FIT", vec![]);
    assert_eq!(detect_format(&file).unwrap(), FileFormat::Fit);

    let file = TrackFile::new("Commute.Gpx", vec![]);
    assert_eq!(detect_format(&file).unwrap(), FileFormat::Gpx);
}

#[test]
fn test_media_type_takes_precedence_over_extension() {
    // A misleading extension loses to an explicit media type.
    let file = TrackFile::with_media_type("ride.gpx", "application/fit", vec![]);
    assert_eq!(detect_format(&file).unwrap(), FileFormat::Fit);
}

#[test]
fn test_empty_media_type_falls_back_to_extension() {
    let file = TrackFile::with_media_type("ride.fit", "", vec![]);
    assert_eq!(detect_format(&file).unwrap(), FileFormat::Fit);
}

#[test]
fn test_unknown_media_type_rejected() {
    // A declared but unrecognized media type is rejected outright; the
    // extension is not consulted as a second chance.
    let file = TrackFile::with_media_type("route.fit", "application/octet-stream", vec![]);
    match detect_format(&file) {
        Err(DecodeError::UnknownFormat(token)) => assert_eq!(token, "application/octet-stream"),
        other => panic!("expected UnknownFormat, got {:?}", other),
    }
}

#[test]
fn test_unknown_extension_rejected() {
    let file = TrackFile::new("workout.tcx", vec![]);
    assert!(matches!(
        detect_format(&file),
        Err(DecodeError::UnknownFormat(_))
    ));
}

#[test]
fn test_missing_extension_rejected() {
    let file = TrackFile::new("README", vec![]);
    assert!(matches!(
        detect_format(&file),
        Err(DecodeError::UnknownFormat(_))
    ));
}
