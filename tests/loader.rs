//! File-level tests: loading exports and writing KML files.

use std::fs;
use tempfile::TempDir;

use location_history_kml::{convert_file, load_records, ConvertConfig, ConvertError};

#[test]
fn test_missing_input_file() {
    let tmp_dir = TempDir::new().expect("failed to create temp dir");
    let missing = tmp_dir.path().join("nope.json");

    let err = load_records(&missing).unwrap_err();
    assert!(matches!(err, ConvertError::InputNotFound { .. }));
    assert!(err.to_string().contains("nope.json"));
}

#[test]
fn test_directory_input_unreadable() {
    let tmp_dir = TempDir::new().expect("failed to create temp dir");

    // Opening a directory succeeds on Unix; the read fails
    let err = load_records(tmp_dir.path()).unwrap_err();
    assert!(matches!(err, ConvertError::InputUnreadable { .. }));
}

#[test]
fn test_input_must_be_a_list() {
    let tmp_dir = TempDir::new().expect("failed to create temp dir");
    let input = tmp_dir.path().join("history.json");
    let output = tmp_dir.path().join("out.kml");
    fs::write(&input, r#"{"semanticSegments": []}"#).unwrap();

    let err = convert_file(&input, &output, &ConvertConfig::default()).unwrap_err();
    assert!(matches!(err, ConvertError::NotAList { found: "object" }));
    // Structural errors abort before any output exists
    assert!(!output.exists());
}

#[test]
fn test_malformed_json() {
    let tmp_dir = TempDir::new().expect("failed to create temp dir");
    let input = tmp_dir.path().join("history.json");
    fs::write(&input, "[{\"activity\": ").unwrap();

    let err = load_records(&input).unwrap_err();
    assert!(matches!(err, ConvertError::InvalidJson(_)));
}

#[test]
fn test_convert_file_writes_document() {
    let tmp_dir = TempDir::new().expect("failed to create temp dir");
    let input = tmp_dir.path().join("history.json");
    let output = tmp_dir.path().join("out.kml");
    fs::write(
        &input,
        r#"[
            {
                "startTime": "2024-06-01T08:00:00.000+08:00",
                "endTime": "2024-06-01T09:30:00.000+08:00",
                "visit": {
                    "hierarchyLevel": "0",
                    "probability": "0.8",
                    "topCandidate": {
                        "placeID": "ChIJxyz",
                        "semanticType": "Work",
                        "placeLocation": "geo:22.335799,114.173673"
                    }
                }
            },
            {"timelinePath": [{"point": "geo:22.3,114.1"}]}
        ]"#,
    )
    .unwrap();

    let stats = convert_file(&input, &output, &ConvertConfig::default()).unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.visits, 1);
    assert_eq!(stats.filtered_out, 1);

    let kml = fs::read_to_string(&output).unwrap();
    assert!(kml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    assert!(kml.contains("<coordinates>114.173673,22.335799</coordinates>"));
    assert!(kml.contains("<name><![CDATA[2024-06-01 08:00:00]]></name>"));
    assert!(kml.contains("Duration: 1.5 hours<br/>Probability: 80.0%<br/>Place ID: ChIJxyz"));
    assert!(kml.trim_end().ends_with("</kml>"));
}
