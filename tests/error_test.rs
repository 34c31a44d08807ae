//! Tests for error types

use episode_outcomes::Error;
use std::path::PathBuf;

#[test]
fn test_configuration_error() {
    let error = Error::Configuration("DRLNAV_BASE_PATH is not set".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Configuration error"));
    assert!(error_str.contains("DRLNAV_BASE_PATH"));
    assert!(error.is_fatal());
}

#[test]
fn test_invalid_window_error() {
    let error = Error::InvalidWindow { start: 200, end: 200 };
    assert_eq!(
        format!("{error}"),
        "Invalid window [200, 200): end must be greater than start"
    );
    assert!(error.is_fatal());
}

#[test]
fn test_resolution_error() {
    let error = Error::Resolution {
        model: "ddpg_0".to_string(),
        found: 2,
        dir: PathBuf::from("/drl/src/turtlebot3_drl/model/robot/ddpg_0"),
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("Found 2 log files for ddpg_0"));
    assert!(error_str.contains("/drl/src/turtlebot3_drl/model/robot/ddpg_0"));
    assert!(!error.is_fatal());
}

#[test]
fn test_range_error_distinct_from_empty_window() {
    let range = Error::Range {
        start: 200,
        end: 350,
        len: 300,
    };
    let empty = Error::EmptyWindow { start: 200, end: 350 };

    assert_eq!(
        format!("{range}"),
        "Requested range 200 to 350 exceeds data length (300)"
    );
    assert!(format!("{empty}").starts_with("No data for episodes"));
    assert!(!range.is_fatal());
    assert!(!empty.is_fatal());
}

#[test]
fn test_schema_error() {
    let error = Error::Schema {
        column: "success".to_string(),
        available: vec!["episode".to_string(), "reward".to_string()],
    };
    assert_eq!(
        format!("{error}"),
        "Column `success` not found (available: episode, reward)"
    );
}

#[test]
fn test_invalid_outcome_error() {
    let error = Error::InvalidOutcome {
        position: "row 12".to_string(),
        code: -1,
    };
    assert_eq!(format!("{error}"), "Invalid outcome code -1 at row 12");
}

#[test]
fn test_storage_error() {
    let error = Error::StorageError("file not found".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Storage error"));
    assert!(error_str.contains("file not found"));
}

#[test]
fn test_render_error_is_fatal() {
    let error = Error::Render("/tmp/out.png: no font".to_string());
    assert!(format!("{error}").contains("Render error"));
    assert!(error.is_fatal());
}

#[test]
fn test_io_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let error: Error = io_error.into();
    let error_str = format!("{error}");
    assert!(error_str.contains("IO error"));
}

#[test]
fn test_other_error() {
    let error = Error::Other("custom error message".to_string());
    let error_str = format!("{error}");
    assert_eq!(error_str, "custom error message");
}

#[test]
fn test_error_debug() {
    let error = Error::EmptyWindow { start: 0, end: 1 };
    let debug_str = format!("{error:?}");
    assert!(debug_str.contains("EmptyWindow"));
}

#[test]
fn test_result_type_alias_error() {
    fn returns_error() -> episode_outcomes::Result<i32> {
        Err(Error::Other("test error".to_string()))
    }

    let result = returns_error();
    assert!(result.is_err());
}
