use scorebar::{ScoreFormat, ScoreSet};
use std::fs;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write score file");
    path
}

#[test]
fn test_json_array_is_normalized() {
    let set = ScoreSet::from_json_str("[-100.0, -150.0, -200.0]").unwrap();
    assert_eq!(set.scores, vec![-100.0, -150.0, -200.0]);
    assert_eq!(set.magnitudes, vec![1.0, 0.5, 0.0]);
}

#[test]
fn test_json_object_with_magnitudes() {
    let set = ScoreSet::from_json_str(
        r#"{"scores": [10, 42, 7], "magnitudes": [0.2, 1.0, 0.5]}"#,
    )
    .unwrap();
    assert_eq!(set.scores, vec![10.0, 42.0, 7.0]);
    assert_eq!(set.magnitudes, vec![0.2, 1.0, 0.5]);
}

#[test]
fn test_json_object_without_magnitudes() {
    let set = ScoreSet::from_json_str(r#"{"scores": [4, 2, 0]}"#).unwrap();
    assert_eq!(set.magnitudes, vec![1.0, 0.5, 0.0]);
}

#[test]
fn test_json_length_mismatch() {
    let err = ScoreSet::from_json_str(r#"{"scores": [1, 2], "magnitudes": [1]}"#).unwrap_err();
    assert!(err.to_string().contains("2 scores but 1 magnitudes"));
}

#[test]
fn test_empty_inputs_rejected() {
    assert!(ScoreSet::from_json_str("[]").is_err());
    assert!(ScoreSet::from_text("# only a comment\n\n").is_err());
}

#[test]
fn test_text_format() {
    let set = ScoreSet::from_text(
        "# best network first\n-10.5\n\n-12.0  # second\n-20.5\n",
    )
    .unwrap();
    assert_eq!(set.scores, vec![-10.5, -12.0, -20.5]);
    assert_eq!(set.magnitudes[0], 1.0);
    assert_eq!(set.magnitudes[2], 0.0);
}

#[test]
fn test_text_reports_bad_line() {
    let err = ScoreSet::from_text("1.0\n2.0\nabc\n").unwrap_err();
    assert!(err.to_string().contains("Line 3"));
}

#[test]
fn test_load_detects_format_from_extension() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let json = write(&dir, "scores.json", "[3, 2, 1]");
    let text = write(&dir, "scores.txt", "3\n2\n1\n");

    let from_json = ScoreSet::load(&json, None).unwrap();
    let from_text = ScoreSet::load(&text, None).unwrap();
    assert_eq!(from_json, from_text);
}

#[test]
fn test_load_with_explicit_format() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write(&dir, "scores.dat", "[5, 6]");

    assert!(ScoreSet::load(&path, None).is_err());
    let set = ScoreSet::load(&path, Some(ScoreFormat::Json)).unwrap();
    assert_eq!(set.scores, vec![5.0, 6.0]);
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let err = ScoreSet::load(&dir.path().join("nope.json"), None).unwrap_err();
    assert!(err.to_string().contains("Failed to read"));
}
