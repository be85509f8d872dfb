use std::time::Duration;

use nltable::config::Settings;
use nltable::error::FileError;

#[test]
fn test_defaults() {
    let settings = Settings::default();
    assert_eq!(settings.history_limit, 100);
    assert_eq!(settings.autosave_debounce(), Duration::from_millis(250));
    assert_eq!(settings.table_folder, "");
    assert!(!settings.use_active_file_name_and_timestamp);
}

#[test]
fn test_partial_json_keeps_defaults() {
    let settings = Settings::from_json_str(r#"{"historyLimit": 5, "unknownKey": 1}"#).unwrap();
    assert_eq!(settings.history_limit, 5);
    assert_eq!(settings.autosave_debounce_ms, 250);
    assert_eq!(settings.store_context().history_limit, 5);
}

#[test]
fn test_invalid_json_is_parse_error() {
    let err = Settings::from_json_str("{ nope").unwrap_err();
    assert!(matches!(err, FileError::Parse(_)));
}

#[test]
fn test_load_missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::load(&dir.path().join("settings.json")).unwrap();
    assert_eq!(settings, Settings::default());
}

#[test]
fn test_load_file_and_create_options() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(
        &path,
        r#"{"tableFolder": "Tables", "useActiveFileNameAndTimestamp": true}"#,
    )
    .unwrap();

    let settings = Settings::load(&path).unwrap();
    let options = settings.create_options(Some("Daily".to_string()));
    assert_eq!(options.folder_path, "Tables");
    assert_eq!(options.active_note.as_deref(), Some("Daily"));
    assert!(options.use_active_file_name_and_timestamp);
}
