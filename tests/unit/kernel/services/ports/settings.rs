use super::*;

#[test]
fn settings_default_values() {
    let settings = Settings::default();
    assert_eq!(settings.grid.resize_mode, ResizeMode::Contents);
    assert_eq!(settings.grid.default_column_width, 100);
    assert!(settings.grid.refresh_after_save);
    assert_eq!(settings.export.delimiter, Delimiter::Tab);
    assert_eq!(settings.runtime.worker_threads, 2);
}

#[test]
fn settings_partial_json_fills_defaults() {
    let json = r#"{ "grid": { "natural_key": "id", "pinned": ["id"] }, "export": { "delimiter": "comma" } }"#;
    let settings: Settings = serde_json::from_str(json).expect("deserialize Settings");
    assert_eq!(settings.grid.natural_key.as_deref(), Some("id"));
    assert_eq!(settings.grid.pinned, vec!["id".to_string()]);
    assert_eq!(settings.grid.char_width, 8);
    assert!(settings.grid.refresh_after_save);
    assert_eq!(settings.export.delimiter.as_byte(), b',');
    assert_eq!(settings.runtime, RuntimeSettings::default());
}

#[test]
fn settings_serde_roundtrip_preserves_defaults() {
    let original = Settings::default();
    let json = serde_json::to_string(&original).expect("serialize Settings");
    let decoded: Settings = serde_json::from_str(&json).expect("deserialize Settings");
    assert_eq!(decoded, original);
}
