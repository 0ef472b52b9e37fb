use crate::*;
use serde_json::json;

#[test]
fn partial_json_keeps_remaining_defaults() {
    let config = EditorConfig::from_json_str(r#"{"format": {"maxBlankLines": 0}}"#).unwrap();
    assert_eq!(config.format.max_blank_lines, 0);
    assert_eq!(config.format.indent, 2);
    assert_eq!(config.ids, IdOptions::default());
}

#[test]
fn layers_merge_in_order() {
    let mut layers = ConfigLayers::defaults();
    layers
        .merge_json_str(r#"{"format": {"indent": 4}, "ids": {"slugWords": 2}}"#)
        .unwrap();
    layers.set_value("format.indent", json!(8));
    assert_eq!(layers.get_u64("format.indent"), Some(8));
    assert_eq!(layers.get_u64("ids.slugWords"), Some(2));
    assert_eq!(layers.get_u64("ids.counterStart"), Some(1));

    let config = layers.resolve().unwrap();
    assert_eq!(config.format.indent, 8);
    assert!(config.format.split_statements);
}

#[test]
fn bad_input_is_reported() {
    assert!(matches!(
        EditorConfig::from_json_str("{"),
        Err(ConfigError::InvalidJson { .. })
    ));

    let mut layers = ConfigLayers::defaults();
    layers.set_value("format.indent", json!("wide"));
    assert!(matches!(layers.resolve(), Err(ConfigError::InvalidValue { .. })));
}
