use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Layout settings for [`crate::format::format_with`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormatOptions {
    /// Spaces per nesting level.
    pub indent: usize,
    /// Longest run of blank lines kept between statements.
    pub max_blank_lines: usize,
    /// Put `;`-separated statements on lines of their own.
    pub split_statements: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            max_blank_lines: 1,
            split_statements: true,
        }
    }
}

/// Settings for [`crate::ids::IdGenerator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IdOptions {
    /// Words of the seed text folded into a generated id.
    pub slug_words: usize,
    /// First counter value tried for ids without a seed.
    pub counter_start: usize,
}

impl Default for IdOptions {
    fn default() -> Self {
        Self {
            slug_words: 3,
            counter_start: 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub format: FormatOptions,
    pub ids: IdOptions,
}

impl EditorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let mut layers = ConfigLayers::defaults();
        layers.merge_json_str(json)?;
        layers.resolve()
    }
}

/// Untyped config value that sources are merged into before it is resolved into an
/// [`EditorConfig`]: defaults, then a config file, then command-line overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigLayers(Value);

impl Default for ConfigLayers {
    fn default() -> Self {
        Self(Value::Object(Map::new()))
    }
}

impl ConfigLayers {
    pub fn defaults() -> Self {
        Self(serde_json::to_value(EditorConfig::default()).unwrap_or_default())
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn merge_json_str(&mut self, json: &str) -> Result<(), ConfigError> {
        let value: Value = serde_json::from_str(json).map_err(|e| ConfigError::InvalidJson {
            message: e.to_string(),
        })?;
        self.deep_merge(&value);
        Ok(())
    }

    pub fn deep_merge(&mut self, other: &Value) {
        deep_merge_value(&mut self.0, other);
    }

    pub fn get_u64(&self, dotted_path: &str) -> Option<u64> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        cur.as_u64()
    }

    /// Sets `value` at a dotted path such as `format.indent`, creating objects on the way.
    pub fn set_value(&mut self, dotted_path: &str, value: Value) {
        let mut cur = &mut self.0;
        for segment in dotted_path.split('.') {
            if !cur.is_object() {
                *cur = Value::Object(Map::new());
            }
            let Value::Object(map) = cur else {
                return;
            };
            cur = map.entry(segment).or_insert(Value::Null);
        }
        *cur = value;
    }

    pub fn resolve(&self) -> Result<EditorConfig, ConfigError> {
        serde_json::from_value(self.0.clone()).map_err(|e| ConfigError::InvalidValue {
            message: e.to_string(),
        })
    }
}

/// Objects merge key by key; any other incoming value replaces the base.
fn deep_merge_value(base: &mut Value, incoming: &Value) {
    if let (Value::Object(base_map), Value::Object(in_map)) = (&mut *base, incoming) {
        for (key, in_value) in in_map {
            deep_merge_value(base_map.entry(key.clone()).or_insert(Value::Null), in_value);
        }
        return;
    }
    *base = incoming.clone();
}
