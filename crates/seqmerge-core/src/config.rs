//! Merge configuration.
//!
//! Configuration never makes a merge fail. Values that cannot be understood
//! are dropped one field at a time, with a warning, and the default is used
//! instead.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One of the three versions taking part in a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Previous,
    Current,
    Next,
}

/// Order in which both sides are emitted when a conflict keeps both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertOrder {
    #[default]
    CurrentFirst,
    NextFirst,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// When set, every conflict resolves to this side's content for the
    /// region. A side with nothing there (an empty ancestor range, or a side
    /// that only deleted) is passed over and the built-in policy applies.
    #[serde(default)]
    pub fallback_on_conflict: Option<Side>,
    #[serde(default)]
    pub insert_order: InsertOrder,
}

impl MergeConfig {
    /// Build a config from JSON, keeping every field that parses.
    pub fn from_value(value: &Value) -> Self {
        let mut config = Self::default();
        let Some(map) = value.as_object() else {
            if !value.is_null() {
                tracing::warn!(value = %value, "Merge configuration is not an object, using defaults");
            }
            return config;
        };

        for (key, raw) in map {
            match key.as_str() {
                "fallback_on_conflict" => match Option::<Side>::deserialize(raw) {
                    Ok(side) => config.fallback_on_conflict = side,
                    Err(e) => warn_ignored(key, raw, &e),
                },
                "insert_order" => match InsertOrder::deserialize(raw) {
                    Ok(order) => config.insert_order = order,
                    Err(e) => warn_ignored(key, raw, &e),
                },
                other => {
                    tracing::warn!(option = other, "Unknown merge option ignored");
                }
            }
        }
        config
    }

    /// Parse a JSON document. Invalid JSON yields the default config.
    pub fn from_json(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => Self::from_value(&value),
            Err(e) => {
                tracing::warn!(error = %e, "Merge configuration is not valid JSON, using defaults");
                Self::default()
            }
        }
    }
}

fn warn_ignored(key: &str, raw: &Value, err: &serde_json::Error) {
    tracing::warn!(option = key, value = %raw, error = %err, "Malformed merge option ignored");
}

/// `deserialize_with` helper for embedding a [`MergeConfig`] in a larger
/// settings struct without letting a bad merge option fail the whole load.
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<MergeConfig, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(MergeConfig::from_value(&value))
}
