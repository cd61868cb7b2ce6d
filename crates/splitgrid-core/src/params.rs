// ABOUTME: Free-form panel parameters passed to panel content on init and update.
// ABOUTME: Updates merge functionally into a new value instead of mutating in place.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key/value parameters handed to a panel's content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters(Map<String, Value>);

impl Parameters {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Return a new value with `patch` laid over `self`; keys in `patch` win
    #[must_use]
    pub fn merged(&self, patch: &Parameters) -> Parameters {
        let mut next = self.0.clone();
        for (key, value) in &patch.0 {
            next.insert(key.clone(), value.clone());
        }
        Parameters(next)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Parameters {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Parameters {
    type Error = Value;

    /// Only JSON objects convert; anything else is handed back
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_keeps_original_untouched() {
        let base = Parameters::new().with("color", "red").with("title", "one");
        let patch = Parameters::new().with("color", "green");

        let next = base.merged(&patch);

        assert_eq!(next.get("color"), Some(&json!("green")));
        assert_eq!(next.get("title"), Some(&json!("one")));
        assert_eq!(base.get("color"), Some(&json!("red")));
    }

    #[test]
    fn serializes_as_plain_object() {
        let params = Parameters::new().with("color", "purple");
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value, json!({ "color": "purple" }));

        let back: Parameters = serde_json::from_value(value).unwrap();
        assert_eq!(back, params);
    }

    #[test]
    fn only_objects_convert() {
        assert!(Parameters::try_from(json!({ "a": 1 })).is_ok());
        assert_eq!(Parameters::try_from(json!(3)), Err(json!(3)));
    }
}
