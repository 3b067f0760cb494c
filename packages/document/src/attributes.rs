use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Reserved attribute keys
pub mod keys {
    pub const LAYOUT_TYPE: &str = "layoutType";
    pub const LIST_TYPE: &str = "listType";
    pub const LOADING: &str = "loading";
    pub const ERROR: &str = "error";
    pub const BACKGROUND_COLOR: &str = "backgroundColor";
    pub const SRC: &str = "src";
    pub const ALT: &str = "alt";
    pub const UPLOAD_HANDLER_REQUIRED: &str = "uploadHandlerRequired";
}

/// Value stored in an attribute map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Bool(b) => write!(f, "{}", b),
            AttrValue::Number(n) => write!(f, "{}", n),
            AttrValue::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Number(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::String(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::String(value)
    }
}

/// Open attribute map.
///
/// Ordered so serialized output is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, AttrValue>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(AttrValue::as_str)
    }

    /// Missing keys read as `false`
    pub fn flag(&self, key: &str) -> bool {
        self.0.get(key).and_then(AttrValue::as_bool).unwrap_or(false)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        self.0.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttrValue)> {
        self.0.iter()
    }

    /// Merge `other` into this map, overwriting existing keys
    pub fn extend(&mut self, other: &Attributes) {
        for (key, value) in other.iter() {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn is_flex(&self) -> bool {
        self.get_str(keys::LAYOUT_TYPE) == Some("flex")
    }

    pub fn list_type(&self) -> Option<&str> {
        self.get_str(keys::LIST_TYPE)
    }

    pub fn is_loading(&self) -> bool {
        self.flag(keys::LOADING)
    }

    pub fn has_error(&self) -> bool {
        self.flag(keys::ERROR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_json_shape() {
        let attrs = Attributes::new()
            .with(keys::LAYOUT_TYPE, "flex")
            .with(keys::LOADING, true)
            .with("width", 320.0);

        let json = serde_json::to_string(&attrs).unwrap();
        assert_eq!(json, r#"{"layoutType":"flex","loading":true,"width":320.0}"#);

        let parsed: Attributes = serde_json::from_str(&json).unwrap();
        assert!(parsed.is_flex());
        assert!(parsed.is_loading());
        assert!(!parsed.has_error());
    }

    #[test]
    fn test_flag_ignores_non_bool_values() {
        let attrs = Attributes::new().with(keys::ERROR, "yes");
        assert!(!attrs.has_error());
    }
}
