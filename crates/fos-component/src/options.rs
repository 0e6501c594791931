//! Component Options
//!
//! Flat key/value configuration resolved per instance from three layers:
//! component defaults, call-site options and the element's `data-*`
//! overrides. Merging is shallow and the right-most layer wins.

use std::collections::BTreeMap;
use std::fmt;

use fos_dom::DOMStringMap;
use serde::{Deserialize, Serialize};

/// A single option value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl OptionValue {
    /// Type a raw `data-*` string
    ///
    /// `true`/`false` become booleans, `null` becomes null, finite numbers
    /// become numbers and anything else stays a string.
    pub fn from_dataset(raw: &str) -> Self {
        match raw {
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            "null" => Self::Null,
            _ => match raw.parse::<f64>() {
                Ok(n) if n.is_finite() && raw.trim() == raw && !raw.is_empty() => Self::Number(n),
                _ => Self::String(raw.to_string()),
            },
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Option map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options(BTreeMap<String, OptionValue>);

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: impl Into<OptionValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<OptionValue>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(OptionValue::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(OptionValue::as_bool)
    }

    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(OptionValue::as_number)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<OptionValue> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Overwrite keys with those of `other`
    pub fn merge(&mut self, other: &Options) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Shallow merge of `layers`, later layers winning
    pub fn merged<'a>(layers: impl IntoIterator<Item = &'a Options>) -> Options {
        let mut out = Options::new();
        for layer in layers {
            out.merge(layer);
        }
        out
    }

    /// Per-element overrides: one dataset lookup per key of `defaults`
    pub fn from_dataset(defaults: &Options, dataset: &DOMStringMap) -> Options {
        let mut out = Options::new();
        for key in defaults.keys() {
            if let Some(raw) = dataset.get(&DOMStringMap::key_for(key)) {
                out.0.insert(key.to_string(), OptionValue::from_dataset(raw));
            }
        }
        out
    }
}

impl<K: Into<String>, V: Into<OptionValue>, const N: usize> From<[(K, V); N]> for Options {
    fn from(pairs: [(K, V); N]) -> Self {
        Self(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl FromIterator<(String, OptionValue)> for Options {
    fn from_iter<I: IntoIterator<Item = (String, OptionValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fos_dom::Attribute;

    #[test]
    fn test_dataset_typing() {
        assert_eq!(OptionValue::from_dataset("true"), OptionValue::Bool(true));
        assert_eq!(OptionValue::from_dataset("false"), OptionValue::Bool(false));
        assert_eq!(OptionValue::from_dataset("null"), OptionValue::Null);
        assert_eq!(OptionValue::from_dataset("250"), OptionValue::Number(250.0));
        assert_eq!(OptionValue::from_dataset("-1.5"), OptionValue::Number(-1.5));
        assert_eq!(OptionValue::from_dataset("inf"), OptionValue::from("inf"));
        assert_eq!(OptionValue::from_dataset(" 3"), OptionValue::from(" 3"));
        assert_eq!(OptionValue::from_dataset(""), OptionValue::from(""));
    }

    #[test]
    fn test_merge_right_most_wins() {
        let defaults = Options::from([("a", 1), ("b", 1)]);
        let call_site = Options::from([("b", 2), ("c", 2)]);
        let merged = Options::merged([&defaults, &call_site]);

        assert_eq!(merged.get_number("a"), Some(1.0));
        assert_eq!(merged.get_number("b"), Some(2.0));
        assert_eq!(merged.get_number("c"), Some(2.0));
    }

    #[test]
    fn test_from_dataset_reads_only_default_keys() {
        let defaults = Options::new()
            .with("auto_close", true)
            .with("delay", 100);
        let dataset = DOMStringMap::from_attributes(&[
            Attribute { name: "data-auto-close".into(), value: "false".into() },
            Attribute { name: "data-unrelated".into(), value: "x".into() },
        ]);

        let overrides = Options::from_dataset(&defaults, &dataset);
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides.get_bool("auto_close"), Some(false));
        assert!(!overrides.contains("unrelated"));
    }
}
