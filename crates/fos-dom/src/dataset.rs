//! Element dataset
//!
//! Read-only view of an element's `data-*` attributes, keyed the way
//! component options look them up.

use std::collections::HashMap;

use crate::Attribute;

/// Snapshot of an element's `data-*` attributes under camelCase keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DOMStringMap {
    data: HashMap<String, String>,
}

impl DOMStringMap {
    /// Collect the `data-*` attributes of an element
    pub fn from_attributes(attrs: &[Attribute]) -> Self {
        let data = attrs
            .iter()
            .filter_map(|attr| {
                let key = attr.name.strip_prefix("data-")?;
                Some((to_camel_case(key), attr.value.clone()))
            })
            .collect();
        Self { data }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    pub fn has(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Dataset key for an option name.
    ///
    /// Both `-` and `_` separate words, so `auto_close`, `auto-close` and
    /// `autoClose` all map to `autoClose`.
    pub fn key_for(name: &str) -> String {
        to_camel_case(name)
    }
}

fn to_camel_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut upper = false;

    for c in s.chars() {
        match c {
            '-' | '_' => upper = !result.is_empty(),
            c if upper => {
                result.push(c.to_ascii_uppercase());
                upper = false;
            }
            c => result.push(c),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(name: &str, value: &str) -> Attribute {
        Attribute { name: name.to_string(), value: value.to_string() }
    }

    #[test]
    fn test_only_data_attributes() {
        let map = DOMStringMap::from_attributes(&[
            attr("data-user-id", "123"),
            attr("data-active", "true"),
            attr("class", "ignored"),
        ]);

        assert_eq!(map.get("userId"), Some("123"));
        assert_eq!(map.get("active"), Some("true"));
        assert!(!map.has("class"));
        assert_eq!(map.len(), 2);
        assert!(DOMStringMap::from_attributes(&[attr("id", "x")]).is_empty());
    }

    #[test]
    fn test_option_keys() {
        assert_eq!(DOMStringMap::key_for("user-id"), "userId");
        assert_eq!(DOMStringMap::key_for("auto_close"), "autoClose");
        assert_eq!(DOMStringMap::key_for("autoClose"), "autoClose");
        assert_eq!(DOMStringMap::key_for("_private"), "private");
    }
}
