//! Field maps produced by line parsers and rewritten by classifiers.

use regex::Regex;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(BTreeMap<String, String>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the named groups of `re` that participated in a match on
    /// `line`. Optional groups that did not match are left out.
    pub fn capture(re: &Regex, line: &str) -> Option<Self> {
        let caps = re.captures(line)?;
        let mut fields = Self::new();
        for name in re.capture_names().flatten() {
            if let Some(m) = caps.name(name) {
                fields.set(name, m.as_str());
            }
        }
        Some(fields)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.to_string(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
