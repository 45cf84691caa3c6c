//! Placeholder allocation for a single render pass.

use crate::value::Value;

/// Prefix of every generated placeholder name.
pub const PLACEHOLDER_PREFIX: &str = "@p";

/// Ordered placeholder-name -> value store filled while rendering.
///
/// Names are handed out in first-use order starting at `@p0`. One instance is
/// created per render call and shared by every node rendered in that pass,
/// including unioned branches and sub-queries, so numbering never collides.
#[derive(Clone, Debug, Default)]
pub struct Parameters {
    entries: Vec<(String, Value)>,
}

impl Parameters {
    /// Create a new empty parameter store.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Bind a value and return the placeholder that stands for it.
    pub fn next(&mut self, value: impl Into<Value>) -> String {
        let name = format!("{PLACEHOLDER_PREFIX}{}", self.entries.len());
        self.entries.push((name.clone(), value.into()));
        name
    }

    /// Number of bound values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing has been bound.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the value bound to a placeholder name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Iterate `(name, value)` pairs in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Values in allocation order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Deterministic `name=value` serialization sorted by name.
    ///
    /// Used as part of the cache key, so it must not depend on the order in which
    /// values happened to be discovered.
    pub fn serialize(&self) -> String {
        let mut pairs: Vec<&(String, Value)> = self.entries.iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs
            .into_iter()
            .map(|(name, value)| format!("{name}={}", value.to_key_string()))
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_start_at_zero_in_first_use_order() {
        let mut params = Parameters::new();
        assert_eq!(params.next(10), "@p0");
        assert_eq!(params.next("x"), "@p1");
        assert_eq!(params.next(true), "@p2");
        assert_eq!(params.len(), 3);
        assert_eq!(params.get("@p1"), Some(&Value::Text("x".into())));
    }

    #[test]
    fn serialize_sorts_by_name() {
        let mut params = Parameters::new();
        for i in 0..11 {
            params.next(i);
        }
        let s = params.serialize();
        assert!(s.starts_with("@p0=0,@p1=1,@p10=10,@p2=2"));
    }

    #[test]
    fn serialize_empty() {
        assert_eq!(Parameters::new().serialize(), "");
    }

    #[test]
    fn iter_preserves_allocation_order() {
        let mut params = Parameters::new();
        params.next("b");
        params.next("a");
        let names: Vec<&str> = params.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["@p0", "@p1"]);
    }
}
