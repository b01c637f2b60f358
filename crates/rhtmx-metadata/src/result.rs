// File: src/result.rs
// Purpose: Validation outcome keyed by field path

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Result of validating one model: field path to message.
///
/// Serializes as a flat JSON object; a valid model serializes as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationResult {
    errors: BTreeMap<String, String>,
}

impl ValidationResult {
    /// Create a successful validation result
    pub fn success() -> Self {
        Self::default()
    }

    /// Record an error. The first message for a path wins.
    pub fn add(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(path.into()).or_insert_with(|| message.into());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_error(&self, path: &str) -> bool {
        self.errors.contains_key(path)
    }

    /// Get the error for a specific field path
    pub fn get(&self, path: &str) -> Option<&str> {
        self.errors.get(path).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of errors at or below `path`
    pub fn count_under(&self, path: &str) -> usize {
        self.errors
            .keys()
            .filter(|k| is_at_or_below(k, path))
            .count()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.errors
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect(),
        )
    }
}

fn is_at_or_below(key: &str, path: &str) -> bool {
    match key.strip_prefix(path) {
        Some(rest) => rest.is_empty() || rest.starts_with('.') || rest.starts_with('['),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_result_serializes_as_empty_object() {
        let result = ValidationResult::success();
        assert!(result.is_valid());
        assert_eq!(serde_json::to_string(&result).unwrap(), "{}");
        assert_eq!(result.to_json(), serde_json::json!({}));
    }

    #[test]
    fn test_first_message_wins() {
        let mut result = ValidationResult::success();
        result.add("product.Price", "first");
        result.add("product.Price", "second");
        assert_eq!(result.len(), 1);
        assert_eq!(result.get("product.Price"), Some("first"));
    }

    #[test]
    fn test_serializes_flat() {
        let mut result = ValidationResult::success();
        result.add("product", "class");
        result.add("product.ProductDetails.Detail2", "missing");
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            serde_json::json!({
                "product": "class",
                "product.ProductDetails.Detail2": "missing"
            })
        );
    }

    #[test]
    fn test_count_under_respects_segments() {
        let mut result = ValidationResult::success();
        result.add("product.ProductDetails", "a");
        result.add("product.ProductDetails.Detail2", "b");
        result.add("product.ProductDetailsExtra", "c");
        result.add("product.Items[0].Name", "d");

        assert_eq!(result.count_under("product.ProductDetails"), 2);
        assert_eq!(result.count_under("product.Items"), 1);
        assert_eq!(result.count_under("product"), 4);
    }
}
