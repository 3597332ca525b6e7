//! Query-string construction for Confluence requests.

use crate::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// Page size used when the caller does not supply `limit`.
pub const DEFAULT_LIMIT: u64 = 25;

/// Ordered set of query parameters.
///
/// Names are kept sorted so the encoded query string is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QuerySpec(BTreeMap<String, String>);

impl QuerySpec {
    /// Creates an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the pagination and expansion parameters shared by most
    /// operations. `limit` defaults to [`DEFAULT_LIMIT`]; fractional values
    /// are truncated; an empty `expand` is omitted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `limit` or `start` is negative or
    /// not finite.
    pub fn common(limit: Option<f64>, start: Option<f64>, expand: Option<&str>) -> Result<Self> {
        let mut query = Self::new();
        let limit = limit
            .map(|v| non_negative("limit", v))
            .transpose()?
            .unwrap_or(DEFAULT_LIMIT);
        query.set("limit", limit.to_string());
        if let Some(start) = start.map(|v| non_negative("start", v)).transpose()? {
            query.set("start", start.to_string());
        }
        if let Some(expand) = expand.filter(|e| !e.is_empty()) {
            query.set("expand", expand);
        }
        Ok(query)
    }

    /// Sets a parameter, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Builder form of [`Self::set`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Returns a parameter value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Ensures the `expand` parameter lists `required`.
    pub fn require_expand(&mut self, required: &str) {
        let current = self.get("expand").unwrap_or_default();
        let expand = ensure_expand_contains(current, required);
        self.set("expand", expand);
    }

    /// Returns true if no parameter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Converts a JSON number into a non-negative integer, truncating fractions.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] naming `field` if the value is negative or
/// not finite.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn non_negative(field: &str, value: f64) -> Result<u64> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidInput(format!(
            "{field} must be a non-negative number"
        )));
    }
    Ok(value.trunc() as u64)
}

/// Appends `required` to a comma-separated expansion list unless a token
/// already matches it exactly (after trimming whitespace).
///
/// Existing tokens are never reordered or deduplicated.
#[must_use]
pub fn ensure_expand_contains(current: &str, required: &str) -> String {
    if current.is_empty() {
        return required.to_string();
    }
    if current.split(',').any(|token| token.trim() == required) {
        return current.to_string();
    }
    format!("{current},{required}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_expand_contains() {
        assert_eq!(ensure_expand_contains("", "body.storage"), "body.storage");
        assert_eq!(
            ensure_expand_contains("version", "body.storage"),
            "version,body.storage"
        );
        assert_eq!(
            ensure_expand_contains("body.storage", "body.storage"),
            "body.storage"
        );
        assert_eq!(
            ensure_expand_contains("version,body.storage", "body.storage"),
            "version,body.storage"
        );
        assert_eq!(
            ensure_expand_contains("version, body.storage ", "body.storage"),
            "version, body.storage "
        );
        assert_eq!(
            ensure_expand_contains("body.storage.value", "body.storage"),
            "body.storage.value,body.storage"
        );
    }

    #[test]
    fn test_common_defaults_limit() {
        let query = QuerySpec::common(None, None, None).unwrap();
        assert_eq!(query.get("limit"), Some("25"));
        assert_eq!(query.get("start"), None);
        assert_eq!(query.get("expand"), None);
    }

    #[test]
    fn test_common_passes_values_through() {
        let query = QuerySpec::common(Some(10.0), Some(5.0), Some("body.storage")).unwrap();
        assert_eq!(query.get("limit"), Some("10"));
        assert_eq!(query.get("start"), Some("5"));
        assert_eq!(query.get("expand"), Some("body.storage"));
    }

    #[test]
    fn test_common_truncates_and_drops_empty_expand() {
        let query = QuerySpec::common(Some(7.9), Some(0.0), Some("")).unwrap();
        assert_eq!(query.get("limit"), Some("7"));
        assert_eq!(query.get("start"), Some("0"));
        assert_eq!(query.get("expand"), None);
    }

    #[test]
    fn test_common_rejects_negative_and_non_finite() {
        assert!(QuerySpec::common(Some(-1.0), None, None).is_err());
        assert!(QuerySpec::common(None, Some(f64::NAN), None).is_err());
        let err = QuerySpec::common(None, Some(-3.0), None).unwrap_err();
        assert!(err.to_string().contains("start"));
    }

    #[test]
    fn test_require_expand() {
        let mut query = QuerySpec::new().with("expand", "version");
        query.require_expand("body.storage");
        assert_eq!(query.get("expand"), Some("version,body.storage"));

        let mut query = QuerySpec::new();
        query.require_expand("body.storage");
        assert_eq!(query.get("expand"), Some("body.storage"));
    }

    #[test]
    fn test_serializes_in_name_order() {
        let query = QuerySpec::new().with("start", "0").with("cql", "x").with("limit", "1");
        assert_eq!(
            serde_json::to_string(&query).unwrap(),
            r#"{"cql":"x","limit":"1","start":"0"}"#
        );
    }
}
