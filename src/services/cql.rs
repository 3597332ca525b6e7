//! CQL builders.

/// Builds the CQL used to list spaces, optionally filtered by title.
///
/// Double quotes in `search_text` are backslash-escaped so the text stays
/// inside the quoted literal.
///
/// # Examples
///
/// ```
/// use confluence_mcp::services::space_cql;
///
/// assert_eq!(space_cql(None), "type=space");
/// assert_eq!(space_cql(Some("Eng")), r#"type=space AND title ~ "Eng""#);
/// ```
#[must_use]
pub fn space_cql(search_text: Option<&str>) -> String {
    match search_text.filter(|text| !text.is_empty()) {
        None => "type=space".to_string(),
        Some(text) => format!(r#"type=space AND title ~ "{}""#, escape_quotes(text)),
    }
}

/// Escapes double quotes for use inside a CQL string literal.
#[must_use]
pub fn escape_quotes(text: &str) -> String {
    text.replace('"', r#"\""#)
}
