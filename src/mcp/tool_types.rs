//! Argument types and mapping for MCP tools.
//!
//! Each tool decodes its untyped argument bag into one typed struct in a
//! single step, then [`validate`](GetContentArgs::validate)s it into the
//! request the handler needs.
//!
//! # Security
//!
//! All argument types use `#[serde(deny_unknown_fields)]` so a misspelled or
//! injected parameter is reported instead of silently ignored.

use crate::models::{ContentId, ContentItem, ContentKind, QuerySpec, non_negative};
use crate::services::{UpdateRequest, space_cql};
use crate::{Error, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error as ThisError;

/// Failure to turn raw tool arguments into a typed struct.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum MapperError {
    /// The arguments value is present but is not a JSON object.
    #[error("arguments are not a JSON object")]
    NotAnObject,

    /// A field has the wrong type, or an unknown field was supplied.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
}

/// Extracts the argument map from a `tools/call` request.
///
/// Absent or `null` arguments yield an empty map.
///
/// # Errors
///
/// Returns [`MapperError::NotAnObject`] for any other non-object value.
pub fn extract_arguments(
    arguments: Option<Value>,
) -> std::result::Result<Map<String, Value>, MapperError> {
    match arguments {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(MapperError::NotAnObject),
    }
}

/// Extracts and decodes tool arguments into `T`.
///
/// # Errors
///
/// Returns a [`MapperError`] if the arguments are not an object or do not
/// match `T`.
pub fn decode_arguments<T>(arguments: Option<Value>) -> std::result::Result<T, MapperError>
where
    T: DeserializeOwned,
{
    let map = extract_arguments(arguments)?;
    serde_json::from_value(Value::Object(map))
        .map_err(|e| MapperError::InvalidArguments(e.to_string()))
}

/// Returns the value if it is present and non-empty.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Returns the value or an [`Error::InvalidInput`] with `message`.
fn required(value: Option<String>, message: &str) -> Result<String> {
    non_empty(value).ok_or_else(|| Error::InvalidInput(message.to_string()))
}

/// Arguments for `confluence_get_content`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GetContentArgs {
    /// Content ID.
    pub content_id: Option<String>,
    /// Comma-separated expansion list.
    pub expand: Option<String>,
    /// Page size.
    pub limit: Option<f64>,
    /// Page offset.
    pub start: Option<f64>,
}

/// A validated single-item read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentQuery {
    /// Item to read.
    pub id: ContentId,
    /// Query parameters.
    pub query: QuerySpec,
}

impl GetContentArgs {
    /// Validates the arguments. `expand` always ends up containing
    /// `body.storage`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a missing or malformed content ID
    /// or invalid pagination.
    pub fn validate(self) -> Result<ContentQuery> {
        let id = required(self.content_id, "contentId must be a string and is required")?;
        let id = ContentId::parse(id)?;
        let mut query = QuerySpec::common(self.limit, self.start, self.expand.as_deref())?;
        query.require_expand("body.storage");
        Ok(ContentQuery { id, query })
    }
}

/// Arguments for `confluence_search_content`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SearchContentArgs {
    /// CQL query.
    pub cql: Option<String>,
    /// Page size.
    pub limit: Option<f64>,
    /// Page offset.
    pub start: Option<f64>,
    /// Comma-separated expansion list.
    pub expand: Option<String>,
}

impl SearchContentArgs {
    /// Validates the arguments into the `/search` query.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `cql` is missing or empty, or the
    /// pagination is invalid.
    pub fn validate(self) -> Result<QuerySpec> {
        let cql = required(self.cql, "cql must be a string and is required")?;
        Ok(QuerySpec::common(self.limit, self.start, self.expand.as_deref())?.with("cql", cql))
    }
}

/// Arguments for `confluence_create_content`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateContentArgs {
    /// Title of the new item.
    pub title: Option<String>,
    /// Key of the owning space.
    pub space_key: Option<String>,
    /// Storage-format body.
    pub content: Option<String>,
    /// `page` (default) or `blogpost`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Parent content ID.
    pub parent_id: Option<String>,
}

impl CreateContentArgs {
    /// Validates the arguments into the item to create.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a required field is missing or the
    /// type is unsupported.
    pub fn validate(self) -> Result<ContentItem> {
        let title = required(self.title, "title is required")?;
        let space_key = required(self.space_key, "spaceKey is required")?;
        let content = required(self.content, "content is required")?;
        let kind = non_empty(self.kind)
            .map(|k| ContentKind::parse(&k))
            .transpose()?
            .unwrap_or_default();

        let item = ContentItem::draft(kind, title, space_key, content);
        Ok(match non_empty(self.parent_id) {
            Some(parent_id) => item.with_parent(parent_id),
            None => item,
        })
    }
}

/// Arguments for `confluence_update_content`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateContentArgs {
    /// Content ID.
    pub content_id: Option<String>,
    /// Explicit new version number.
    pub version: Option<f64>,
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement storage-format body.
    pub content: Option<String>,
    /// Comment for the new version.
    pub version_comment: Option<String>,
}

impl UpdateContentArgs {
    /// Validates the arguments. Empty strings count as absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a missing or malformed content ID,
    /// or a version below 1.
    pub fn validate(self) -> Result<UpdateRequest> {
        let id = required(self.content_id, "contentId is required")?;
        let id = ContentId::parse(id)?;
        let version = self.version.map(|v| non_negative("version", v)).transpose()?;
        if version == Some(0) {
            return Err(Error::InvalidInput(
                "version must be at least 1".to_string(),
            ));
        }

        Ok(UpdateRequest {
            id,
            version,
            title: non_empty(self.title),
            content: non_empty(self.content),
            version_comment: non_empty(self.version_comment),
        })
    }
}

/// Arguments for `confluence_list_spaces`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ListSpacesArgs {
    /// Title filter.
    pub search_text: Option<String>,
    /// Page size.
    pub limit: Option<f64>,
    /// Page offset.
    pub start: Option<f64>,
    /// Comma-separated expansion list.
    pub expand: Option<String>,
}

impl ListSpacesArgs {
    /// Validates the arguments into the `/search` query.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the pagination is invalid.
    pub fn validate(self) -> Result<QuerySpec> {
        let cql = space_cql(self.search_text.as_deref());
        Ok(QuerySpec::common(self.limit, self.start, self.expand.as_deref())?.with("cql", cql))
    }
}
