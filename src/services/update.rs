//! Read-modify-write content update.
//!
//! An update is two remote calls run strictly in sequence:
//!
//! 1. [`fetch_current`] reads the item with its body, version and space.
//! 2. [`plan_update`] computes the replacement item locally.
//! 3. [`submit`] writes it back.
//!
//! Any failure short-circuits. There is no transactional guarantee between
//! the read and the write; a concurrent edit surfaces as a remote conflict.

use crate::client::ConfluenceClient;
use crate::models::{Body, ContentId, ContentItem, QuerySpec, Version};
use crate::{Error, Result};

/// Expansion requested when reading the current state of an item.
pub const CURRENT_STATE_EXPAND: &str = "body.storage,version,space";

/// Validated update request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    /// Item to update.
    pub id: ContentId,
    /// Explicit new version number; defaults to current + 1.
    pub version: Option<u64>,
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement storage-format body.
    pub content: Option<String>,
    /// Comment attached to the new version.
    pub version_comment: Option<String>,
}

impl UpdateRequest {
    /// Creates a request that only bumps the version.
    #[must_use]
    pub const fn new(id: ContentId) -> Self {
        Self {
            id,
            version: None,
            title: None,
            content: None,
            version_comment: None,
        }
    }
}

/// Reads the current state of an item.
///
/// # Errors
///
/// Returns [`Error::Remote`] with context `"failed to retrieve current content"`.
pub async fn fetch_current(client: &ConfluenceClient, id: &ContentId) -> Result<ContentItem> {
    let query = QuerySpec::new().with("expand", CURRENT_STATE_EXPAND);
    client
        .get_json(&id.path(), Some(&query))
        .await
        .map_err(|e| Error::remote("failed to retrieve current content", e))
}

/// Computes the replacement item from the current state and the request.
///
/// Type and space are copied from `current`. Title and body fall back to the
/// current values when the request leaves them unset.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if no explicit version was requested and
/// `current` has no version block.
pub fn plan_update(current: ContentItem, request: &UpdateRequest) -> Result<ContentItem> {
    let number = match request.version {
        Some(number) => number,
        None => current
            .version
            .as_ref()
            .map(|v| v.number.saturating_add(1))
            .ok_or_else(|| {
                Error::InvalidInput(
                    "could not determine current version from API response".to_string(),
                )
            })?,
    };

    let title = request.title.clone().unwrap_or(current.title);
    let body = match &request.content {
        Some(content) => Some(Body::storage(content.clone())),
        None => current.body,
    };

    Ok(ContentItem {
        id: Some(request.id.as_str().to_string()),
        kind: current.kind,
        title,
        space: current.space,
        body,
        version: Some(Version {
            number,
            message: request.version_comment.clone(),
        }),
        ancestors: Vec::new(),
    })
}

/// Writes the planned item back and returns the raw response body.
///
/// # Errors
///
/// Returns [`Error::Remote`] with context `"error updating content"`.
pub async fn submit(
    client: &ConfluenceClient,
    id: &ContentId,
    item: &ContentItem,
) -> Result<Vec<u8>> {
    client
        .put(&id.path(), item)
        .await
        .map_err(|e| Error::remote("error updating content", e))
}

/// Runs the full fetch, plan, submit sequence.
///
/// # Errors
///
/// Propagates the first failing step.
pub async fn update_content(client: &ConfluenceClient, request: &UpdateRequest) -> Result<Vec<u8>> {
    let current = fetch_current(client, &request.id).await?;
    let planned = plan_update(current, request)?;
    tracing::debug!(
        content_id = %request.id,
        version = planned.version.as_ref().map_or(0, |v| v.number),
        "Submitting content update"
    );
    submit(client, &request.id, &planned).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BodyStorage, SpaceRef};

    fn current() -> ContentItem {
        ContentItem {
            id: Some("123".to_string()),
            kind: "page".to_string(),
            title: "Old Title".to_string(),
            space: Some(SpaceRef {
                key: "ENG".to_string(),
            }),
            body: Some(Body {
                storage: Some(BodyStorage {
                    value: "<p>old</p>".to_string(),
                    representation: "storage".to_string(),
                }),
            }),
            version: Some(Version {
                number: 1,
                message: None,
            }),
            ancestors: Vec::new(),
        }
    }

    fn request() -> UpdateRequest {
        UpdateRequest::new(ContentId::parse("123").unwrap())
    }

    #[test]
    fn test_version_defaults_to_current_plus_one() {
        let planned = plan_update(current(), &request()).unwrap();
        assert_eq!(planned.version.unwrap().number, 2);
    }

    #[test]
    fn test_explicit_version_wins() {
        let mut request = request();
        request.version = Some(10);
        let planned = plan_update(current(), &request).unwrap();
        assert_eq!(planned.version.unwrap().number, 10);
    }

    #[test]
    fn test_missing_version_block_is_an_error() {
        let mut current = current();
        current.version = None;
        let err = plan_update(current, &request()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "could not determine current version from API response"
        );
    }

    #[test]
    fn test_missing_version_block_ok_with_explicit_version() {
        let mut current = current();
        current.version = None;
        let mut request = request();
        request.version = Some(4);
        assert_eq!(
            plan_update(current, &request).unwrap().version.unwrap().number,
            4
        );
    }

    #[test]
    fn test_unset_fields_fall_back_to_current() {
        let planned = plan_update(current(), &request()).unwrap();
        assert_eq!(planned.title, "Old Title");
        assert_eq!(planned.body, current().body);
        assert_eq!(planned.kind, "page");
        assert_eq!(planned.space, current().space);
        assert_eq!(planned.id.as_deref(), Some("123"));
        assert!(planned.version.unwrap().message.is_none());
    }

    #[test]
    fn test_supplied_fields_replace_current() {
        let mut request = request();
        request.title = Some("New Title".to_string());
        request.content = Some("<p>new</p>".to_string());
        request.version_comment = Some("edited".to_string());
        let planned = plan_update(current(), &request).unwrap();
        assert_eq!(planned.title, "New Title");
        assert_eq!(planned.body, Some(Body::storage("<p>new</p>")));
        assert_eq!(planned.version.unwrap().message.as_deref(), Some("edited"));
    }

    #[test]
    fn test_current_without_body_stays_without_body() {
        let mut current = current();
        current.body = None;
        let planned = plan_update(current, &request()).unwrap();
        let value = serde_json::to_value(&planned).unwrap();
        assert!(value.get("body").is_none());
    }
}
