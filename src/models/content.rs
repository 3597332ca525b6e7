//! Confluence content item wire model.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Representation tag used for storage-format bodies.
pub const STORAGE_REPRESENTATION: &str = "storage";

/// Validated Confluence content identifier.
///
/// Non-empty, not `.`, and free of `/` and `..`, so it always maps to
/// exactly one path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentId(String);

impl ContentId {
    /// Validates and wraps a content identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the identifier is empty, is `.`, or
    /// contains `/` or `..`.
    pub fn parse(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::InvalidInput("contentId is required".to_string()));
        }
        if id == "." || id.contains('/') || id.contains("..") {
            return Err(Error::InvalidInput("invalid contentId format".to_string()));
        }
        Ok(Self(id))
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the operation path for this item (`/content/{id}`).
    #[must_use]
    pub fn path(&self) -> String {
        format!("/content/{}", self.0)
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A page or blog post as exchanged with the Confluence API.
///
/// Absent optional blocks are omitted when serialized; unknown fields in
/// fetched items are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Content ID (absent on create).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Content type, e.g. `page` or `blogpost`.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Title.
    #[serde(default)]
    pub title: String,
    /// Owning space.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space: Option<SpaceRef>,
    /// Body block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
    /// Version block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
    /// Parent chain; only the direct parent is ever sent.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ancestors: Vec<Ancestor>,
}

/// Reference to a space by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceRef {
    /// Space key.
    #[serde(default)]
    pub key: String,
}

/// Body container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Body {
    /// Storage-format representation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<BodyStorage>,
}

impl Body {
    /// Wraps an opaque storage-format document.
    #[must_use]
    pub fn storage(value: impl Into<String>) -> Self {
        Self {
            storage: Some(BodyStorage {
                value: value.into(),
                representation: STORAGE_REPRESENTATION.to_string(),
            }),
        }
    }
}

/// Storage-format body. The value is passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyStorage {
    /// The storage-format document.
    #[serde(default)]
    pub value: String,
    /// Always `storage` for bodies built here.
    #[serde(default)]
    pub representation: String,
}

/// Version block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Server-assigned version counter.
    pub number: u64,
    /// Version comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Ancestor reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ancestor {
    /// Ancestor content ID.
    pub id: String,
}

/// Content types accepted on create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentKind {
    /// A page.
    #[default]
    Page,
    /// A blog post.
    BlogPost,
}

impl ContentKind {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::BlogPost => "blogpost",
        }
    }

    /// Parses a wire name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for anything but `page` or `blogpost`.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "page" => Ok(Self::Page),
            "blogpost" => Ok(Self::BlogPost),
            other => Err(Error::InvalidInput(format!(
                "invalid type '{other}': must be 'page' or 'blogpost'"
            ))),
        }
    }
}

impl ContentItem {
    /// Builds a new item for creation with a storage-format body.
    #[must_use]
    pub fn draft(
        kind: ContentKind,
        title: impl Into<String>,
        space_key: impl Into<String>,
        storage: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            title: title.into(),
            space: Some(SpaceRef {
                key: space_key.into(),
            }),
            body: Some(Body::storage(storage)),
            ..Self::default()
        }
    }

    /// Sets the direct parent.
    #[must_use]
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.ancestors = vec![Ancestor {
            id: parent_id.into(),
        }];
        self
    }
}
