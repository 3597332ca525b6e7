//! Data models for confluence-mcp.
//!
//! Wire types exchanged with the Confluence API and the query builder used by
//! every operation.

mod content;
mod query;

pub use content::{
    Ancestor, Body, BodyStorage, ContentId, ContentItem, ContentKind, STORAGE_REPRESENTATION,
    SpaceRef, Version,
};
pub use query::{DEFAULT_LIMIT, QuerySpec, ensure_expand_contains, non_negative};
