//! Content tool execution handlers.
//!
//! Contains handlers for reading, searching, creating and updating pages and
//! blog posts.

use crate::client::ConfluenceClient;
use crate::mcp::tool_types::{
    CreateContentArgs, GetContentArgs, SearchContentArgs, UpdateContentArgs, decode_arguments,
};
use crate::services::update_content;
use crate::{Error, Result};
use serde_json::Value;

use super::text_result;
use super::super::ToolResult;

/// Executes the get content tool.
pub async fn execute_get_content(
    client: &ConfluenceClient,
    arguments: Option<Value>,
) -> Result<ToolResult> {
    let args: GetContentArgs = decode_arguments(arguments)?;
    let request = args.validate()?;

    let body = client
        .get(&request.id.path(), &request.query)
        .await
        .map_err(|e| Error::remote("error getting content", e))?;

    Ok(text_result(&body))
}

/// Executes the search content tool.
pub async fn execute_search_content(
    client: &ConfluenceClient,
    arguments: Option<Value>,
) -> Result<ToolResult> {
    let args: SearchContentArgs = decode_arguments(arguments)?;
    let query = args.validate()?;

    let body = client
        .get("/search", &query)
        .await
        .map_err(|e| Error::remote("error searching content", e))?;

    Ok(text_result(&body))
}

/// Executes the create content tool.
pub async fn execute_create_content(
    client: &ConfluenceClient,
    arguments: Option<Value>,
) -> Result<ToolResult> {
    let args: CreateContentArgs = decode_arguments(arguments)?;
    let item = args.validate()?;

    tracing::debug!(kind = %item.kind, "Creating content");
    let body = client
        .post("/content", &item)
        .await
        .map_err(|e| Error::remote("error creating content", e))?;

    Ok(text_result(&body))
}

/// Executes the update content tool.
///
/// Delegates to the read-modify-write sequence in [`crate::services::update`].
pub async fn execute_update_content(
    client: &ConfluenceClient,
    arguments: Option<Value>,
) -> Result<ToolResult> {
    let args: UpdateContentArgs = decode_arguments(arguments)?;
    let request = args.validate()?;

    let body = update_content(client, &request).await?;
    Ok(text_result(&body))
}
