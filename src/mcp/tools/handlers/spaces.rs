//! Space tool execution handlers.

use crate::client::ConfluenceClient;
use crate::mcp::tool_types::{ListSpacesArgs, decode_arguments};
use crate::{Error, Result};
use serde_json::Value;

use super::text_result;
use super::super::ToolResult;

/// Executes the list spaces tool.
///
/// Spaces are found through the general `/search` endpoint with a
/// `type=space` CQL filter.
pub async fn execute_list_spaces(
    client: &ConfluenceClient,
    arguments: Option<Value>,
) -> Result<ToolResult> {
    let args: ListSpacesArgs = decode_arguments(arguments)?;
    let query = args.validate()?;

    let body = client
        .get("/search", &query)
        .await
        .map_err(|e| Error::remote("error listing spaces", e))?;

    Ok(text_result(&body))
}
