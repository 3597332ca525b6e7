//! Tool execution handlers.
//!
//! This module contains the execution logic for all MCP tools,
//! organized into submodules by domain.

mod content;
mod spaces;

pub use content::{
    execute_create_content, execute_get_content, execute_search_content, execute_update_content,
};
pub use spaces::execute_list_spaces;

use super::{ToolContent, ToolResult};

/// Wraps a raw response body as a successful text result.
fn text_result(body: &[u8]) -> ToolResult {
    ToolResult {
        content: vec![ToolContent::Text {
            text: String::from_utf8_lossy(body).into_owned(),
        }],
        is_error: false,
    }
}
