//! MCP server implementation.
//!
//! Provides a Model Context Protocol server exposing Confluence content
//! operations.
//!
//! ## Tools
//!
//! - `confluence_get_content`, `confluence_search_content`
//! - `confluence_create_content`, `confluence_update_content`
//! - `confluence_list_spaces`
//!
//! ## Usage
//!
//! ```bash
//! confluence-mcp serve
//! ```

mod dispatch;
mod server;
pub mod tool_types;
mod tools;

pub use dispatch::McpMethod;
pub use server::{MAX_REQUEST_BODY_SIZE, McpServer, PROTOCOL_VERSION, SERVER_NAME};
pub use tool_types::{MapperError, extract_arguments};
pub use tools::{ToolContent, ToolDefinition, ToolRegistry, ToolResult, definitions};
