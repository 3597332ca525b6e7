//! MCP tool implementations.
//!
//! Provides tool handlers for the Model Context Protocol.
//!
//! # Module Structure
//!
//! - [`definitions`]: Tool schema definitions (JSON Schema for input validation)
//! - [`handlers`]: Tool execution logic
//!   - `handlers::content`: get, search, create and update
//!   - `handlers::spaces`: space listing

pub mod definitions;
mod handlers;

use crate::client::ConfluenceClient;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Registry of MCP tools bound to one shared transport.
pub struct ToolRegistry {
    /// Available tools.
    tools: HashMap<String, ToolDefinition>,
    /// Transport injected into every handler.
    client: ConfluenceClient,
}

impl ToolRegistry {
    /// Creates a new tool registry with all Confluence tools.
    #[must_use]
    pub fn new(client: ConfluenceClient) -> Self {
        let tools = Self::definitions()
            .into_iter()
            .map(|tool| (tool.name.clone(), tool))
            .collect();

        Self { tools, client }
    }

    /// Returns the definitions of every tool, independent of any transport.
    #[must_use]
    pub fn definitions() -> Vec<ToolDefinition> {
        vec![
            definitions::get_content_tool(),
            definitions::search_content_tool(),
            definitions::create_content_tool(),
            definitions::update_content_tool(),
            definitions::list_spaces_tool(),
        ]
    }

    /// Returns all tool definitions, sorted by name.
    #[must_use]
    pub fn list_tools(&self) -> Vec<&ToolDefinition> {
        let mut tools: Vec<&ToolDefinition> = self.tools.values().collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    /// Executes a tool with the given arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool is unknown or its execution fails.
    pub async fn execute(&self, name: &str, arguments: Option<Value>) -> Result<ToolResult> {
        let client = &self.client;
        match name {
            definitions::GET_CONTENT => handlers::execute_get_content(client, arguments).await,
            definitions::SEARCH_CONTENT => {
                handlers::execute_search_content(client, arguments).await
            },
            definitions::CREATE_CONTENT => {
                handlers::execute_create_content(client, arguments).await
            },
            definitions::UPDATE_CONTENT => {
                handlers::execute_update_content(client, arguments).await
            },
            definitions::LIST_SPACES => handlers::execute_list_spaces(client, arguments).await,
            _ => Err(Error::InvalidInput(format!("Unknown tool: {name}"))),
        }
    }

    /// Executes a tool, folding any failure into an error result.
    pub async fn call(&self, name: &str, arguments: Option<Value>) -> ToolResult {
        match self.execute(name, arguments).await {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!(tool = name, error = %e, "Tool call failed");
                ToolResult::error(e.to_string())
            },
        }
    }
}

/// Definition of an MCP tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name.
    pub name: String,
    /// Tool description.
    pub description: String,
    /// JSON Schema for input validation.
    pub input_schema: Value,
}

/// Result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
    /// Whether the result represents an error.
    #[serde(default)]
    pub is_error: bool,
}

impl ToolResult {
    /// Creates an error result carrying a single text message.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }

    /// Returns the text of the first content block, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.content.first().map(|c| match c {
            ToolContent::Text { text } => text.as_str(),
        })
    }
}

/// Content types that can be returned by tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}
