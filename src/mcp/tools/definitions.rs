//! Tool definitions for MCP tools.
//!
//! Contains the JSON Schema definitions for all Confluence tools.

use super::ToolDefinition;

/// Tool name for reading one item.
pub const GET_CONTENT: &str = "confluence_get_content";
/// Tool name for CQL search.
pub const SEARCH_CONTENT: &str = "confluence_search_content";
/// Tool name for creating an item.
pub const CREATE_CONTENT: &str = "confluence_create_content";
/// Tool name for updating an item.
pub const UPDATE_CONTENT: &str = "confluence_update_content";
/// Tool name for listing spaces.
pub const LIST_SPACES: &str = "confluence_list_spaces";

/// Defines the get content tool.
pub fn get_content_tool() -> ToolDefinition {
    ToolDefinition {
        name: GET_CONTENT.to_string(),
        description: "Get Confluence content by ID from the Confluence Data Center instance"
            .to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "contentId": {
                    "type": "string",
                    "description": "Confluence Data Center content ID"
                },
                "expand": {
                    "type": "string",
                    "description": "Comma-separated list of properties to expand (body.storage is always included)"
                },
                "limit": {
                    "type": "number",
                    "description": "Maximum number of results to return (default: 25)",
                    "minimum": 0
                },
                "start": {
                    "type": "number",
                    "description": "The starting index of the results to return",
                    "minimum": 0
                }
            },
            "required": ["contentId"]
        }),
    }
}

/// Defines the search content tool.
pub fn search_content_tool() -> ToolDefinition {
    ToolDefinition {
        name: SEARCH_CONTENT.to_string(),
        description: "Search for content in the Confluence Data Center instance using CQL"
            .to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "cql": {
                    "type": "string",
                    "description": "Confluence Query Language (CQL) search string"
                },
                "limit": {
                    "type": "number",
                    "description": "Maximum number of results to return (default: 25)",
                    "minimum": 0
                },
                "start": {
                    "type": "number",
                    "description": "The starting index of the results to return",
                    "minimum": 0
                },
                "expand": {
                    "type": "string",
                    "description": "Comma-separated list of properties to expand"
                }
            },
            "required": ["cql"]
        }),
    }
}

/// Defines the create content tool.
pub fn create_content_tool() -> ToolDefinition {
    ToolDefinition {
        name: CREATE_CONTENT.to_string(),
        description: "Create a new page or blog post in the Confluence Data Center instance"
            .to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "The title of the new content"
                },
                "spaceKey": {
                    "type": "string",
                    "description": "The key of the space where content will be created"
                },
                "content": {
                    "type": "string",
                    "description": "The body of the content in Confluence storage format"
                },
                "type": {
                    "type": "string",
                    "description": "The type of content (default: page)",
                    "enum": ["page", "blogpost"]
                },
                "parentId": {
                    "type": "string",
                    "description": "The ID of the parent content"
                }
            },
            "required": ["title", "spaceKey", "content"]
        }),
    }
}

/// Defines the update content tool.
pub fn update_content_tool() -> ToolDefinition {
    ToolDefinition {
        name: UPDATE_CONTENT.to_string(),
        description: "Update existing content in the Confluence Data Center instance. Unset fields keep their current values.".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "contentId": {
                    "type": "string",
                    "description": "The ID of the content to update"
                },
                "version": {
                    "type": "number",
                    "description": "The new version number (default: current version + 1)",
                    "minimum": 1
                },
                "title": {
                    "type": "string",
                    "description": "New title for the content"
                },
                "content": {
                    "type": "string",
                    "description": "New body in Confluence storage format"
                },
                "versionComment": {
                    "type": "string",
                    "description": "A comment for the new version"
                }
            },
            "required": ["contentId"]
        }),
    }
}

/// Defines the list spaces tool.
pub fn list_spaces_tool() -> ToolDefinition {
    ToolDefinition {
        name: LIST_SPACES.to_string(),
        description: "List and search for spaces in the Confluence Data Center instance"
            .to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "searchText": {
                    "type": "string",
                    "description": "Text to match against space titles (returns all spaces if omitted)"
                },
                "limit": {
                    "type": "number",
                    "description": "Maximum number of spaces to return (default: 25)",
                    "minimum": 0
                },
                "start": {
                    "type": "number",
                    "description": "The starting index of the results to return",
                    "minimum": 0
                },
                "expand": {
                    "type": "string",
                    "description": "Comma-separated list of properties to expand"
                }
            }
        }),
    }
}
