//! # confluence-mcp
//!
//! A Model Context Protocol server for Confluence Data Center.
//!
//! Exposes content-management operations (get, search, create, update, and
//! space listing) as MCP tools and relays them to the Confluence REST API.
//!
//! ## Features
//!
//! - Single authenticated transport with pooled connections and bounded timeouts
//! - Typed, validated tool arguments with defaulted pagination
//! - Read-modify-write content updates that preserve the server version counter
//! - JSON-RPC 2.0 MCP server over stdio with per-call cancellation
//!
//! ## Example
//!
//! ```rust,ignore
//! use confluence_mcp::{ConfluenceClient, ConfluenceConfig, HttpSettings};
//! use confluence_mcp::mcp::{McpServer, ToolRegistry};
//!
//! let config = ConfluenceConfig::from_env()?;
//! let client = ConfluenceClient::new(config, HttpSettings::from_env())?;
//! McpServer::new(ToolRegistry::new(client)).run_stdio().await?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
// multiple_crate_versions is inherently crate-level (detects duplicate transitive dependencies).
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod client;
pub mod config;
pub mod mcp;
pub mod models;
pub mod observability;
pub mod services;

// Re-exports for convenience
pub use client::{ConfluenceClient, TransportError};
pub use config::{ConfigError, ConfluenceConfig, HttpSettings};
pub use models::{ContentId, ContentItem, QuerySpec};

/// Error type for confluence-mcp operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Missing required tool arguments, invalid content IDs, bad pagination values |
/// | `Config` | Credential or endpoint missing or malformed at startup |
/// | `Arguments` | Tool arguments are not a JSON object or have the wrong shape |
/// | `Remote` | The Confluence API call failed (network, status, encoding, decoding) |
/// | `OperationFailed` | Local I/O or client construction failures |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - A required argument is missing or empty (e.g., `contentId`, `cql`)
    /// - A content ID contains `/` or `..`
    /// - `limit`, `start`, or `version` are negative or not finite
    /// - The current item has no version block during an update
    #[error("{0}")]
    InvalidInput(String),

    /// Configuration could not be resolved.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Tool arguments had the wrong shape.
    #[error(transparent)]
    Arguments(#[from] mcp::MapperError),

    /// A call to the Confluence API failed.
    ///
    /// `context` is the operation-specific phrase shown to the caller,
    /// for example `"error getting content"`.
    #[error("{context}: {source}")]
    Remote {
        /// The operation-specific context phrase.
        context: &'static str,
        /// The underlying transport failure.
        source: client::TransportError,
    },

    /// An operation failed.
    ///
    /// Raised when:
    /// - The HTTP client cannot be built
    /// - Reading from or writing to the protocol stream fails
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

impl Error {
    /// Wraps a transport failure with an operation-specific context phrase.
    #[must_use]
    pub const fn remote(context: &'static str, source: client::TransportError) -> Self {
        Self::Remote { context, source }
    }
}

/// Result type alias for confluence-mcp operations.
pub type Result<T> = std::result::Result<T, Error>;
