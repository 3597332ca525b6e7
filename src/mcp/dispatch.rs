//! MCP method dispatch.
//!
//! Parses JSON-RPC method names into [`McpMethod`] so the server matches on
//! an enum instead of strings.
//!
//! ```text
//! McpMethod (enum)
//!   ├── Initialize
//!   ├── Initialized      (notification)
//!   ├── Cancelled        (notification)
//!   ├── ListTools
//!   ├── CallTool
//!   ├── Ping
//!   └── Unknown(String)
//! ```

use std::fmt;

/// MCP method identifier.
///
/// Unknown methods are captured for error reporting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum McpMethod {
    /// Initialize the MCP session.
    Initialize,
    /// Client finished initialization.
    Initialized,
    /// Client cancelled an in-flight request.
    Cancelled,
    /// List available tools.
    ListTools,
    /// Call a specific tool.
    CallTool,
    /// Ping the server (health check).
    Ping,
    /// Unknown method (for error handling).
    Unknown(String),
}

impl McpMethod {
    /// Returns the MCP protocol method name.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::Initialize => "initialize",
            Self::Initialized => "notifications/initialized",
            Self::Cancelled => "notifications/cancelled",
            Self::ListTools => "tools/list",
            Self::CallTool => "tools/call",
            Self::Ping => "ping",
            Self::Unknown(s) => s.as_str(),
        }
    }

    /// Returns true if this is a known method.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    /// Returns true for methods that never receive a response.
    #[must_use]
    pub const fn is_notification(&self) -> bool {
        matches!(self, Self::Initialized | Self::Cancelled)
    }
}

impl From<&str> for McpMethod {
    fn from(s: &str) -> Self {
        match s {
            "initialize" => Self::Initialize,
            "notifications/initialized" => Self::Initialized,
            "notifications/cancelled" => Self::Cancelled,
            "tools/list" => Self::ListTools,
            "tools/call" => Self::CallTool,
            "ping" => Self::Ping,
            unknown => Self::Unknown(unknown.to_string()),
        }
    }
}

impl fmt::Display for McpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
