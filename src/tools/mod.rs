pub mod address;
pub mod auth;
pub mod details;
pub mod networks;
pub mod status;

pub use address::AddressTool;
pub use auth::AuthTool;
pub use details::DetailsTool;
pub use networks::NetworksTool;
pub use status::StatusTool;

use serde::{Deserialize, Serialize};

use crate::error::{CivicError, Result};

/// One MCP content block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

/// Result of a `tools/call`, in MCP content form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResponse {
    pub content: Vec<ToolContent>,
}

impl ToolResponse {
    /// Wrap a response as a single pretty-printed JSON text block.
    pub fn json<T: Serialize>(value: &T) -> Result<Self> {
        let text = serde_json::to_string_pretty(value)
            .map_err(|e| CivicError::SerializationError(e.to_string()))?;

        Ok(ToolResponse {
            content: vec![ToolContent {
                content_type: "text".to_string(),
                text,
            }],
        })
    }
}
