pub mod mcp;
pub mod stdio;

pub use mcp::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, McpServer, ToolDefinition};
pub use stdio::serve;
