use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::civic::CivicApiClient;
use crate::config::Config;
use crate::networks::NetworkKey;
use crate::tools::address::ValidateRequest;
use crate::tools::auth::AuthRequest;
use crate::tools::details::DetailsRequest;
use crate::tools::status::{BatchRequest, StatusRequest};
use crate::tools::{AddressTool, AuthTool, DetailsTool, NetworksTool, StatusTool, ToolResponse};

pub const SERVER_NAME: &str = "civic-pass-mcp-server";
pub const PROTOCOL_VERSION: &str = "2024-11-05";

const SCOPES: [&str; 5] = ["captcha", "uniqueness", "liveness", "id_verification", "all"];

/// JSON-RPC 2.0 Request format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    /// Absent for notifications. An explicit `null` is kept as `Some(Value::Null)`.
    #[serde(
        default,
        deserialize_with = "deserialize_present_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<Value>,
}

fn deserialize_present_id<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// JSON-RPC 2.0 Response format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    pub fn new(code: i32, message: impl Into<String>) -> Self {
        JsonRpcError {
            code,
            message: message.into(),
            data: None,
        }
    }
}

/// MCP Tool Definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// MCP Server for Civic Pass verification tools
pub struct McpServer {
    config: Config,
    status_tool: Arc<RwLock<Option<StatusTool>>>,
    details_tool: Arc<RwLock<Option<DetailsTool>>>,
    auth_tool: Arc<RwLock<Option<AuthTool>>>,
    address_tool: AddressTool,
    networks_tool: NetworksTool,
}

impl McpServer {
    pub fn new(config: Config) -> Self {
        McpServer {
            config,
            status_tool: Arc::new(RwLock::new(None)),
            details_tool: Arc::new(RwLock::new(None)),
            auth_tool: Arc::new(RwLock::new(None)),
            address_tool: AddressTool::new(),
            networks_tool: NetworksTool::new(),
        }
    }

    /// Build the Civic API client and the tools that share it
    pub async fn initialize(&self) -> crate::error::Result<()> {
        info!(
            "Initializing MCP server against Civic API: {}",
            self.config.api_base_url
        );

        let client = Arc::new(CivicApiClient::new(self.config.clone())?);

        *self.status_tool.write().await = Some(StatusTool::new(Arc::clone(&client)));
        *self.details_tool.write().await = Some(DetailsTool::new(Arc::clone(&client)));
        *self.auth_tool.write().await = Some(AuthTool::new(client));

        info!("MCP server initialized successfully");
        Ok(())
    }

    /// Tool definitions advertised through `tools/list`
    pub fn get_tool_definitions(&self) -> Vec<ToolDefinition> {
        let network_keys: Vec<&str> = NetworkKey::ALL.iter().map(|k| k.as_str()).collect();

        vec![
            ToolDefinition {
                name: "check_civic_pass_status".to_string(),
                description: "Check Civic Pass status for ANY wallet address on any supported network"
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "walletAddress": {
                            "type": "string",
                            "description": "Any wallet address (0x... for EVM, base58 for Solana)"
                        },
                        "network": {
                            "type": "string",
                            "enum": network_keys,
                            "description": "Blockchain network"
                        },
                        "scope": {
                            "type": "string",
                            "enum": SCOPES,
                            "default": "all",
                            "description": "Verification scope"
                        },
                        "gatekeeperNetwork": {
                            "type": "string",
                            "description": "Custom gatekeeper network (uses default if not provided)"
                        }
                    },
                    "required": ["walletAddress", "network"]
                }),
            },
            ToolDefinition {
                name: "batch_check_wallets".to_string(),
                description: "Check Civic Pass status for multiple wallet addresses at once"
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "walletAddresses": {
                            "type": "array",
                            "items": { "type": "string" },
                            "description": "Array of wallet addresses to check"
                        },
                        "network": {
                            "type": "string",
                            "enum": network_keys,
                            "description": "Blockchain network"
                        },
                        "scope": {
                            "type": "string",
                            "enum": SCOPES,
                            "default": "all",
                            "description": "Verification scope"
                        }
                    },
                    "required": ["walletAddresses", "network"]
                }),
            },
            ToolDefinition {
                name: "get_pass_details".to_string(),
                description: "Get detailed Civic Pass information for any wallet address"
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "walletAddress": {
                            "type": "string",
                            "description": "Wallet address to get details for"
                        },
                        "network": {
                            "type": "string",
                            "enum": network_keys,
                            "description": "Blockchain network"
                        },
                        "includePII": {
                            "type": "boolean",
                            "default": false,
                            "description": "Include personally identifiable information (requires user consent)"
                        }
                    },
                    "required": ["walletAddress", "network"]
                }),
            },
            ToolDefinition {
                name: "authenticate_civic_api".to_string(),
                description: "Get OAuth2 access token for Civic Pass API".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "environment": {
                            "type": "string",
                            "enum": ["sandbox", "production"],
                            "default": "sandbox",
                            "description": "API environment"
                        }
                    }
                }),
            },
            ToolDefinition {
                name: "validate_wallet_address".to_string(),
                description:
                    "Validate if a wallet address has the correct format for the specified network"
                        .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "walletAddress": {
                            "type": "string",
                            "description": "Wallet address to validate"
                        },
                        "network": {
                            "type": "string",
                            "enum": network_keys,
                            "description": "Target blockchain network"
                        }
                    },
                    "required": ["walletAddress", "network"]
                }),
            },
            ToolDefinition {
                name: "get_supported_networks".to_string(),
                description:
                    "Get list of all supported blockchain networks and their configurations"
                        .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {}
                }),
            },
        ]
    }

    /// Handle a JSON-RPC message. Notifications get no response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        debug!("Handling MCP request: {}", request.method);

        let Some(id) = request.id else {
            debug!("Notification received: {}", request.method);
            return None;
        };

        let response = if id.is_null() {
            warn!("Rejecting {} with a null id", request.method);
            Err(JsonRpcError::new(
                JsonRpcError::INVALID_REQUEST,
                "Request id must not be null",
            ))
        } else {
            self.dispatch(&request.method, &request.params).await
        };

        Some(match response {
            Ok(result) => JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                result: Some(result),
                error: None,
                id,
            },
            Err(err) => JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                result: None,
                error: Some(err),
                id,
            },
        })
    }

    async fn dispatch(&self, method: &str, params: &Value) -> Result<Value, JsonRpcError> {
        match method {
            "initialize" => Ok(self.handle_initialize(params)),
            "tools/list" => self.handle_tools_list(),
            "tools/call" => self.handle_tool_call(params).await,
            "ping" => Ok(json!({})),
            _ => Err(JsonRpcError::new(
                JsonRpcError::METHOD_NOT_FOUND,
                format!("Method not found: {}", method),
            )),
        }
    }

    fn handle_initialize(&self, params: &Value) -> Value {
        let protocol_version = params
            .get("protocolVersion")
            .and_then(|v| v.as_str())
            .unwrap_or(PROTOCOL_VERSION);

        json!({
            "protocolVersion": protocol_version,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            }
        })
    }

    fn handle_tools_list(&self) -> Result<Value, JsonRpcError> {
        let tools = serde_json::to_value(self.get_tool_definitions()).map_err(|e| {
            JsonRpcError::new(
                JsonRpcError::INTERNAL_ERROR,
                format!("Internal error: {}", e),
            )
        })?;
        Ok(json!({ "tools": tools }))
    }

    async fn handle_tool_call(&self, params: &Value) -> Result<Value, JsonRpcError> {
        let tool_name = params
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                JsonRpcError::new(
                    JsonRpcError::INVALID_PARAMS,
                    "Missing or invalid 'name' parameter",
                )
            })?;

        let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

        info!("Tool call: {}", tool_name);

        match tool_name {
            "check_civic_pass_status" => {
                let request: StatusRequest = parse_arguments(arguments)?;
                let status_tool = self.status_tool.read().await;
                let tool = status_tool.as_ref().ok_or_else(|| not_initialized("Status"))?;
                tool_result(
                    tool.check_pass_status(request).await,
                    "Failed to check pass status",
                )
            }
            "batch_check_wallets" => {
                let request: BatchRequest = parse_arguments(arguments)?;
                let status_tool = self.status_tool.read().await;
                let tool = status_tool.as_ref().ok_or_else(|| not_initialized("Status"))?;
                tool_result(tool.batch_check(request).await, "Batch check failed")
            }
            "get_pass_details" => {
                let request: DetailsRequest = parse_arguments(arguments)?;
                let details_tool = self.details_tool.read().await;
                let tool = details_tool.as_ref().ok_or_else(|| not_initialized("Details"))?;
                tool_result(
                    tool.get_pass_details(request).await,
                    "Failed to get pass details",
                )
            }
            "authenticate_civic_api" => {
                let request: AuthRequest = parse_arguments(arguments)?;
                let auth_tool = self.auth_tool.read().await;
                let tool = auth_tool.as_ref().ok_or_else(|| not_initialized("Auth"))?;
                tool_result(tool.authenticate(request).await, "Authentication failed")
            }
            "validate_wallet_address" => {
                let request: ValidateRequest = parse_arguments(arguments)?;
                tool_result(
                    self.address_tool.validate(request),
                    "Address validation failed",
                )
            }
            "get_supported_networks" => {
                tool_result(Ok(self.networks_tool.list()), "Failed to list networks")
            }
            _ => Err(JsonRpcError::new(
                JsonRpcError::METHOD_NOT_FOUND,
                format!("Tool not found: {}", tool_name),
            )),
        }
    }
}

fn parse_arguments<T: DeserializeOwned>(arguments: Value) -> Result<T, JsonRpcError> {
    serde_json::from_value(arguments).map_err(|e| {
        JsonRpcError::new(
            JsonRpcError::INVALID_PARAMS,
            format!("Invalid arguments: {}", e),
        )
    })
}

/// Shape a tool outcome as MCP content, prefixing failures with the operation name.
fn tool_result<T: Serialize>(
    outcome: crate::error::Result<T>,
    failure_prefix: &str,
) -> Result<Value, JsonRpcError> {
    let internal = |message: String| JsonRpcError::new(JsonRpcError::INTERNAL_ERROR, message);

    let response = outcome.map_err(|e| {
        warn!("{}: {}", failure_prefix, e);
        internal(format!("{}: {}", failure_prefix, e))
    })?;

    let content = ToolResponse::json(&response)
        .map_err(|e| internal(format!("{}: {}", failure_prefix, e)))?;
    serde_json::to_value(content).map_err(|e| internal(format!("Internal error: {}", e)))
}

fn not_initialized(tool: &str) -> JsonRpcError {
    JsonRpcError::new(
        JsonRpcError::INTERNAL_ERROR,
        format!("{} tool not initialized", tool),
    )
}
