//! MCP protocol types and JSON-RPC message structures

use relay_core::{BoundArguments, ToolSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol revision sent in `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC 2.0 request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Value,
    pub id: u64,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.into(),
            params,
            id,
        }
    }
}

/// Client capabilities. Serializes to `{}` when nothing is advertised;
/// servers reject an `initialize` without this member.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClientCapabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experimental: Option<Value>,
}

/// Client information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self {
            name: "mcp-relay".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Initialize request parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub protocol_version: String,
    pub capabilities: ClientCapabilities,
    pub client_info: ClientInfo,
}

impl InitializeParams {
    pub fn new(client_info: ClientInfo) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ClientCapabilities::default(),
            client_info,
        }
    }
}

/// Initialize response result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    #[serde(default)]
    pub capabilities: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_info: Option<ServerInfo>,
}

/// Server information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

/// Tool call parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    pub arguments: BoundArguments,
}

/// List tools result
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ListToolsResult {
    #[serde(default)]
    pub tools: Vec<ToolSchema>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_rpc_request_serialization() {
        let request = JsonRpcRequest::new(7, "tools/list", json!({}));

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            json!({"jsonrpc": "2.0", "method": "tools/list", "params": {}, "id": 7})
        );
    }

    #[test]
    fn test_initialize_params_carry_empty_capabilities() {
        let params = InitializeParams::new(ClientInfo {
            name: "relay".into(),
            version: "1.0.0".into(),
        });
        let json = serde_json::to_value(&params).unwrap();

        assert_eq!(json["protocolVersion"], "2024-11-05");
        assert_eq!(json["capabilities"], json!({}));
        assert_eq!(json["clientInfo"], json!({"name": "relay", "version": "1.0.0"}));
    }

    #[test]
    fn test_list_tools_result_defaults_to_empty() {
        let result: ListToolsResult = serde_json::from_value(json!({})).unwrap();
        assert!(result.tools.is_empty());
    }
}
