mod catalog;
mod pokemon;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::ServerContext;
use crate::api::CatalogSource;

// Re-export types needed by tool handlers
pub use super::{JsonRpcError, Tool};

// MCP Protocol types for tools
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ServerCapabilities {
    pub tools: Option<ToolsCapability>,
}

#[derive(Debug, Serialize)]
pub struct ToolsCapability {}

#[derive(Debug, Serialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

#[derive(Debug, Serialize)]
pub struct ToolsList {
    pub tools: Vec<Tool>,
}

#[derive(Debug, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    pub arguments: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct CallToolResult {
    pub content: Vec<Content>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum Content {
    #[serde(rename = "text")]
    Text { text: String },
}

fn internal_error(e: impl std::fmt::Display) -> JsonRpcError {
    JsonRpcError {
        code: -32603,
        message: format!("Internal error: {e}"),
        data: None,
    }
}

/// Deserialize tool arguments; missing arguments are an empty object
pub(crate) fn parse_arguments<T: DeserializeOwned>(
    arguments: Option<serde_json::Value>,
) -> Result<T, JsonRpcError> {
    let arguments = arguments.unwrap_or_else(|| serde_json::json!({}));
    serde_json::from_value(arguments).map_err(|e| JsonRpcError {
        code: -32602,
        message: format!("Invalid arguments: {e}"),
        data: None,
    })
}

pub(crate) fn execution_error(e: impl std::fmt::Display) -> JsonRpcError {
    JsonRpcError {
        code: -32603,
        message: format!("Tool execution error: {e}"),
        data: None,
    }
}

/// Wrap `data` as pretty JSON text content
pub(crate) fn text_result<T: Serialize>(data: &T) -> Result<serde_json::Value, JsonRpcError> {
    let json_string = serde_json::to_string_pretty(data).map_err(|e| JsonRpcError {
        code: -32603,
        message: format!("Serialization error: {e}"),
        data: None,
    })?;

    let result = CallToolResult {
        content: vec![Content::Text { text: json_string }],
        is_error: None,
    };

    serde_json::to_value(result).map_err(internal_error)
}

pub fn handle_initialize() -> Result<serde_json::Value, JsonRpcError> {
    let result = InitializeResult {
        protocol_version: "2024-11-05".to_string(),
        capabilities: ServerCapabilities {
            tools: Some(ToolsCapability {}),
        },
        server_info: ServerInfo {
            name: "pokedex".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    };

    serde_json::to_value(result).map_err(internal_error)
}

pub fn handle_tools_list() -> Result<serde_json::Value, JsonRpcError> {
    let tools = vec![
        Tool {
            name: "pokemon_list".to_string(),
            description: "List one page of pokemon names from PokeAPI. Returns entries with their National Dex id, the total count and a command for the next page.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "limit": {
                        "type": "number",
                        "description": "Number of pokemon per page (default: the configured page size)"
                    },
                    "offset": {
                        "type": "number",
                        "description": "Position of the first pokemon to list (default: 0)"
                    }
                },
                "required": []
            }),
        },
        Tool {
            name: "pokemon_get".to_string(),
            description: "Get a pokemon by name or id. Returns its card (number, types, image, colors), height in meters, weight in kilograms, base stats with bar percentages and sprite URLs.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "pokemon": {
                        "type": "string",
                        "description": "Pokemon name or id (e.g., 'pikachu' or '25')"
                    }
                },
                "required": ["pokemon"]
            }),
        },
        Tool {
            name: "pokemon_types".to_string(),
            description: "List the selectable pokemon types with their display colors.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        },
        Tool {
            name: "pokemon_by_type".to_string(),
            description: "List pokemon of one type as cards. At most the first 100 members of the type are returned.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "type": {
                        "type": "string",
                        "description": "Type name (e.g., 'fire')"
                    }
                },
                "required": ["type"]
            }),
        },
        Tool {
            name: "pokemon_search".to_string(),
            description: "Look a pokemon up by exact name or id. Returns an empty result list when nothing matches.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Exact pokemon name or id"
                    }
                },
                "required": ["query"]
            }),
        },
        Tool {
            name: "pokemon_evolution".to_string(),
            description: "Resolve the evolution chain a pokemon belongs to. Stages are returned in pre-order (each stage before the forms it evolves into); stages that cannot be fetched are left out.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "pokemon": {
                        "type": "string",
                        "description": "Pokemon name or id"
                    }
                },
                "required": ["pokemon"]
            }),
        },
        Tool {
            name: "catalog_view".to_string(),
            description: "Return the current view of the shared browsing session: visible cards, type filters, query, favorites, loading flags and the open detail card. The first call loads the first page.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        },
        Tool {
            name: "catalog_dispatch".to_string(),
            description: "Send an intent to the shared browsing session and return the resulting view. Intent types: set_query {query}, toggle_type {name}, toggle_favorite {id}, toggle_favorites_only, clear_filters, select_item {id}, close_detail, request_load_more, scrolled {scroll_top, viewport_height, document_height}, retry.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "intent": {
                        "type": "object",
                        "description": "Intent object tagged by 'type' (e.g., {\"type\": \"toggle_type\", \"name\": \"fire\"})"
                    }
                },
                "required": ["intent"]
            }),
        },
    ];

    let result = ToolsList { tools };

    serde_json::to_value(result).map_err(internal_error)
}

pub async fn handle_tools_call<S: CatalogSource>(
    params: Option<serde_json::Value>,
    context: &ServerContext<S>,
) -> Result<serde_json::Value, JsonRpcError> {
    let params: CallToolParams = serde_json::from_value(params.unwrap_or(serde_json::Value::Null))
        .map_err(|e| JsonRpcError {
            code: -32602,
            message: format!("Invalid params: {e}"),
            data: None,
        })?;

    if context.global.verbose {
        crate::prelude::eprintln!("Calling {}: {:?}", params.name, params.arguments);
    }

    match params.name.as_str() {
        "pokemon_list" => pokemon::handle_pokemon_list(params.arguments, context).await,
        "pokemon_get" => pokemon::handle_pokemon_get(params.arguments, context).await,
        "pokemon_types" => pokemon::handle_pokemon_types(context).await,
        "pokemon_by_type" => pokemon::handle_pokemon_by_type(params.arguments, context).await,
        "pokemon_search" => pokemon::handle_pokemon_search(params.arguments, context).await,
        "pokemon_evolution" => pokemon::handle_pokemon_evolution(params.arguments, context).await,
        "catalog_view" => catalog::handle_catalog_view(context).await,
        "catalog_dispatch" => catalog::handle_catalog_dispatch(params.arguments, context).await,
        _ => Err(JsonRpcError {
            code: -32602,
            message: format!("Unknown tool: {}", params.name),
            data: None,
        }),
    }
}

#[cfg(test)]
pub(crate) fn tool_text(result: &serde_json::Value) -> serde_json::Value {
    let text = result["content"][0]["text"].as_str().unwrap();
    serde_json::from_str(text).unwrap()
}
