mod cli;
mod sse;
mod stdio;
mod tools;

pub use cli::App;

use crate::api::{CatalogSource, PokeClient};
use crate::prelude::*;
use crate::session::CatalogSession;
use serde::{Deserialize, Serialize};

// JSON-RPC 2.0 types
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    id: Option<serde_json::Value>,
    method: String,
    params: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    jsonrpc: String,
    id: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

// MCP Protocol types
#[derive(Debug, Serialize)]
pub struct Tool {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

/// Everything a request handler needs: configuration plus the one catalog
/// session shared by every client of this server
pub struct ServerContext<S> {
    pub global: crate::Global,
    pub session: CatalogSession<S>,
}

impl<S: CatalogSource> ServerContext<S> {
    pub fn new(global: crate::Global, source: S) -> Self {
        let session = CatalogSession::new(source, global.page_size, global.favorites_path());
        Self { global, session }
    }

    pub fn source(&self) -> &S {
        self.session.source()
    }
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let client = PokeClient::from_global(&global)?;
    let context = ServerContext::new(global, client);

    match app.command {
        cli::Commands::Stdio => stdio::run_stdio(context).await,
        cli::Commands::Sse(options) => sse::run_sse(options, context).await,
    }
}

pub async fn handle_request<S: CatalogSource>(
    request_str: &str,
    context: &ServerContext<S>,
) -> JsonRpcResponse {
    let request: JsonRpcRequest = match serde_json::from_str(request_str) {
        Ok(req) => req,
        Err(e) => {
            return JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                id: None,
                result: None,
                error: Some(JsonRpcError {
                    code: -32700,
                    message: format!("Parse error: {e}"),
                    data: None,
                }),
            };
        }
    };

    let result = match request.method.as_str() {
        "initialize" => tools::handle_initialize(),
        "tools/list" => tools::handle_tools_list(),
        "tools/call" => tools::handle_tools_call(request.params, context).await,
        method => Err(JsonRpcError {
            code: -32601,
            message: format!("Method not found: {method}"),
            data: None,
        }),
    };

    match result {
        Ok(value) => JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id: request.id,
            result: Some(value),
            error: None,
        },
        Err(error) => JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id: request.id,
            result: None,
            error: Some(error),
        },
    }
}

#[cfg(test)]
pub(crate) fn test_context(count: u32) -> ServerContext<crate::testing::FakeSource> {
    use clap::Parser;

    let app = crate::App::parse_from(["pokedex", "--page-size", "4", "types"]);
    let mut global = app.global;
    global.favorites_file = None;
    ServerContext {
        session: CatalogSession::new(crate::testing::FakeSource::with_pokemon(count), 4, None),
        global,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn call(request: serde_json::Value) -> serde_json::Value {
        let context = test_context(5);
        let response = handle_request(&request.to_string(), &context).await;
        serde_json::to_value(response).unwrap()
    }

    #[tokio::test]
    async fn test_parse_error() {
        let context = test_context(1);
        let response = serde_json::to_value(handle_request("{nope", &context).await).unwrap();
        assert_eq!(response["error"]["code"], -32700);
        assert!(response["id"].is_null());
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let response = call(serde_json::json!({
            "jsonrpc": "2.0", "id": 3, "method": "resources/list"
        }))
        .await;
        assert_eq!(response["id"], 3);
        assert_eq!(response["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn test_initialize() {
        let response = call(serde_json::json!({
            "jsonrpc": "2.0", "id": 1, "method": "initialize"
        }))
        .await;
        assert_eq!(response["result"]["serverInfo"]["name"], "pokedex");
        assert!(response.get("error").is_none());
    }

    #[tokio::test]
    async fn test_tools_list_names() {
        let response = call(serde_json::json!({
            "jsonrpc": "2.0", "id": 2, "method": "tools/list"
        }))
        .await;
        let names: Vec<&str> = response["result"]["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                "pokemon_list",
                "pokemon_get",
                "pokemon_types",
                "pokemon_by_type",
                "pokemon_search",
                "pokemon_evolution",
                "catalog_view",
                "catalog_dispatch",
            ]
        );
    }
}
