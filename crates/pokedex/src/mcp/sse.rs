use crate::prelude::{eprintln, *};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures::channel::mpsc::{self, UnboundedSender};
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tower_http::cors::{Any, CorsLayer};

use super::cli::SseOptions;
use super::ServerContext;
use crate::api::PokeClient;

/// Server context plus the open event streams, keyed by session id
struct SseState {
    context: ServerContext<PokeClient>,
    clients: Mutex<HashMap<u64, UnboundedSender<String>>>,
    next_session: AtomicU64,
}

type SharedState = Arc<SseState>;

impl SseState {
    fn connect(&self) -> (u64, mpsc::UnboundedReceiver<String>) {
        let id = self.next_session.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded();
        self.lock_clients().insert(id, tx);
        log::debug!("SSE session {} connected", id);
        (id, rx)
    }

    /// Push `message` to session `id`. Returns false when the session is gone.
    fn send(&self, id: u64, message: String) -> bool {
        let mut clients = self.lock_clients();
        let Some(tx) = clients.get(&id) else {
            return false;
        };
        if tx.unbounded_send(message).is_err() {
            log::debug!("SSE session {} disconnected", id);
            clients.remove(&id);
            return false;
        }
        true
    }

    fn lock_clients(&self) -> std::sync::MutexGuard<'_, HashMap<u64, UnboundedSender<String>>> {
        self.clients.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn router(context: ServerContext<PokeClient>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = Arc::new(SseState {
        context,
        clients: Mutex::new(HashMap::new()),
        next_session: AtomicU64::new(0),
    });

    Router::new()
        .route("/sse", get(sse_handler))
        .route("/message", post(message_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn run_sse(options: SseOptions, context: ServerContext<PokeClient>) -> Result<()> {
    let verbose = context.global.verbose;
    if verbose {
        eprintln!(
            "Starting MCP server with SSE transport on {}:{}...",
            options.host, options.port
        );
    }

    let addr = format!("{}:{}", options.host, options.port);
    let app_router = router(context);

    if verbose {
        eprintln!("MCP server listening on http://{}", addr);
        eprintln!("SSE endpoint: http://{}/sse", addr);
        eprintln!("Message endpoint: http://{}/message", addr);
    }

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| eyre!("Failed to bind to {}: {}", addr, e))?;

    log::info!("pokedex MCP server listening on {}", addr);

    axum::serve(listener, app_router)
        .await
        .map_err(|e| eyre!("Server error: {e}"))?;

    Ok(())
}

/// Opens a session. The first event names the URL to POST requests to, and
/// every response to those requests follows as a `message` event.
async fn sse_handler(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (id, rx) = state.connect();
    let endpoint = Event::default()
        .event("endpoint")
        .data(f!("/message?session_id={id}"));

    let stream = stream::once(async move { endpoint })
        .chain(rx.map(|message| Event::default().event("message").data(message)))
        .map(Ok::<_, Infallible>);

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[derive(Debug, Deserialize)]
struct MessageQuery {
    session_id: Option<u64>,
}

/// Handles one JSON-RPC request. With a `session_id` the response goes out on
/// that session's event stream, otherwise it is the HTTP response body.
async fn message_handler(
    State(state): State<SharedState>,
    Query(query): Query<MessageQuery>,
    Json(request): Json<serde_json::Value>,
) -> Response {
    let request_str = serde_json::to_string(&request).unwrap_or_default();
    let response = super::handle_request(&request_str, &state.context).await;

    let Some(session_id) = query.session_id else {
        return Json(serde_json::to_value(response).unwrap_or(serde_json::Value::Null))
            .into_response();
    };

    let message = serde_json::to_string(&response).unwrap_or_default();
    if state.send(session_id, message) {
        StatusCode::ACCEPTED.into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            f!("Unknown SSE session {session_id}"),
        )
            .into_response()
    }
}
