//! HTTP face of the bus: one websocket per topic subscription, plus a topic listing.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use futures_util::stream::StreamExt;
use tracing::{debug, info};

use crate::bus::Subscription;
use crate::error::AgentError;
use crate::state::AppState;

use std::collections::HashMap;
use std::sync::atomic::Ordering;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ws/*topic", get(ws_handler))
        .route("/topics", get(topics_handler))
        .with_state(state)
}

fn authorized(state: &AppState, q: &HashMap<String, String>) -> bool {
    match state.auth_token.as_ref() {
        Some(expected) => q.get("token") == Some(expected),
        None => true,
    }
}

pub async fn topics_handler(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&state, &q) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(state.bus.topics()).into_response()
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(topic): Path<String>,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&state, &q) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    // Subscribe before upgrading so nothing published after the handshake is missed.
    let Some(sub) = state.bus.subscribe(&topic) else {
        return (StatusCode::NOT_FOUND, AgentError::UnknownTopic(topic).to_string()).into_response();
    };
    ws.on_upgrade(move |socket| handle_socket(socket, sub, state))
}

async fn handle_socket(mut socket: WebSocket, mut sub: Subscription, state: AppState) {
    let n = state.client_count.fetch_add(1, Ordering::Relaxed) + 1;
    info!("subscriber connected to {} ({n} connected)", sub.name());

    // Ensure we decrement on disconnect (drop).
    struct ClientGuard(AppState);
    impl Drop for ClientGuard {
        fn drop(&mut self) {
            self.0.client_count.fetch_sub(1, Ordering::Relaxed);
        }
    }
    let _guard = ClientGuard(state.clone());

    loop {
        tokio::select! {
            msg = sub.recv() => match msg {
                Some(text) => {
                    if socket.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
            incoming = socket.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                // Subscribers have nothing to say; pings are answered by axum.
                Some(Ok(_)) => {}
            },
        }
    }
    debug!("subscriber left {}", sub.name());
}
