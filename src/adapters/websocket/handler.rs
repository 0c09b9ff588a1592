//! WebSocket upgrade handler for chat connections.
//!
//! Handles the HTTP → WebSocket upgrade and manages the connection lifecycle:
//! 1. Attach to the connection hub and open a chat session
//! 2. Spawn a writer draining the connection's outbound queue
//! 3. Read frames one at a time and dispatch them to the session
//! 4. On close, disconnect the session and detach from the hub

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    routing::get,
    Json, Router,
};
use futures::{SinkExt, StreamExt};
use serde::Serialize;

use crate::application::ChatServices;
use crate::domain::chat::ChatError;
use crate::domain::foundation::ValidationError;

use super::connections::ConnectionHub;
use super::messages::{ClientMessage, ServerMessage};

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    pub services: Arc<ChatServices>,
    pub hub: Arc<ConnectionHub>,
}

impl WebSocketState {
    pub fn new(services: Arc<ChatServices>, hub: Arc<ConnectionHub>) -> Self {
        Self { services, hub }
    }
}

/// Handle WebSocket upgrade requests.
///
/// Route: `GET /ws`
///
/// Connections start unbound; the client names itself with a `register`
/// frame. There is no authentication beyond that.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<WebSocketState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Run one connection until the client goes away.
///
/// Inbound frames are handled inline, so a connection never has two
/// commands in flight and disconnect waits for the current one.
async fn handle_socket(socket: WebSocket, state: WebSocketState) {
    let (mut sender, mut receiver) = socket.split();
    let (handle, mut outbound) = state.hub.attach().await;

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = outbound.recv().await {
            if let Err(e) = send_message(&mut sender, &msg).await {
                tracing::debug!(connection = %handle, error = %e, "Send error, closing connection");
                break;
            }
        }
    });

    let mut session = state.services.open_session(handle).await;

    loop {
        tokio::select! {
            frame = receiver.next() => {
                let Some(frame) = frame else { break };
                match frame {
                    Ok(Message::Text(text)) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(msg) => session.dispatch(msg.into()).await,
                            Err(e) => {
                                tracing::debug!(connection = %handle, error = %e, "Malformed frame");
                                session.report(&malformed(e.to_string())).await;
                            }
                        }
                    }
                    Ok(Message::Binary(_)) => {
                        tracing::warn!(connection = %handle, "Received unsupported binary message");
                        session.report(&malformed("binary frames are not supported")).await;
                    }
                    Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                        // WebSocket protocol ping/pong - handled automatically by axum
                    }
                    Ok(Message::Close(_)) => {
                        tracing::debug!(connection = %handle, "Client sent close frame");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(connection = %handle, error = %e, "Receive error");
                        break;
                    }
                }
            }
            _ = &mut send_task => break,
        }
    }

    session.disconnect().await;
    state.hub.detach(&handle).await;
    send_task.abort();
}

fn malformed(reason: impl Into<String>) -> ChatError {
    ChatError::Validation(ValidationError::invalid_format("frame", reason))
}

/// Send a JSON message over the WebSocket.
async fn send_message(
    sender: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &ServerMessage,
) -> Result<(), axum::Error> {
    match serde_json::to_string(msg) {
        Ok(json) => sender.send(Message::Text(json)).await,
        Err(e) => {
            tracing::error!(error = %e, "ServerMessage serialization failed");
            Ok(())
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub online_identities: usize,
    pub connections: usize,
}

/// Route: `GET /health`
pub async fn health_handler(State(state): State<WebSocketState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        online_identities: state.services.registry().len().await,
        connections: state.hub.connection_count().await,
    })
}

/// Create axum router for the chat endpoints.
///
/// # Example
///
/// ```ignore
/// let app = websocket_router()
///     .with_state(WebSocketState::new(services, hub))
///     .layer(TraceLayer::new_for_http());
/// ```
pub fn websocket_router() -> Router<WebSocketState> {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health_handler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::foundation::ErrorCode;

    fn state() -> WebSocketState {
        let store = Arc::new(InMemoryStore::new());
        let hub = Arc::new(ConnectionHub::new(16));
        let services = Arc::new(ChatServices::new(
            store.clone(),
            store.clone(),
            store,
            hub.clone(),
            false,
        ));
        WebSocketState::new(services, hub)
    }

    #[test]
    fn malformed_frames_are_invalid_format() {
        assert_eq!(malformed("bad json").code(), ErrorCode::InvalidFormat);
    }

    #[tokio::test]
    async fn health_reports_counts() {
        let state = state();
        let (_handle, _rx) = state.hub.attach().await;

        let Json(health) = health_handler(State(state)).await;

        assert_eq!(health.status, "ok");
        assert_eq!(health.connections, 1);
        assert_eq!(health.online_identities, 0);
    }

    #[test]
    fn websocket_router_creates_routes() {
        let _router: Router<WebSocketState> = websocket_router();
    }
}
