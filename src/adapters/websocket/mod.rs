//! WebSocket adapter: the chat transport.
//!
//! # Architecture
//!
//! ```text
//!   client ──frames──▶ handle_socket ──SessionCommand──▶ ChatSession
//!                                                          │
//!                                                          ▼
//!                                                     ChatServices
//!                                                          │ EventDispatcher
//!                                                          ▼
//!   client ◀──JSON── writer task ◀──mpsc── ConnectionHub ── RoomManager
//! ```
//!
//! # Components
//!
//! - [`messages`] - WebSocket message protocol types
//! - [`rooms`] - Group room subscriptions
//! - [`connections`] - Outbound queues, `EventDispatcher` implementation
//! - [`handler`] - Axum upgrade handler and health endpoint

pub mod connections;
pub mod handler;
pub mod messages;
pub mod rooms;

pub use connections::ConnectionHub;
pub use handler::{health_handler, websocket_router, ws_handler, HealthResponse, WebSocketState};
pub use messages::{ClientMessage, ErrorMessage, MessageDto, PongMessage, ServerMessage};
pub use rooms::RoomManager;
