//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the routing core to external systems:
//! - `memory` - In-memory persistence (no database configured, tests)
//! - `postgres` - PostgreSQL persistence via sqlx
//! - `websocket` - Axum WebSocket transport and `EventDispatcher`

pub mod memory;
pub mod postgres;
pub mod websocket;

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use websocket::{websocket_router, ConnectionHub, WebSocketState};
