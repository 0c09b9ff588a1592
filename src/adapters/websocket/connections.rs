//! Connection hub: the WebSocket implementation of `EventDispatcher`.
//!
//! Every attached connection owns a bounded outbound queue drained by its
//! writer task. Delivery never waits: a full queue drops the event and a
//! closed queue means the connection is gone.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{mpsc, RwLock};

use crate::domain::chat::ChatEvent;
use crate::domain::foundation::{ConnectionHandle, GroupId};
use crate::ports::EventDispatcher;

use super::messages::ServerMessage;
use super::rooms::RoomManager;

pub struct ConnectionHub {
    connections: RwLock<HashMap<ConnectionHandle, mpsc::Sender<ServerMessage>>>,
    rooms: RoomManager,
    buffer: usize,
}

impl ConnectionHub {
    /// `buffer` is the per-connection outbound queue length.
    pub fn new(buffer: usize) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            rooms: RoomManager::new(),
            buffer: buffer.max(1),
        }
    }

    /// Register a new connection and hand back its outbound queue.
    pub async fn attach(&self) -> (ConnectionHandle, mpsc::Receiver<ServerMessage>) {
        let handle = ConnectionHandle::new();
        let (tx, rx) = mpsc::channel(self.buffer);
        self.connections.write().await.insert(handle, tx);
        (handle, rx)
    }

    /// Forget a connection. Its writer task ends once the queue drains.
    pub async fn detach(&self, handle: &ConnectionHandle) {
        self.connections.write().await.remove(handle);
        self.rooms.leave_all(handle).await;
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    pub fn rooms(&self) -> &RoomManager {
        &self.rooms
    }

    fn try_send(
        handle: &ConnectionHandle,
        tx: &mpsc::Sender<ServerMessage>,
        msg: ServerMessage,
        event: &'static str,
    ) -> bool {
        match tx.try_send(msg) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(connection = %handle, event, "Outbound queue full; event dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(connection = %handle, event, "Connection closed; event dropped");
                false
            }
        }
    }
}

#[async_trait]
impl EventDispatcher for ConnectionHub {
    async fn deliver(&self, to: &ConnectionHandle, event: ChatEvent) -> bool {
        let name = event.name();
        let connections = self.connections.read().await;
        match connections.get(to) {
            Some(tx) => Self::try_send(to, tx, event.into(), name),
            None => {
                tracing::debug!(connection = %to, event = name, "Unknown connection; event dropped");
                false
            }
        }
    }

    async fn broadcast(&self, event: ChatEvent) {
        let name = event.name();
        let msg = ServerMessage::from(event);
        let connections = self.connections.read().await;
        for (handle, tx) in connections.iter() {
            Self::try_send(handle, tx, msg.clone(), name);
        }
    }

    async fn join_room(&self, handle: &ConnectionHandle, group_id: &GroupId) {
        self.rooms.join(group_id, *handle).await;
    }

    async fn leave_room(&self, handle: &ConnectionHandle, group_id: &GroupId) {
        self.rooms.leave(group_id, handle).await;
    }

    async fn leave_all_rooms(&self, handle: &ConnectionHandle) {
        self.rooms.leave_all(handle).await;
    }
}
