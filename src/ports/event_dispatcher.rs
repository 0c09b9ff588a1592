//! EventDispatcher port - outbound delivery to live connections.
//!
//! Delivery is fire-and-forget: no acknowledgment, no retry, no queueing
//! for connections that are gone.

use async_trait::async_trait;

use crate::domain::chat::ChatEvent;
use crate::domain::foundation::{ConnectionHandle, GroupId};

/// Port for pushing events to connections and tracking group rooms.
#[async_trait]
pub trait EventDispatcher: Send + Sync {
    /// Deliver an event to one connection.
    ///
    /// Returns `false` if the connection is unknown or could not take the
    /// event.
    async fn deliver(&self, to: &ConnectionHandle, event: ChatEvent) -> bool;

    /// Deliver an event to every attached connection.
    async fn broadcast(&self, event: ChatEvent);

    /// Subscribe a connection to a group's room.
    async fn join_room(&self, handle: &ConnectionHandle, group_id: &GroupId);

    /// Unsubscribe a connection from a group's room.
    async fn leave_room(&self, handle: &ConnectionHandle, group_id: &GroupId);

    /// Drop every room subscription of a connection.
    async fn leave_all_rooms(&self, handle: &ConnectionHandle);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_dispatcher_is_object_safe() {
        fn _accepts_dyn(_dispatcher: &dyn EventDispatcher) {}
    }
}
