//! WebSocket room management for group subscriptions.
//!
//! Rooms are organized by group ID. A connection may sit in any number of
//! rooms; the reverse index makes disconnect cleanup O(rooms of that
//! connection).
//!
//! ```text
//! Room: group-123      Room: group-456
//! ├── conn-a           ├── conn-a
//! ├── conn-b           └── conn-d
//! └── conn-c
//! ```

use std::collections::{HashMap, HashSet};

use tokio::sync::RwLock;

use crate::domain::foundation::{ConnectionHandle, GroupId};

#[derive(Default)]
struct Rooms {
    /// group → connections subscribed to it.
    members: HashMap<GroupId, HashSet<ConnectionHandle>>,
    /// connection → groups it joined.
    joined: HashMap<ConnectionHandle, HashSet<GroupId>>,
}

/// Tracks which connections are subscribed to which group rooms.
///
/// Both indexes live behind one lock so they can never disagree.
#[derive(Default)]
pub struct RoomManager {
    rooms: RwLock<Rooms>,
}

impl RoomManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join a connection to a group room, creating the room if needed.
    ///
    /// Returns `false` if the connection was already in the room.
    pub async fn join(&self, group_id: &GroupId, handle: ConnectionHandle) -> bool {
        let mut rooms = self.rooms.write().await;
        let added = rooms.members.entry(*group_id).or_default().insert(handle);
        rooms.joined.entry(handle).or_default().insert(*group_id);
        added
    }

    /// Remove a connection from one room. Empty rooms are cleaned up.
    pub async fn leave(&self, group_id: &GroupId, handle: &ConnectionHandle) -> bool {
        let mut rooms = self.rooms.write().await;
        let removed = remove_member(&mut rooms.members, group_id, handle);
        if let Some(groups) = rooms.joined.get_mut(handle) {
            groups.remove(group_id);
            if groups.is_empty() {
                rooms.joined.remove(handle);
            }
        }
        removed
    }

    /// Remove a connection from every room it joined.
    pub async fn leave_all(&self, handle: &ConnectionHandle) -> usize {
        let mut rooms = self.rooms.write().await;
        let Some(groups) = rooms.joined.remove(handle) else {
            return 0;
        };
        for group_id in &groups {
            remove_member(&mut rooms.members, group_id, handle);
        }
        groups.len()
    }

    /// Connections currently in a room.
    pub async fn members(&self, group_id: &GroupId) -> Vec<ConnectionHandle> {
        self.rooms
            .read()
            .await
            .members
            .get(group_id)
            .map(|m| m.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Rooms a connection has joined.
    pub async fn rooms_of(&self, handle: &ConnectionHandle) -> HashSet<GroupId> {
        self.rooms
            .read()
            .await
            .joined
            .get(handle)
            .cloned()
            .unwrap_or_default()
    }

    /// Get all active room IDs (for monitoring/debugging).
    pub async fn active_rooms(&self) -> Vec<GroupId> {
        self.rooms.read().await.members.keys().copied().collect()
    }
}

fn remove_member(
    members: &mut HashMap<GroupId, HashSet<ConnectionHandle>>,
    group_id: &GroupId,
    handle: &ConnectionHandle,
) -> bool {
    let Some(room) = members.get_mut(group_id) else {
        return false;
    };
    let removed = room.remove(handle);
    if room.is_empty() {
        members.remove(group_id);
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn join_creates_room_if_not_exists() {
        let manager = RoomManager::new();
        let group_id = GroupId::new();

        assert!(manager.join(&group_id, ConnectionHandle::new()).await);

        assert_eq!(manager.active_rooms().await, vec![group_id]);
    }

    #[tokio::test]
    async fn joining_twice_is_idempotent() {
        let manager = RoomManager::new();
        let group_id = GroupId::new();
        let handle = ConnectionHandle::new();

        assert!(manager.join(&group_id, handle).await);
        assert!(!manager.join(&group_id, handle).await);
        assert_eq!(manager.members(&group_id).await, vec![handle]);
    }

    #[tokio::test]
    async fn leave_cleans_up_empty_room() {
        let manager = RoomManager::new();
        let group_id = GroupId::new();
        let handle = ConnectionHandle::new();
        manager.join(&group_id, handle).await;

        assert!(manager.leave(&group_id, &handle).await);

        assert!(manager.active_rooms().await.is_empty());
        assert!(manager.rooms_of(&handle).await.is_empty());
    }

    #[tokio::test]
    async fn leaving_a_room_never_joined_is_a_no_op() {
        let manager = RoomManager::new();
        assert!(!manager.leave(&GroupId::new(), &ConnectionHandle::new()).await);
    }

    #[tokio::test]
    async fn leave_all_only_touches_that_connection() {
        let manager = RoomManager::new();
        let (g1, g2) = (GroupId::new(), GroupId::new());
        let (a, b) = (ConnectionHandle::new(), ConnectionHandle::new());
        manager.join(&g1, a).await;
        manager.join(&g2, a).await;
        manager.join(&g1, b).await;

        assert_eq!(manager.leave_all(&a).await, 2);

        assert_eq!(manager.members(&g1).await, vec![b]);
        assert!(manager.members(&g2).await.is_empty());
        assert_eq!(manager.active_rooms().await, vec![g1]);
    }
}
