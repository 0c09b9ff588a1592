//! Presence domain module.
//!
//! Presence is the fact (and recency) of an identity having a live,
//! routable connection.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ConnectionHandle, Identity, Timestamp};

/// An identity currently bound to a live connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceEntry {
    pub identity: Identity,
    pub handle: ConnectionHandle,
    pub last_seen: Timestamp,
}

impl PresenceEntry {
    pub fn new(identity: Identity, handle: ConnectionHandle) -> Self {
        Self {
            identity,
            handle,
            last_seen: Timestamp::now(),
        }
    }

    /// True when `handle` is the connection that owns this entry.
    pub fn is_owned_by(&self, handle: &ConnectionHandle) -> bool {
        &self.handle == handle
    }
}

/// Broadcast whenever an identity goes online or offline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceChanged {
    pub identity: Identity,
    pub online: bool,
    pub timestamp: Timestamp,
}

impl PresenceChanged {
    pub fn online(identity: Identity) -> Self {
        Self {
            identity,
            online: true,
            timestamp: Timestamp::now(),
        }
    }

    pub fn offline(identity: Identity) -> Self {
        Self {
            identity,
            online: false,
            timestamp: Timestamp::now(),
        }
    }
}

/// Advisory presence write mirrored to the user store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceUpdate {
    pub identity: Identity,
    pub connection_ref: Option<String>,
    pub online: bool,
    pub last_seen: Timestamp,
}

impl PresenceUpdate {
    pub fn connected(identity: Identity, handle: &ConnectionHandle) -> Self {
        Self {
            identity,
            connection_ref: Some(handle.to_string()),
            online: true,
            last_seen: Timestamp::now(),
        }
    }

    pub fn disconnected(identity: Identity) -> Self {
        Self {
            identity,
            connection_ref: None,
            online: false,
            last_seen: Timestamp::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_ownership_compares_handles() {
        let handle = ConnectionHandle::new();
        let entry = PresenceEntry::new(Identity::new("alice").unwrap(), handle);
        assert!(entry.is_owned_by(&handle));
        assert!(!entry.is_owned_by(&ConnectionHandle::new()));
    }

    #[test]
    fn connected_update_carries_connection_ref() {
        let handle = ConnectionHandle::new();
        let update = PresenceUpdate::connected(Identity::new("alice").unwrap(), &handle);
        assert!(update.online);
        assert_eq!(update.connection_ref, Some(handle.to_string()));

        let update = PresenceUpdate::disconnected(Identity::new("alice").unwrap());
        assert!(!update.online);
        assert!(update.connection_ref.is_none());
    }
}
