//! User records as seen by the presence core.
//!
//! Registration, profile and search live outside this crate; the core only
//! reads a user and mirrors presence onto it.

use crate::domain::foundation::{Identity, Timestamp};

/// Persisted user row, including the advisory presence mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub identity: Identity,
    pub online: bool,
    pub last_seen: Option<Timestamp>,
    pub connection_ref: Option<String>,
}

impl UserRecord {
    /// A user that has never connected.
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            online: false,
            last_seen: None,
            connection_ref: None,
        }
    }
}
