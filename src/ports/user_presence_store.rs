//! UserPresenceStore port - user lookup and the advisory presence mirror.
//!
//! The in-memory presence registry is authoritative for routing. What this
//! port stores is a mirror for REST reads, so callers treat write failures
//! as non-fatal.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Identity};
use crate::domain::presence::PresenceUpdate;
use crate::domain::user::UserRecord;

/// Port for reading users and mirroring their presence.
#[async_trait]
pub trait UserPresenceStore: Send + Sync {
    /// Find a user by identity.
    ///
    /// Returns `None` if the identity was never registered.
    async fn find_user(&self, identity: &Identity) -> Result<Option<UserRecord>, DomainError>;

    /// Upsert the online flag, last-seen time and connection reference.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn upsert_user_presence(&self, update: &PresenceUpdate) -> Result<(), DomainError>;
}
