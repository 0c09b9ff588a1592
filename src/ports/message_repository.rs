//! MessageRepository port (write side).
//!
//! History reads are served elsewhere; the router only appends and applies
//! the bulk read-flag update.

use async_trait::async_trait;

use crate::domain::chat::Message;
use crate::domain::foundation::{DomainError, Identity, MessageId};

/// Repository port for message persistence.
///
/// Implementations must make `append` durable before returning `Ok`, since
/// the router confirms a send only after it succeeds.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist a new message and return its id.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn append(&self, message: &Message) -> Result<MessageId, DomainError>;

    /// Mark every unread private message from `sender` to `receiver` as read.
    ///
    /// Returns the number of messages that changed.
    async fn mark_conversation_read(
        &self,
        sender: &Identity,
        receiver: &Identity,
    ) -> Result<u64, DomainError>;
}
