//! In-memory implementation of every persistence port.
//!
//! Group and user seeding helpers stand in for the external registration
//! and group-management services. Write failures can be switched on to
//! exercise error paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::chat::{ChatError, Group, Message, MessageTarget};
use crate::domain::foundation::{DomainError, GroupId, Identity, MessageId};
use crate::domain::presence::PresenceUpdate;
use crate::domain::user::UserRecord;
use crate::ports::{GroupReader, MessageRepository, UserPresenceStore};

#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<Identity, UserRecord>>,
    groups: RwLock<HashMap<GroupId, Group>>,
    messages: RwLock<Vec<Message>>,
    fail_message_writes: AtomicBool,
    fail_presence_writes: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // === Seeding ===

    /// Add a user that has never connected. Existing records are kept.
    pub async fn insert_user(&self, identity: Identity) {
        self.users
            .write()
            .await
            .entry(identity.clone())
            .or_insert_with(|| UserRecord::new(identity));
    }

    pub async fn insert_group(&self, group: Group) {
        self.groups.write().await.insert(*group.id(), group);
    }

    /// Add a member to an existing group. Returns `false` if the group is
    /// unknown or the identity was already a member.
    pub async fn add_member(&self, group_id: &GroupId, identity: Identity) -> bool {
        self.groups
            .write()
            .await
            .get_mut(group_id)
            .is_some_and(|group| group.add_member(identity))
    }

    /// Remove a member the way the group service would.
    ///
    /// Removing the admin is rejected with `Forbidden`.
    pub async fn remove_member(
        &self,
        group_id: &GroupId,
        identity: &Identity,
    ) -> Result<bool, ChatError> {
        let mut groups = self.groups.write().await;
        let group = groups
            .get_mut(group_id)
            .ok_or_else(|| ChatError::group_not_found(group_id))?;
        group.remove_member(identity)
    }

    // === Inspection ===

    pub async fn user(&self, identity: &Identity) -> Option<UserRecord> {
        self.users.read().await.get(identity).cloned()
    }

    /// Stored messages in append order.
    pub async fn messages(&self) -> Vec<Message> {
        self.messages.read().await.clone()
    }

    // === Failure injection ===

    pub fn fail_message_writes(&self, fail: bool) {
        self.fail_message_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_presence_writes(&self, fail: bool) {
        self.fail_presence_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserPresenceStore for InMemoryStore {
    async fn find_user(&self, identity: &Identity) -> Result<Option<UserRecord>, DomainError> {
        Ok(self.user(identity).await)
    }

    async fn upsert_user_presence(&self, update: &PresenceUpdate) -> Result<(), DomainError> {
        if self.fail_presence_writes.load(Ordering::SeqCst) {
            return Err(DomainError::database("presence write rejected"));
        }
        let mut users = self.users.write().await;
        let record = users
            .entry(update.identity.clone())
            .or_insert_with(|| UserRecord::new(update.identity.clone()));
        record.online = update.online;
        record.last_seen = Some(update.last_seen);
        record.connection_ref = update.connection_ref.clone();
        Ok(())
    }
}

#[async_trait]
impl GroupReader for InMemoryStore {
    async fn find_group(&self, id: &GroupId) -> Result<Option<Group>, DomainError> {
        Ok(self.groups.read().await.get(id).cloned())
    }
}

#[async_trait]
impl MessageRepository for InMemoryStore {
    async fn append(&self, message: &Message) -> Result<MessageId, DomainError> {
        if self.fail_message_writes.load(Ordering::SeqCst) {
            return Err(DomainError::database("message write rejected"));
        }
        self.messages.write().await.push(message.clone());
        Ok(*message.id())
    }

    async fn mark_conversation_read(
        &self,
        sender: &Identity,
        receiver: &Identity,
    ) -> Result<u64, DomainError> {
        if self.fail_message_writes.load(Ordering::SeqCst) {
            return Err(DomainError::database("message write rejected"));
        }
        let mut messages = self.messages.write().await;
        let mut changed = 0;
        for message in messages.iter_mut().filter(|m| m.sender() == sender) {
            let unread = matches!(
                message.target(),
                MessageTarget::Private { receiver: to, read: false } if to == receiver
            );
            if unread {
                message.set_read();
                changed += 1;
            }
        }
        Ok(changed)
    }
}
