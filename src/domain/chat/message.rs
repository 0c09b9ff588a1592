//! Chat message entity.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{GroupId, Identity, MessageId, Timestamp, ValidationError};

/// Whether a message goes to one user or to a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Private,
    Group,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Private => "private",
            MessageKind::Group => "group",
        }
    }
}

/// Text and/or photo carried by a message. At least one is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBody {
    content: Option<String>,
    photo: Option<String>,
}

impl MessageBody {
    /// Builds a body, treating blank strings as absent.
    pub fn new(content: Option<String>, photo: Option<String>) -> Result<Self, ValidationError> {
        let content = content.filter(|c| !c.trim().is_empty());
        let photo = photo.filter(|p| !p.trim().is_empty());
        if content.is_none() && photo.is_none() {
            return Err(ValidationError::empty_field("content"));
        }
        Ok(Self { content, photo })
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn photo(&self) -> Option<&str> {
        self.photo.as_deref()
    }
}

/// Where a message is addressed. The variant decides the message kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageTarget {
    Private { receiver: Identity, read: bool },
    Group { group_id: GroupId },
}

/// A persisted chat message.
///
/// Immutable once stored, except the `read` flag of private messages which
/// only changes through a bulk conversation update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    id: MessageId,
    sender: Identity,
    target: MessageTarget,
    body: MessageBody,
    timestamp: Timestamp,
}

impl Message {
    /// New unread private message stamped now.
    pub fn private(sender: Identity, receiver: Identity, body: MessageBody) -> Self {
        Self {
            id: MessageId::new(),
            sender,
            target: MessageTarget::Private {
                receiver,
                read: false,
            },
            body,
            timestamp: Timestamp::now(),
        }
    }

    /// New group message stamped now.
    pub fn group(sender: Identity, group_id: GroupId, body: MessageBody) -> Self {
        Self {
            id: MessageId::new(),
            sender,
            target: MessageTarget::Group { group_id },
            body,
            timestamp: Timestamp::now(),
        }
    }

    /// Adopts the id assigned by the store.
    pub fn with_id(mut self, id: MessageId) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn sender(&self) -> &Identity {
        &self.sender
    }

    pub fn target(&self) -> &MessageTarget {
        &self.target
    }

    pub fn body(&self) -> &MessageBody {
        &self.body
    }

    pub fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    pub fn kind(&self) -> MessageKind {
        match self.target {
            MessageTarget::Private { .. } => MessageKind::Private,
            MessageTarget::Group { .. } => MessageKind::Group,
        }
    }

    pub fn receiver(&self) -> Option<&Identity> {
        match &self.target {
            MessageTarget::Private { receiver, .. } => Some(receiver),
            MessageTarget::Group { .. } => None,
        }
    }

    pub fn group_id(&self) -> Option<&GroupId> {
        match &self.target {
            MessageTarget::Group { group_id } => Some(group_id),
            MessageTarget::Private { .. } => None,
        }
    }

    /// Read flag; `None` for group messages.
    pub fn read(&self) -> Option<bool> {
        match self.target {
            MessageTarget::Private { read, .. } => Some(read),
            MessageTarget::Group { .. } => None,
        }
    }

    /// Marks a private message read. Used by stores applying the bulk update.
    pub(crate) fn set_read(&mut self) {
        if let MessageTarget::Private { read, .. } = &mut self.target {
            *read = true;
        }
    }
}
