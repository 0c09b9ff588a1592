//! Outbound events emitted by the routing core.
//!
//! These are transport-neutral; the WebSocket adapter renders them into
//! wire messages.

use crate::domain::foundation::{ConnectionHandle, ErrorCode, Identity, Timestamp};
use crate::domain::presence::PresenceChanged;

use super::{ChatError, Message};

/// Event delivered to one connection or broadcast to all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// Greeting sent once the transport is up.
    Connected { handle: ConnectionHandle },

    /// Someone went online or offline. Broadcast.
    PresenceChanged(PresenceChanged),

    /// Identities online at the moment a session registered.
    PresenceSnapshot { online: Vec<Identity> },

    /// A private message routed to its receiver.
    PrivateMessage(Message),

    /// Confirmation to the sender that a private message was persisted.
    MessageSent(Message),

    /// A group message fanned out to an online member.
    GroupMessage(Message),

    UserTyping { from: Identity },

    UserStopTyping { from: Identity },

    /// `reader` has read `count` messages sent by the recipient.
    MessagesRead {
        reader: Identity,
        count: u64,
        timestamp: Timestamp,
    },

    Error { code: ErrorCode, message: String },

    Pong,
}

impl ChatEvent {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            ChatEvent::Connected { .. } => "connected",
            ChatEvent::PresenceChanged(_) => "presence_changed",
            ChatEvent::PresenceSnapshot { .. } => "presence_snapshot",
            ChatEvent::PrivateMessage(_) => "private_message",
            ChatEvent::MessageSent(_) => "message_sent",
            ChatEvent::GroupMessage(_) => "group_message",
            ChatEvent::UserTyping { .. } => "user_typing",
            ChatEvent::UserStopTyping { .. } => "user_stop_typing",
            ChatEvent::MessagesRead { .. } => "messages_read",
            ChatEvent::Error { .. } => "error",
            ChatEvent::Pong => "pong",
        }
    }
}

impl From<&ChatError> for ChatEvent {
    fn from(err: &ChatError) -> Self {
        ChatEvent::Error {
            code: err.code(),
            message: err.to_string(),
        }
    }
}
