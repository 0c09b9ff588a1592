//! WebSocket message types for the chat protocol.
//!
//! Defines the JSON protocol between server and connected clients:
//! - Client → Server: register, sends, room membership, typing, read receipts, pings
//! - Server → Client: greeting, presence, routed messages, typing, errors, pongs

use serde::{Deserialize, Serialize};

use crate::application::SessionCommand;
use crate::domain::chat::{ChatEvent, Message, MessageKind};
use crate::domain::foundation::Timestamp;

// ============================================
// Server → Client Messages
// ============================================

/// All message types that can be sent from server to client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Transport is up; carries the server-side connection id.
    Connected(ConnectedMessage),

    PresenceChanged(PresenceChangedMessage),

    PresenceSnapshot(PresenceSnapshotMessage),

    PrivateMessage(MessageEnvelope),

    /// Confirmation of a persisted private message, to its sender.
    MessageSent(MessageEnvelope),

    GroupMessage(MessageEnvelope),

    UserTyping(TypingMessage),

    UserStopTyping(TypingMessage),

    MessagesRead(MessagesReadMessage),

    Error(ErrorMessage),

    /// Heartbeat response.
    Pong(PongMessage),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedMessage {
    pub connection_id: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresenceChangedMessage {
    pub identity: String,
    pub online: bool,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresenceSnapshotMessage {
    pub online: Vec<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageEnvelope {
    pub message: MessageDto,
}

/// Wire form of a stored message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: String,
    pub sender: String,
    pub kind: MessageKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
    pub timestamp: String,
}

impl From<&Message> for MessageDto {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id().to_string(),
            sender: message.sender().to_string(),
            kind: message.kind(),
            receiver: message.receiver().map(ToString::to_string),
            group_id: message.group_id().map(ToString::to_string),
            content: message.body().content().map(str::to_string),
            photo: message.body().photo().map(str::to_string),
            read: message.read(),
            timestamp: message.timestamp().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypingMessage {
    pub from: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessagesReadMessage {
    pub reader: String,
    pub count: u64,
    pub timestamp: String,
}

/// Error message sent to client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorMessage {
    pub code: String,
    pub message: String,
    pub timestamp: String,
}

/// Heartbeat response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PongMessage {
    pub timestamp: String,
}

fn envelope(message: &Message) -> MessageEnvelope {
    MessageEnvelope {
        message: MessageDto::from(message),
    }
}

impl From<ChatEvent> for ServerMessage {
    fn from(event: ChatEvent) -> Self {
        let now = || Timestamp::now().to_rfc3339();
        match event {
            ChatEvent::Connected { handle } => ServerMessage::Connected(ConnectedMessage {
                connection_id: handle.to_string(),
                timestamp: now(),
            }),
            ChatEvent::PresenceChanged(change) => {
                ServerMessage::PresenceChanged(PresenceChangedMessage {
                    identity: change.identity.to_string(),
                    online: change.online,
                    timestamp: change.timestamp.to_rfc3339(),
                })
            }
            ChatEvent::PresenceSnapshot { online } => {
                ServerMessage::PresenceSnapshot(PresenceSnapshotMessage {
                    online: online.iter().map(ToString::to_string).collect(),
                    timestamp: now(),
                })
            }
            ChatEvent::PrivateMessage(message) => ServerMessage::PrivateMessage(envelope(&message)),
            ChatEvent::MessageSent(message) => ServerMessage::MessageSent(envelope(&message)),
            ChatEvent::GroupMessage(message) => ServerMessage::GroupMessage(envelope(&message)),
            ChatEvent::UserTyping { from } => ServerMessage::UserTyping(TypingMessage {
                from: from.to_string(),
            }),
            ChatEvent::UserStopTyping { from } => ServerMessage::UserStopTyping(TypingMessage {
                from: from.to_string(),
            }),
            ChatEvent::MessagesRead {
                reader,
                count,
                timestamp,
            } => ServerMessage::MessagesRead(MessagesReadMessage {
                reader: reader.to_string(),
                count,
                timestamp: timestamp.to_rfc3339(),
            }),
            ChatEvent::Error { code, message } => ServerMessage::Error(ErrorMessage {
                code: code.to_string(),
                message,
                timestamp: now(),
            }),
            ChatEvent::Pong => ServerMessage::Pong(PongMessage { timestamp: now() }),
        }
    }
}

// ============================================
// Client → Server Messages
// ============================================

/// All message types that can be received from client.
///
/// Missing string fields decode as empty so that they surface as
/// validation errors rather than malformed frames.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Register(RegisterRequest),
    SendPrivate(SendPrivateRequest),
    SendGroup(SendGroupRequest),
    JoinGroup(GroupRequest),
    LeaveGroup(GroupRequest),
    Typing(TypingRequest),
    StopTyping(TypingRequest),
    MarkRead(MarkReadRequest),
    /// Heartbeat request.
    Ping,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub identity: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SendPrivateRequest {
    #[serde(default)]
    pub receiver: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendGroupRequest {
    #[serde(default)]
    pub group_id: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRequest {
    #[serde(default)]
    pub group_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TypingRequest {
    #[serde(default)]
    pub receiver: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MarkReadRequest {
    #[serde(default)]
    pub sender: String,
}

impl From<ClientMessage> for SessionCommand {
    fn from(msg: ClientMessage) -> Self {
        match msg {
            ClientMessage::Register(r) => SessionCommand::Register {
                identity: r.identity,
            },
            ClientMessage::SendPrivate(r) => SessionCommand::SendPrivate {
                receiver: r.receiver,
                content: r.content,
                photo: r.photo,
            },
            ClientMessage::SendGroup(r) => SessionCommand::SendGroup {
                group_id: r.group_id,
                content: r.content,
                photo: r.photo,
            },
            ClientMessage::JoinGroup(r) => SessionCommand::JoinGroup {
                group_id: r.group_id,
            },
            ClientMessage::LeaveGroup(r) => SessionCommand::LeaveGroup {
                group_id: r.group_id,
            },
            ClientMessage::Typing(r) => SessionCommand::Typing {
                receiver: r.receiver,
            },
            ClientMessage::StopTyping(r) => SessionCommand::StopTyping {
                receiver: r.receiver,
            },
            ClientMessage::MarkRead(r) => SessionCommand::MarkRead { sender: r.sender },
            ClientMessage::Ping => SessionCommand::Ping,
        }
    }
}
