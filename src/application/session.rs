//! Per-connection chat session.
//!
//! A session owns its [`ConnectionState`] exclusively and handles one
//! command at a time, so nothing else ever observes the state mid-update.
//! Errors are reported to the session's own connection and never end it.

use std::sync::Arc;

use crate::application::handlers::{
    GroupRoomCommand, MarkConversationReadCommand, RegisterIdentityCommand,
    SendGroupMessageCommand, SendPrivateMessageCommand, TypingCommand,
};
use crate::application::ChatServices;
use crate::domain::chat::{ChatError, ChatEvent};
use crate::domain::foundation::{ConnectionHandle, Identity};
use crate::domain::session::ConnectionState;

/// An inbound client request, already decoded from the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Register {
        identity: String,
    },
    SendPrivate {
        receiver: String,
        content: Option<String>,
        photo: Option<String>,
    },
    SendGroup {
        group_id: String,
        content: Option<String>,
        photo: Option<String>,
    },
    JoinGroup {
        group_id: String,
    },
    LeaveGroup {
        group_id: String,
    },
    Typing {
        receiver: String,
    },
    StopTyping {
        receiver: String,
    },
    MarkRead {
        sender: String,
    },
    Ping,
}

impl SessionCommand {
    pub fn name(&self) -> &'static str {
        match self {
            SessionCommand::Register { .. } => "register",
            SessionCommand::SendPrivate { .. } => "send_private",
            SessionCommand::SendGroup { .. } => "send_group",
            SessionCommand::JoinGroup { .. } => "join_group",
            SessionCommand::LeaveGroup { .. } => "leave_group",
            SessionCommand::Typing { .. } => "typing",
            SessionCommand::StopTyping { .. } => "stop_typing",
            SessionCommand::MarkRead { .. } => "mark_read",
            SessionCommand::Ping => "ping",
        }
    }
}

pub struct ChatSession {
    handle: ConnectionHandle,
    state: ConnectionState,
    services: Arc<ChatServices>,
}

impl ChatSession {
    pub(crate) fn new(handle: ConnectionHandle, services: Arc<ChatServices>) -> Self {
        Self {
            handle,
            state: ConnectionState::Unbound,
            services,
        }
    }

    pub fn handle(&self) -> ConnectionHandle {
        self.handle
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Run a command and report any failure to this connection as an
    /// `error` event.
    pub async fn dispatch(&mut self, command: SessionCommand) {
        let name = command.name();
        if let Err(err) = self.execute(command).await {
            tracing::debug!(
                connection = %self.handle,
                command = name,
                code = %err.code(),
                error = %err,
                "Command rejected"
            );
            self.report(&err).await;
        }
    }

    /// Send an error event to this connection.
    pub async fn report(&self, err: &ChatError) {
        self.services
            .dispatcher
            .deliver(&self.handle, ChatEvent::from(err))
            .await;
    }

    pub async fn execute(&mut self, command: SessionCommand) -> Result<(), ChatError> {
        if self.state.is_closed() {
            return Err(ChatError::NotRegistered);
        }

        match command {
            SessionCommand::Ping => {
                self.services
                    .dispatcher
                    .deliver(&self.handle, ChatEvent::Pong)
                    .await;
                Ok(())
            }
            SessionCommand::Register { identity } => {
                let identity = Identity::new(identity)?;
                self.register(identity).await
            }
            SessionCommand::SendPrivate {
                receiver,
                content,
                photo,
            } => {
                let sender = self.bound_identity()?;
                self.services
                    .send_private
                    .handle(SendPrivateMessageCommand {
                        sender,
                        sender_handle: self.handle,
                        receiver,
                        content,
                        photo,
                    })
                    .await
                    .map(|_| ())
            }
            SessionCommand::SendGroup {
                group_id,
                content,
                photo,
            } => {
                let sender = self.bound_identity()?;
                self.services
                    .send_group
                    .handle(SendGroupMessageCommand {
                        sender,
                        group_id,
                        content,
                        photo,
                    })
                    .await
                    .map(|_| ())
            }
            SessionCommand::JoinGroup { group_id } => {
                let identity = self.bound_identity()?;
                self.services
                    .rooms
                    .join(GroupRoomCommand {
                        identity,
                        handle: self.handle,
                        group_id,
                    })
                    .await
                    .map(|_| ())
            }
            SessionCommand::LeaveGroup { group_id } => {
                let identity = self.bound_identity()?;
                self.services
                    .rooms
                    .leave(GroupRoomCommand {
                        identity,
                        handle: self.handle,
                        group_id,
                    })
                    .await
                    .map(|_| ())
            }
            SessionCommand::Typing { receiver } => self.typing(receiver, true).await,
            SessionCommand::StopTyping { receiver } => self.typing(receiver, false).await,
            SessionCommand::MarkRead { sender } => {
                let reader = self.bound_identity()?;
                self.services
                    .mark_read
                    .handle(MarkConversationReadCommand { reader, sender })
                    .await
                    .map(|_| ())
            }
        }
    }

    /// Tear the session down. Safe to call more than once.
    pub async fn disconnect(&mut self) {
        if self.state.is_closed() {
            return;
        }
        let identity = self.state.close();
        if let Some(identity) = &identity {
            self.services.registry.unregister(identity, &self.handle).await;
        }
        self.services.dispatcher.leave_all_rooms(&self.handle).await;

        tracing::info!(
            connection = %self.handle,
            identity = identity.as_ref().map(Identity::as_str),
            "Connection closed"
        );
    }

    async fn register(&mut self, identity: Identity) -> Result<(), ChatError> {
        let released = self.state.bind(identity.clone())?;
        self.services
            .register
            .handle(RegisterIdentityCommand {
                handle: self.handle,
                identity,
                released,
            })
            .await;
        Ok(())
    }

    async fn typing(&self, receiver: String, typing: bool) -> Result<(), ChatError> {
        let from = self.bound_identity()?;
        self.services
            .typing
            .handle(TypingCommand {
                from,
                receiver,
                typing,
            })
            .await;
        Ok(())
    }

    fn bound_identity(&self) -> Result<Identity, ChatError> {
        self.state
            .identity()
            .cloned()
            .ok_or(ChatError::NotRegistered)
    }
}
