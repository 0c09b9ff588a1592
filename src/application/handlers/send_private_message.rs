//! SendPrivateMessageHandler - persist, route to the receiver, confirm.
//!
//! Delivery is online-only: an offline receiver finds the message through
//! history later. The sender's confirmation is sent only after the message
//! is stored.

use std::sync::Arc;

use crate::application::PresenceRegistry;
use crate::domain::chat::{ChatError, ChatEvent, Message, MessageBody};
use crate::domain::foundation::{ConnectionHandle, Identity};
use crate::ports::{EventDispatcher, MessageRepository};

#[derive(Debug, Clone)]
pub struct SendPrivateMessageCommand {
    pub sender: Identity,
    pub sender_handle: ConnectionHandle,
    pub receiver: String,
    pub content: Option<String>,
    pub photo: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SendPrivateMessageResult {
    pub message: Message,
    /// Whether the receiver was online and took the event.
    pub delivered: bool,
}

pub struct SendPrivateMessageHandler {
    registry: Arc<PresenceRegistry>,
    messages: Arc<dyn MessageRepository>,
    dispatcher: Arc<dyn EventDispatcher>,
}

impl SendPrivateMessageHandler {
    pub fn new(
        registry: Arc<PresenceRegistry>,
        messages: Arc<dyn MessageRepository>,
        dispatcher: Arc<dyn EventDispatcher>,
    ) -> Self {
        Self {
            registry,
            messages,
            dispatcher,
        }
    }

    pub async fn handle(
        &self,
        cmd: SendPrivateMessageCommand,
    ) -> Result<SendPrivateMessageResult, ChatError> {
        // 1. Validate
        let receiver = Identity::for_field(cmd.receiver, "receiver")?;
        let body = MessageBody::new(cmd.content, cmd.photo)?;

        // 2. Persist
        let message = Message::private(cmd.sender, receiver.clone(), body);
        let id = self.messages.append(&message).await?;
        let message = message.with_id(id);

        // 3. Route to the receiver if online
        let delivered = match self.registry.lookup(&receiver).await {
            Some(handle) => {
                self.dispatcher
                    .deliver(&handle, ChatEvent::PrivateMessage(message.clone()))
                    .await
            }
            None => false,
        };

        tracing::debug!(
            message_id = %message.id(),
            sender = %message.sender(),
            receiver = %receiver,
            delivered,
            "Private message routed"
        );

        // 4. Confirm to the sender
        self.dispatcher
            .deliver(&cmd.sender_handle, ChatEvent::MessageSent(message.clone()))
            .await;

        Ok(SendPrivateMessageResult { message, delivered })
    }
}
