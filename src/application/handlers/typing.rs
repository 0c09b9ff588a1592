//! TypingHandler - relays typing indicators to an online receiver.
//!
//! Indicators are lossy: offline or blank receivers are dropped without
//! telling the sender.

use std::sync::Arc;

use crate::application::PresenceRegistry;
use crate::domain::chat::ChatEvent;
use crate::domain::foundation::Identity;
use crate::ports::EventDispatcher;

#[derive(Debug, Clone)]
pub struct TypingCommand {
    pub from: Identity,
    pub receiver: String,
    /// `true` for typing, `false` for stop typing.
    pub typing: bool,
}

pub struct TypingHandler {
    registry: Arc<PresenceRegistry>,
    dispatcher: Arc<dyn EventDispatcher>,
}

impl TypingHandler {
    pub fn new(registry: Arc<PresenceRegistry>, dispatcher: Arc<dyn EventDispatcher>) -> Self {
        Self {
            registry,
            dispatcher,
        }
    }

    /// Returns whether the indicator reached a connection.
    pub async fn handle(&self, cmd: TypingCommand) -> bool {
        let Ok(receiver) = Identity::new(cmd.receiver) else {
            return false;
        };
        let Some(handle) = self.registry.lookup(&receiver).await else {
            tracing::trace!(from = %cmd.from, receiver = %receiver, "Typing indicator dropped; receiver offline");
            return false;
        };

        let event = if cmd.typing {
            ChatEvent::UserTyping { from: cmd.from }
        } else {
            ChatEvent::UserStopTyping { from: cmd.from }
        };
        self.dispatcher.deliver(&handle, event).await
    }
}
