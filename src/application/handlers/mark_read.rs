//! MarkConversationReadHandler - bulk read update plus read receipt.

use std::sync::Arc;

use crate::application::PresenceRegistry;
use crate::domain::chat::{ChatError, ChatEvent};
use crate::domain::foundation::{Identity, Timestamp};
use crate::ports::{EventDispatcher, MessageRepository};

#[derive(Debug, Clone)]
pub struct MarkConversationReadCommand {
    /// The caller, i.e. the receiver of the messages.
    pub reader: Identity,
    /// Whose messages are being marked read.
    pub sender: String,
}

pub struct MarkConversationReadHandler {
    registry: Arc<PresenceRegistry>,
    messages: Arc<dyn MessageRepository>,
    dispatcher: Arc<dyn EventDispatcher>,
}

impl MarkConversationReadHandler {
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

    /// Returns how many messages flipped to read.
    pub async fn handle(&self, cmd: MarkConversationReadCommand) -> Result<u64, ChatError> {
        let sender = Identity::for_field(cmd.sender, "sender")?;
        let count = self
            .messages
            .mark_conversation_read(&sender, &cmd.reader)
            .await?;

        if count > 0 {
            if let Some(handle) = self.registry.lookup(&sender).await {
                self.dispatcher
                    .deliver(
                        &handle,
                        ChatEvent::MessagesRead {
                            reader: cmd.reader.clone(),
                            count,
                            timestamp: Timestamp::now(),
                        },
                    )
                    .await;
            }
        }

        tracing::debug!(reader = %cmd.reader, sender = %sender, count, "Conversation marked read");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::application::test_support::RecordingDispatcher;
    use crate::domain::chat::{Message, MessageBody};
    use crate::domain::foundation::ConnectionHandle;
    use crate::ports::MessageRepository as _;

    fn id(name: &str) -> Identity {
        Identity::new(name).unwrap()
    }

    async fn setup() -> (
        MarkConversationReadHandler,
        Arc<PresenceRegistry>,
        Arc<InMemoryStore>,
        Arc<RecordingDispatcher>,
    ) {
        let store = Arc::new(InMemoryStore::new());
        let dispatcher = Arc::new(RecordingDispatcher::new());
        let registry = Arc::new(PresenceRegistry::new(store.clone(), dispatcher.clone()));
        for text in ["one", "two"] {
            let body = MessageBody::new(Some(text.to_string()), None).unwrap();
            store
                .append(&Message::private(id("alice"), id("bob"), body))
                .await
                .unwrap();
        }
        let handler =
            MarkConversationReadHandler::new(registry.clone(), store.clone(), dispatcher.clone());
        (handler, registry, store, dispatcher)
    }

    #[tokio::test]
    async fn marks_messages_and_notifies_online_sender() {
        let (handler, registry, store, dispatcher) = setup().await;
        let alice = ConnectionHandle::new();
        registry.register(id("alice"), alice).await;

        let count = handler
            .handle(MarkConversationReadCommand {
                reader: id("bob"),
                sender: "alice".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(count, 2);
        assert!(store.messages().await.iter().all(|m| m.read() == Some(true)));
        let events = dispatcher.delivered_to(&alice);
        assert!(matches!(
            events.as_slice(),
            [ChatEvent::MessagesRead { count: 2, .. }]
        ));
    }

    #[tokio::test]
    async fn second_pass_changes_nothing_and_sends_no_receipt() {
        let (handler, registry, _, dispatcher) = setup().await;
        let alice = ConnectionHandle::new();
        registry.register(id("alice"), alice).await;
        let cmd = MarkConversationReadCommand {
            reader: id("bob"),
            sender: "alice".to_string(),
        };

        handler.handle(cmd.clone()).await.unwrap();
        dispatcher.clear();

        assert_eq!(handler.handle(cmd).await.unwrap(), 0);
        assert!(dispatcher.deliveries().is_empty());
    }

    #[tokio::test]
    async fn blank_sender_is_rejected() {
        let (handler, _, _, _) = setup().await;
        let result = handler
            .handle(MarkConversationReadCommand {
                reader: id("bob"),
                sender: String::new(),
            })
            .await;
        assert!(matches!(result, Err(ChatError::Validation(_))));
    }
}
