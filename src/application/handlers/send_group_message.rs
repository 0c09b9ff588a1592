//! SendGroupMessageHandler - membership check, persist, fan out.

use std::sync::Arc;

use crate::application::{GroupMembership, PresenceRegistry};
use crate::domain::chat::{ChatError, ChatEvent, Message, MessageBody};
use crate::domain::foundation::{GroupId, Identity};
use crate::ports::{EventDispatcher, MessageRepository};

#[derive(Debug, Clone)]
pub struct SendGroupMessageCommand {
    pub sender: Identity,
    pub group_id: String,
    pub content: Option<String>,
    pub photo: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SendGroupMessageResult {
    pub message: Message,
    /// Number of connections the message was handed to.
    pub recipients: usize,
}

pub struct SendGroupMessageHandler {
    registry: Arc<PresenceRegistry>,
    membership: GroupMembership,
    messages: Arc<dyn MessageRepository>,
    dispatcher: Arc<dyn EventDispatcher>,
}

impl SendGroupMessageHandler {
    pub fn new(
        registry: Arc<PresenceRegistry>,
        membership: GroupMembership,
        messages: Arc<dyn MessageRepository>,
        dispatcher: Arc<dyn EventDispatcher>,
    ) -> Self {
        Self {
            registry,
            membership,
            messages,
            dispatcher,
        }
    }

    pub async fn handle(
        &self,
        cmd: SendGroupMessageCommand,
    ) -> Result<SendGroupMessageResult, ChatError> {
        // 1. Validate
        let body = MessageBody::new(cmd.content, cmd.photo)?;
        let group_id = GroupId::parse(&cmd.group_id)?;

        // 2-3. Group must exist and the sender must belong to it
        let group = self.membership.require_member(&group_id, &cmd.sender).await?;

        // 4. Persist
        let message = Message::group(cmd.sender, group_id, body);
        let id = self.messages.append(&message).await?;
        let message = message.with_id(id);

        // 5. Fan out to online members, one event per connection
        let handles = self.registry.resolve(group.members()).await;
        let mut recipients = 0;
        for handle in &handles {
            if self
                .dispatcher
                .deliver(handle, ChatEvent::GroupMessage(message.clone()))
                .await
            {
                recipients += 1;
            }
        }

        tracing::debug!(
            message_id = %message.id(),
            group_id = %group_id,
            members = group.members().len(),
            recipients,
            "Group message fanned out"
        );

        Ok(SendGroupMessageResult {
            message,
            recipients,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::application::test_support::RecordingDispatcher;
    use crate::domain::chat::{Group, MessageKind};
    use crate::domain::foundation::ConnectionHandle;

    fn id(name: &str) -> Identity {
        Identity::new(name).unwrap()
    }

    struct Fixture {
        handler: SendGroupMessageHandler,
        registry: Arc<PresenceRegistry>,
        store: Arc<InMemoryStore>,
        dispatcher: Arc<RecordingDispatcher>,
        group_id: GroupId,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let dispatcher = Arc::new(RecordingDispatcher::new());
        let registry = Arc::new(PresenceRegistry::new(store.clone(), dispatcher.clone()));
        let handler = SendGroupMessageHandler::new(
            registry.clone(),
            GroupMembership::new(store.clone()),
            store.clone(),
            dispatcher.clone(),
        );

        let mut group = Group::new(GroupId::new(), "team", id("alice"));
        group.add_member(id("bob"));
        group.add_member(id("carol"));
        let group_id = *group.id();
        store.insert_group(group).await;

        Fixture {
            handler,
            registry,
            store,
            dispatcher,
            group_id,
        }
    }

    fn command(sender: &str, group_id: &GroupId, content: &str) -> SendGroupMessageCommand {
        SendGroupMessageCommand {
            sender: id(sender),
            group_id: group_id.to_string(),
            content: Some(content.to_string()),
            photo: None,
        }
    }

    #[tokio::test]
    async fn fans_out_to_online_members_including_sender() {
        let f = fixture().await;
        let alice = ConnectionHandle::new();
        let bob = ConnectionHandle::new();
        f.registry.register(id("alice"), alice).await;
        f.registry.register(id("bob"), bob).await;

        let result = f
            .handler
            .handle(command("alice", &f.group_id, "standup?"))
            .await
            .unwrap();

        assert_eq!(result.recipients, 2);
        assert_eq!(result.message.kind(), MessageKind::Group);
        assert_eq!(result.message.read(), None);
        for handle in [alice, bob] {
            assert_eq!(
                f.dispatcher.delivered_to(&handle),
                vec![ChatEvent::GroupMessage(result.message.clone())]
            );
        }
        assert_eq!(f.store.messages().await.len(), 1);
    }

    #[tokio::test]
    async fn non_member_is_forbidden_and_nothing_is_stored() {
        let f = fixture().await;

        let result = f.handler.handle(command("mallory", &f.group_id, "hi")).await;

        assert!(matches!(result, Err(ChatError::Forbidden(_))));
        assert!(f.store.messages().await.is_empty());
        assert!(f.dispatcher.deliveries().is_empty());
    }

    #[tokio::test]
    async fn unknown_group_is_not_found() {
        let f = fixture().await;

        let result = f.handler.handle(command("alice", &GroupId::new(), "hi")).await;

        assert!(matches!(result, Err(ChatError::GroupNotFound(_))));
        assert!(f.store.messages().await.is_empty());
    }

    #[tokio::test]
    async fn malformed_group_id_is_a_validation_error() {
        let f = fixture().await;
        let mut cmd = command("alice", &f.group_id, "hi");
        cmd.group_id = "general".to_string();

        let result = f.handler.handle(cmd).await;
        assert!(matches!(result, Err(ChatError::Validation(_))));
    }

    #[tokio::test]
    async fn empty_body_is_rejected_before_lookup() {
        let f = fixture().await;
        let mut cmd = command("mallory", &f.group_id, "");
        cmd.content = None;

        let result = f.handler.handle(cmd).await;
        assert!(matches!(result, Err(ChatError::Validation(_))));
    }

    #[tokio::test]
    async fn shared_connection_receives_one_copy() {
        let f = fixture().await;
        let shared = ConnectionHandle::new();
        f.registry.register(id("bob"), shared).await;
        f.registry.register(id("carol"), shared).await;

        let result = f
            .handler
            .handle(command("alice", &f.group_id, "hello"))
            .await
            .unwrap();

        assert_eq!(result.recipients, 1);
        assert_eq!(f.dispatcher.delivered_to(&shared).len(), 1);
    }

    #[tokio::test]
    async fn persistence_failure_aborts_fanout() {
        let f = fixture().await;
        f.registry.register(id("bob"), ConnectionHandle::new()).await;
        f.store.fail_message_writes(true);

        let result = f.handler.handle(command("alice", &f.group_id, "hi")).await;

        assert!(matches!(result, Err(ChatError::Persistence(_))));
        assert!(f.dispatcher.deliveries().is_empty());
    }
}
