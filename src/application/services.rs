//! Wiring of the chat handlers around one shared presence registry.

use std::sync::Arc;

use crate::application::handlers::{
    GroupRoomsHandler, MarkConversationReadHandler, RegisterIdentityHandler,
    SendGroupMessageHandler, SendPrivateMessageHandler, TypingHandler,
};
use crate::application::{ChatSession, GroupMembership, PresenceRegistry};
use crate::domain::chat::ChatEvent;
use crate::domain::foundation::ConnectionHandle;
use crate::ports::{EventDispatcher, GroupReader, MessageRepository, UserPresenceStore};

/// Everything a session needs, shared by all connections of the process.
pub struct ChatServices {
    pub(crate) registry: Arc<PresenceRegistry>,
    pub(crate) membership: GroupMembership,
    pub(crate) dispatcher: Arc<dyn EventDispatcher>,
    pub(crate) register: RegisterIdentityHandler,
    pub(crate) send_private: SendPrivateMessageHandler,
    pub(crate) send_group: SendGroupMessageHandler,
    pub(crate) rooms: GroupRoomsHandler,
    pub(crate) typing: TypingHandler,
    pub(crate) mark_read: MarkConversationReadHandler,
}

impl ChatServices {
    pub fn new(
        users: Arc<dyn UserPresenceStore>,
        groups: Arc<dyn GroupReader>,
        messages: Arc<dyn MessageRepository>,
        dispatcher: Arc<dyn EventDispatcher>,
        mirror_presence: bool,
    ) -> Self {
        let registry = Arc::new(
            PresenceRegistry::new(users.clone(), dispatcher.clone()).with_mirror(mirror_presence),
        );
        let membership = GroupMembership::new(groups);

        Self {
            register: RegisterIdentityHandler::new(registry.clone(), users, dispatcher.clone()),
            send_private: SendPrivateMessageHandler::new(
                registry.clone(),
                messages.clone(),
                dispatcher.clone(),
            ),
            send_group: SendGroupMessageHandler::new(
                registry.clone(),
                membership.clone(),
                messages.clone(),
                dispatcher.clone(),
            ),
            rooms: GroupRoomsHandler::new(membership.clone(), dispatcher.clone()),
            typing: TypingHandler::new(registry.clone(), dispatcher.clone()),
            mark_read: MarkConversationReadHandler::new(
                registry.clone(),
                messages,
                dispatcher.clone(),
            ),
            registry,
            membership,
            dispatcher,
        }
    }

    pub fn registry(&self) -> &Arc<PresenceRegistry> {
        &self.registry
    }

    pub fn membership(&self) -> &GroupMembership {
        &self.membership
    }

    /// Start a session for a freshly attached connection and greet it.
    pub async fn open_session(self: &Arc<Self>, handle: ConnectionHandle) -> ChatSession {
        tracing::info!(connection = %handle, "Connection opened");
        self.dispatcher
            .deliver(&handle, ChatEvent::Connected { handle })
            .await;
        ChatSession::new(handle, Arc::clone(self))
    }
}
