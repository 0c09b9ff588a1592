//! RegisterIdentityHandler - binds a connection's identity into presence.
//!
//! The session has already moved its own state to `Bound`; this handler
//! performs the shared-state side: release a previously bound identity,
//! claim the new one and greet the session with who is online.

use std::sync::Arc;

use crate::application::PresenceRegistry;
use crate::domain::chat::ChatEvent;
use crate::domain::foundation::{ConnectionHandle, Identity};
use crate::ports::{EventDispatcher, UserPresenceStore};

#[derive(Debug, Clone)]
pub struct RegisterIdentityCommand {
    pub handle: ConnectionHandle,
    pub identity: Identity,
    /// Identity this connection was bound to before, if it changed.
    pub released: Option<Identity>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterIdentityResult {
    /// Connection that owned the identity before and is now orphaned.
    pub orphaned: Option<ConnectionHandle>,
    pub known_user: bool,
}

pub struct RegisterIdentityHandler {
    registry: Arc<PresenceRegistry>,
    users: Arc<dyn UserPresenceStore>,
    dispatcher: Arc<dyn EventDispatcher>,
}

impl RegisterIdentityHandler {
    pub fn new(
        registry: Arc<PresenceRegistry>,
        users: Arc<dyn UserPresenceStore>,
        dispatcher: Arc<dyn EventDispatcher>,
    ) -> Self {
        Self {
            registry,
            users,
            dispatcher,
        }
    }

    pub async fn handle(&self, cmd: RegisterIdentityCommand) -> RegisterIdentityResult {
        if let Some(released) = &cmd.released {
            self.registry.unregister(released, &cmd.handle).await;
        }

        let known_user = match self.users.find_user(&cmd.identity).await {
            Ok(Some(_)) => true,
            Ok(None) => {
                tracing::debug!(identity = %cmd.identity, "Registering identity without a user record");
                false
            }
            Err(e) => {
                tracing::warn!(identity = %cmd.identity, error = %e, "User lookup failed during registration");
                false
            }
        };

        let orphaned = self
            .registry
            .register(cmd.identity.clone(), cmd.handle)
            .await;

        tracing::info!(
            identity = %cmd.identity,
            connection = %cmd.handle,
            "Identity registered"
        );

        let online = self.registry.online_identities().await;
        self.dispatcher
            .deliver(&cmd.handle, ChatEvent::PresenceSnapshot { online })
            .await;

        RegisterIdentityResult {
            orphaned,
            known_user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::application::test_support::RecordingDispatcher;

    fn id(name: &str) -> Identity {
        Identity::new(name).unwrap()
    }

    fn setup() -> (
        RegisterIdentityHandler,
        Arc<PresenceRegistry>,
        Arc<InMemoryStore>,
        Arc<RecordingDispatcher>,
    ) {
        let store = Arc::new(InMemoryStore::new());
        let dispatcher = Arc::new(RecordingDispatcher::new());
        let registry = Arc::new(PresenceRegistry::new(store.clone(), dispatcher.clone()));
        let handler = RegisterIdentityHandler::new(registry.clone(), store.clone(), dispatcher.clone());
        (handler, registry, store, dispatcher)
    }

    #[tokio::test]
    async fn registers_and_sends_snapshot_to_caller() {
        let (handler, registry, _, dispatcher) = setup();
        let handle = ConnectionHandle::new();

        let result = handler
            .handle(RegisterIdentityCommand {
                handle,
                identity: id("alice"),
                released: None,
            })
            .await;

        assert!(result.orphaned.is_none());
        assert_eq!(registry.lookup(&id("alice")).await, Some(handle));
        assert_eq!(
            dispatcher.delivered_to(&handle),
            vec![ChatEvent::PresenceSnapshot {
                online: vec![id("alice")]
            }]
        );
    }

    #[tokio::test]
    async fn releases_previous_identity_of_same_connection() {
        let (handler, registry, _, _) = setup();
        let handle = ConnectionHandle::new();

        handler
            .handle(RegisterIdentityCommand {
                handle,
                identity: id("alice"),
                released: None,
            })
            .await;
        handler
            .handle(RegisterIdentityCommand {
                handle,
                identity: id("alicia"),
                released: Some(id("alice")),
            })
            .await;

        assert!(registry.lookup(&id("alice")).await.is_none());
        assert_eq!(registry.lookup(&id("alicia")).await, Some(handle));
    }

    #[tokio::test]
    async fn reports_whether_user_record_exists() {
        let (handler, _, store, _) = setup();
        store.insert_user(id("bob")).await;

        let known = handler
            .handle(RegisterIdentityCommand {
                handle: ConnectionHandle::new(),
                identity: id("bob"),
                released: None,
            })
            .await;
        let unknown = handler
            .handle(RegisterIdentityCommand {
                handle: ConnectionHandle::new(),
                identity: id("ghost"),
                released: None,
            })
            .await;

        assert!(known.known_user);
        assert!(!unknown.known_user);
    }

    #[tokio::test]
    async fn second_connection_orphans_first() {
        let (handler, registry, _, _) = setup();
        let h1 = ConnectionHandle::new();
        let h2 = ConnectionHandle::new();

        for handle in [h1, h2] {
            handler
                .handle(RegisterIdentityCommand {
                    handle,
                    identity: id("alice"),
                    released: None,
                })
                .await;
        }

        assert_eq!(registry.lookup(&id("alice")).await, Some(h2));
    }
}
