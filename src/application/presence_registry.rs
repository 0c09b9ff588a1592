//! In-memory presence registry.
//!
//! Maps each online identity to the connection that currently owns it. This
//! map is the only state shared between connection tasks, so every access
//! goes through the `RwLock`.
//!
//! `presence_changed` is broadcast while the write lock is held, so clients
//! see presence changes in the same order the map applied them. Broadcasting
//! only enqueues onto connection queues. The store mirror runs after the lock
//! is released and may complete out of order; an unregister that finds the
//! identity owned again once its write lands re-mirrors the live owner.
//!
//! # Ownership
//!
//! Re-registering an identity from a second connection replaces the entry
//! (last writer wins). The first connection is left open but orphaned: it no
//! longer receives routed messages, and its eventual `unregister` is ignored
//! because its handle no longer matches the entry.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::chat::ChatEvent;
use crate::domain::foundation::{ConnectionHandle, Identity};
use crate::domain::presence::{PresenceChanged, PresenceEntry, PresenceUpdate};
use crate::ports::{EventDispatcher, UserPresenceStore};

pub struct PresenceRegistry {
    entries: RwLock<HashMap<Identity, PresenceEntry>>,
    store: Arc<dyn UserPresenceStore>,
    dispatcher: Arc<dyn EventDispatcher>,
    mirror_presence: bool,
}

impl PresenceRegistry {
    pub fn new(store: Arc<dyn UserPresenceStore>, dispatcher: Arc<dyn EventDispatcher>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            store,
            dispatcher,
            mirror_presence: true,
        }
    }

    /// Enable or disable the advisory write-through to the user store.
    pub fn with_mirror(mut self, enabled: bool) -> Self {
        self.mirror_presence = enabled;
        self
    }

    /// Bind `identity` to `handle`, replacing any previous owner.
    ///
    /// Returns the handle that was orphaned, if a different connection
    /// owned the identity before.
    pub async fn register(
        &self,
        identity: Identity,
        handle: ConnectionHandle,
    ) -> Option<ConnectionHandle> {
        let orphaned = {
            let mut entries = self.entries.write().await;
            let orphaned = entries
                .insert(identity.clone(), PresenceEntry::new(identity.clone(), handle))
                .map(|previous| previous.handle)
                .filter(|previous| previous != &handle);
            self.dispatcher
                .broadcast(ChatEvent::PresenceChanged(PresenceChanged::online(
                    identity.clone(),
                )))
                .await;
            orphaned
        };

        if let Some(orphan) = &orphaned {
            tracing::warn!(
                identity = %identity,
                orphaned = %orphan,
                connection = %handle,
                "Identity re-registered; previous connection no longer routable"
            );
        }

        self.mirror(PresenceUpdate::connected(identity, &handle))
            .await;

        orphaned
    }

    /// Remove `identity` if `handle` still owns it.
    ///
    /// Returns whether an entry was removed.
    pub async fn unregister(&self, identity: &Identity, handle: &ConnectionHandle) -> bool {
        let removed = {
            let mut entries = self.entries.write().await;
            let owned = entries
                .get(identity)
                .is_some_and(|entry| entry.is_owned_by(handle));
            if owned {
                entries.remove(identity);
                self.dispatcher
                    .broadcast(ChatEvent::PresenceChanged(PresenceChanged::offline(
                        identity.clone(),
                    )))
                    .await;
            }
            owned
        };

        if !removed {
            tracing::debug!(
                identity = %identity,
                connection = %handle,
                "Unregister ignored; connection does not own the entry"
            );
            return false;
        }

        self.mirror(PresenceUpdate::disconnected(identity.clone()))
            .await;

        // A reconnect may have claimed the identity while the offline write
        // was in flight; leave the store showing the live owner.
        if let Some(owner) = self.lookup(identity).await {
            tracing::debug!(
                identity = %identity,
                connection = %owner,
                "Identity reclaimed during unregister; re-mirroring owner"
            );
            self.mirror(PresenceUpdate::connected(identity.clone(), &owner))
                .await;
        }

        true
    }

    /// The connection currently owning `identity`.
    pub async fn lookup(&self, identity: &Identity) -> Option<ConnectionHandle> {
        self.entries.read().await.get(identity).map(|e| e.handle)
    }

    /// Resolve many identities under one read lock.
    ///
    /// Offline identities are skipped and each connection appears once.
    pub async fn resolve<'a, I>(&self, identities: I) -> Vec<ConnectionHandle>
    where
        I: IntoIterator<Item = &'a Identity>,
    {
        let entries = self.entries.read().await;
        let mut seen = HashSet::new();
        identities
            .into_iter()
            .filter_map(|identity| entries.get(identity).map(|e| e.handle))
            .filter(|handle| seen.insert(*handle))
            .collect()
    }

    /// Online identities, sorted.
    pub async fn online_identities(&self) -> Vec<Identity> {
        let mut online: Vec<Identity> = self.entries.read().await.keys().cloned().collect();
        online.sort();
        online
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    async fn mirror(&self, update: PresenceUpdate) {
        if !self.mirror_presence {
            return;
        }
        if let Err(e) = self.store.upsert_user_presence(&update).await {
            tracing::warn!(
                identity = %update.identity,
                online = update.online,
                error = %e,
                "Presence mirror write failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use crate::adapters::memory::InMemoryStore;
    use crate::application::test_support::RecordingDispatcher;
    use crate::domain::foundation::DomainError;
    use crate::domain::user::UserRecord;

    /// Store whose offline writes park until released, once armed.
    #[derive(Default)]
    struct SlowOfflineStore {
        inner: InMemoryStore,
        armed: AtomicBool,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl UserPresenceStore for SlowOfflineStore {
        async fn find_user(&self, identity: &Identity) -> Result<Option<UserRecord>, DomainError> {
            self.inner.find_user(identity).await
        }

        async fn upsert_user_presence(&self, update: &PresenceUpdate) -> Result<(), DomainError> {
            if !update.online && self.armed.swap(false, Ordering::SeqCst) {
                self.entered.notify_one();
                self.release.notified().await;
            }
            self.inner.upsert_user_presence(update).await
        }
    }

    fn online_flags(events: &[ChatEvent]) -> Vec<bool> {
        events
            .iter()
            .filter_map(|event| match event {
                ChatEvent::PresenceChanged(change) => Some(change.online),
                _ => None,
            })
            .collect()
    }

    fn id(name: &str) -> Identity {
        Identity::new(name).unwrap()
    }

    fn registry() -> (PresenceRegistry, Arc<InMemoryStore>, Arc<RecordingDispatcher>) {
        let store = Arc::new(InMemoryStore::new());
        let dispatcher = Arc::new(RecordingDispatcher::new());
        let registry = PresenceRegistry::new(store.clone(), dispatcher.clone());
        (registry, store, dispatcher)
    }

    #[tokio::test]
    async fn lookup_returns_registered_handle() {
        let (registry, _, _) = registry();
        let h1 = ConnectionHandle::new();

        assert!(registry.register(id("alice"), h1).await.is_none());
        assert_eq!(registry.lookup(&id("alice")).await, Some(h1));
    }

    #[tokio::test]
    async fn re_registration_replaces_handle_and_reports_orphan() {
        let (registry, _, _) = registry();
        let h1 = ConnectionHandle::new();
        let h2 = ConnectionHandle::new();

        registry.register(id("alice"), h1).await;
        let orphaned = registry.register(id("alice"), h2).await;

        assert_eq!(orphaned, Some(h1));
        assert_eq!(registry.lookup(&id("alice")).await, Some(h2));
    }

    #[tokio::test]
    async fn registering_same_handle_twice_is_idempotent() {
        let (registry, _, _) = registry();
        let h1 = ConnectionHandle::new();

        registry.register(id("alice"), h1).await;
        assert!(registry.register(id("alice"), h1).await.is_none());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn unregister_by_non_owner_is_ignored() {
        let (registry, _, dispatcher) = registry();
        let h1 = ConnectionHandle::new();
        let h2 = ConnectionHandle::new();

        registry.register(id("alice"), h1).await;
        registry.register(id("alice"), h2).await;
        dispatcher.clear();

        assert!(!registry.unregister(&id("alice"), &h1).await);
        assert_eq!(registry.lookup(&id("alice")).await, Some(h2));
        assert!(dispatcher.broadcasts().is_empty());
    }

    #[tokio::test]
    async fn unregister_by_owner_removes_and_broadcasts_offline() {
        let (registry, _, dispatcher) = registry();
        let h1 = ConnectionHandle::new();

        registry.register(id("alice"), h1).await;
        assert!(registry.unregister(&id("alice"), &h1).await);
        assert!(registry.lookup(&id("alice")).await.is_none());

        let broadcasts = dispatcher.broadcasts();
        assert_eq!(broadcasts.len(), 2);
        match &broadcasts[1] {
            ChatEvent::PresenceChanged(change) => {
                assert_eq!(change.identity, id("alice"));
                assert!(!change.online);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn register_mirrors_presence_to_store() {
        let (registry, store, _) = registry();
        let h1 = ConnectionHandle::new();

        registry.register(id("alice"), h1).await;

        let user = store.user(&id("alice")).await.unwrap();
        assert!(user.online);
        assert_eq!(user.connection_ref, Some(h1.to_string()));

        registry.unregister(&id("alice"), &h1).await;
        let user = store.user(&id("alice")).await.unwrap();
        assert!(!user.online);
        assert!(user.last_seen.is_some());
    }

    #[tokio::test]
    async fn mirror_failure_does_not_block_registration() {
        let (registry, store, dispatcher) = registry();
        store.fail_presence_writes(true);
        let h1 = ConnectionHandle::new();

        registry.register(id("alice"), h1).await;

        assert_eq!(registry.lookup(&id("alice")).await, Some(h1));
        assert_eq!(dispatcher.broadcasts().len(), 1);
        assert!(store.user(&id("alice")).await.is_none());
    }

    #[tokio::test]
    async fn disabled_mirror_skips_store() {
        let store = Arc::new(InMemoryStore::new());
        let dispatcher = Arc::new(RecordingDispatcher::new());
        let registry = PresenceRegistry::new(store.clone(), dispatcher).with_mirror(false);

        registry.register(id("alice"), ConnectionHandle::new()).await;
        assert!(store.user(&id("alice")).await.is_none());
    }

    #[tokio::test]
    async fn resolve_skips_offline_and_dedupes_handles() {
        let (registry, _, _) = registry();
        let shared = ConnectionHandle::new();
        let bob = ConnectionHandle::new();

        registry.register(id("alice"), shared).await;
        registry.register(id("alice-alt"), shared).await;
        registry.register(id("bob"), bob).await;

        let members = [id("alice"), id("alice-alt"), id("bob"), id("carol")];
        let handles = registry.resolve(members.iter()).await;

        assert_eq!(handles.len(), 2);
        assert!(handles.contains(&shared));
        assert!(handles.contains(&bob));
    }

    #[tokio::test]
    async fn online_identities_are_sorted() {
        let (registry, _, _) = registry();
        registry.register(id("carol"), ConnectionHandle::new()).await;
        registry.register(id("alice"), ConnectionHandle::new()).await;

        assert_eq!(registry.online_identities().await, vec![id("alice"), id("carol")]);
    }

    #[tokio::test]
    async fn reconnect_during_slow_offline_write_ends_online() {
        let store = Arc::new(SlowOfflineStore::default());
        let dispatcher = Arc::new(RecordingDispatcher::new());
        let registry = Arc::new(PresenceRegistry::new(store.clone(), dispatcher.clone()));
        let h1 = ConnectionHandle::new();
        let h2 = ConnectionHandle::new();

        registry.register(id("alice"), h1).await;
        store.armed.store(true, Ordering::SeqCst);

        let leaving = {
            let registry = registry.clone();
            tokio::spawn(async move { registry.unregister(&id("alice"), &h1).await })
        };
        store.entered.notified().await;

        registry.register(id("alice"), h2).await;
        store.release.notify_one();
        assert!(leaving.await.unwrap());

        assert_eq!(online_flags(&dispatcher.broadcasts()), vec![true, false, true]);
        assert_eq!(registry.lookup(&id("alice")).await, Some(h2));

        let user = store.inner.user(&id("alice")).await.unwrap();
        assert!(user.online);
        assert_eq!(user.connection_ref, Some(h2.to_string()));
    }
}
