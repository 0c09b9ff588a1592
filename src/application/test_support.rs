//! Test doubles shared by application-layer unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::chat::ChatEvent;
use crate::domain::foundation::{ConnectionHandle, GroupId};
use crate::ports::EventDispatcher;

/// Dispatcher that records everything instead of delivering it.
///
/// Every handle counts as attached unless marked gone.
pub struct RecordingDispatcher {
    deliveries: Mutex<Vec<(ConnectionHandle, ChatEvent)>>,
    broadcasts: Mutex<Vec<ChatEvent>>,
    rooms: Mutex<HashMap<ConnectionHandle, HashSet<GroupId>>>,
    gone: Mutex<HashSet<ConnectionHandle>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self {
            deliveries: Mutex::new(Vec::new()),
            broadcasts: Mutex::new(Vec::new()),
            rooms: Mutex::new(HashMap::new()),
            gone: Mutex::new(HashSet::new()),
        }
    }

    pub fn mark_gone(&self, handle: ConnectionHandle) {
        self.gone.lock().unwrap().insert(handle);
    }

    pub fn deliveries(&self) -> Vec<(ConnectionHandle, ChatEvent)> {
        self.deliveries.lock().unwrap().clone()
    }

    pub fn delivered_to(&self, handle: &ConnectionHandle) -> Vec<ChatEvent> {
        self.deliveries()
            .into_iter()
            .filter(|(to, _)| to == handle)
            .map(|(_, event)| event)
            .collect()
    }

    pub fn broadcasts(&self) -> Vec<ChatEvent> {
        self.broadcasts.lock().unwrap().clone()
    }

    pub fn rooms_of(&self, handle: &ConnectionHandle) -> HashSet<GroupId> {
        self.rooms
            .lock()
            .unwrap()
            .get(handle)
            .cloned()
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        self.deliveries.lock().unwrap().clear();
        self.broadcasts.lock().unwrap().clear();
    }
}

#[async_trait]
impl EventDispatcher for RecordingDispatcher {
    async fn deliver(&self, to: &ConnectionHandle, event: ChatEvent) -> bool {
        if self.gone.lock().unwrap().contains(to) {
            return false;
        }
        self.deliveries.lock().unwrap().push((*to, event));
        true
    }

    async fn broadcast(&self, event: ChatEvent) {
        self.broadcasts.lock().unwrap().push(event);
    }

    async fn join_room(&self, handle: &ConnectionHandle, group_id: &GroupId) {
        self.rooms
            .lock()
            .unwrap()
            .entry(*handle)
            .or_default()
            .insert(*group_id);
    }

    async fn leave_room(&self, handle: &ConnectionHandle, group_id: &GroupId) {
        if let Some(rooms) = self.rooms.lock().unwrap().get_mut(handle) {
            rooms.remove(group_id);
        }
    }

    async fn leave_all_rooms(&self, handle: &ConnectionHandle) {
        self.rooms.lock().unwrap().remove(handle);
    }
}
