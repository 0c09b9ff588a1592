//! GroupRoomsHandler - join and leave group broadcast rooms.
//!
//! Room subscriptions are bookkeeping on the connection only; they do not
//! touch message persistence or presence.

use std::sync::Arc;

use crate::application::GroupMembership;
use crate::domain::chat::ChatError;
use crate::domain::foundation::{ConnectionHandle, GroupId, Identity};
use crate::ports::EventDispatcher;

#[derive(Debug, Clone)]
pub struct GroupRoomCommand {
    pub identity: Identity,
    pub handle: ConnectionHandle,
    pub group_id: String,
}

pub struct GroupRoomsHandler {
    membership: GroupMembership,
    dispatcher: Arc<dyn EventDispatcher>,
}

impl GroupRoomsHandler {
    pub fn new(membership: GroupMembership, dispatcher: Arc<dyn EventDispatcher>) -> Self {
        Self {
            membership,
            dispatcher,
        }
    }

    /// Subscribe to a group room. Same existence and membership rules as
    /// sending to the group.
    pub async fn join(&self, cmd: GroupRoomCommand) -> Result<GroupId, ChatError> {
        let group_id = GroupId::parse(&cmd.group_id)?;
        self.membership
            .require_member(&group_id, &cmd.identity)
            .await?;
        self.dispatcher.join_room(&cmd.handle, &group_id).await;
        tracing::debug!(identity = %cmd.identity, group_id = %group_id, "Joined group room");
        Ok(group_id)
    }

    /// Unsubscribe from a group room. Leaving a room never joined is a no-op.
    pub async fn leave(&self, cmd: GroupRoomCommand) -> Result<GroupId, ChatError> {
        let group_id = GroupId::parse(&cmd.group_id)?;
        self.dispatcher.leave_room(&cmd.handle, &group_id).await;
        tracing::debug!(identity = %cmd.identity, group_id = %group_id, "Left group room");
        Ok(group_id)
    }
}
