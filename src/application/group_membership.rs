//! Group membership checks over the group store.
//!
//! Every call reads a fresh snapshot. A snapshot is only trusted for the
//! duration of the operation that fetched it.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::chat::{ChatError, Group};
use crate::domain::foundation::{GroupId, Identity};
use crate::ports::GroupReader;

#[derive(Clone)]
pub struct GroupMembership {
    groups: Arc<dyn GroupReader>,
}

impl GroupMembership {
    pub fn new(groups: Arc<dyn GroupReader>) -> Self {
        Self { groups }
    }

    /// Load a group or fail with `GroupNotFound`.
    pub async fn group(&self, group_id: &GroupId) -> Result<Group, ChatError> {
        self.groups
            .find_group(group_id)
            .await?
            .ok_or_else(|| ChatError::group_not_found(group_id))
    }

    /// False for unknown groups.
    pub async fn is_member(&self, group_id: &GroupId, identity: &Identity) -> Result<bool, ChatError> {
        Ok(self
            .groups
            .find_group(group_id)
            .await?
            .is_some_and(|group| group.is_member(identity)))
    }

    pub async fn members_of(&self, group_id: &GroupId) -> Result<BTreeSet<Identity>, ChatError> {
        Ok(self.group(group_id).await?.members().clone())
    }

    /// Load a group and check that `identity` belongs to it.
    ///
    /// `GroupNotFound` for unknown groups, `Forbidden` for non-members.
    pub async fn require_member(
        &self,
        group_id: &GroupId,
        identity: &Identity,
    ) -> Result<Group, ChatError> {
        let group = self.group(group_id).await?;
        if !group.is_member(identity) {
            return Err(ChatError::forbidden(format!(
                "{} is not a member of group {}",
                identity, group_id
            )));
        }
        Ok(group)
    }
}
