//! Chat group aggregate, as far as routing needs it.

use std::collections::BTreeSet;

use crate::domain::foundation::{GroupId, Identity};

use super::ChatError;

/// A named set of members with one admin.
///
/// The admin is always a member and cannot be removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    id: GroupId,
    name: String,
    admin: Identity,
    members: BTreeSet<Identity>,
}

impl Group {
    /// New group whose only member is its admin.
    pub fn new(id: GroupId, name: impl Into<String>, admin: Identity) -> Self {
        Self::from_parts(id, name, admin, BTreeSet::new())
    }

    /// Rebuilds a group from storage; the admin is added to `members`.
    pub fn from_parts(
        id: GroupId,
        name: impl Into<String>,
        admin: Identity,
        mut members: BTreeSet<Identity>,
    ) -> Self {
        members.insert(admin.clone());
        Self {
            id,
            name: name.into(),
            admin,
            members,
        }
    }

    pub fn id(&self) -> &GroupId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn admin(&self) -> &Identity {
        &self.admin
    }

    pub fn members(&self) -> &BTreeSet<Identity> {
        &self.members
    }

    pub fn is_member(&self, identity: &Identity) -> bool {
        self.members.contains(identity)
    }

    /// Adds a member. Returns false if already present.
    pub fn add_member(&mut self, identity: Identity) -> bool {
        self.members.insert(identity)
    }

    /// Removes a member. Returns whether anything was removed.
    pub fn remove_member(&mut self, identity: &Identity) -> Result<bool, ChatError> {
        if identity == &self.admin {
            return Err(ChatError::forbidden(format!(
                "{} is the admin of group {}",
                identity, self.id
            )));
        }
        Ok(self.members.remove(identity))
    }
}
