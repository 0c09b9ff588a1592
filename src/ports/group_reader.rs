//! GroupReader port - read access to group records.
//!
//! Group creation and membership edits happen outside the routing core.
//! Every read returns a fresh snapshot; callers must not cache it across
//! operations.

use async_trait::async_trait;

use crate::domain::chat::Group;
use crate::domain::foundation::{DomainError, GroupId};

#[async_trait]
pub trait GroupReader: Send + Sync {
    /// Find a group with its admin and member set.
    ///
    /// Returns `None` if the group does not exist.
    async fn find_group(&self, id: &GroupId) -> Result<Option<Group>, DomainError>;
}
