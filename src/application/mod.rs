//! Application layer - presence registry, session lifecycle and handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! A [`ChatSession`] decodes nothing and knows no transport; it turns
//! [`SessionCommand`]s into handler calls against shared [`ChatServices`].

mod group_membership;
pub mod handlers;
mod presence_registry;
mod services;
mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use group_membership::GroupMembership;
pub use presence_registry::PresenceRegistry;
pub use services::ChatServices;
pub use session::{ChatSession, SessionCommand};
