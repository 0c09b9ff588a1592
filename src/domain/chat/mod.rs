//! Chat domain module.
//!
//! Messages, groups, the events the router emits and the errors it reports.

mod errors;
mod events;
mod group;
mod message;

pub use errors::ChatError;
pub use events::ChatEvent;
pub use group::Group;
pub use message::{Message, MessageBody, MessageKind, MessageTarget};
