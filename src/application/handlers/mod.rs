//! Application handlers.
//!
//! One handler per inbound chat operation. Each takes a command struct and
//! talks to the outside world only through ports and the presence registry.

mod group_rooms;
mod mark_read;
mod register_identity;
mod send_group_message;
mod send_private_message;
mod typing;

pub use group_rooms::{GroupRoomCommand, GroupRoomsHandler};
pub use mark_read::{MarkConversationReadCommand, MarkConversationReadHandler};
pub use register_identity::{
    RegisterIdentityCommand, RegisterIdentityHandler, RegisterIdentityResult,
};
pub use send_group_message::{
    SendGroupMessageCommand, SendGroupMessageHandler, SendGroupMessageResult,
};
pub use send_private_message::{
    SendPrivateMessageCommand, SendPrivateMessageHandler, SendPrivateMessageResult,
};
pub use typing::{TypingCommand, TypingHandler};
