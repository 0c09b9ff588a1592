//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machine)
//! - `session` - Per-connection lifecycle state
//! - `presence` - Presence entries and change events
//! - `chat` - Messages, groups, outbound events and routing errors
//! - `user` - User records mirrored by the presence core

pub mod chat;
pub mod foundation;
pub mod presence;
pub mod session;
pub mod user;
