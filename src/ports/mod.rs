//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the routing core and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `UserPresenceStore` - User lookup and advisory presence mirror
//! - `GroupReader` - Group and member-set snapshots
//! - `MessageRepository` - Message append and bulk read update
//!
//! ## Delivery Ports
//!
//! - `EventDispatcher` - Targeted and broadcast delivery, group rooms

mod event_dispatcher;
mod group_reader;
mod message_repository;
mod user_presence_store;

pub use event_dispatcher::EventDispatcher;
pub use group_reader::GroupReader;
pub use message_repository::MessageRepository;
pub use user_presence_store::UserPresenceStore;
