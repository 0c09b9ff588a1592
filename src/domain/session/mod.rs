//! Connection session domain module.
//!
//! A session is the server-side view of one transport connection. It starts
//! `Unbound`, becomes `Bound` to an identity on registration and ends
//! `Closed` when the transport goes away.

mod state;

pub use state::{ConnectionState, SessionStatus};
