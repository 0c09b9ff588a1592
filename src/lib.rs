//! Presence Hub - real-time presence and message routing for chat
//!
//! This crate tracks which users are connected, routes private and group
//! messages to their live connections, persists message history and emits
//! presence and typing events over WebSockets.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
