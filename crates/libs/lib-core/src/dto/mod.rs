//! # Data Transfer Objects (DTOs)
//!
//! This module contains all data structures used for communication between
//! clients and the backend, both over the REST API and the WebSocket channel.

pub mod auth;
pub mod chat;

pub use auth::*;
pub use chat::*;
