//! # Web Library
//!
//! HTTP handlers, middleware, the realtime chat core, and server setup.

pub mod chat;
pub mod handlers;
pub mod middleware;
pub mod server;

pub use server::{start_server, AppState, ServerConfig};
