//! # HTTP Handlers
//!
//! Request handlers for the REST surface of the chat service.
//!
//! ## Endpoints
//!
//! - `POST /api/auth/register` - Create an account ([`auth::register`])
//! - `POST /api/auth/login` - Authenticate and get a JWT ([`auth::login`])
//! - `GET /api/users` - List contactable users ([`users::list_users`])
//! - `POST /api/profile` - Update own display name / picture ([`users::update_profile`])
//! - `GET /api/messages/{target}` - Conversation history ([`history::get_history`])
//!
//! The realtime channel lives in [`crate::chat`], not here.

// region: --- Modules
pub mod auth;
pub mod history;
pub mod users;
// endregion: --- Modules
