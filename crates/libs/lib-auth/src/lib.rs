//! # Authentication Library
//!
//! Password hashing (Argon2) and JWT token management for the chat backend.

pub mod pwd;
pub mod token;

pub use pwd::{hash_password, verify_password};
pub use token::{decode_jwt, encode_jwt, Claims};
