//! # Utilities Library
//!
//! Shared utility functions for base64 encoding, environment variables, time, and validation.

pub mod b64;
pub mod envs;
pub mod time;
pub mod validation;

// Re-export commonly used functions
pub use b64::{b64_decode, b64_encode};
pub use envs::{get_env, get_env_parse};
pub use time::{format_time, now_utc, parse_utc};
pub use validation::{validate_image_ref, validate_min_length, validate_not_empty};
