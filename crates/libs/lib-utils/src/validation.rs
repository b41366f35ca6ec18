//! # Validation Utilities
//!
//! Input validation helpers for user and message fields.

use crate::b64::b64_decode;

/// Validate that a string is not empty.
pub fn validate_not_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} cannot be empty", field_name))
    } else {
        Ok(())
    }
}

/// Validate minimum length.
pub fn validate_min_length(value: &str, min: usize, field_name: &str) -> Result<(), String> {
    if value.len() < min {
        Err(format!("{} must be at least {} characters", field_name, min))
    } else {
        Ok(())
    }
}

/// Validate an image reference: either an http(s) URL or a base64 `data:` URI.
///
/// For data URIs the base64 payload must actually decode; a URL is only
/// checked for scheme, the content is never fetched server-side.
pub fn validate_image_ref(image: &str) -> Result<(), String> {
    if image.starts_with("http://") || image.starts_with("https://") {
        return Ok(());
    }

    if let Some(rest) = image.strip_prefix("data:") {
        let payload = rest
            .split_once(";base64,")
            .map(|(_, payload)| payload)
            .ok_or_else(|| "data URI must be base64 encoded".to_string())?;
        b64_decode(payload).map_err(|_| "data URI payload is not valid base64".to_string())?;
        return Ok(());
    }

    Err("image must be an http(s) URL or a data URI".to_string())
}
