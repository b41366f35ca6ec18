//! # Base64 Encoding/Decoding
//!
//! Standard-alphabet base64 helpers, used to sanity-check the payload of
//! `data:` image URIs before they are accepted into a message.

use base64::{engine::general_purpose, Engine as _};

/// Encode bytes to a standard base64 string.
pub fn b64_encode(content: impl AsRef<[u8]>) -> String {
    general_purpose::STANDARD.encode(content)
}

/// Decode a standard base64 string to bytes.
pub fn b64_decode(b64: &str) -> Result<Vec<u8>, Error> {
    general_purpose::STANDARD
        .decode(b64)
        .map_err(|_| Error::FailToB64Decode)
}

// region:    --- Error
#[derive(Debug)]
pub enum Error {
    FailToB64Decode,
}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{self:?}")
    }
}

impl std::error::Error for Error {}
// endregion: --- Error

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode() {
        let encoded = b64_encode("driftchat");
        assert_eq!(b64_decode(&encoded).unwrap(), b"driftchat");
    }

    #[test]
    fn test_decode_invalid() {
        assert!(b64_decode("not base64 at all!!!").is_err());
    }
}
