//! Opaque file handles.

use crate::error::{Error, Result};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of a rendered handle: 16 random bytes, hex-encoded.
pub const HANDLE_LEN: usize = 32;

/// Opaque, unguessable identifier for an uploaded file.
///
/// A handle is a 128-bit random value rendered as lowercase hex. It is
/// generated once at registration and never reused; once the record it names
/// is deleted, the handle is permanently invalid. Collision probability is
/// negligible at this size, so no uniqueness check against live handles is
/// performed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileHandle(String);

impl FileHandle {
    /// Generate a fresh random handle using a cryptographically secure RNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        rand::rng().fill_bytes(&mut bytes);
        Self(bytes.iter().map(|b| format!("{b:02x}")).collect())
    }

    /// Parse a client-supplied handle, validating its shape.
    ///
    /// Malformed handles are rejected here so path parameters never reach the
    /// registry (they cannot name a live record anyway).
    pub fn parse(s: &str) -> Result<Self> {
        if s.len() != HANDLE_LEN || !s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(Error::InvalidHandle(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    /// The handle as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_handles_are_well_formed() {
        let handle = FileHandle::generate();
        assert_eq!(handle.as_str().len(), HANDLE_LEN);
        FileHandle::parse(handle.as_str()).unwrap();
    }

    #[test]
    fn generated_handles_are_distinct() {
        let a = FileHandle::generate();
        let b = FileHandle::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn parse_rejects_malformed_handles() {
        assert!(FileHandle::parse("").is_err());
        assert!(FileHandle::parse("short").is_err());
        assert!(FileHandle::parse(&"g".repeat(HANDLE_LEN)).is_err());
        assert!(FileHandle::parse(&"A".repeat(HANDLE_LEN)).is_err());
        assert!(FileHandle::parse("../../../../../../etc/passwd0000000").is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let handle = FileHandle::generate();
        let json = serde_json::to_string(&handle).unwrap();
        assert_eq!(json, format!("\"{handle}\""));
    }
}
