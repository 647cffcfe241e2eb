//! Keccak-256 content fingerprints
//!
//! A [`Digest`] is the 32-byte output of the hash service. It is rendered as
//! lowercase hex without a prefix; parsing accepts an optional `0x` prefix and
//! either case so that digests copied from ledger explorers still resolve.

use crate::error::{CertificateError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest as _, Keccak256};
use std::fmt;
use std::str::FromStr;

/// Size of a digest in bytes
pub const DIGEST_LEN: usize = 32;

/// A Keccak-256 digest
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Lowercase hex, no prefix
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex, with or without `0x`
    pub fn from_hex(s: &str) -> Result<Self> {
        let trimmed = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let bytes = hex::decode(trimmed)
            .map_err(|e| CertificateError::Validation(format!("invalid digest hex: {}", e)))?;
        let arr: [u8; DIGEST_LEN] = bytes.try_into().map_err(|v: Vec<u8>| {
            CertificateError::Validation(format!(
                "digest must be {} bytes, got {}",
                DIGEST_LEN,
                v.len()
            ))
        })?;
        Ok(Self(arr))
    }
}

/// Keccak-256 of arbitrary bytes
pub fn keccak256(data: &[u8]) -> Digest {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();

    let mut bytes = [0u8; DIGEST_LEN];
    bytes.copy_from_slice(&result);
    Digest(bytes)
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl FromStr for Digest {
    type Err = CertificateError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Digest::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
