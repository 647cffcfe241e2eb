//! Certifier identities and digest signatures
//!
//! A certifier is identified on the ledger by its 20-byte account address.
//! Certifiers sign the raw bytes of the pre-signature digest as an EIP-191
//! personal message; verification recovers the signer from the 65-byte
//! signature and compares it with the claimed address.
//!
//! Key types:
//! - `CertifierAddress`: normalized (EIP-55 checksummed) ledger address
//! - `CertifierKeyPair`: secp256k1 signing key held by a certifier

use crate::digest::Digest;
use crate::error::{CertificateError, Result};
use alloy::primitives::{Address, Signature, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const ADDRESS_LEN: usize = 20;

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Normalized certifier address
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CertifierAddress(Address);

impl CertifierAddress {
    /// Parse an address; case-insensitive, `0x` prefix optional
    pub fn parse(s: &str) -> Result<Self> {
        let bytes = hex::decode(strip_hex_prefix(s.trim())).map_err(|e| {
            CertificateError::Validation(format!("invalid certifier address {}: {}", s, e))
        })?;
        let arr: [u8; ADDRESS_LEN] = bytes.try_into().map_err(|_| {
            CertificateError::Validation(format!(
                "certifier address {} must be {} bytes",
                s, ADDRESS_LEN
            ))
        })?;
        Ok(Self(Address::from(arr)))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }

    /// Recover the signer of `signature_hex` over the digest and compare it
    /// with this address
    pub fn verify(&self, digest: &Digest, signature_hex: &str) -> Result<()> {
        let sig_bytes = hex::decode(strip_hex_prefix(signature_hex.trim())).map_err(|e| {
            CertificateError::InvalidSignature(format!("signature is not hex: {}", e))
        })?;
        let signature = Signature::from_raw(&sig_bytes).map_err(|e| {
            CertificateError::InvalidSignature(format!("malformed signature: {}", e))
        })?;

        let recovered = signature
            .recover_address_from_msg(digest.as_bytes())
            .map_err(|e| {
                CertificateError::InvalidSignature(format!("signer recovery failed: {}", e))
            })?;

        if recovered != self.0 {
            return Err(CertificateError::InvalidSignature(format!(
                "recovered signer {} does not match certifier address {}",
                recovered, self
            )));
        }
        Ok(())
    }
}

impl From<Address> for CertifierAddress {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl fmt::Display for CertifierAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_checksum(None))
    }
}

impl fmt::Debug for CertifierAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CertifierAddress({})", self)
    }
}

impl FromStr for CertifierAddress {
    type Err = CertificateError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for CertifierAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CertifierAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        CertifierAddress::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// secp256k1 key pair held by a certifier
pub struct CertifierKeyPair {
    signer: PrivateKeySigner,
}

impl CertifierKeyPair {
    pub fn generate() -> Self {
        Self {
            signer: PrivateKeySigner::random(),
        }
    }

    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self> {
        let signer = PrivateKeySigner::from_bytes(&B256::from(*bytes)).map_err(|e| {
            CertificateError::Validation(format!("invalid certifier private key: {}", e))
        })?;
        Ok(Self { signer })
    }

    pub fn address(&self) -> CertifierAddress {
        CertifierAddress(self.signer.address())
    }

    /// Sign the raw digest bytes as a personal message; returns `0x`-prefixed
    /// hex of the 65-byte `r || s || v` signature
    pub fn sign_digest(&self, digest: &Digest) -> Result<String> {
        let signature = self
            .signer
            .sign_message_sync(digest.as_bytes())
            .map_err(|e| CertificateError::InvalidSignature(format!("signing failed: {}", e)))?;
        Ok(format!("0x{}", hex::encode(signature.as_bytes())))
    }
}

impl fmt::Debug for CertifierKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertifierKeyPair")
            .field("address", &self.address())
            .finish()
    }
}
