//! # Key Material
//!
//! Typed containers for everything the key hierarchy produces or consumes.
//!
//! ## Key Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          KEY TYPES                                      │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  Salt                                                           │   │
//! │  │  ────                                                           │   │
//! │  │  • Unique per identity, stored next to the identity record     │   │
//! │  │  • Not secret (serializes as hex)                              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  MasterKey (32 bytes)                                           │   │
//! │  │  ─────────                                                      │   │
//! │  │  • scrypt(password, salt)                                      │   │
//! │  │  • Held in memory only, zeroized on drop                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  Subkey (32 bytes)                                              │   │
//! │  │  ──────                                                         │   │
//! │  │  • BLAKE3-keyed(master_key, context)                           │   │
//! │  │  • One per purpose, zeroized on drop                           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Neither secret type prints its bytes through `Debug`. Equality is
//! constant-time.

use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::kdf::keyed_subkey;
use super::{MASTER_KEY_SIZE, SALT_SIZE, SUBKEY_SIZE};
use crate::error::{Error, Result};

/// Root of the key hierarchy, derived from a password
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MasterKey([u8; MASTER_KEY_SIZE]);

impl MasterKey {
    /// Wrap raw master key bytes
    pub fn from_bytes(bytes: [u8; MASTER_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Borrow the raw key bytes
    ///
    /// ## Security Warning
    ///
    /// Never log or transmit these bytes.
    pub fn as_bytes(&self) -> &[u8; MASTER_KEY_SIZE] {
        &self.0
    }

    /// Hex encoding of the key, for explicit display only
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Derive the subkey bound to `context`
    ///
    /// Infallible: the key length is already guaranteed by the type.
    pub fn derive_subkey(&self, context: &str) -> Subkey {
        keyed_subkey(&self.0, context)
    }
}

impl TryFrom<&[u8]> for MasterKey {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let key: [u8; MASTER_KEY_SIZE] =
            bytes.try_into().map_err(|_| Error::InvalidKeyLength {
                expected: MASTER_KEY_SIZE,
                actual: bytes.len(),
            })?;
        Ok(Self(key))
    }
}

impl PartialEq for MasterKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for MasterKey {}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey([REDACTED])")
    }
}

/// Purpose-bound key derived from a [`MasterKey`]
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Subkey([u8; SUBKEY_SIZE]);

impl Subkey {
    /// Wrap raw subkey bytes
    pub fn from_bytes(bytes: [u8; SUBKEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Borrow the raw key bytes
    ///
    /// ## Security Warning
    ///
    /// Never log or transmit these bytes.
    pub fn as_bytes(&self) -> &[u8; SUBKEY_SIZE] {
        &self.0
    }

    /// Hex encoding of the key, for explicit display only
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl PartialEq for Subkey {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for Subkey {}

impl fmt::Debug for Subkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Subkey([REDACTED])")
    }
}

/// Per-identity salt
///
/// Generate one with [`Salt::generate`] when the identity is created and
/// store it with the identity record. Salts are public.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Salt(#[serde(with = "hex_bytes")] Vec<u8>);

impl Salt {
    /// Fresh random salt from the operating system's CSPRNG
    pub fn generate() -> Self {
        let mut bytes = vec![0u8; SALT_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Wrap an existing salt
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Decode a hex-encoded salt
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes = hex::decode(hex_str.trim())
            .map_err(|e| Error::InvalidSalt(format!("Invalid hex: {}", e)))?;
        Ok(Self(bytes))
    }

    /// Borrow the salt bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Hex encoding of the salt
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl AsRef<[u8]> for Salt {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Salt({})", self.to_hex())
    }
}

/// Serde helper for serializing byte vectors as hex
mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// TESTS
// ============================================================================
