//! # Subkey Expansion
//!
//! Fans a master key out into independent, purpose-bound subkeys.
//!
//! ## Key Derivation Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    KEY DERIVATION HIERARCHY                             │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    PASSWORD + SALT                              │   │
//! │  │                                                                 │   │
//! │  │  • Low entropy, supplied by the user                           │   │
//! │  │  • Salt unique per identity                                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │                                ▼                                        │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    MASTER KEY (32 bytes)                        │   │
//! │  │                                                                 │   │
//! │  │  scrypt(password, salt, N = 2^17, r = 8, p = 1)               │   │
//! │  │  Slow and memory-hard: extracts entropy from a weak secret     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │              ┌─────────────────┴─────────────────┐                     │
//! │              ▼                                   ▼                     │
//! │  ┌───────────────────────────┐   ┌───────────────────────────┐       │
//! │  │   DATA ENCRYPTION KEY     │   │        HMAC KEY           │       │
//! │  │                           │   │                           │       │
//! │  │  BLAKE3-keyed(            │   │  BLAKE3-keyed(            │       │
//! │  │    key = master_key,      │   │    key = master_key,      │       │
//! │  │    msg = "<app> <epoch>   │   │    msg = "<app> <epoch>   │       │
//! │  │      Data Encryption Key" │   │      HMAC Key"            │       │
//! │  │  )                        │   │  )                        │       │
//! │  └───────────────────────────┘   └───────────────────────────┘       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Security Considerations
//!
//! | Aspect | Design Choice | Rationale |
//! |--------|---------------|-----------|
//! | Stretching | scrypt | Memory-hard, for low-entropy input |
//! | Expansion | BLAKE3 keyed hash | PRF over the context, for high-entropy input |
//! | Key Separation | Distinct context strings | Independent subkeys per purpose |
//! | Versioning | Epoch inside the context | New epoch, new key schedule |
//!
//! The two stages are never swapped: scrypt is not used for domain
//! separation, and the fast expander never sees the raw password.

use zeroize::Zeroizing;

use super::context::KeyContext;
use super::keys::Subkey;
use super::MASTER_KEY_SIZE;
use crate::error::{Error, Result};

/// Expand `master_key` into the subkey bound to `context`
///
/// ## Process
///
/// ```text
/// Master Key (32 bytes)
///       │
///       └──► BLAKE3-keyed(key = master_key, msg = context) → Subkey
/// ```
///
/// Fails with [`Error::InvalidKeyLength`] unless `master_key` is exactly
/// 32 bytes.
pub fn expand(master_key: &[u8], context: &str) -> Result<Subkey> {
    let key = master_key_array(master_key)?;
    Ok(keyed_subkey(&key, context))
}

/// Expand using a validated [`KeyContext`]
pub fn expand_with(master_key: &[u8], context: &KeyContext) -> Result<Subkey> {
    expand(master_key, context.as_str())
}

/// Expand several purposes at once
///
/// Fails with [`Error::InvalidContext`] when two contexts are identical,
/// since they would produce the same key for what should be different
/// purposes.
///
/// ## Example Use Case
///
/// ```text
/// Master Key
///       │
///       ├──► "<app> <epoch> Data Encryption Key"
///       ├──► "<app> <epoch> HMAC Key"
///       └──► "<app> <epoch> Search Index Key"
/// ```
pub fn expand_many<const N: usize>(
    master_key: &[u8],
    contexts: &[&str; N],
) -> Result<[Subkey; N]> {
    let key = master_key_array(master_key)?;

    for (i, context) in contexts.iter().enumerate() {
        if contexts[..i].contains(context) {
            return Err(Error::InvalidContext(format!(
                "context {:?} appears more than once",
                context
            )));
        }
    }

    Ok(contexts.map(|context| keyed_subkey(&key, context)))
}

pub(crate) fn keyed_subkey(key: &[u8; MASTER_KEY_SIZE], context: &str) -> Subkey {
    let hash = blake3::keyed_hash(key, context.as_bytes());
    Subkey::from_bytes(*hash.as_bytes())
}

fn master_key_array(master_key: &[u8]) -> Result<Zeroizing<[u8; MASTER_KEY_SIZE]>> {
    let key: [u8; MASTER_KEY_SIZE] =
        master_key.try_into().map_err(|_| Error::InvalidKeyLength {
            expected: MASTER_KEY_SIZE,
            actual: master_key.len(),
        })?;
    Ok(Zeroizing::new(key))
}

// ============================================================================
// TESTS
// ============================================================================
