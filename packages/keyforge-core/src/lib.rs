//! # Keyforge Core
//!
//! Password-based key hierarchy.
//!
//! A low-entropy password and a per-identity salt are stretched with scrypt
//! into a 32-byte master key. The master key is then expanded with keyed
//! BLAKE3 into any number of independent subkeys, one per purpose, each bound
//! to a context string of the form `"<application> <epoch> <purpose>"`.
//!
//! ## Usage
//!
//! ```no_run
//! use keyforge_core::{stretch, KeyContext, Salt, StretchParams};
//!
//! # fn main() -> keyforge_core::Result<()> {
//! let salt = Salt::from_bytes(b"unique-salt-for-user".to_vec());
//! let master = stretch(b"user-password", salt.as_bytes(), &StretchParams::default())?;
//!
//! let dek = KeyContext::new("My Application", "2025-02-03 11:30:00", "Data Encryption Key")?;
//! let hmac = dek.with_purpose("HMAC Key")?;
//!
//! let encryption_key = master.derive_subkey(dek.as_str());
//! let hmac_key = master.derive_subkey(hmac.as_str());
//! # let _ = (encryption_key, hmac_key);
//! # Ok(())
//! # }
//! ```
//!
//! ## Responsibilities Left to the Caller
//!
//! - Persist the salt with the identity record (generate it with
//!   [`Salt::generate`]).
//! - Persist the epoch if key schedules are versioned.
//! - Drop keys as soon as they are no longer needed. [`MasterKey`] and
//!   [`Subkey`] zeroize themselves on drop.
//! - Run [`stretch`] off latency-sensitive paths, e.g. via
//!   [`stretch_blocking`].

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod crypto;
pub mod error;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use crypto::{
    expand, expand_many, expand_with, stretch, stretch_blocking, stretch_into, KeyContext,
    MasterKey, Salt, StretchParams, Subkey, MASTER_KEY_SIZE, SUBKEY_SIZE,
};
pub use error::{Error, Result};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Returns the version of Keyforge Core
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
