//! # Cryptography Module
//!
//! The two-stage key hierarchy: stretch a password into a master key, then
//! expand the master key into purpose-bound subkeys.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    KEY HIERARCHY                                        │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │   password, salt ──► stretch (scrypt) ──► MasterKey                    │
//! │                                              │                          │
//! │                      ┌───────────────────────┼───────────────────┐     │
//! │                      ▼                       ▼                   ▼     │
//! │           expand(ctx "… Data         expand(ctx "…       expand(ctx    │
//! │           Encryption Key")           HMAC Key")          "… <purpose>")│
//! │                      │                       │                   │     │
//! │                      ▼                       ▼                   ▼     │
//! │                   Subkey                  Subkey              Subkey    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod context;
mod kdf;
mod keys;
mod stretch;

pub use context::{parse_epoch, KeyContext, EPOCH_FORMAT};
pub use kdf::{expand, expand_many, expand_with};
pub use keys::{MasterKey, Salt, Subkey};
pub use stretch::{
    stretch, stretch_blocking, stretch_into, StretchParams, DEFAULT_MAX_COST, DEFAULT_MAX_MEMORY,
    MIN_SECURE_LOG_N,
};

/// Size of master keys in bytes (256 bits)
pub const MASTER_KEY_SIZE: usize = 32;

/// Size of subkeys in bytes (256 bits)
pub const SUBKEY_SIZE: usize = 32;

/// Size of generated salts in bytes
pub const SALT_SIZE: usize = 32;
