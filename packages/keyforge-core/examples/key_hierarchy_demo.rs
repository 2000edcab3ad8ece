//! # Key Hierarchy Demo
//!
//! Stretches a password into a master key, then expands it into a data
//! encryption key and an HMAC key.
//!
//! ## Run
//!
//! ```bash
//! cargo run --example key_hierarchy_demo
//! ```
//!
//! Key material is printed for demonstration only. Real code must never
//! log or print derived keys.

use std::time::Instant;

use keyforge_core::{stretch, KeyContext, Salt, StretchParams};

fn main() {
    println!("=== Keyforge Core: Key Hierarchy Demo ===\n");

    // Step 1: Stretch the password
    println!("Step 1: Stretching password with scrypt (N = 2^17, r = 8, p = 1)...");

    // In production the password comes from the user and the salt from the
    // identity record (see Salt::generate)
    let password = b"user-password";
    let salt = Salt::from_bytes(b"unique-salt-for-user".to_vec());
    let params = StretchParams::default();

    let started = Instant::now();
    let master = stretch(password, salt.as_bytes(), &params).expect("Failed to stretch password");
    println!("  took {:?}", started.elapsed());
    println!();

    // Step 2: Expand into purpose-bound subkeys
    println!("Step 2: Expanding master key with keyed BLAKE3...");
    println!();
    println!("  ┌─────────────────────────────────────────────────────────────┐");
    println!("  │                    KEY HIERARCHY                            │");
    println!("  ├─────────────────────────────────────────────────────────────┤");
    println!("  │                                                             │");
    println!("  │                      Master Key                             │");
    println!("  │                          │                                  │");
    println!("  │            ┌─────────────┴─────────────┐                    │");
    println!("  │            ▼                           ▼                    │");
    println!("  │   \"… Data Encryption Key\"        \"… HMAC Key\"              │");
    println!("  │            │                           │                    │");
    println!("  │            ▼                           ▼                    │");
    println!("  │    Data Encryption Key             HMAC Key                 │");
    println!("  │                                                             │");
    println!("  └─────────────────────────────────────────────────────────────┘");
    println!();

    let dek_context = KeyContext::new("My Application", "2025-02-03 11:30:00", "Data Encryption Key")
        .expect("Invalid context");
    let hmac_context = dek_context
        .with_purpose("HMAC Key")
        .expect("Invalid context");

    let data_encryption_key = master.derive_subkey(dek_context.as_str());
    let hmac_key = master.derive_subkey(hmac_context.as_str());

    println!("  context: {:?}", dek_context.as_str());
    println!("  context: {:?}", hmac_context.as_str());
    println!();

    // Step 3: Show the keys
    println!("Step 3: Derived keys");
    println!("  master key:          {}", master.to_hex());
    println!("  data encryption key: {}", data_encryption_key.to_hex());
    println!("  hmac key:            {}", hmac_key.to_hex());
    println!();

    assert_ne!(data_encryption_key, hmac_key);
    println!("=== Demo Complete: subkeys are independent ===");
}
