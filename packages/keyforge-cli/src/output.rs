//! Rendering of derived keys for the terminal.

use keyforge_core::crypto::{KeyContext, MasterKey, Subkey};
use serde::Serialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Hex-encoded keys from one run, wiped when dropped
#[derive(Serialize, Zeroize, ZeroizeOnDrop)]
pub struct Report {
    pub master_key: String,
    pub subkeys: Vec<SubkeyEntry>,
}

#[derive(Serialize, Zeroize, ZeroizeOnDrop)]
pub struct SubkeyEntry {
    pub purpose: String,
    pub context: String,
    pub key: String,
}

impl Report {
    pub fn new(master: &MasterKey, subkeys: &[(KeyContext, Subkey)]) -> Self {
        Self {
            master_key: master.to_hex(),
            subkeys: subkeys
                .iter()
                .map(|(context, key)| SubkeyEntry {
                    purpose: context.purpose().to_string(),
                    context: context.as_str().to_string(),
                    key: key.to_hex(),
                })
                .collect(),
        }
    }

    /// One `label: hex` line per key, master key first
    pub fn to_text(&self) -> String {
        let mut out = format!("master key: {}\n", self.master_key);
        for entry in &self.subkeys {
            out.push_str(&format!(
                "{}: {}\n",
                entry.purpose.to_lowercase(),
                entry.key
            ));
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
