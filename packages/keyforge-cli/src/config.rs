//! Command-line arguments and the validated derivation config built from them.

use std::time::Duration;

use clap::Parser;
use keyforge_core::crypto::{
    KeyContext, Salt, StretchParams, DEFAULT_MAX_COST, DEFAULT_MAX_MEMORY,
};
use keyforge_core::{Error, Result};
use zeroize::Zeroizing;

// ── CLI Arguments ─────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "keyforge",
    version,
    about = "Derive a master key from a password and expand it into purpose-bound subkeys"
)]
pub struct Args {
    /// Password to stretch
    #[arg(
        long,
        default_value = "user-password",
        env = "KEYFORGE_PASSWORD",
        hide_env_values = true
    )]
    pub password: String,

    /// Salt as UTF-8 text
    #[arg(long, default_value = "unique-salt-for-user", env = "KEYFORGE_SALT")]
    pub salt: String,

    /// Salt as hex. Takes precedence over --salt.
    #[arg(long, env = "KEYFORGE_SALT_HEX")]
    pub salt_hex: Option<String>,

    /// scrypt cost as a power of two (N = 2^log_n)
    #[arg(long, default_value_t = 17, env = "KEYFORGE_LOG_N")]
    pub log_n: u8,

    /// scrypt block size
    #[arg(short = 'r', long = "block-size", default_value_t = 8, env = "KEYFORGE_R")]
    pub r: u32,

    /// scrypt parallelization factor
    #[arg(short = 'p', long = "parallelism", default_value_t = 1, env = "KEYFORGE_P")]
    pub p: u32,

    /// Ceiling on scrypt working memory in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_MEMORY, env = "KEYFORGE_MAX_MEMORY")]
    pub max_memory: u64,

    /// Ceiling on scrypt CPU work, N * r * p
    #[arg(long, default_value_t = DEFAULT_MAX_COST, env = "KEYFORGE_MAX_COST")]
    pub max_cost: u64,

    /// Application identity in the context string
    #[arg(long, default_value = "My Application", env = "KEYFORGE_APP")]
    pub app: String,

    /// Key-schedule epoch, formatted YYYY-MM-DD HH:MM:SS
    #[arg(long, default_value = "2025-02-03 11:30:00", env = "KEYFORGE_EPOCH")]
    pub epoch: String,

    /// Purpose of a subkey. Repeat for several subkeys.
    #[arg(
        long = "purpose",
        default_values = ["Data Encryption Key", "HMAC Key"],
        env = "KEYFORGE_PURPOSES",
        value_delimiter = ','
    )]
    pub purposes: Vec<String>,

    /// Give up on stretching after this many seconds
    #[arg(long, default_value_t = 30, env = "KEYFORGE_TIMEOUT_SECS")]
    pub timeout_secs: u64,

    /// Print a fresh random salt in hex and exit
    #[arg(long)]
    pub generate_salt: bool,

    /// Print keys as JSON
    #[arg(long)]
    pub json: bool,
}

// ── Derivation Config ─────────────────────────────────────────────────────────

/// Everything needed for one derivation run, validated up front
pub struct DeriveConfig {
    pub password: Zeroizing<Vec<u8>>,
    pub salt: Salt,
    pub params: StretchParams,
    pub contexts: Vec<KeyContext>,
    pub timeout: Duration,
    pub json: bool,
}

impl TryFrom<Args> for DeriveConfig {
    type Error = Error;

    fn try_from(args: Args) -> Result<Self> {
        let password = Zeroizing::new(args.password.into_bytes());

        let salt = match args.salt_hex.as_deref() {
            Some(hex) => Salt::from_hex(hex)?,
            None => Salt::from_bytes(args.salt.into_bytes()),
        };

        let params = StretchParams {
            log_n: args.log_n,
            r: args.r,
            p: args.p,
            max_memory: args.max_memory,
            max_cost: args.max_cost,
            ..StretchParams::default()
        };
        params.validate()?;

        if args.purposes.is_empty() {
            return Err(Error::InvalidContext(
                "at least one --purpose is required".into(),
            ));
        }

        let mut contexts: Vec<KeyContext> = Vec::with_capacity(args.purposes.len());
        for purpose in args.purposes {
            let context = KeyContext::new(args.app.as_str(), &args.epoch, purpose)?;
            if contexts.contains(&context) {
                return Err(Error::InvalidContext(format!(
                    "purpose {:?} given more than once",
                    context.purpose()
                )));
            }
            contexts.push(context);
        }

        if args.timeout_secs == 0 {
            return Err(Error::InvalidParameters(
                "timeout must be at least one second".into(),
            ));
        }

        Ok(Self {
            password,
            salt,
            params,
            contexts,
            timeout: Duration::from_secs(args.timeout_secs),
            json: args.json,
        })
    }
}
