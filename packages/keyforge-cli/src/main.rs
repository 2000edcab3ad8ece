//! Keyforge CLI
//!
//! Derives a key hierarchy from a password:
//!
//! 1. **Stretch**: scrypt turns the password and salt into a 32-byte master
//!    key. This runs on the blocking pool under `--timeout-secs`.
//!
//! 2. **Expand**: keyed BLAKE3 turns the master key into one subkey per
//!    `--purpose`, each bound to `"<app> <epoch> <purpose>"`.
//!
//! 3. **Print**: all keys are printed in hex (or JSON with `--json`).
//!
//! Printing key material is a debugging aid. Logs go to stderr and never
//! contain keys.

mod config;
mod output;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use keyforge_core::crypto::{stretch_blocking, Salt, Subkey};
use keyforge_core::KeyContext;
use zeroize::Zeroizing;

use config::{Args, DeriveConfig};
use output::Report;

// ── Entry Point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keyforge=info,keyforge_core=info".into()),
        )
        .init();

    let output = run(Args::parse()).await?;
    print!("{}", *output);

    Ok(())
}

/// Everything `main` does after logging is up. Returns the text for stdout.
async fn run(args: Args) -> color_eyre::Result<Zeroizing<String>> {
    if args.generate_salt {
        return Ok(Zeroizing::new(format!("{}\n", Salt::generate().to_hex())));
    }

    let config = DeriveConfig::try_from(args).wrap_err("invalid configuration")?;
    let report = derive(&config).await?;

    tracing::warn!("printing derived key material to stdout");

    if config.json {
        Ok(Zeroizing::new(format!("{}\n", report.to_json()?)))
    } else {
        Ok(Zeroizing::new(report.to_text()))
    }
}

/// Stretch the password, then expand one subkey per configured context
async fn derive(config: &DeriveConfig) -> color_eyre::Result<Report> {
    if !config.params.is_secure() {
        tracing::warn!(
            log_n = config.params.log_n,
            "scrypt cost is below N = 2^14; do not use these keys for real passwords"
        );
    }

    tracing::info!(
        log_n = config.params.log_n,
        r = config.params.r,
        p = config.params.p,
        purposes = config.contexts.len(),
        "deriving key hierarchy"
    );

    let master = stretch_blocking(
        &config.password,
        config.salt.as_bytes(),
        &config.params,
        config.timeout,
    )
    .await
    .wrap_err("failed to stretch password")?;

    let subkeys: Vec<(KeyContext, Subkey)> = config
        .contexts
        .iter()
        .map(|context| (context.clone(), master.derive_subkey(context.as_str())))
        .collect();

    Ok(Report::new(&master, &subkeys))
}
