//! # Key Contexts
//!
//! A context string binds a subkey to one application, one key-schedule
//! epoch and one purpose:
//!
//! ```text
//! "My Application 2025-02-03 11:30:00 Data Encryption Key"
//!  └─────┬──────┘ └────────┬────────┘ └───────┬─────────┘
//!    application         epoch              purpose
//! ```
//!
//! [`KeyContext`] keeps the three parts as separate, validated fields and
//! renders them in that format. The epoch is a real timestamp rendered in
//! one canonical form, so two spellings of the same instant can never yield
//! two different key schedules.
//!
//! ## Validation Rules
//!
//! | Field | Rule |
//! |-------|------|
//! | application | non-empty, trimmed, no control characters, no embedded epoch |
//! | epoch | `YYYY-MM-DD HH:MM:SS`, whole seconds, input must already be canonical |
//! | purpose | non-empty, trimmed, no control characters |
//!
//! Because the epoch has a fixed width and cannot appear inside the
//! application name, every rendered string maps back to exactly one
//! (application, epoch, purpose) triple.

use std::fmt;

use chrono::{NaiveDateTime, Timelike};

use crate::error::{Error, Result};

/// Canonical epoch format
pub const EPOCH_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Width of a rendered epoch
const EPOCH_LEN: usize = 19;

/// Validated (application, epoch, purpose) triple
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyContext {
    application: String,
    epoch: NaiveDateTime,
    purpose: String,
    rendered: String,
}

impl KeyContext {
    /// Build a context from an epoch string
    ///
    /// The epoch must already be in canonical `YYYY-MM-DD HH:MM:SS` form.
    pub fn new(
        application: impl Into<String>,
        epoch: &str,
        purpose: impl Into<String>,
    ) -> Result<Self> {
        Self::from_datetime(application, parse_epoch(epoch)?, purpose)
    }

    /// Build a context from a parsed epoch
    pub fn from_datetime(
        application: impl Into<String>,
        epoch: NaiveDateTime,
        purpose: impl Into<String>,
    ) -> Result<Self> {
        let application = application.into();
        let purpose = purpose.into();

        validate_label("application", &application)?;
        validate_application(&application)?;
        validate_label("purpose", &purpose)?;
        if epoch.nanosecond() != 0 {
            return Err(Error::InvalidContext(
                "epoch must be a whole second".into(),
            ));
        }

        let rendered = format!(
            "{} {} {}",
            application,
            epoch.format(EPOCH_FORMAT),
            purpose
        );

        Ok(Self {
            application,
            epoch,
            purpose,
            rendered,
        })
    }

    /// Same application and epoch, different purpose
    pub fn with_purpose(&self, purpose: impl Into<String>) -> Result<Self> {
        Self::from_datetime(self.application.clone(), self.epoch, purpose)
    }

    /// Application identity
    pub fn application(&self) -> &str {
        &self.application
    }

    /// Key-schedule epoch
    pub fn epoch(&self) -> NaiveDateTime {
        self.epoch
    }

    /// Key purpose
    pub fn purpose(&self) -> &str {
        &self.purpose
    }

    /// The rendered context string fed to the expander
    pub fn as_str(&self) -> &str {
        &self.rendered
    }
}

impl fmt::Display for KeyContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

impl AsRef<str> for KeyContext {
    fn as_ref(&self) -> &str {
        &self.rendered
    }
}

/// Parse an epoch, insisting on the canonical spelling
pub fn parse_epoch(epoch: &str) -> Result<NaiveDateTime> {
    let parsed = NaiveDateTime::parse_from_str(epoch, EPOCH_FORMAT).map_err(|e| {
        Error::InvalidContext(format!(
            "epoch {:?} is not a YYYY-MM-DD HH:MM:SS timestamp: {}",
            epoch, e
        ))
    })?;

    if parsed.format(EPOCH_FORMAT).to_string() != epoch {
        return Err(Error::InvalidContext(format!(
            "epoch {:?} is not in canonical form, expected {:?}",
            epoch,
            parsed.format(EPOCH_FORMAT).to_string()
        )));
    }

    Ok(parsed)
}

fn validate_label(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::InvalidContext(format!("{} must not be empty", field)));
    }
    if value.trim() != value {
        return Err(Error::InvalidContext(format!(
            "{} {:?} has leading or trailing whitespace",
            field, value
        )));
    }
    if value.chars().any(char::is_control) {
        return Err(Error::InvalidContext(format!(
            "{} {:?} contains control characters",
            field, value
        )));
    }
    Ok(())
}

fn validate_application(application: &str) -> Result<()> {
    let embedded = application.char_indices().any(|(i, _)| {
        application
            .get(i..i + EPOCH_LEN)
            .map(|window| NaiveDateTime::parse_from_str(window, EPOCH_FORMAT).is_ok())
            .unwrap_or(false)
    });

    if embedded {
        return Err(Error::InvalidContext(format!(
            "application {:?} contains an epoch timestamp",
            application
        )));
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const APP: &str = "My Application";
    const EPOCH: &str = "2025-02-03 11:30:00";

    #[test]
    fn test_renders_application_epoch_purpose() {
        let ctx = KeyContext::new(APP, EPOCH, "Data Encryption Key").unwrap();
        assert_eq!(
            ctx.as_str(),
            "My Application 2025-02-03 11:30:00 Data Encryption Key"
        );
        assert_eq!(ctx.to_string(), ctx.as_str());
        assert_eq!(ctx.application(), APP);
        assert_eq!(ctx.purpose(), "Data Encryption Key");
        assert_eq!(ctx.epoch().format(EPOCH_FORMAT).to_string(), EPOCH);
    }

    #[test]
    fn test_with_purpose_keeps_application_and_epoch() {
        let dek = KeyContext::new(APP, EPOCH, "Data Encryption Key").unwrap();
        let hmac = dek.with_purpose("HMAC Key").unwrap();

        assert_eq!(hmac.as_str(), "My Application 2025-02-03 11:30:00 HMAC Key");
        assert_eq!(hmac.epoch(), dek.epoch());
        assert_ne!(hmac, dek);
    }

    #[test]
    fn test_rejects_non_canonical_epochs() {
        for epoch in [
            "2025-2-3 11:30:00",
            "2025-02-03T11:30:00",
            "2025-02-03 11:30",
            "2025-02-03 11:30:00 ",
            "2025-02-30 00:00:00",
            "yesterday",
            "",
        ] {
            assert!(
                matches!(
                    KeyContext::new(APP, epoch, "HMAC Key"),
                    Err(Error::InvalidContext(_))
                ),
                "epoch {:?} should be rejected",
                epoch
            );
        }
    }

    #[test]
    fn test_rejects_sub_second_epoch() {
        let epoch = parse_epoch(EPOCH)
            .unwrap()
            .with_nanosecond(500_000_000)
            .unwrap();
        assert!(matches!(
            KeyContext::from_datetime(APP, epoch, "HMAC Key"),
            Err(Error::InvalidContext(_))
        ));
    }

    #[test]
    fn test_rejects_bad_labels() {
        assert!(KeyContext::new("", EPOCH, "HMAC Key").is_err());
        assert!(KeyContext::new(APP, EPOCH, "").is_err());
        assert!(KeyContext::new(" My Application", EPOCH, "HMAC Key").is_err());
        assert!(KeyContext::new(APP, EPOCH, "HMAC Key\n").is_err());
        assert!(KeyContext::new("My\tApplication", EPOCH, "HMAC Key").is_err());
    }

    #[test]
    fn test_rejects_application_with_embedded_epoch() {
        // Would render identically to ("Backup", 2024-01-01 00:00:00, "Tool 2025-...")
        let err = KeyContext::new("Backup 2024-01-01 00:00:00 Tool", EPOCH, "HMAC Key")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidContext(ref m) if m.contains("epoch")));

        // Dates alone are fine
        assert!(KeyContext::new("Backup 2024 Tool", EPOCH, "HMAC Key").is_ok());
        assert!(KeyContext::new("Tool 2024-01-01", EPOCH, "HMAC Key").is_ok());
    }

    #[test]
    fn test_purpose_may_contain_digits_and_dates() {
        let ctx = KeyContext::new(APP, EPOCH, "Backup Key 2024-01-01 00:00:00").unwrap();
        assert!(ctx.as_str().ends_with("Backup Key 2024-01-01 00:00:00"));
    }

    #[test]
    fn test_non_ascii_application() {
        let ctx = KeyContext::new("Anwendung für Schlüssel", EPOCH, "HMAC Key").unwrap();
        assert_eq!(
            ctx.as_str(),
            "Anwendung für Schlüssel 2025-02-03 11:30:00 HMAC Key"
        );
    }
}
