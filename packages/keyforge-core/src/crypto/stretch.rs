//! # Password Stretching
//!
//! Turns a low-entropy password and a per-identity salt into a 32-byte
//! master key using scrypt.
//!
//! ## Cost Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    SCRYPT COST PARAMETERS                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  N = 2^log_n   CPU/memory cost        reference: 2^17                  │
//! │  r             block size             reference: 8                     │
//! │  p             parallelization        reference: 1                     │
//! │  dk_len        output bytes           reference: 32                    │
//! │                                                                         │
//! │  memory ≈ 128 · r · (N + p) bytes     reference: ~128 MiB              │
//! │  cost   = N · r · p block mixes       reference: 2^20                  │
//! │                                                                         │
//! │  Rejected when:                                                        │
//! │  • N is not a power of two greater than 1, or N > 2^32                 │
//! │  • N ≥ 2^(16·r)                                                        │
//! │  • r = 0, p = 0, or r·p ≥ 2^30                                         │
//! │  • dk_len = 0                                                          │
//! │  • memory estimate exceeds max_memory                                  │
//! │  • N · r · p exceeds max_cost                                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stretching is slow on purpose (tens to hundreds of milliseconds at the
//! reference cost). Call it once per authentication event, and off any
//! latency-sensitive path: [`stretch_blocking`] runs it on the blocking
//! thread pool under a deadline.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use super::keys::MasterKey;
use super::MASTER_KEY_SIZE;
use crate::error::{Error, Result};

/// Default ceiling on scrypt's working memory (1 GiB + 1 KiB)
pub const DEFAULT_MAX_MEMORY: u64 = 1024 * 1024 * 1024 + 1024;

/// Default ceiling on scrypt's CPU work, N · r · p (2^32, 4096× the reference)
pub const DEFAULT_MAX_COST: u64 = 1 << 32;

/// Smallest `log_n` considered acceptable for real passwords (N = 2^14)
pub const MIN_SECURE_LOG_N: u8 = 14;

/// Largest supported `log_n` (N = 2^32)
const MAX_LOG_N: u32 = 32;

/// Upper bound on `r · p`
const MAX_R_TIMES_P: u64 = 1 << 30;

/// Upper bound on derived length: (2^32 - 1) · 32
const MAX_DK_LEN: u64 = ((1u64 << 32) - 1) * 32;

/// scrypt cost parameters
///
/// `Default` is the reference configuration: N = 2^17, r = 8, p = 1,
/// dk_len = 32.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StretchParams {
    /// Base-2 logarithm of the CPU/memory cost N
    pub log_n: u8,
    /// Block size
    pub r: u32,
    /// Parallelization factor
    pub p: u32,
    /// Output length in bytes
    pub dk_len: usize,
    /// Ceiling on the estimated working memory in bytes
    pub max_memory: u64,
    /// Ceiling on N · r · p
    pub max_cost: u64,
}

impl Default for StretchParams {
    fn default() -> Self {
        Self {
            log_n: 17,
            r: 8,
            p: 1,
            dk_len: MASTER_KEY_SIZE,
            max_memory: DEFAULT_MAX_MEMORY,
            max_cost: DEFAULT_MAX_COST,
        }
    }
}

impl StretchParams {
    /// Build parameters from a raw cost factor `n`
    ///
    /// Fails if `n` is not a power of two greater than 1. The remaining
    /// checks happen in [`StretchParams::validate`].
    pub fn new(n: u64, r: u32, p: u32, dk_len: usize) -> Result<Self> {
        if n <= 1 || !n.is_power_of_two() {
            return Err(Error::InvalidParameters(format!(
                "N must be a power of two greater than 1, got {}",
                n
            )));
        }
        if n.trailing_zeros() > MAX_LOG_N {
            return Err(Error::InvalidParameters(format!(
                "N must not exceed 2^{}, got {}",
                MAX_LOG_N, n
            )));
        }

        let params = Self {
            log_n: n.trailing_zeros() as u8,
            r,
            p,
            dk_len,
            max_memory: DEFAULT_MAX_MEMORY,
            max_cost: DEFAULT_MAX_COST,
        };
        params.validate()?;
        Ok(params)
    }

    /// Replace the working-memory ceiling
    pub fn with_max_memory(mut self, max_memory: u64) -> Self {
        self.max_memory = max_memory;
        self
    }

    /// Replace the CPU work ceiling
    pub fn with_max_cost(mut self, max_cost: u64) -> Self {
        self.max_cost = max_cost;
        self
    }

    /// The cost factor N (saturates for out-of-range `log_n`)
    pub fn n(&self) -> u64 {
        1u64.checked_shl(u32::from(self.log_n)).unwrap_or(u64::MAX)
    }

    /// Estimated working memory in bytes: 128 · r · (N + p)
    pub fn memory_estimate(&self) -> u128 {
        128 * u128::from(self.r) * (u128::from(self.n()) + u128::from(self.p))
    }

    /// CPU work in salsa20/8 block mixes: N · r · p
    pub fn cost(&self) -> u128 {
        u128::from(self.n()) * u128::from(self.r) * u128::from(self.p)
    }

    /// Whether N meets the 2^14 floor for real passwords
    pub fn is_secure(&self) -> bool {
        self.log_n >= MIN_SECURE_LOG_N
    }

    /// Check every constraint scrypt places on the parameters
    pub fn validate(&self) -> Result<()> {
        if self.log_n == 0 || u32::from(self.log_n) > MAX_LOG_N {
            return Err(Error::InvalidParameters(format!(
                "log_n must be between 1 and {}, got {}",
                MAX_LOG_N, self.log_n
            )));
        }
        if self.r == 0 {
            return Err(Error::InvalidParameters("r must be positive".into()));
        }
        if self.p == 0 {
            return Err(Error::InvalidParameters("p must be positive".into()));
        }
        if u64::from(self.r) * u64::from(self.p) >= MAX_R_TIMES_P {
            return Err(Error::InvalidParameters(format!(
                "r * p must be below 2^30, got {} * {}",
                self.r, self.p
            )));
        }
        if u64::from(self.log_n) >= 16 * u64::from(self.r) {
            return Err(Error::InvalidParameters(format!(
                "N = 2^{} is too large for r = {}",
                self.log_n, self.r
            )));
        }
        if self.dk_len == 0 {
            return Err(Error::InvalidParameters("dk_len must be positive".into()));
        }
        if self.dk_len as u64 > MAX_DK_LEN {
            return Err(Error::InvalidParameters(format!(
                "dk_len must not exceed {}, got {}",
                MAX_DK_LEN, self.dk_len
            )));
        }

        let memory = self.memory_estimate();
        if memory > u128::from(self.max_memory) {
            return Err(Error::InvalidParameters(format!(
                "scrypt would need {} bytes of memory, limit is {}",
                memory, self.max_memory
            )));
        }

        let cost = self.cost();
        if cost > u128::from(self.max_cost) {
            return Err(Error::InvalidParameters(format!(
                "scrypt cost N * r * p = {} exceeds limit {}",
                cost, self.max_cost
            )));
        }

        Ok(())
    }

    fn to_scrypt(self) -> Result<scrypt::Params> {
        self.validate()?;
        // The length passed here only matters for PHC strings, which are not
        // produced. The real output length is the buffer handed to scrypt.
        Ok(scrypt::Params::new(
            self.log_n,
            self.r,
            self.p,
            MASTER_KEY_SIZE,
        )?)
    }
}

/// Derive raw key bytes of length `params.dk_len` into `output`
///
/// Fails with [`Error::InvalidParameters`] if the parameters are rejected or
/// `output.len() != params.dk_len`. On failure `output` is left zeroed.
pub fn stretch_into(
    password: &[u8],
    salt: &[u8],
    params: &StretchParams,
    output: &mut [u8],
) -> Result<()> {
    output.zeroize();

    if output.len() != params.dk_len {
        return Err(Error::InvalidParameters(format!(
            "output buffer is {} bytes but dk_len is {}",
            output.len(),
            params.dk_len
        )));
    }

    let scrypt_params = params.to_scrypt()?;

    tracing::debug!(
        log_n = params.log_n,
        r = params.r,
        p = params.p,
        dk_len = params.dk_len,
        "stretching password"
    );
    let started = Instant::now();

    if let Err(e) = scrypt::scrypt(password, salt, &scrypt_params, output) {
        output.zeroize();
        return Err(e.into());
    }

    tracing::debug!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        "password stretched"
    );
    Ok(())
}

/// Derive the master key for `password` and `salt`
///
/// Deterministic: the same inputs always give the same key, so the key is
/// re-derived at each login instead of stored. `params.dk_len` must be
/// [`MASTER_KEY_SIZE`].
pub fn stretch(password: &[u8], salt: &[u8], params: &StretchParams) -> Result<MasterKey> {
    if params.dk_len != MASTER_KEY_SIZE {
        return Err(Error::InvalidParameters(format!(
            "master keys are {} bytes, dk_len is {}",
            MASTER_KEY_SIZE, params.dk_len
        )));
    }

    let mut output = Zeroizing::new([0u8; MASTER_KEY_SIZE]);
    stretch_into(password, salt, params, &mut output[..])?;
    Ok(MasterKey::from_bytes(*output))
}

/// Run [`stretch`] on the blocking thread pool, bounded by `timeout`
///
/// The password is copied into a buffer that is zeroized when the blocking
/// task finishes. When the deadline passes the computation keeps running to
/// completion on its thread, but its result is dropped (and zeroized).
pub async fn stretch_blocking(
    password: &[u8],
    salt: &[u8],
    params: &StretchParams,
    timeout: Duration,
) -> Result<MasterKey> {
    // Fail fast on bad parameters instead of occupying a pool slot
    params.validate()?;

    let password = Zeroizing::new(password.to_vec());
    let salt = salt.to_vec();
    let params = *params;

    let task = tokio::task::spawn_blocking(move || stretch(&password, &salt, &params));

    match tokio::time::timeout(timeout, task).await {
        Ok(joined) => joined?,
        Err(_) => {
            tracing::warn!(
                timeout_ms = timeout.as_millis() as u64,
                log_n = params.log_n,
                r = params.r,
                "password stretch exceeded deadline"
            );
            Err(Error::Timeout(format!(
                "stretch did not finish within {:?}",
                timeout
            )))
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// N = 2^10 keeps unit tests fast
    fn fast_params() -> StretchParams {
        StretchParams {
            log_n: 10,
            ..StretchParams::default()
        }
    }

    #[test]
    fn test_default_is_reference_configuration() {
        let params = StretchParams::default();
        assert_eq!(params.n(), 1 << 17);
        assert_eq!(params.r, 8);
        assert_eq!(params.p, 1);
        assert_eq!(params.dk_len, 32);
        assert!(params.is_secure());
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_new_rejects_bad_n() {
        for n in [0u64, 1, 3, 100_000, (1 << 17) + 1] {
            assert!(
                matches!(StretchParams::new(n, 8, 1, 32), Err(Error::InvalidParameters(_))),
                "N = {} should be rejected",
                n
            );
        }
        assert!(matches!(
            StretchParams::new(1 << 33, 8, 1, 32),
            Err(Error::InvalidParameters(_))
        ));

        let params = StretchParams::new(1 << 17, 8, 1, 32).unwrap();
        assert_eq!(params.log_n, 17);
    }

    #[test]
    fn test_new_rejects_zero_r_p_dk_len() {
        assert!(matches!(
            StretchParams::new(1 << 14, 0, 1, 32),
            Err(Error::InvalidParameters(_))
        ));
        assert!(matches!(
            StretchParams::new(1 << 14, 8, 0, 32),
            Err(Error::InvalidParameters(_))
        ));
        assert!(matches!(
            StretchParams::new(1 << 14, 8, 1, 0),
            Err(Error::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_log_n() {
        let params = StretchParams {
            log_n: 0,
            ..StretchParams::default()
        };
        assert!(matches!(params.validate(), Err(Error::InvalidParameters(_))));
    }

    #[test]
    fn test_validate_rejects_n_too_large_for_r() {
        // r = 1 caps N below 2^16
        let params = StretchParams {
            log_n: 16,
            r: 1,
            ..StretchParams::default()
        };
        assert!(matches!(params.validate(), Err(Error::InvalidParameters(_))));
    }

    #[test]
    fn test_validate_rejects_huge_r_times_p() {
        let params = StretchParams {
            log_n: 10,
            r: 1 << 15,
            p: 1 << 15,
            max_memory: u64::MAX,
            ..StretchParams::default()
        };
        assert!(matches!(params.validate(), Err(Error::InvalidParameters(_))));
    }

    #[test]
    fn test_memory_limit() {
        let params = StretchParams::default();
        // 128 * 8 * (2^17 + 1)
        assert_eq!(params.memory_estimate(), 134_218_752);

        let tight = params.with_max_memory(64 * 1024 * 1024);
        let err = tight.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidParameters(ref m) if m.contains("memory")));

        let err = stretch(b"pw", b"salt", &tight).unwrap_err();
        assert!(matches!(err, Error::InvalidParameters(_)));
    }

    #[test]
    fn test_cpu_limit() {
        let params = StretchParams::default();
        assert_eq!(params.cost(), 1 << 20);
        assert!(params.validate().is_ok());

        // Fits in 1 GiB but needs 2^43 block mixes
        let expensive = StretchParams {
            log_n: 21,
            r: 2,
            p: 1 << 21,
            ..StretchParams::default()
        };
        assert!(expensive.memory_estimate() <= u128::from(DEFAULT_MAX_MEMORY));
        let err = expensive.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidParameters(ref m) if m.contains("cost")));

        let tight = params.with_max_cost(1 << 19);
        assert!(matches!(
            stretch(b"pw", b"salt", &tight),
            Err(Error::InvalidParameters(_))
        ));
        assert!(params.with_max_cost(1 << 20).validate().is_ok());
    }

    #[test]
    fn test_stretch_is_deterministic() {
        let params = fast_params();
        let a = stretch(b"user-password", b"unique-salt-for-user", &params).unwrap();
        let b = stretch(b"user-password", b"unique-salt-for-user", &params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_stretch_fast_vector() {
        let key = stretch(b"user-password", b"unique-salt-for-user", &fast_params()).unwrap();
        assert_eq!(
            key.to_hex(),
            "e2ee2c2f013a75fda87ca564137547893af9f6584af74ffe879768c979da592e"
        );
    }

    #[test]
    fn test_different_salts_give_different_keys() {
        let params = fast_params();
        let a = stretch(b"user-password", b"salt-one", &params).unwrap();
        let b = stretch(b"user-password", b"salt-two", &params).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_different_passwords_give_different_keys() {
        let params = fast_params();
        let a = stretch(b"password-a", b"salt", &params).unwrap();
        let b = stretch(b"password-b", b"salt", &params).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_password_and_salt_are_accepted() {
        let key = stretch(b"", b"", &fast_params()).unwrap();
        assert_eq!(key.as_bytes().len(), MASTER_KEY_SIZE);
    }

    #[test]
    fn test_stretch_requires_master_key_length() {
        let params = StretchParams {
            dk_len: 64,
            ..fast_params()
        };
        assert!(matches!(
            stretch(b"pw", b"salt", &params),
            Err(Error::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_stretch_into_arbitrary_length() {
        let params = StretchParams {
            dk_len: 64,
            ..fast_params()
        };
        let mut out = [0u8; 64];
        stretch_into(b"pw", b"salt", &params, &mut out).unwrap();
        assert_ne!(out, [0u8; 64]);

        // The first 32 bytes match a 32-byte derivation (PBKDF2 output prefix)
        let short = stretch(b"pw", b"salt", &fast_params()).unwrap();
        assert_eq!(&out[..32], short.as_bytes());
    }

    #[test]
    fn test_stretch_into_rejects_mismatched_buffer() {
        let mut out = [0xffu8; 16];
        let err = stretch_into(b"pw", b"salt", &fast_params(), &mut out).unwrap_err();
        assert!(matches!(err, Error::InvalidParameters(_)));
        assert_eq!(out, [0u8; 16]);
    }

    #[test]
    fn test_params_deserialize_with_defaults() {
        let params: StretchParams = serde_json::from_str(r#"{"log_n": 15}"#).unwrap();
        assert_eq!(params.log_n, 15);
        assert_eq!(params.r, 8);
        assert_eq!(params.p, 1);
        assert_eq!(params.dk_len, 32);
        assert_eq!(params.max_memory, DEFAULT_MAX_MEMORY);
        assert_eq!(params.max_cost, DEFAULT_MAX_COST);
    }

    #[tokio::test]
    async fn test_stretch_blocking_matches_sync() {
        let params = fast_params();
        let sync = stretch(b"pw", b"salt", &params).unwrap();
        let background = stretch_blocking(b"pw", b"salt", &params, Duration::from_secs(30))
            .await
            .unwrap();
        assert_eq!(sync, background);
    }

    #[tokio::test]
    async fn test_stretch_blocking_times_out() {
        let err = stretch_blocking(
            b"pw",
            b"salt",
            &StretchParams::default(),
            Duration::from_nanos(1),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Timeout(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_stretch_blocking_rejects_bad_params_up_front() {
        let params = StretchParams {
            r: 0,
            ..fast_params()
        };
        let result = tokio_test::block_on(stretch_blocking(
            b"pw",
            b"salt",
            &params,
            Duration::from_secs(1),
        ));
        assert!(matches!(result, Err(Error::InvalidParameters(_))));
    }
}
