//! Construction parameters.
//!
//! `w` and `n` are fixed for the lifetime of an encoder. Everything else is
//! a label or a diagnostics knob and never changes which bits get allocated.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Parameters accepted by [`CategoryEncoder::new`](crate::CategoryEncoder::new).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Number of active bits per representation. Must be odd.
    pub w: usize,
    /// Total number of bits. Must exceed `6 * w`.
    pub n: usize,
    /// Debug label.
    pub name: String,
    /// Recorded and persisted only. Bit selection is deterministic and never
    /// reads it; `None` stands for the non-deterministic setting.
    pub seed: Option<u64>,
    /// 0 is silent, 1 dumps once, 2 traces every encode, 3+ dumps all buckets.
    pub verbosity: u8,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            w: 21,
            n: 400,
            name: "RDCE".to_string(),
            seed: Some(42),
            verbosity: 0,
        }
    }
}

impl EncoderConfig {
    /// Config with the given `w` and `n` and defaults for the rest.
    pub fn new(w: usize, n: usize) -> Self {
        Self {
            w,
            n,
            ..Self::default()
        }
    }

    /// Set the debug label.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the seed (`None` for non-deterministic).
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Set the diagnostics level.
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Check the construction invariants.
    ///
    /// # Errors
    /// Returns `Error::InvalidWidth` if `w` is zero or even, and
    /// `Error::InvalidSize` if `n <= 6 * w`.
    pub fn validate(&self) -> Result<()> {
        if self.w == 0 || self.w % 2 == 0 {
            return Err(Error::InvalidWidth { w: self.w });
        }
        // Saturating so that an absurd `w` is reported as a size error
        // instead of overflowing.
        if self.n <= self.w.saturating_mul(6) {
            return Err(Error::InvalidSize {
                n: self.n,
                w: self.w,
            });
        }
        Ok(())
    }
}
