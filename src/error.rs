//! Error types.

/// Errors reported to the caller.
///
/// Rejected key generation attempts are not errors: the driver resamples internally and
/// never surfaces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Deterministic derivation was given a seed of the wrong size.
    #[error("invalid seed length: expected {expected} bytes, got {actual}")]
    InvalidSeedLength {
        /// required length
        expected: usize,
        /// provided length
        actual: usize,
    },

    /// A stored key has the wrong size for the parameter set.
    #[error("invalid {key} key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength {
        /// `"public"` or `"private"`
        key: &'static str,
        /// required length
        expected: usize,
        /// provided length
        actual: usize,
    },

    /// The random number generator could not produce a seed.
    #[error("entropy source failed")]
    Entropy,
}

/// Reasons a key generation attempt is discarded and resampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rejection {
    /// The candidate has no degree-`t` minimal polynomial.
    NotIrreducible,
    /// Two permutation priorities collided.
    DuplicateSupport,
    /// The parity-check matrix cannot be brought to systematic form.
    NotSystematic,
}

impl Rejection {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::NotIrreducible => "not irreducible",
            Self::DuplicateSupport => "duplicate support",
            Self::NotSystematic => "not systematic",
        }
    }
}
