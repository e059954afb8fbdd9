#![no_std]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//!
//! # Security Warning
//!
//! **DO NOT USE THIS LIBRARY IN PRODUCTION.**
//!
//! This is an educational implementation for learning and experimentation.
//! It has not been audited, may contain timing side-channels, and provides
//! no security guarantees.
//!
//! # Usage
//!
//! ```
//! use mceliecers::kem::McElieceKem;
//! use mceliecers::{KeySeed, ParameterSet, mceliece348864::Mceliece348864Params, toy::ToyParams};
//!
//! // Obviously don't do this irl
//! let seed = KeySeed::from([0x42u8; 32]);
//!
//! let (pk, sk) = McElieceKem::keygen::<ToyParams>(&seed);
//! assert_eq!(pk.as_bytes().len(), ToyParams::PUBLIC_KEY_BYTES);
//! assert_eq!(sk.as_bytes().len(), ToyParams::PRIVATE_KEY_BYTES);
//!
//! // the same seed always gives the same keys
//! let (pk2, sk2) = McElieceKem::derive_keypair::<ToyParams>(&[0x42u8; 32]).unwrap();
//! assert_eq!(pk, pk2);
//! assert_eq!(sk, sk2);
//!
//! assert_eq!(Mceliece348864Params::PUBLIC_KEY_BYTES, 261_120);
//! assert_eq!(Mceliece348864Params::PRIVATE_KEY_BYTES, 6_492);
//! ```

extern crate alloc;

#[cfg(test)]
mod test_util;

/// SHAKE256 seed expansion
mod xof;

/// GF(2^m)
pub mod gf;

/// constant-time sorting network
mod sort;

/// Beneš network control bits
mod controlbits;

/// GF((2^m)^t) and the minimal polynomial
mod poly;

/// permutation and support
mod support;

/// parity-check matrix, 8 columns per byte
mod matrix;

/// parity-check matrix, 64 columns per word
mod bitsliced;

/// systematic-form public key
pub mod pk;

/// key pair generation
pub mod kem;

mod error;

mod param;

#[cfg(test)]
extern crate std;

pub use error::Error;
pub use param::{KeySeed, ParameterSet, SEED_BYTES};
pub use xof::{SeedExpander, Shake256Expander};

/// mceliece348864 parameter set (NIST Security Level 1)
pub mod mceliece348864 {
    use super::{ParameterSet, gf::Gf4096, pk::ByteMatrix};

    /// mceliece348864 parameter set implementation
    #[derive(Default, Clone, Debug, PartialEq, Eq)]
    pub struct Mceliece348864Params;

    impl ParameterSet for Mceliece348864Params {
        const NAME: &'static str = "mceliece348864";
        type Field = Gf4096;
        type Builder = ByteMatrix;
        const SYS_T: usize = 64;
        const SYS_N: usize = 3488;
        // y^64 = y^3 + y + z
        const POLY_REDUCTION: &'static [(usize, u16)] = &[(3, 1), (1, 1), (0, 2)];
    }
}

/// mceliece6960119 parameter set (NIST Security Level 5)
pub mod mceliece6960119 {
    use super::{ParameterSet, gf::Gf8192, pk::BitslicedMatrix};

    /// mceliece6960119 parameter set implementation
    #[derive(Default, Clone, Debug, PartialEq, Eq)]
    pub struct Mceliece6960119Params;

    impl ParameterSet for Mceliece6960119Params {
        const NAME: &'static str = "mceliece6960119";
        type Field = Gf8192;
        type Builder = BitslicedMatrix;
        const SYS_T: usize = 119;
        const SYS_N: usize = 6960;
        // y^119 = y^8 + 1
        const POLY_REDUCTION: &'static [(usize, u16)] = &[(8, 1), (0, 1)];
    }
}

/// Toy parameter set over GF(2^4) with `t = 2` and `n = 16`.
///
/// Offers no security at all; small enough to check by hand and to run in tests.
pub mod toy {
    use super::{ParameterSet, gf::Gf16, pk::ByteMatrix};

    /// toy parameter set implementation
    #[derive(Default, Clone, Debug, PartialEq, Eq)]
    pub struct ToyParams;

    impl ParameterSet for ToyParams {
        const NAME: &'static str = "toy";
        type Field = Gf16;
        type Builder = ByteMatrix;
        const SYS_T: usize = 2;
        const SYS_N: usize = 16;
        // y^2 = y + z^3
        const POLY_REDUCTION: &'static [(usize, u16)] = &[(1, 1), (0, 8)];
    }
}
