use core::fmt::Debug;

use hybrid_array::{
    Array,
    typenum::{U32, U33},
};

use crate::{
    gf::{Field, Gf},
    pk::PublicKeyBuilder,
};

/// Classic McEliece parameter set trait defining field, code and key sizes.
///
/// Implementations exist for mceliece348864, mceliece6960119 and a toy set over GF(2^4).
/// The derived constants must not be overridden.
pub trait ParameterSet: Default + Clone + Debug + PartialEq + Eq + 'static {
    /// Scheme name, e.g. `"mceliece348864"`
    const NAME: &'static str;

    /// The Goppa field GF(2^m)
    type Field: Field;

    /// Strategy used to build and reduce the parity-check matrix
    type Builder: PublicKeyBuilder;

    /// degree of the Goppa polynomial, denoted `t`
    const SYS_T: usize;

    /// code length, denoted `n`
    const SYS_N: usize;

    /// Reduction relation of GF((2^m)^t) as `(offset, coefficient)` pairs:
    /// `y^t = sum(coefficient * y^offset)`
    const POLY_REDUCTION: &'static [(usize, Gf)];

    /// `m`
    const GF_BITS: usize = <Self::Field as Field>::BITS;

    /// `2^m`, number of field elements and length of the permutation
    const FIELD_SIZE: usize = 1 << Self::GF_BITS;

    /// `m * t`, rows of the parity-check matrix
    const PK_NROWS: usize = Self::SYS_T * Self::GF_BITS;

    /// `n - m * t`, columns of the public key block
    const PK_NCOLS: usize = Self::SYS_N - Self::PK_NROWS;

    /// bytes per public key row
    const PK_ROW_BYTES: usize = Self::PK_NCOLS.div_ceil(8);

    /// serialized Goppa polynomial, two bytes per coefficient
    const IRR_BYTES: usize = Self::SYS_T * 2;

    /// Beneš network control bits: `(2m - 1) * 2^m / 2` bits
    const COND_BYTES: usize = (1 << (Self::GF_BITS - 4)) * (2 * Self::GF_BITS - 1);

    /// `n / 8` bytes of secret random string kept in the private key
    const S_BYTES: usize = Self::SYS_N / 8;

    /// `T` stored row by row
    const PUBLIC_KEY_BYTES: usize = Self::PK_NROWS * Self::PK_ROW_BYTES;

    /// seed || pivots || g || control bits || s
    const PRIVATE_KEY_BYTES: usize =
        SEED_BYTES + PIVOT_BYTES + Self::IRR_BYTES + Self::COND_BYTES + Self::S_BYTES;

    /// Seed expansion output: s || permutation words || polynomial words || next seed
    const EXPANDED_BYTES: usize =
        Self::S_BYTES + Self::FIELD_SIZE * 4 + Self::IRR_BYTES + SEED_BYTES;
}

// Shared params

/// |seed|
pub const SEED_BYTES: usize = 32;

/// little-endian pivot mask stored after the seed
pub const PIVOT_BYTES: usize = 8;

/// Domain separator prepended to the seed before expansion
pub const EXPAND_DOMAIN_SEP: u8 = 64;

/// Pivot mask of the non-"f" variants, whose elimination never moves columns
pub const DEFAULT_PIVOTS: u64 = 0xFFFF_FFFF;

/// 32-byte key generation seed
pub type KeySeed = Array<u8, U32>;

/// `EXPAND_DOMAIN_SEP || seed`, the input of each expansion round
pub type ExpandInput = Array<u8, U33>;
