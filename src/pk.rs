//! Public key generation.
//!
//! The parity-check matrix has `t * m` rows and `n` columns over GF(2). Column `j` is
//! `1 / g(L[j]) * (1, L[j], ..., L[j]^(t-1))` written as `t` field elements of `m` bits,
//! so row `i * m + k` holds bit `k` of `L[j]^i / g(L[j])`. The matrix is reduced to
//! `(I | T)` and `T` is the public key, row-major with each row padded to whole bytes.
//!
//! Two strategies build it, selected by [`ParameterSet::Builder`]:
//! - [`ByteMatrix`]: 8 columns per byte, elimination over the whole row;
//! - [`BitslicedMatrix`]: 64 columns per word with bitsliced evaluation, eliminating the
//!   pivot block first and applying the recorded row operations to the rest.
//!
//! Both produce the same bytes for the same input.
//!
//! Ref: Classic McEliece round-4 reference implementation, `pk_gen.c`; the `vec`
//! implementation of `pk_gen.c` for the two-phase elimination.

use alloc::boxed::Box;

use crate::{
    ParameterSet,
    gf::{self, Gf},
};

pub use crate::bitsliced::BitslicedMatrix;
pub use crate::matrix::ByteMatrix;

/// The parity-check matrix has no invertible left block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotSystematic;

/// Builds the systematic-form public key.
pub trait PublicKeyBuilder {
    /// Writes the `P::PUBLIC_KEY_BYTES` public key for the Goppa polynomial with low
    /// coefficients `irr` (the leading coefficient is 1) and the first `P::SYS_N` support
    /// points into `pk`.
    ///
    /// `pk` is left unspecified when the matrix is not systematic.
    fn build<P: ParameterSet>(irr: &[Gf], support: &[Gf], pk: &mut [u8])
    -> Result<(), NotSystematic>;
}

/// `g(a)` for the monic polynomial with low coefficients `irr`, by Horner's rule.
pub(crate) fn evaluate<P: ParameterSet>(irr: &[Gf], a: Gf) -> Gf {
    let mut r: Gf = 1;
    for &c in irr[..P::SYS_T].iter().rev() {
        r = gf::add(gf::mul::<P::Field>(r, a), c);
    }
    r
}

/// `1 / g(L[j])` for every support point.
pub(crate) fn inverse_evaluations<P: ParameterSet>(irr: &[Gf], support: &[Gf]) -> Box<[Gf]> {
    support[..P::SYS_N]
        .iter()
        .map(|&a| gf::inv::<P::Field>(evaluate::<P>(irr, a)))
        .collect()
}

/// Masks the bits past `P::PK_NCOLS` in the last byte of a public key row.
#[inline]
pub(crate) fn clear_padding<P: ParameterSet>(row: &mut [u8]) {
    if P::PK_NCOLS % 8 != 0 {
        row[P::PK_ROW_BYTES - 1] &= (1 << (P::PK_NCOLS % 8)) - 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gf::Gf16;
    use crate::toy::ToyParams;

    #[test]
    fn evaluate_monic_polynomial() {
        // g(y) = y^2 + y + 8
        let irr = [8, 1];
        assert_eq!(evaluate::<ToyParams>(&irr, 0), 8);
        assert_eq!(evaluate::<ToyParams>(&irr, 1), 8);
        let a = 0b0110;
        let expected = gf::sq::<Gf16>(a) ^ a ^ 8;
        assert_eq!(evaluate::<ToyParams>(&irr, a), expected);
    }

    #[test]
    fn inverse_evaluations_are_inverses() {
        let irr = [15, 1];
        let support: std::vec::Vec<Gf> = (0..16).collect();
        let inv = inverse_evaluations::<ToyParams>(&irr, &support);
        for (&a, &i) in support.iter().zip(inv.iter()) {
            assert_eq!(gf::mul::<Gf16>(evaluate::<ToyParams>(&irr, a), i), 1);
        }
    }

    #[test]
    fn padding_is_cleared_only_for_partial_bytes() {
        let mut row = [0xFFu8; 1];
        clear_padding::<ToyParams>(&mut row);
        assert_eq!(row, [0xFF]);
    }
}
