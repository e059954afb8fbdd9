//! GF(2^m) arithmetic for the Goppa field.
//!
//! Elements are stored in the low `m` bits of a `u16`. Multiplication is a
//! constant-time shift-and-mask carry-less product followed by reduction modulo the
//! field polynomial; there are no lookup tables indexed by secret data.
//!
//! Ref: Classic McEliece round-4 reference implementation, `gf.c` (gf_mul, gf_frac, gf_inv)
//! and `util.c` (bitrev, load_gf, store_gf).

use core::fmt::Debug;

use subtle::{ConditionallySelectable, ConstantTimeEq};

/// A field element of GF(2^m), `m <= 16`.
pub type Gf = u16;

/// A binary extension field GF(2^m) with a fixed reduction polynomial.
pub trait Field: Default + Clone + Copy + Debug + PartialEq + Eq {
    /// Extension degree `m`.
    const BITS: usize;

    /// Reduction polynomial, including the `x^m` term.
    const MODULUS: u32;

    /// Mask selecting the low `m` bits of an element.
    const MASK: Gf = ((1u32 << Self::BITS) - 1) as Gf;
}

/// GF(2^4) with modulus x^4 + x + 1. Only used by the toy parameter set.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Gf16;

impl Field for Gf16 {
    const BITS: usize = 4;
    const MODULUS: u32 = 0x13;
}

/// GF(2^12) with modulus x^12 + x^3 + 1.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Gf4096;

impl Field for Gf4096 {
    const BITS: usize = 12;
    const MODULUS: u32 = 0x1009;
}

/// GF(2^13) with modulus x^13 + x^4 + x^3 + x + 1.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Gf8192;

impl Field for Gf8192 {
    const BITS: usize = 13;
    const MODULUS: u32 = 0x201B;
}

/// Field addition, XOR of the coefficient bits.
#[inline]
#[must_use]
pub const fn add(a: Gf, b: Gf) -> Gf {
    a ^ b
}

/// Multiplies two field elements.
///
/// The partial products are accumulated as `a * (b & (1 << i))`, which is either `0` or
/// `a << i`, so the instruction trace does not depend on the operands. The reduction
/// folds every bit above `m - 1` back with a multiplication by that bit.
#[must_use]
pub fn mul<F: Field>(a: Gf, b: Gf) -> Gf {
    let a = u32::from(a);
    let b = u32::from(b);

    let mut t = 0u32;
    for i in 0..F::BITS {
        t ^= a * (b & (1 << i));
    }

    for i in (F::BITS..2 * F::BITS - 1).rev() {
        let top = (t >> i) & 1;
        t ^= (F::MODULUS * top) << (i - F::BITS);
    }

    (t as Gf) & F::MASK
}

/// `a^2`
#[inline]
#[must_use]
pub fn sq<F: Field>(a: Gf) -> Gf {
    mul::<F>(a, a)
}

/// Computes `a^(2^m - 2)`, the multiplicative inverse of a non-zero `a`.
///
/// The exponent is public, so the square-and-multiply chain is fixed:
/// `a^(2^k - 1)` is raised to `a^(2^(k+1) - 1)` until `k = m - 1`, then squared once.
/// `inv(0)` is `0`; callers must not rely on it.
#[must_use]
pub fn inv<F: Field>(a: Gf) -> Gf {
    let mut acc = a;
    for _ in 2..F::BITS {
        acc = mul::<F>(sq::<F>(acc), a);
    }
    sq::<F>(acc)
}

/// Returns all-ones if `a == 0` and zero otherwise, without branching.
#[inline]
#[must_use]
pub fn is_zero_mask(a: Gf) -> Gf {
    Gf::conditional_select(&0, &Gf::MAX, a.ct_eq(&0))
}

/// Reverses the bits of an `m`-bit value.
///
/// Maps a position in the sorted permutation to the field element in the natural
/// enumeration order used for the support.
#[inline]
#[must_use]
pub fn bit_reverse<F: Field>(a: Gf) -> Gf {
    a.reverse_bits() >> (16 - F::BITS)
}

/// Reads a field element stored as two little-endian bytes, masked to `m` bits.
#[inline]
#[must_use]
pub fn load_gf<F: Field>(src: &[u8]) -> Gf {
    Gf::from_le_bytes([src[0], src[1]]) & F::MASK
}

/// Writes a field element as two little-endian bytes.
#[inline]
pub fn store_gf(dst: &mut [u8], a: Gf) {
    dst[..2].copy_from_slice(&a.to_le_bytes());
}
