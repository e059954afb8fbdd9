//! Arithmetic in GF((2^m)^t) and the minimal polynomial of a seed-derived element.
//!
//! An element of GF((2^m)^t) is a length-`t` slice of coefficients over GF(2^m), reduced
//! by the parameter set's relation `y^t = sum(c * y^offset)`. The Goppa polynomial is the
//! minimal polynomial of such an element; it has degree `t` exactly when the element
//! generates the whole extension, which is the irreducibility test.
//!
//! Ref: Classic McEliece round-4 reference implementation, `sk_gen.c` (genpoly_gen) and
//! `gf.c` (GF_mul).

use alloc::{boxed::Box, vec};

use zeroize::Zeroize;

use crate::{
    ParameterSet,
    error::Rejection,
    gf::{self, Gf},
};

/// `out = a * b` in GF((2^m)^t).
pub(crate) fn poly_mul<P: ParameterSet>(out: &mut [Gf], a: &[Gf], b: &[Gf]) {
    let t = P::SYS_T;
    let mut product = vec![0 as Gf; 2 * t - 1];

    for i in 0..t {
        for j in 0..t {
            product[i + j] ^= gf::mul::<P::Field>(a[i], b[j]);
        }
    }

    // fold y^i for i >= t back down, highest degree first
    for i in (t..2 * t - 1).rev() {
        let top = product[i];
        for &(offset, coefficient) in P::POLY_REDUCTION {
            product[i - t + offset] ^= gf::mul::<P::Field>(top, coefficient);
        }
    }

    out[..t].copy_from_slice(&product[..t]);
    product.zeroize();
}

/// Computes the monic minimal polynomial of `f`, returning its `t` low coefficients.
///
/// # Algorithm
/// 1. Row `i` of the `(t + 1) x t` matrix holds `f^i`, for `i = 0..=t`
/// 2. Gauss-Jordan on the columns, where a zero pivot is repaired by a masked merge of
///    every later column into it
/// 3. A pivot that stays zero means `1, f, ..., f^(t-1)` are dependent: reject
/// 4. The last row is then the linear relation expressing `f^t`
pub(crate) fn minimal_polynomial<P: ParameterSet>(f: &[Gf]) -> Result<Box<[Gf]>, Rejection> {
    let t = P::SYS_T;
    let mut mat = vec![0 as Gf; (t + 1) * t];
    let at = |row: usize, col: usize| row * t + col;

    // Step 1
    mat[at(0, 0)] = 1;
    mat[t..2 * t].copy_from_slice(&f[..t]);
    for i in 2..=t {
        let (done, rest) = mat.split_at_mut(i * t);
        poly_mul::<P>(&mut rest[..t], &done[(i - 1) * t..], f);
    }

    // Step 2
    for j in 0..t {
        for k in j + 1..t {
            let mask = gf::is_zero_mask(mat[at(j, j)]);
            for c in j..=t {
                mat[at(c, j)] ^= mat[at(c, k)] & mask;
            }
        }

        // Step 3
        if mat[at(j, j)] == 0 {
            mat.zeroize();
            return Err(Rejection::NotIrreducible);
        }

        let inv = gf::inv::<P::Field>(mat[at(j, j)]);
        for c in 0..=t {
            mat[at(c, j)] = gf::mul::<P::Field>(mat[at(c, j)], inv);
        }

        for k in 0..t {
            if k != j {
                let factor = mat[at(j, k)];
                for c in 0..=t {
                    mat[at(c, k)] ^= gf::mul::<P::Field>(mat[at(c, j)], factor);
                }
            }
        }
    }

    // Step 4
    let out: Box<[Gf]> = mat[at(t, 0)..].into();
    mat.zeroize();
    Ok(out)
}
