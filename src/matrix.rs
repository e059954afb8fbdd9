//! Byte-oriented public key builder.
//!
//! Each matrix row is `ceil(n / 8)` bytes with column `j` at bit `j % 8` of byte `j / 8`.
//! Elimination runs over whole rows: a zero pivot absorbs every later row whose bit
//! differs, then the pivot column is cleared in every other row. All row updates are
//! masked XORs; the only branch is the systematic check.
//!
//! Ref: Classic McEliece round-4 reference implementation, `ref/pk_gen.c`.

use alloc::{vec, vec::Vec};

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    ParameterSet,
    gf::{self, Gf},
    pk::{self, NotSystematic, PublicKeyBuilder},
};

/// Public key builder working on 8 columns per byte, used by the smaller parameter sets.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ByteMatrix;

/// Row-major GF(2) matrix, wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
struct Rows {
    data: Vec<u8>,
    row_bytes: usize,
}

impl Rows {
    fn new(rows: usize, cols: usize) -> Self {
        let row_bytes = cols.div_ceil(8);
        Self {
            data: vec![0u8; rows * row_bytes],
            row_bytes,
        }
    }

    #[inline]
    fn bit(&self, row: usize, col: usize) -> u8 {
        (self.data[row * self.row_bytes + col / 8] >> (col % 8)) & 1
    }

    /// `rows[dst] ^= rows[src] & mask`
    #[inline]
    fn xor_masked(&mut self, dst: usize, src: usize, mask: u8) {
        let rb = self.row_bytes;
        for c in 0..rb {
            let v = self.data[src * rb + c] & mask;
            self.data[dst * rb + c] ^= v;
        }
    }

    fn row(&self, row: usize) -> &[u8] {
        &self.data[row * self.row_bytes..(row + 1) * self.row_bytes]
    }
}

impl PublicKeyBuilder for ByteMatrix {
    /// # Algorithm
    /// 1. `inv[j] = 1 / g(L[j])`
    /// 2. For each coefficient index `i`, rows `i * m .. i * m + m` take the bits of
    ///    `inv`, then `inv[j] *= L[j]`
    /// 3. Reduce to `(I | T)`, failing on a zero pivot
    /// 4. Store `T` row by row
    fn build<P: ParameterSet>(
        irr: &[Gf],
        support: &[Gf],
        pk: &mut [u8],
    ) -> Result<(), NotSystematic> {
        let m = P::GF_BITS;
        let nrows = P::PK_NROWS;

        // Step 1
        let mut inv = pk::inverse_evaluations::<P>(irr, support);

        // Step 2
        let mut mat = Rows::new(nrows, P::SYS_N);
        for i in 0..P::SYS_T {
            for (j, &v) in inv.iter().enumerate() {
                for k in 0..m {
                    let bit = ((v >> k) & 1) as u8;
                    mat.data[(i * m + k) * mat.row_bytes + j / 8] |= bit << (j % 8);
                }
            }
            for (v, &a) in inv.iter_mut().zip(support) {
                *v = gf::mul::<P::Field>(*v, a);
            }
        }
        inv.zeroize();

        // Step 3
        for row in 0..nrows {
            for k in row + 1..nrows {
                let mask = (mat.bit(row, row) ^ mat.bit(k, row)).wrapping_neg();
                mat.xor_masked(row, k, mask);
            }

            if mat.bit(row, row) == 0 {
                return Err(NotSystematic);
            }

            for k in 0..nrows {
                if k != row {
                    let mask = mat.bit(k, row).wrapping_neg();
                    mat.xor_masked(k, row, mask);
                }
            }
        }

        // Step 4
        let first = nrows / 8;
        let shift = nrows % 8;
        for (row, out) in pk.chunks_exact_mut(P::PK_ROW_BYTES).enumerate() {
            let src = mat.row(row);
            for (c, byte) in out.iter_mut().enumerate() {
                let lo = src[first + c] >> shift;
                let hi = match src.get(first + c + 1) {
                    Some(&next) if shift != 0 => next << (8 - shift),
                    _ => 0,
                };
                *byte = lo | hi;
            }
            pk::clear_padding::<P>(out);
        }

        Ok(())
    }
}
