//! Bitsliced public key builder.
//!
//! Columns are processed 64 at a time. A block of 64 field elements is held as `m` words,
//! word `k` carrying bit `k` of every lane, so one word-wise multiplication evaluates 64
//! columns at once and each word is directly a 64-column slice of one matrix row.
//!
//! The elimination only touches the `ceil(t * m / 64)` blocks that contain pivot columns
//! and records the row operations in a side matrix. The remaining blocks are generated
//! afterwards and multiplied by the recorded operations while serializing.
//!
//! Ref: Classic McEliece round-4 `vec` implementation, `pk_gen.c` and `vec.c`.

use alloc::{boxed::Box, vec, vec::Vec};

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    ParameterSet,
    gf::{Field, Gf},
    pk::{self, NotSystematic, PublicKeyBuilder},
};

/// Public key builder working on 64 columns per word, used by the larger parameter sets.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitslicedMatrix;

// ============================================================================
// Bitsliced GF(2^m) arithmetic
// ============================================================================

/// 64 field elements; word `k` holds bit `k` of each lane, words `m..` stay zero.
type Lanes = [u64; 16];

/// Every lane set to `a`.
fn broadcast<F: Field>(a: Gf) -> Lanes {
    let mut out = [0u64; 16];
    for (k, plane) in out.iter_mut().enumerate().take(F::BITS) {
        *plane = 0u64.wrapping_sub(u64::from((a >> k) & 1));
    }
    out
}

/// Lanes `block * 64 ..` of `values`, zero past the end.
fn transpose<F: Field>(values: &[Gf], block: usize) -> Lanes {
    let mut out = [0u64; 16];
    let start = block * 64;
    let end = values.len().min(start + 64);
    for (r, &v) in values[start..end].iter().enumerate() {
        for (k, plane) in out.iter_mut().enumerate().take(F::BITS) {
            *plane |= u64::from((v >> k) & 1) << r;
        }
    }
    out
}

#[inline]
fn vec_add(a: &Lanes, b: &Lanes) -> Lanes {
    core::array::from_fn(|k| a[k] ^ b[k])
}

/// Lane-wise product: schoolbook over the bit planes, then reduction by the modulus.
fn vec_mul<F: Field>(a: &Lanes, b: &Lanes) -> Lanes {
    let m = F::BITS;
    let mut buf = [0u64; 31];

    for i in 0..m {
        for j in 0..m {
            buf[i + j] ^= a[i] & b[j];
        }
    }

    // x^m = sum of the low terms of the modulus
    for i in (m..2 * m - 1).rev() {
        for k in 0..m {
            if (F::MODULUS >> k) & 1 == 1 {
                buf[i - m + k] ^= buf[i];
            }
        }
    }

    let mut out = [0u64; 16];
    out[..m].copy_from_slice(&buf[..m]);
    out
}

#[inline]
fn vec_sq<F: Field>(a: &Lanes) -> Lanes {
    vec_mul::<F>(a, a)
}

/// Lane-wise `a^(2^m - 2)`; zero lanes stay zero.
fn vec_inv<F: Field>(a: &Lanes) -> Lanes {
    let mut acc = *a;
    for _ in 2..F::BITS {
        acc = vec_mul::<F>(&vec_sq::<F>(&acc), a);
    }
    vec_sq::<F>(&acc)
}

/// Inverts every block with a single field inversion (Montgomery's trick).
///
/// No lane may be zero: a zero lane zeroes that lane in every block.
fn batch_invert<F: Field>(eval: &[Lanes]) -> Box<[Lanes]> {
    let mut prod: Box<[Lanes]> = vec![[0u64; 16]; eval.len()].into_boxed_slice();
    prod[0] = eval[0];
    for i in 1..eval.len() {
        prod[i] = vec_mul::<F>(&prod[i - 1], &eval[i]);
    }

    let mut tmp = vec_inv::<F>(&prod[eval.len() - 1]);
    for i in (0..eval.len() - 1).rev() {
        prod[i + 1] = vec_mul::<F>(&prod[i], &tmp);
        tmp = vec_mul::<F>(&tmp, &eval[i + 1]);
    }
    prod[0] = tmp;

    tmp.zeroize();
    prod
}

// ============================================================================
// Matrix construction and elimination
// ============================================================================

/// Buffers holding secret-derived data, wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
struct Workspace {
    /// support points, one block per 64 columns
    consts: Box<[Lanes]>,
    /// `1 / g(L)`, one block per 64 columns
    inverses: Box<[Lanes]>,
    /// `t * m` rows of `blocks_h` words
    mat: Vec<u64>,
    /// `t * m` rows of `blocks_i` words
    ops: Vec<u64>,
    /// pivot-block column saved before elimination
    column: Vec<u64>,
    blocks_h: usize,
    blocks_i: usize,
}

impl Workspace {
    fn new<P: ParameterSet>(irr: &[Gf], support: &[Gf]) -> Self {
        let blocks_h = P::SYS_N.div_ceil(64);
        let blocks_i = P::PK_NROWS.div_ceil(64);

        let consts: Box<[Lanes]> = (0..blocks_h)
            .map(|b| transpose::<P::Field>(&support[..P::SYS_N], b))
            .collect();

        // Horner over the bitsliced points; the padding lanes evaluate to g(0) != 0
        let mut eval: Box<[Lanes]> = consts
            .iter()
            .map(|l| {
                let mut acc = broadcast::<P::Field>(1);
                for &c in irr[..P::SYS_T].iter().rev() {
                    acc = vec_add(&vec_mul::<P::Field>(&acc, l), &broadcast::<P::Field>(c));
                }
                acc
            })
            .collect();

        let mut inverses = batch_invert::<P::Field>(&eval);
        eval.zeroize();

        if P::SYS_N % 64 != 0 {
            let lanes = (1u64 << (P::SYS_N % 64)) - 1;
            for plane in inverses[blocks_h - 1].iter_mut() {
                *plane &= lanes;
            }
        }

        Self {
            consts,
            inverses,
            mat: vec![0u64; P::PK_NROWS * blocks_h],
            ops: vec![0u64; P::PK_NROWS * blocks_i],
            column: vec![0u64; P::PK_NROWS],
            blocks_h,
            blocks_i,
        }
    }

    /// Writes rows `i * m + k` of the given column blocks: bit `k` of `L^i / g(L)`.
    fn fill<P: ParameterSet>(&mut self, blocks: core::ops::Range<usize>) {
        let m = P::GF_BITS;
        for j in blocks {
            let mut lanes = self.inverses[j];
            for i in 0..P::SYS_T {
                if i > 0 {
                    lanes = vec_mul::<P::Field>(&lanes, &self.consts[j]);
                }
                for (k, &plane) in lanes.iter().enumerate().take(m) {
                    self.mat[(i * m + k) * self.blocks_h + j] = plane;
                }
            }
            lanes.zeroize();
        }
    }

    #[inline]
    fn mat_bit(&self, row: usize, col: usize) -> u64 {
        (self.mat[row * self.blocks_h + col / 64] >> (col % 64)) & 1
    }

    /// `mat[dst] ^= mat[src] & mask` and `ops[dst] ^= ops[src] & mask` over the pivot
    /// blocks.
    #[inline]
    fn xor_masked(&mut self, dst: usize, src: usize, mask: u64) {
        let (h, bi) = (self.blocks_h, self.blocks_i);
        for c in 0..bi {
            let v = self.mat[src * h + c] & mask;
            self.mat[dst * h + c] ^= v;
            let o = self.ops[src * bi + c] & mask;
            self.ops[dst * bi + c] ^= o;
        }
    }

    /// Forward elimination on the pivot blocks to unit upper triangular form, recording
    /// the row operations in `ops`, then back-substitution on `ops` alone.
    ///
    /// Afterwards `ops` is the inverse of the leading `t * m` square block.
    fn eliminate(&mut self, nrows: usize) -> Result<(), NotSystematic> {
        for i in 0..nrows {
            self.ops[i * self.blocks_i + i / 64] = 1 << (i % 64);
        }

        for row in 0..nrows {
            for k in row + 1..nrows {
                let mask = self.mat_bit(row, row).wrapping_sub(1);
                self.xor_masked(row, k, mask);
            }

            if self.mat_bit(row, row) == 0 {
                return Err(NotSystematic);
            }

            for k in row + 1..nrows {
                let mask = self.mat_bit(k, row).wrapping_neg();
                self.xor_masked(k, row, mask);
            }
        }

        // the upper part of `mat` is never updated: column `row` of rows above `row`
        // only changes in columns already cleared
        let bi = self.blocks_i;
        for row in (0..nrows).rev() {
            for k in 0..row {
                let mask = self.mat_bit(k, row).wrapping_neg();
                for c in 0..bi {
                    let o = self.ops[row * bi + c] & mask;
                    self.ops[k * bi + c] ^= o;
                }
            }
        }

        Ok(())
    }
}

impl PublicKeyBuilder for BitslicedMatrix {
    /// # Algorithm
    /// 1. Bitslice the support and compute `1 / g(L)` block by block
    /// 2. Fill the pivot blocks and save the last one, which may also hold `T` columns
    /// 3. Eliminate, recording the operations; fail on a zero pivot
    /// 4. Fill the remaining blocks and restore the saved one
    /// 5. Each public key row is `ops[row] * H` on the blocks from column `t * m` on,
    ///    shifted down to start at that column
    fn build<P: ParameterSet>(
        irr: &[Gf],
        support: &[Gf],
        pk: &mut [u8],
    ) -> Result<(), NotSystematic> {
        let nrows = P::PK_NROWS;

        // Step 1
        let mut ws = Workspace::new::<P>(irr, support);
        let (blocks_h, blocks_i) = (ws.blocks_h, ws.blocks_i);
        let block_idx = blocks_i - 1;

        // Step 2
        ws.fill::<P>(0..blocks_i);
        for r in 0..nrows {
            ws.column[r] = ws.mat[r * blocks_h + block_idx];
        }

        // Step 3
        ws.eliminate(nrows)?;

        // Step 4
        ws.fill::<P>(blocks_i..blocks_h);
        for r in 0..nrows {
            ws.mat[r * blocks_h + block_idx] = ws.column[r];
        }

        // Step 5
        let first = nrows / 64;
        let tail = nrows % 64;
        let mut one_row = vec![0u64; blocks_h];
        for (row, out) in pk.chunks_exact_mut(P::PK_ROW_BYTES).enumerate() {
            one_row.fill(0);
            for c in 0..nrows {
                let mask = ((ws.ops[row * blocks_i + c / 64] >> (c % 64)) & 1).wrapping_neg();
                for k in first..blocks_h {
                    one_row[k] ^= ws.mat[c * blocks_h + k] & mask;
                }
            }

            for (w, chunk) in out.chunks_mut(8).enumerate() {
                let k = first + w;
                let mut word = one_row[k] >> tail;
                if tail != 0 && k + 1 < blocks_h {
                    word |= one_row[k + 1] << (64 - tail);
                }
                chunk.copy_from_slice(&word.to_le_bytes()[..chunk.len()]);
            }
            pk::clear_padding::<P>(out);
        }
        one_row.zeroize();

        Ok(())
    }
}
