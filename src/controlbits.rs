//! Beneš network control bits.
//!
//! A permutation of `n = 2^w` elements is stored in the private key as the switch settings
//! of a Beneš network with `2w - 1` layers of `n / 2` conditional swaps. Layer `s` of the
//! first half (and layer `2w - 2 - s` of the second half) swaps positions `i` and
//! `i + 2^s`.
//!
//! The encoder is the recursive control-bit algorithm; every step is a sort of packed
//! 32-bit words or a branch-free minimum, so the permutation does not leak through timing.
//!
//! Ref: D. J. Bernstein, "Verified fast formulas for control bits for permutation networks"
//! (https://cr.yp.to/papers.html#controlbits), `controlbits.c` in the Classic McEliece
//! reference implementation.

use alloc::{boxed::Box, vec, vec::Vec};

use subtle::{ConditionallySelectable, ConstantTimeGreater};
use zeroize::Zeroize;

use crate::sort::sort_u32;

/// Number of bytes holding the control bits for `2^w` elements.
#[inline]
#[must_use]
pub(crate) const fn control_bytes(w: usize) -> usize {
    (((2 * w - 1) << w) / 2).div_ceil(8)
}

#[inline]
fn ct_min(a: u32, b: u32) -> u32 {
    u32::conditional_select(&a, &b, a.ct_gt(&b))
}

/// Writes the control bits of `pi` into `out`, one bit every `step` starting at `pos`.
///
/// `out` must be zeroed beforehand; bits are XORed in. Values are packed into `u32` as
/// `(high << 16) | low`, and the shifts drop whatever does not fit, which the packing
/// relies on.
fn cbrecursion(out: &mut [u8], mut pos: usize, step: usize, pi: &[u16], w: usize) {
    let n = pi.len();
    if w == 1 {
        out[pos >> 3] ^= (pi[0] as u8) << (pos & 7);
        return;
    }

    let mut a = vec![0u32; n];
    let mut b = vec![0u32; n];

    // a = (id << 16) + pibar, where pibar(x) = pi(x ^ 1) ^ 1
    for x in 0..n {
        a[x] = ((u32::from(pi[x]) ^ 1) << 16) | u32::from(pi[x ^ 1]);
    }
    sort_u32(&mut a);

    // b = (p << 16) + c, c starting as min(x, p(x))
    for x in 0..n {
        let px = a[x] & 0xffff;
        let cx = ct_min(px, x as u32);
        b[x] = (px << 16) | cx;
    }

    // a = (pibar^-1 << 16) + id
    for x in 0..n {
        a[x] = (a[x] << 16) | x as u32;
    }
    sort_u32(&mut a);

    // a = (id << 16) + pibar^2
    for x in 0..n {
        a[x] = (a[x] << 16) | (b[x] >> 16);
    }
    sort_u32(&mut a);

    if w <= 10 {
        // b = (p << 10) + c, both fit in ten bits
        for x in 0..n {
            b[x] = ((a[x] & 0xffff) << 10) | (b[x] & 0x3ff);
        }

        for _ in 1..w - 1 {
            // a = (p << 16) + id
            for x in 0..n {
                a[x] = ((b[x] & !0x3ff) << 6) | x as u32;
            }
            sort_u32(&mut a);

            for x in 0..n {
                a[x] = (a[x] << 20) | b[x];
            }
            sort_u32(&mut a);

            for x in 0..n {
                let ppcpx = a[x] & 0xfffff;
                let ppcx = (a[x] & 0xffc00) | (b[x] & 0x3ff);
                b[x] = ct_min(ppcx, ppcpx);
            }
        }

        for x in b.iter_mut() {
            *x &= 0x3ff;
        }
    } else {
        // b = (p << 16) + c
        for x in 0..n {
            b[x] = (a[x] << 16) | (b[x] & 0xffff);
        }

        for i in 1..w - 1 {
            for x in 0..n {
                a[x] = (b[x] & !0xffff) | x as u32;
            }
            sort_u32(&mut a);

            for x in 0..n {
                a[x] = (a[x] << 16) | (b[x] & 0xffff);
            }

            if i < w - 2 {
                // square p for the next round
                for x in 0..n {
                    b[x] = (a[x] & !0xffff) | (b[x] >> 16);
                }
                sort_u32(&mut b);
                for x in 0..n {
                    b[x] = (b[x] << 16) | (a[x] & 0xffff);
                }
            }

            sort_u32(&mut a);
            for x in 0..n {
                let cpx = (b[x] & !0xffff) | (a[x] & 0xffff);
                b[x] = ct_min(b[x], cpx);
            }
        }

        for x in b.iter_mut() {
            *x &= 0xffff;
        }
    }

    // a = (pi << 16) + id
    for x in 0..n {
        a[x] = (u32::from(pi[x]) << 16) | x as u32;
    }
    sort_u32(&mut a);

    // first layer: f = c mod 2
    for j in 0..n / 2 {
        let x = 2 * j;
        let fj = b[x] & 1;
        let fx = x as u32 + fj;
        let fx1 = fx ^ 1;

        out[pos >> 3] ^= (fj as u8) << (pos & 7);
        pos += step;

        b[x] = (a[x] << 16) | fx;
        b[x + 1] = (a[x + 1] << 16) | fx1;
    }
    sort_u32(&mut b);

    pos += (2 * w - 3) * step * (n / 2);

    // last layer
    for k in 0..n / 2 {
        let y = 2 * k;
        let lk = b[y] & 1;
        let ly = y as u32 + lk;
        let ly1 = ly ^ 1;

        out[pos >> 3] ^= (lk as u8) << (pos & 7);
        pos += step;

        a[y] = (ly << 16) | (b[y] & 0xffff);
        a[y + 1] = (ly1 << 16) | (b[y + 1] & 0xffff);
    }
    sort_u32(&mut a);

    pos -= (2 * w - 2) * step * (n / 2);

    let mut q = vec![0u16; n];
    for j in 0..n / 2 {
        q[j] = ((a[2 * j] & 0xffff) >> 1) as u16;
        q[j + n / 2] = ((a[2 * j + 1] & 0xffff) >> 1) as u16;
    }

    a.zeroize();
    b.zeroize();

    cbrecursion(out, pos, step * 2, &q[..n / 2], w - 1);
    cbrecursion(out, pos + step, step * 2, &q[n / 2..], w - 1);

    q.zeroize();
}

/// Computes the control bits of the permutation `pi` of `2^w` elements.
#[must_use]
pub(crate) fn from_permutation(pi: &[u16], w: usize) -> Box<[u8]> {
    debug_assert_eq!(pi.len(), 1 << w);

    let mut out = vec![0u8; control_bytes(w)].into_boxed_slice();
    cbrecursion(&mut out, 0, 1, pi, w);

    debug_assert!(to_permutation(&out, w) == pi);
    out
}

/// One network layer: conditionally swaps `p[i]` and `p[i + 2^s]`, reading `p.len() / 2`
/// control bits starting at bit `index`.
fn layer(p: &mut [u16], cb: &[u8], s: usize, mut index: usize) {
    let stride = 1 << s;

    for i in (0..p.len()).step_by(stride * 2) {
        for j in 0..stride {
            let bit = u16::from((cb[index >> 3] >> (index & 7)) & 1);
            let d = (p[i + j] ^ p[i + j + stride]) & bit.wrapping_neg();
            p[i + j] ^= d;
            p[i + j + stride] ^= d;
            index += 1;
        }
    }
}

/// Recovers the permutation of `2^w` elements from its control bits by running the
/// network on the identity.
#[must_use]
pub(crate) fn to_permutation(cb: &[u8], w: usize) -> Vec<u16> {
    let n = 1usize << w;
    let mut p: Vec<u16> = (0..n).map(|i| i as u16).collect();

    let mut offset = 0;
    for s in (0..w).chain((0..w - 1).rev()) {
        layer(&mut p, cb, s, offset);
        offset += n / 2;
    }
    p
}
