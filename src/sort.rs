//! Constant-time sorting network.
//!
//! Sorts fixed-length slices with a data-independent sequence of compare-exchange
//! operations, so the memory access pattern depends only on the length. Used to turn
//! random priorities into the secret permutation and inside the control-bit encoder.
//!
//! Ref: djbsort (https://sorting.cr.yp.to/), `int32_sort.c` / `uint64_sort.h` as vendored
//! by the Classic McEliece reference implementation.

use subtle::{ConditionallySelectable, ConstantTimeGreater};

/// Key types the network can sort.
pub(crate) trait SortKey: Copy + ConditionallySelectable + ConstantTimeGreater {}

impl SortKey for u32 {}
impl SortKey for u64 {}

/// Orders `(a, b)` so that `a <= b`.
#[inline]
fn minmax<T: SortKey>(a: &mut T, b: &mut T) {
    let swap = a.ct_gt(b);
    T::conditional_swap(a, b, swap);
}

#[inline]
fn minmax_at<T: SortKey>(x: &mut [T], i: usize, j: usize) {
    let mut a = x[i];
    let mut b = x[j];
    minmax(&mut a, &mut b);
    x[i] = a;
    x[j] = b;
}

/// Merges `x[j + p]` against the comparators `x[j + q], x[j + q/2], ..., x[j + 2p]`.
#[inline]
fn merge_step<T: SortKey>(x: &mut [T], j: usize, p: usize, q: usize) {
    let mut a = x[j + p];
    let mut r = q;
    while r > p {
        minmax(&mut a, &mut x[j + r]);
        r >>= 1;
    }
    x[j + p] = a;
}

/// Sorts `x` in ascending order.
pub(crate) fn sort<T: SortKey>(x: &mut [T]) {
    let n = x.len();
    if n < 2 {
        return;
    }

    let mut top = 1;
    while top < n - top {
        top += top;
    }

    let mut p = top;
    while p >= 1 {
        let mut i = 0;
        while i + 2 * p <= n {
            for j in i..i + p {
                minmax_at(x, j, j + p);
            }
            i += 2 * p;
        }
        for j in i..n - p {
            minmax_at(x, j, j + p);
        }

        let mut i = 0;
        let mut j = 0;
        let mut q = top;
        while q > p {
            'round: {
                if j != i {
                    loop {
                        if j == n - q {
                            break 'round;
                        }
                        merge_step(x, j, p, q);
                        j += 1;
                        if j == i + p {
                            i += 2 * p;
                            break;
                        }
                    }
                }

                while i + p <= n - q {
                    for k in i..i + p {
                        merge_step(x, k, p, q);
                    }
                    i += 2 * p;
                }

                j = i;
                while j < n - q {
                    merge_step(x, j, p, q);
                    j += 1;
                }
            }
            q >>= 1;
        }
        p >>= 1;
    }
}

#[inline]
pub(crate) fn sort_u64(x: &mut [u64]) {
    sort(x);
}

#[inline]
pub(crate) fn sort_u32(x: &mut [u32]) {
    sort(x);
}
