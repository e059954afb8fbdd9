//! Secret permutation of the field elements and the derived support.
//!
//! Every index `i` gets a 32-bit priority from the seed stream; sorting the packed keys
//! `(priority << 31) | i` orders the indices by priority, and the sorted low bits are the
//! permutation `pi`. Equal priorities would make the order depend on the index tie-break,
//! so any collision discards the draw.
//!
//! Ref: Classic McEliece round-4 reference implementation, `pk_gen.c` (the `buf` sort and
//! the `L[i] = bitrev(pi[i])` support).

use alloc::{boxed::Box, vec};

use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroize;

use crate::{
    ParameterSet,
    error::Rejection,
    gf::{self, Field, Gf},
    sort::sort_u64,
};

/// Derives the permutation of `2^m` elements from one priority per element.
pub(crate) fn permutation<P: ParameterSet>(priorities: &[u32]) -> Result<Box<[u16]>, Rejection> {
    debug_assert_eq!(priorities.len(), P::FIELD_SIZE);

    let mut keys = vec![0u64; P::FIELD_SIZE];
    for (i, (key, &priority)) in keys.iter_mut().zip(priorities).enumerate() {
        *key = (u64::from(priority) << 31) | i as u64;
    }
    sort_u64(&mut keys);

    let mut duplicate = Choice::from(0);
    for pair in keys.windows(2) {
        duplicate |= (pair[0] >> 31).ct_eq(&(pair[1] >> 31));
    }
    if bool::from(duplicate) {
        keys.zeroize();
        return Err(Rejection::DuplicateSupport);
    }

    let mask = u64::from(<P::Field as Field>::MASK);
    let pi = keys.iter().map(|&key| (key & mask) as u16).collect();
    keys.zeroize();
    Ok(pi)
}

/// The first `n` entries of `pi` mapped to field elements, `L[i] = bitrev(pi[i])`.
pub(crate) fn support_points<P: ParameterSet>(pi: &[u16]) -> Box<[Gf]> {
    pi[..P::SYS_N]
        .iter()
        .map(|&p| gf::bit_reverse::<P::Field>(p))
        .collect()
}
