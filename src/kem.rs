//! Classic McEliece key pair generation.
//!
//! Each attempt expands `64 || seed` into `s || priorities || candidate || next seed`,
//! derives the Goppa polynomial and the permutation from it, and builds the public key.
//! Any rejection restarts from the next seed; only a complete attempt produces keys.
//!
//! Ref: Classic McEliece NIST round 4 submission (SeededKeyGen, Irreducible, FieldOrdering,
//! MatGen) and its reference implementation, `operations.c` (crypto_kem_keypair).

use alloc::{boxed::Box, vec, vec::Vec};
use core::{fmt, marker::PhantomData};

use rand_core::{CryptoRng, RngCore};
use subtle::{Choice, ConstantTimeEq};
use tracing::{debug, trace};
use zeroize::{Zeroize, Zeroizing};

use crate::{
    ParameterSet,
    controlbits,
    error::{Error, Rejection},
    gf::{self, Gf},
    param::{DEFAULT_PIVOTS, EXPAND_DOMAIN_SEP, ExpandInput, KeySeed, PIVOT_BYTES, SEED_BYTES},
    pk::PublicKeyBuilder,
    poly::minimal_polynomial,
    support::{permutation, support_points},
    xof::{SeedExpander, Shake256Expander},
};

/// Public key: the `t * m` rows of `T` in the systematic parity-check matrix `(I | T)`.
#[derive(Clone)]
pub struct PublicKey<P: ParameterSet> {
    bytes: Box<[u8]>,
    _params: PhantomData<P>,
}

/// Private key: `seed || pivots || g || control bits || s`.
///
/// The seed is the one of the accepted attempt, not necessarily the caller's.
#[derive(Clone)]
pub struct PrivateKey<P: ParameterSet> {
    bytes: Box<[u8]>,
    _params: PhantomData<P>,
}

/// Classic McEliece KEM key generation.
pub struct McElieceKem;

impl McElieceKem {
    /// Deterministic key generation from a 32-byte seed, expanding it with SHAKE256.
    #[must_use]
    pub fn keygen<P: ParameterSet>(seed: &KeySeed) -> (PublicKey<P>, PrivateKey<P>) {
        let Ok(keys) = Self::keygen_with::<P, _>(&mut Shake256Expander, seed);
        keys
    }

    /// Deterministic key generation with a caller-supplied seed expander.
    ///
    /// # Algorithm
    /// 1. `r = expand(64 || seed)`
    /// 2. Attempt a key pair from `r`
    /// 3. On rejection, `seed` = last 32 bytes of `r` and go to 1
    ///
    /// # Errors
    /// Returns the expander's error as soon as it fails; no key pair is produced.
    pub fn keygen_with<P: ParameterSet, X: SeedExpander>(
        expander: &mut X,
        seed: &KeySeed,
    ) -> Result<(PublicKey<P>, PrivateKey<P>), X::Error> {
        let mut input = Zeroizing::new(ExpandInput::default());
        input[0] = EXPAND_DOMAIN_SEP;
        input[1..].copy_from_slice(seed);

        let mut r = Zeroizing::new(vec![0u8; P::EXPANDED_BYTES]);
        let mut attempt = 0usize;

        loop {
            attempt += 1;

            // Step 1
            expander.expand(&input, &mut r)?;

            // Step 2
            match attempt_keypair::<P>(&input[1..], &r) {
                Ok(keys) => {
                    debug!(scheme = P::NAME, attempts = attempt, "derived key pair");
                    return Ok(keys);
                }
                Err(rejection) => {
                    trace!(
                        scheme = P::NAME,
                        attempt,
                        reason = rejection.as_str(),
                        "key generation attempt rejected"
                    );
                }
            }

            // Step 3
            input[1..].copy_from_slice(&r[P::EXPANDED_BYTES - SEED_BYTES..]);
        }
    }

    /// Deterministic key generation from a seed slice, which must be exactly 32 bytes.
    ///
    /// # Errors
    /// [`Error::InvalidSeedLength`] for any other length.
    pub fn derive_keypair<P: ParameterSet>(
        seed: &[u8],
    ) -> Result<(PublicKey<P>, PrivateKey<P>), Error> {
        if seed.len() != SEED_BYTES {
            return Err(Error::InvalidSeedLength {
                expected: SEED_BYTES,
                actual: seed.len(),
            });
        }
        let mut key_seed = Zeroizing::new(KeySeed::default());
        key_seed.copy_from_slice(seed);
        Ok(Self::keygen::<P>(&key_seed))
    }

    /// Key generation from a seed drawn from `rng`.
    ///
    /// # Errors
    /// [`Error::Entropy`] if the generator fails.
    pub fn generate<P: ParameterSet, R: CryptoRng + RngCore>(
        rng: &mut R,
    ) -> Result<(PublicKey<P>, PrivateKey<P>), Error> {
        let mut seed = Zeroizing::new(KeySeed::default());
        rng.try_fill_bytes(seed.as_mut_slice())
            .map_err(|_| Error::Entropy)?;
        Ok(Self::keygen::<P>(&seed))
    }
}

/// One key generation attempt on the expanded buffer `r`.
///
/// # Algorithm
/// 1. Candidate `f` from the polynomial words; `g` = its minimal polynomial
/// 2. Permutation `pi` from the priority words; support `L = bitrev(pi)`
/// 3. Public key from `g` and `L`
/// 4. `sk = seed || pivots || g || controlbits(pi) || s`
fn attempt_keypair<P: ParameterSet>(
    seed: &[u8],
    r: &[u8],
) -> Result<(PublicKey<P>, PrivateKey<P>), Rejection> {
    let perm_start = P::S_BYTES;
    let poly_start = perm_start + P::FIELD_SIZE * 4;
    let (s, rest) = r.split_at(perm_start);
    let (perm_bytes, rest) = rest.split_at(poly_start - perm_start);
    let poly_bytes = &rest[..P::IRR_BYTES];

    // Step 1
    let f: Zeroizing<Vec<Gf>> = Zeroizing::new(
        poly_bytes
            .chunks_exact(2)
            .map(gf::load_gf::<P::Field>)
            .collect(),
    );
    let irr = Zeroizing::new(minimal_polynomial::<P>(&f)?);

    // Step 2
    let priorities: Zeroizing<Vec<u32>> = Zeroizing::new(
        perm_bytes
            .chunks_exact(4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect(),
    );
    let pi = Zeroizing::new(permutation::<P>(&priorities)?);
    let support = Zeroizing::new(support_points::<P>(&pi));

    // Step 3
    let mut pk = vec![0u8; P::PUBLIC_KEY_BYTES].into_boxed_slice();
    <P::Builder as PublicKeyBuilder>::build::<P>(&irr, &support, &mut pk)
        .map_err(|_| Rejection::NotSystematic)?;

    // Step 4
    let mut sk = vec![0u8; P::PRIVATE_KEY_BYTES].into_boxed_slice();
    sk[..SEED_BYTES].copy_from_slice(seed);
    sk[PrivateKey::<P>::PIVOTS_OFFSET..PrivateKey::<P>::IRR_OFFSET]
        .copy_from_slice(&DEFAULT_PIVOTS.to_le_bytes());
    for (dst, &c) in sk[PrivateKey::<P>::IRR_OFFSET..PrivateKey::<P>::COND_OFFSET]
        .chunks_exact_mut(2)
        .zip(irr.iter())
    {
        gf::store_gf(dst, c);
    }
    let cb = Zeroizing::new(controlbits::from_permutation(&pi, P::GF_BITS));
    sk[PrivateKey::<P>::COND_OFFSET..PrivateKey::<P>::S_OFFSET].copy_from_slice(&cb);
    sk[PrivateKey::<P>::S_OFFSET..].copy_from_slice(s);

    Ok((
        PublicKey {
            bytes: pk,
            _params: PhantomData,
        },
        PrivateKey {
            bytes: sk,
            _params: PhantomData,
        },
    ))
}

impl<P: ParameterSet> PublicKey<P> {
    /// Parses a public key.
    ///
    /// # Errors
    /// [`Error::InvalidKeyLength`] unless `bytes` is `P::PUBLIC_KEY_BYTES` long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != P::PUBLIC_KEY_BYTES {
            return Err(Error::InvalidKeyLength {
                key: "public",
                expected: P::PUBLIC_KEY_BYTES,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            bytes: bytes.into(),
            _params: PhantomData,
        })
    }

    /// Serialized key, `P::PUBLIC_KEY_BYTES` bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Copy of the serialized key.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    /// Row `i` of `T`, `P::PK_ROW_BYTES` bytes.
    #[must_use]
    pub fn row(&self, i: usize) -> &[u8] {
        &self.bytes[i * P::PK_ROW_BYTES..(i + 1) * P::PK_ROW_BYTES]
    }
}

impl<P: ParameterSet> PrivateKey<P> {
    const PIVOTS_OFFSET: usize = SEED_BYTES;
    const IRR_OFFSET: usize = Self::PIVOTS_OFFSET + PIVOT_BYTES;
    const COND_OFFSET: usize = Self::IRR_OFFSET + P::IRR_BYTES;
    const S_OFFSET: usize = Self::COND_OFFSET + P::COND_BYTES;

    /// Parses a private key.
    ///
    /// # Errors
    /// [`Error::InvalidKeyLength`] unless `bytes` is `P::PRIVATE_KEY_BYTES` long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != P::PRIVATE_KEY_BYTES {
            return Err(Error::InvalidKeyLength {
                key: "private",
                expected: P::PRIVATE_KEY_BYTES,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            bytes: bytes.into(),
            _params: PhantomData,
        })
    }

    /// Serialized key, `P::PRIVATE_KEY_BYTES` bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Copy of the serialized key; the caller is responsible for wiping it.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    /// Seed of the accepted attempt.
    #[must_use]
    pub fn seed(&self) -> &[u8] {
        &self.bytes[..SEED_BYTES]
    }

    /// Pivot mask; always `0xFFFF_FFFF` since columns are never swapped.
    #[must_use]
    pub fn pivots(&self) -> u64 {
        let mut le = [0u8; PIVOT_BYTES];
        le.copy_from_slice(&self.bytes[Self::PIVOTS_OFFSET..Self::IRR_OFFSET]);
        u64::from_le_bytes(le)
    }

    /// Low `t` coefficients of the monic Goppa polynomial.
    #[must_use]
    pub fn irreducible(&self) -> Vec<Gf> {
        self.bytes[Self::IRR_OFFSET..Self::COND_OFFSET]
            .chunks_exact(2)
            .map(gf::load_gf::<P::Field>)
            .collect()
    }

    /// Beneš network control bits of the permutation.
    #[must_use]
    pub fn control_bits(&self) -> &[u8] {
        &self.bytes[Self::COND_OFFSET..Self::S_OFFSET]
    }

    /// Secret string used for implicit rejection.
    #[must_use]
    pub fn s(&self) -> &[u8] {
        &self.bytes[Self::S_OFFSET..]
    }

    /// The permutation `pi` of the `2^m` field elements, decoded from the control bits.
    #[must_use]
    pub fn permutation(&self) -> Vec<u16> {
        controlbits::to_permutation(self.control_bits(), P::GF_BITS)
    }
}

impl<P: ParameterSet> Drop for PrivateKey<P> {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl<P: ParameterSet> ConstantTimeEq for PublicKey<P> {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.bytes[..].ct_eq(&other.bytes[..])
    }
}

impl<P: ParameterSet> ConstantTimeEq for PrivateKey<P> {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.bytes[..].ct_eq(&other.bytes[..])
    }
}

impl<P: ParameterSet> PartialEq for PublicKey<P> {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl<P: ParameterSet> Eq for PublicKey<P> {}

impl<P: ParameterSet> PartialEq for PrivateKey<P> {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl<P: ParameterSet> Eq for PrivateKey<P> {}

impl<P: ParameterSet> fmt::Debug for PublicKey<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("scheme", &P::NAME)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl<P: ParameterSet> fmt::Debug for PrivateKey<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("scheme", &P::NAME)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toy::ToyParams;
    use core::num::NonZeroU32;
    use rand_chacha::ChaCha8Rng;
    use rand_chacha::rand_core::SeedableRng;

    type Toy = ToyParams;

    const TOY_ZERO_SEED_PK: &str = "cdebd3ae72f8871d";
    const TOY_ZERO_SEED_SK: &str = "0000000000000000000000000000000000000000000000000000000000000000\
                                    ffffffff00000000\
                                    0f000100\
                                    62085049495a53\
                                    deb4";

    fn next_seed<P: ParameterSet>(seed: &KeySeed) -> KeySeed {
        let mut input = ExpandInput::default();
        input[0] = EXPAND_DOMAIN_SEP;
        input[1..].copy_from_slice(seed);
        let mut r = vec![0u8; P::EXPANDED_BYTES];
        let Ok(()) = Shake256Expander.expand(&input, &mut r);
        let mut next = KeySeed::default();
        next.copy_from_slice(&r[P::EXPANDED_BYTES - SEED_BYTES..]);
        next
    }

    fn first_attempt<P: ParameterSet>(
        seed: &KeySeed,
    ) -> Result<(PublicKey<P>, PrivateKey<P>), Rejection> {
        let mut input = ExpandInput::default();
        input[0] = EXPAND_DOMAIN_SEP;
        input[1..].copy_from_slice(seed);
        let mut r = vec![0u8; P::EXPANDED_BYTES];
        let Ok(()) = Shake256Expander.expand(&input, &mut r);
        attempt_keypair::<P>(seed, &r)
    }

    /// Writes all-zero buffers for the first `rejections` calls, then defers to SHAKE256.
    ///
    /// An all-zero candidate lies in GF(2^m), so those attempts are rejected, and the
    /// seed they hand over is all zeros.
    struct ScriptedExpander {
        rejections: usize,
        calls: usize,
    }

    impl SeedExpander for ScriptedExpander {
        type Error = core::convert::Infallible;

        fn expand(&mut self, input: &[u8], output: &mut [u8]) -> Result<(), Self::Error> {
            self.calls += 1;
            if self.calls <= self.rejections {
                output.fill(0);
                Ok(())
            } else {
                Shake256Expander.expand(input, output)
            }
        }
    }

    struct FailingExpander;

    impl SeedExpander for FailingExpander {
        type Error = &'static str;

        fn expand(&mut self, _input: &[u8], _output: &mut [u8]) -> Result<(), Self::Error> {
            Err("out of memory")
        }
    }

    struct FailingRng;

    impl RngCore for FailingRng {
        fn next_u32(&mut self) -> u32 {
            0
        }
        fn next_u64(&mut self) -> u64 {
            0
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }
        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand_core::Error> {
            let code = NonZeroU32::new(rand_core::Error::CUSTOM_START).unwrap();
            Err(rand_core::Error::from(code))
        }
    }

    impl CryptoRng for FailingRng {}

    #[test]
    fn toy_zero_seed_golden_vector() {
        let (pk, sk) = McElieceKem::keygen::<Toy>(&KeySeed::default());
        assert_eq!(hex::encode(pk.as_bytes()), TOY_ZERO_SEED_PK);
        assert_eq!(hex::encode(sk.as_bytes()), TOY_ZERO_SEED_SK);
    }

    #[test]
    fn keygen_is_deterministic() {
        for i in 0..8u8 {
            let seed = KeySeed::from([i; 32]);
            let (pk1, sk1) = McElieceKem::keygen::<Toy>(&seed);
            let (pk2, sk2) = McElieceKem::keygen::<Toy>(&seed);
            assert_eq!(pk1.as_bytes(), pk2.as_bytes());
            assert_eq!(sk1.as_bytes(), sk2.as_bytes());
        }
    }

    #[test]
    fn rejected_attempt_continues_from_next_seed() {
        // find a seed whose first attempt is rejected
        let seed = (1..=255u8)
            .map(|i| KeySeed::from([i; 32]))
            .find(|seed| first_attempt::<Toy>(seed).is_err())
            .expect("a rejected first attempt");

        let (pk, sk) = McElieceKem::keygen::<Toy>(&seed);
        let next = next_seed::<Toy>(&seed);
        let (pk_next, sk_next) = McElieceKem::keygen::<Toy>(&next);

        assert_eq!(pk, pk_next);
        assert_eq!(sk, sk_next);
        assert_ne!(sk.seed(), seed.as_slice());
    }

    #[test]
    fn accepted_attempt_records_its_own_seed() {
        let seed = KeySeed::default();
        let (pk, sk) = first_attempt::<Toy>(&seed).unwrap();
        assert_eq!(sk.seed(), seed.as_slice());
        assert_eq!(hex::encode(pk.as_bytes()), TOY_ZERO_SEED_PK);
    }

    #[test]
    fn scripted_rejections_match_direct_seeding() {
        let mut expander = ScriptedExpander {
            rejections: 3,
            calls: 0,
        };
        let seed = KeySeed::from([0xA5; 32]);
        let Ok((pk, sk)) = McElieceKem::keygen_with::<Toy, _>(&mut expander, &seed);
        assert_eq!(expander.calls, 4);

        let (pk_direct, sk_direct) = McElieceKem::keygen::<Toy>(&KeySeed::default());
        assert_eq!(pk, pk_direct);
        assert_eq!(sk, sk_direct);
    }

    #[test]
    fn expander_failure_propagates() {
        let result =
            McElieceKem::keygen_with::<Toy, _>(&mut FailingExpander, &KeySeed::default());
        assert_eq!(result.unwrap_err(), "out of memory");
    }

    #[test]
    fn derive_keypair_checks_seed_length() {
        for len in [0usize, 31, 33, 64] {
            let seed = vec![0u8; len];
            assert_eq!(
                McElieceKem::derive_keypair::<Toy>(&seed).unwrap_err(),
                Error::InvalidSeedLength {
                    expected: 32,
                    actual: len
                }
            );
        }

        let (pk, sk) = McElieceKem::derive_keypair::<Toy>(&[0u8; 32]).unwrap();
        let (pk_ref, sk_ref) = McElieceKem::keygen::<Toy>(&KeySeed::default());
        assert_eq!(pk, pk_ref);
        assert_eq!(sk, sk_ref);
    }

    #[test]
    fn generate_uses_the_rng() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let (pk, sk) = McElieceKem::generate::<Toy, _>(&mut rng).unwrap();

        let mut seed = KeySeed::default();
        ChaCha8Rng::seed_from_u64(7).fill_bytes(seed.as_mut_slice());
        let (pk_ref, sk_ref) = McElieceKem::keygen::<Toy>(&seed);
        assert_eq!(pk, pk_ref);
        assert_eq!(sk, sk_ref);
    }

    #[test]
    fn generate_reports_rng_failure() {
        assert_eq!(
            McElieceKem::generate::<Toy, _>(&mut FailingRng).unwrap_err(),
            Error::Entropy
        );
    }

    #[test]
    fn keys_round_trip_through_bytes() {
        let (pk, sk) = McElieceKem::keygen::<Toy>(&KeySeed::from([3; 32]));
        assert_eq!(PublicKey::<Toy>::from_bytes(pk.as_bytes()).unwrap(), pk);
        assert_eq!(PrivateKey::<Toy>::from_bytes(&sk.to_bytes()).unwrap(), sk);
        assert_eq!(pk.to_bytes().len(), Toy::PUBLIC_KEY_BYTES);
    }

    #[test]
    fn from_bytes_rejects_wrong_lengths() {
        assert_eq!(
            PublicKey::<Toy>::from_bytes(&[0u8; 9]).unwrap_err(),
            Error::InvalidKeyLength {
                key: "public",
                expected: 8,
                actual: 9
            }
        );
        assert_eq!(
            PrivateKey::<Toy>::from_bytes(&[0u8; 52]).unwrap_err(),
            Error::InvalidKeyLength {
                key: "private",
                expected: 53,
                actual: 52
            }
        );
    }

    #[test]
    fn private_key_accessors() {
        let (_, sk) = McElieceKem::keygen::<Toy>(&KeySeed::default());
        assert_eq!(sk.pivots(), 0xFFFF_FFFF);
        assert_eq!(sk.irreducible(), [15, 1]);
        assert_eq!(hex::encode(sk.control_bits()), "62085049495a53");
        assert_eq!(hex::encode(sk.s()), "deb4");
        assert_eq!(
            sk.permutation(),
            [5, 4, 1, 3, 13, 10, 11, 7, 9, 6, 0, 2, 12, 14, 8, 15]
        );
    }

    #[test]
    fn keys_compare_by_content() {
        let (pk1, sk1) = McElieceKem::keygen::<Toy>(&KeySeed::from([1; 32]));
        let (pk2, sk2) = McElieceKem::keygen::<Toy>(&KeySeed::from([2; 32]));
        assert_ne!(pk1, pk2);
        assert_ne!(sk1, sk2);
        assert_eq!(pk1.clone(), pk1);
        assert!(bool::from(sk1.ct_eq(&sk1.clone())));
    }

    #[test]
    fn debug_does_not_print_secrets() {
        let (pk, sk) = McElieceKem::keygen::<Toy>(&KeySeed::default());
        let printed = std::format!("{sk:?}");
        assert_eq!(printed, "PrivateKey { scheme: \"toy\", .. }");
        assert_eq!(
            std::format!("{pk:?}"),
            "PublicKey { scheme: \"toy\", len: 8 }"
        );
    }
}
