//! Seed expansion.
//!
//! Each key generation round feeds `64 || seed` (33 bytes) to SHAKE256 and squeezes the
//! whole working buffer in one go. The expander is a seam: the driver only needs a
//! deterministic byte stream for a given input, and a failure to produce one aborts
//! key generation instead of triggering a resample.
//!
//! Ref: Classic McEliece round-4 reference implementation, `operations.c`
//! (crypto_kem_keypair, `shake(r, sizeof(r), seed, 33)`).

use core::convert::Infallible;

use sha3::Shake256;
use sha3::digest::{ExtendableOutput, Update, XofReader};

/// Extendable-output hash used to expand the key generation seed.
pub trait SeedExpander {
    /// Error reported when no output can be produced.
    type Error;

    /// Fills `output` with the deterministic stream derived from `input`.
    ///
    /// The same input must always produce the same output.
    fn expand(&mut self, input: &[u8], output: &mut [u8]) -> Result<(), Self::Error>;
}

/// SHAKE256 seed expander.
#[derive(Default, Clone, Copy, Debug)]
pub struct Shake256Expander;

impl SeedExpander for Shake256Expander {
    type Error = Infallible;

    fn expand(&mut self, input: &[u8], output: &mut [u8]) -> Result<(), Self::Error> {
        Xof::init(input).squeeze(output);
        Ok(())
    }
}

pub(crate) struct Xof {
    reader: sha3::Shake256Reader,
}

impl Xof {
    pub(crate) fn init(input: &[u8]) -> Self {
        let mut hasher = Shake256::default();
        hasher.update(input);
        Self {
            reader: hasher.finalize_xof(),
        }
    }

    pub(crate) fn squeeze(&mut self, out: &mut [u8]) {
        self.reader.read(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shake256_empty_input_matches_known_answer() {
        // SHAKE256("") from FIPS 202 examples
        let mut out = [0u8; 32];
        Shake256Expander.expand(&[], &mut out).unwrap();
        assert_eq!(
            hex::encode(out),
            "46b9dd2b0ba88d13233b3feb743eeb243fcd52ea62b81b82b50c27646ed5762f"
        );
    }

    #[test]
    fn expansion_is_a_prefix_stream() {
        let input = [0x40u8; 33];
        let mut short = [0u8; 64];
        let mut long = [0u8; 200];
        Shake256Expander.expand(&input, &mut short).unwrap();
        Shake256Expander.expand(&input, &mut long).unwrap();
        assert_eq!(short[..], long[..64]);
    }

    #[test]
    fn squeeze_in_pieces_matches_single_squeeze() {
        let input = b"mceliece";
        let mut whole = [0u8; 100];
        Xof::init(input).squeeze(&mut whole);

        let mut xof = Xof::init(input);
        let mut first = [0u8; 37];
        let mut second = [0u8; 63];
        xof.squeeze(&mut first);
        xof.squeeze(&mut second);
        assert_eq!(whole[..37], first);
        assert_eq!(whole[37..], second);
    }
}
