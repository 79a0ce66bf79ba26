use std::sync::Arc;

use crate::bfv::BfvParameters;
use mhe_math::rq::{Poly, Representation};
use mhe_traits::Serialize;
use rand::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A public random seed from which common random polynomials are expanded.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct CommonReferenceString {
    seed: <ChaCha8Rng as SeedableRng>::Seed,
}

impl CommonReferenceString {
    /// Sample a fresh seed from a cryptographically secure generator.
    pub fn new<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut seed = <ChaCha8Rng as SeedableRng>::Seed::default();
        rng.fill_bytes(&mut seed);
        Self { seed }
    }

    /// Use a seed agreed upon out of band.
    pub fn from_seed(seed: <ChaCha8Rng as SeedableRng>::Seed) -> Self {
        Self { seed }
    }

    /// The raw seed.
    pub fn seed(&self) -> <ChaCha8Rng as SeedableRng>::Seed {
        self.seed
    }

    /// Expand the seed into a common random polynomial. The same seed always
    /// yields the same polynomial.
    pub fn sample_crp(&self, par: &Arc<BfvParameters>) -> CommonRandomPoly {
        CommonRandomPoly::new_deterministic(par, self.seed)
    }
}

/// A polynomial sampled uniformly from R_Q, shared by every participant of a
/// key generation round.
///
/// On its own a CRP is not bound to anything; a [`KeyGenRound`](super::KeyGenRound)
/// binds it to one round.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct CommonRandomPoly {
    pub(crate) poly: Poly,
}

impl CommonRandomPoly {
    /// Generate a new random CRP.
    pub fn new<R: RngCore + CryptoRng>(par: &Arc<BfvParameters>, rng: &mut R) -> Self {
        Self {
            poly: Poly::random(par.ctx(), Representation::Ntt, rng),
        }
    }

    /// Generate a new CRP from a shared deterministic seed.
    pub fn new_deterministic(
        par: &Arc<BfvParameters>,
        seed: <ChaCha8Rng as SeedableRng>::Seed,
    ) -> Self {
        Self {
            poly: Poly::random_from_seed(par.ctx(), Representation::Ntt, seed),
        }
    }
}

impl Serialize for CommonRandomPoly {
    fn to_bytes(&self) -> Vec<u8> {
        self.poly.to_bytes()
    }
}
