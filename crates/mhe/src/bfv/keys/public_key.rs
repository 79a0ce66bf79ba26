//! Public keys for the BFV encryption scheme

use crate::bfv::{BfvParameters, Ciphertext, Plaintext};
use crate::{Error, Result};
use mhe_math::rq::{Poly, Representation};
use mhe_traits::{FheEncrypter, FheParametrized, Serialize};
use mhe_util::sample_vec_ternary;
use rand::{CryptoRng, RngCore};
use std::sync::Arc;
use zeroize::Zeroizing;

/// Public key for the BFV encryption scheme.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PublicKey {
    /// The BFV parameters
    pub(crate) par: Arc<BfvParameters>,
    /// The public key ciphertext (p0, p1)
    pub(crate) c: Ciphertext,
}

impl PublicKey {
    /// Create a public key from its two polynomials.
    pub(crate) fn from_polys(p0: Poly, p1: Poly, par: &Arc<BfvParameters>) -> Result<Self> {
        Ok(Self {
            par: par.clone(),
            c: Ciphertext::new(vec![p0, p1], par)?,
        })
    }
}

impl FheParametrized for PublicKey {
    type Parameters = BfvParameters;
}

impl FheEncrypter<Plaintext, Ciphertext> for PublicKey {
    type Error = Error;

    fn try_encrypt<R: RngCore + CryptoRng>(
        &self,
        pt: &Plaintext,
        rng: &mut R,
    ) -> Result<Ciphertext> {
        if self.par != pt.par {
            return Err(Error::DefaultError(
                "Incompatible BFV parameters".to_string(),
            ));
        }
        let ctx = self.par.ctx();

        let u = Zeroizing::new(Poly::from_small_coefficients(
            ctx,
            Representation::Ntt,
            &sample_vec_ternary(self.par.degree(), rng),
        )?);
        let e1 = Zeroizing::new(Poly::small(
            ctx,
            Representation::Ntt,
            self.par.variance,
            rng,
        )?);
        let e2 = Zeroizing::new(Poly::small(
            ctx,
            Representation::Ntt,
            self.par.variance,
            rng,
        )?);

        let m = Zeroizing::new(pt.to_poly()?);
        let mut c0 = &*u * &self.c.c[0];
        c0 += &*e1;
        c0 += &*m;
        let mut c1 = &*u * &self.c.c[1];
        c1 += &*e2;

        Ciphertext::new(vec![c0, c1], &self.par)
    }
}

impl Serialize for PublicKey {
    fn to_bytes(&self) -> Vec<u8> {
        self.c.to_bytes()
    }
}
