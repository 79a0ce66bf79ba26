//! Secret keys for the BFV encryption scheme

use crate::bfv::{BfvParameters, Ciphertext, Plaintext};
use crate::{Error, Result};
use mhe_math::rq::{Poly, Representation};
use mhe_traits::{FheDecrypter, FheParametrized};
use mhe_util::sample_vec_ternary;
use rand::{CryptoRng, RngCore};
use std::sync::Arc;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Secret key for the BFV encryption scheme.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SecretKey {
    /// The BFV parameters
    pub(crate) par: Arc<BfvParameters>,
    /// The secret key coefficients, in {-1, 0, 1}
    pub(crate) coeffs: Box<[i64]>,
}

impl Zeroize for SecretKey {
    fn zeroize(&mut self) {
        self.coeffs.zeroize();
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for SecretKey {}

impl SecretKey {
    /// Generate a random [`SecretKey`] with ternary coefficients.
    pub fn random<R: RngCore + CryptoRng>(par: &Arc<BfvParameters>, rng: &mut R) -> Self {
        let s_coefficients = sample_vec_ternary(par.degree(), rng);
        Self::new(s_coefficients, par)
    }

    /// Generate a [`SecretKey`] from its coefficients.
    pub fn new(coeffs: Vec<i64>, par: &Arc<BfvParameters>) -> Self {
        Self {
            par: par.clone(),
            coeffs: coeffs.into_boxed_slice(),
        }
    }

    /// Returns the secret as a polynomial in NTT representation.
    pub(crate) fn to_poly(&self) -> Result<Zeroizing<Poly>> {
        Ok(Zeroizing::new(Poly::from_small_coefficients(
            self.par.ctx(),
            Representation::Ntt,
            &self.coeffs,
        )?))
    }
}

impl FheParametrized for SecretKey {
    type Parameters = BfvParameters;
}

impl FheDecrypter<Plaintext, Ciphertext> for SecretKey {
    type Error = Error;

    fn try_decrypt(&self, ct: &Ciphertext) -> Result<Plaintext> {
        if self.par != ct.par {
            return Err(Error::DefaultError(
                "Incompatible BFV parameters".to_string(),
            ));
        }

        let s = self.to_poly()?;
        let mut si = s.clone();

        // c0 + c1 * s + c2 * s^2 + ...
        let mut c = Zeroizing::new(ct.c[0].clone());
        for ci in ct.c[1..].iter() {
            let cis = Zeroizing::new(ci * &*si);
            *c += &*cis;
            *si *= &*s;
        }

        Plaintext::from_phase(&self.par, (*c).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::SecretKey;
    use crate::bfv::BfvParameters;
    use rand::thread_rng;
    use zeroize::Zeroize;

    #[test]
    fn keygen() {
        let mut rng = thread_rng();
        let params = BfvParameters::default_arc(1, 16);
        let sk = SecretKey::random(&params, &mut rng);
        assert_eq!(sk.par, params);
        assert_eq!(sk.coeffs.len(), 16);
        sk.coeffs.iter().for_each(|ci| assert!((-1..=1).contains(ci)));
    }

    #[test]
    fn zeroize() {
        let params = BfvParameters::default_arc(1, 16);
        let mut sk = SecretKey::new(vec![1; 16], &params);
        sk.zeroize();
        assert!(sk.coeffs.iter().all(|ci| *ci == 0));
    }
}
