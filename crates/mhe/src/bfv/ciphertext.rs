//! Ciphertext type in the BFV encryption scheme.

use crate::bfv::parameters::BfvParameters;
use crate::{Error, Result};
use mhe_math::rq::{Poly, Representation};
use mhe_traits::{FheCiphertext, FheParametrized, Serialize};
use std::ops::{Add, AddAssign};
use std::sync::Arc;

/// A ciphertext encrypting a plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ciphertext {
    /// The parameters of the underlying BFV encryption scheme.
    pub(crate) par: Arc<BfvParameters>,

    /// The ciphertext elements.
    pub(crate) c: Vec<Poly>,
}

impl Ciphertext {
    /// Create a ciphertext from a vector of polynomials.
    /// A ciphertext must contain at least two polynomials, and all polynomials
    /// must be in Ntt representation and with the context of the parameters.
    pub fn new(c: Vec<Poly>, par: &Arc<BfvParameters>) -> Result<Self> {
        if c.len() < 2 {
            return Err(Error::TooFewValues(c.len(), 2));
        }
        check_components(&c, par)?;

        Ok(Self {
            par: par.clone(),
            c,
        })
    }

    /// Get the i-th polynomial of the ciphertext.
    pub fn get(&self, i: usize) -> Option<&Poly> {
        self.c.get(i)
    }

    /// Returns the number of polynomials in the ciphertext.
    pub fn len(&self) -> usize {
        self.c.len()
    }

    /// Returns whether the ciphertext holds no polynomial. Never true for a
    /// ciphertext built with [`Ciphertext::new`].
    pub fn is_empty(&self) -> bool {
        self.c.is_empty()
    }
}

/// Check that the polynomials are in Ntt representation under the context of
/// the parameters.
pub(crate) fn check_components(c: &[Poly], par: &Arc<BfvParameters>) -> Result<()> {
    for ci in c {
        if ci.representation() != Representation::Ntt {
            return Err(Error::MathError(
                mhe_math::Error::IncorrectRepresentation(
                    ci.representation(),
                    Representation::Ntt,
                ),
            ));
        }
        if ci.ctx() != par.ctx() {
            return Err(Error::MathError(mhe_math::Error::InvalidContext));
        }
    }
    Ok(())
}

impl AddAssign<&Ciphertext> for Ciphertext {
    fn add_assign(&mut self, rhs: &Ciphertext) {
        assert_eq!(self.par, rhs.par);
        assert_eq!(self.c.len(), rhs.c.len());
        self.c
            .iter_mut()
            .zip(rhs.c.iter())
            .for_each(|(c1i, c2i)| *c1i += c2i);
    }
}

impl Add<&Ciphertext> for &Ciphertext {
    type Output = Ciphertext;

    fn add(self, rhs: &Ciphertext) -> Ciphertext {
        let mut self_clone = self.clone();
        self_clone += rhs;
        self_clone
    }
}

impl FheCiphertext for Ciphertext {}

impl FheParametrized for Ciphertext {
    type Parameters = BfvParameters;
}

impl Serialize for Ciphertext {
    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = (self.c.len() as u32).to_le_bytes().to_vec();
        self.c
            .iter()
            .for_each(|ci| bytes.extend_from_slice(&ci.to_bytes()));
        bytes
    }
}
