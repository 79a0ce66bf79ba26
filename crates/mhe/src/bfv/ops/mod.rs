//! Homomorphic operations.

use crate::bfv::{
    ciphertext::check_components, traits::CiphertextComponents, BfvParameters, Ciphertext,
};
use crate::{Error, Result};
use itertools::izip;
use mhe_math::rq::Poly;
use std::sync::Arc;

impl CiphertextComponents for Ciphertext {
    fn parameters(&self) -> &Arc<BfvParameters> {
        &self.par
    }

    fn components(&self) -> &[Poly] {
        &self.c
    }

    fn components_mut(&mut self) -> &mut [Poly] {
        &mut self.c
    }
}

/// Evaluates homomorphic operations on ciphertexts of a fixed set of
/// parameters.
#[derive(Debug, Clone)]
pub struct Computer {
    par: Arc<BfvParameters>,
}

impl Computer {
    /// Create a computer for the given parameters.
    pub fn new(par: &Arc<BfvParameters>) -> Self {
        Self { par: par.clone() }
    }

    /// Add `a` and `b` component-wise into `destination`.
    ///
    /// The three operands must share the parameters of the computer and have
    /// the same number of components.
    pub fn add<C: CiphertextComponents>(&self, a: &C, b: &C, destination: &mut C) -> Result<()> {
        for operand in [a.parameters(), b.parameters(), destination.parameters()] {
            if operand != &self.par {
                return Err(Error::DefaultError(
                    "Incompatible BFV parameters".to_string(),
                ));
            }
        }
        let len = a.components().len();
        for other in [b.components().len(), destination.components().len()] {
            if other != len {
                return Err(Error::DefaultError(format!(
                    "Mismatched number of components: {other} instead of {len}"
                )));
            }
        }
        check_components(a.components(), &self.par)?;
        check_components(b.components(), &self.par)?;

        izip!(
            destination.components_mut(),
            a.components(),
            b.components()
        )
        .for_each(|(d, ai, bi)| *d = ai + bi);
        Ok(())
    }
}
