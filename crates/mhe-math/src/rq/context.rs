use itertools::Itertools;
use num_bigint::BigUint;
use std::{fmt::Debug, sync::Arc};

use crate::{ntt::NttOperator, rns::RnsContext, zq::Modulus, Error, Result};

/// Struct that holds the context associated with elements in rq.
#[derive(Clone, PartialEq, Eq)]
pub struct Context {
    pub(crate) moduli: Box<[u64]>,
    pub(crate) q: Box<[Modulus]>,
    pub(crate) rns: RnsContext,
    pub(crate) ops: Box<[NttOperator]>,
    pub(crate) degree: usize,
}

impl Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("moduli", &self.moduli)
            .field("degree", &self.degree)
            .finish()
    }
}

impl Context {
    /// Creates a context from a list of moduli and a polynomial degree.
    ///
    /// Returns an error if the moduli are not primes less than 62 bits which
    /// supports the NTT of size `degree`.
    pub fn new(moduli: &[u64], degree: usize) -> Result<Self> {
        if !degree.is_power_of_two() || degree < 8 {
            return Err(Error::Default(
                "The degree is not a power of two larger or equal to 8".to_string(),
            ));
        }

        let rns = RnsContext::new(moduli)?;
        let (q, ops): (Vec<_>, Vec<_>) = moduli
            .iter()
            .map(|modulus| {
                let qi = Modulus::new(*modulus)?;
                let op = NttOperator::new(&qi, degree).ok_or_else(|| {
                    Error::Default(format!(
                        "Impossible to construct a Ntt operator for {modulus}"
                    ))
                })?;
                Ok((qi, op))
            })
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .unzip();

        Ok(Self {
            moduli: moduli.iter().copied().collect_vec().into_boxed_slice(),
            q: q.into_boxed_slice(),
            rns,
            ops: ops.into_boxed_slice(),
            degree,
        })
    }

    /// Creates a context in an `Arc`.
    pub fn new_arc(moduli: &[u64], degree: usize) -> Result<Arc<Self>> {
        Self::new(moduli, degree).map(Arc::new)
    }

    /// Returns the modulus as a BigUint.
    pub fn modulus(&self) -> &BigUint {
        self.rns.modulus()
    }

    /// Returns a reference to the moduli in this context.
    pub fn moduli(&self) -> &[u64] {
        &self.moduli
    }

    /// Returns a reference to the moduli as Modulus in this context.
    pub fn moduli_operators(&self) -> &[Modulus] {
        &self.q
    }

    /// Returns the RNS context.
    pub fn rns(&self) -> &RnsContext {
        &self.rns
    }

    /// Returns the polynomial degree.
    pub const fn degree(&self) -> usize {
        self.degree
    }
}

#[cfg(test)]
mod tests {
    use super::Context;
    use num_bigint::BigUint;
    use std::error::Error;

    const MODULI: &[u64; 3] = &[4611686018326724609, 4611686018309947393, 65537];

    #[test]
    fn context_constructor() -> Result<(), Box<dyn Error>> {
        for modulus in MODULI {
            assert!(Context::new(&[*modulus], 8).is_ok());
        }
        let ctx = Context::new(MODULI, 8)?;
        assert_eq!(ctx.moduli(), MODULI);
        assert_eq!(ctx.degree(), 8);
        assert_eq!(ctx.moduli_operators().len(), 3);
        assert_eq!(
            ctx.modulus(),
            &(BigUint::from(MODULI[0]) * MODULI[1] * MODULI[2])
        );

        assert!(Context::new(MODULI, 7).is_err());
        assert!(Context::new(MODULI, 4).is_err());
        assert!(Context::new(&[1153], 1024).is_err());
        assert!(Context::new(&[], 8).is_err());
        Ok(())
    }
}
