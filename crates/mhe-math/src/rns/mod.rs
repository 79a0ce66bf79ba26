//! Residue-Number System operations.

use crate::{zq::Modulus, Error, Result};
use itertools::izip;
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

/// Context for a Residue Number System.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct RnsContext {
    moduli_u64: Box<[u64]>,
    moduli: Box<[Modulus]>,
    q_tilde: Box<[u64]>,
    q_star: Box<[BigUint]>,
    product: BigUint,
}

impl RnsContext {
    /// Create a RNS context from a list of moduli.
    ///
    /// Returns an error if the list is empty, or if the moduli are not
    /// coprime.
    pub fn new(moduli_u64: &[u64]) -> Result<Self> {
        if moduli_u64.is_empty() {
            return Err(Error::Default("The list of moduli is empty".to_string()));
        }

        let moduli = moduli_u64
            .iter()
            .map(|qi| Modulus::new(*qi))
            .collect::<Result<Vec<_>>>()?;
        let product = moduli_u64
            .iter()
            .fold(BigUint::from(1u64), |acc, qi| acc * *qi);

        let mut q_tilde = Vec::with_capacity(moduli.len());
        let mut q_star = Vec::with_capacity(moduli.len());
        for qi in &moduli {
            // q* = product / qi, and q~ = (q*)^(-1) mod qi.
            let q_star_i = &product / qi.modulus();
            let q_star_mod_qi = (&q_star_i % qi.modulus()).to_u64().ok_or_else(|| {
                Error::Default("Residue does not fit in a u64".to_string())
            })?;
            let q_tilde_i = qi
                .inv(q_star_mod_qi)
                .ok_or_else(|| Error::Default("The moduli are not coprime".to_string()))?;
            q_tilde.push(q_tilde_i);
            q_star.push(q_star_i);
        }

        Ok(Self {
            moduli_u64: moduli_u64.to_owned().into_boxed_slice(),
            moduli: moduli.into_boxed_slice(),
            q_tilde: q_tilde.into_boxed_slice(),
            q_star: q_star.into_boxed_slice(),
            product,
        })
    }

    /// Returns the product of the moduli used when creating the RNS context.
    pub const fn modulus(&self) -> &BigUint {
        &self.product
    }

    /// Returns the moduli of the RNS context.
    pub fn moduli(&self) -> &[u64] {
        &self.moduli_u64
    }

    /// Project a BigUint into its rests.
    pub fn project(&self, a: &BigUint) -> Vec<u64> {
        self.moduli_u64
            .iter()
            .map(|qi| (a % *qi).to_u64().unwrap_or_default())
            .collect()
    }

    /// Lift rests into a BigUint modulo the product of the moduli.
    ///
    /// Aborts if the number of rests is different than the number of moduli in
    /// debug mode.
    pub fn lift(&self, rests: &[u64]) -> BigUint {
        debug_assert_eq!(rests.len(), self.moduli.len());

        let mut result = BigUint::zero();
        izip!(rests, self.moduli.iter(), self.q_tilde.iter(), self.q_star.iter()).for_each(
            |(xi, qi, qi_tilde, qi_star)| {
                result += qi_star * qi.mul(qi.reduce(*xi), *qi_tilde);
            },
        );
        result % &self.product
    }
}

#[cfg(test)]
mod tests {
    use super::RnsContext;
    use num_bigint::BigUint;
    use rand::{thread_rng, RngCore};

    #[test]
    fn constructor() {
        assert!(RnsContext::new(&[2]).is_ok());
        assert!(RnsContext::new(&[2, 3]).is_ok());
        assert!(RnsContext::new(&[4, 15, 1153]).is_ok());

        assert!(RnsContext::new(&[]).is_err());
        assert!(RnsContext::new(&[1]).is_err());
        assert!(RnsContext::new(&[2, 4]).is_err());
        assert!(RnsContext::new(&[2, 3, 5, 30]).is_err());
    }

    #[test]
    fn modulus() {
        let rns = RnsContext::new(&[2, 3, 5]).unwrap();
        assert_eq!(rns.modulus(), &BigUint::from(30u64));
        assert_eq!(rns.moduli(), &[2, 3, 5]);
    }

    #[test]
    fn project_lift() {
        let ntests = 100;
        let rns = RnsContext::new(&[4, 4611686018326724609, 1153]).unwrap();
        let product = 4u128 * 4611686018326724609 * 1153;

        let mut rng = thread_rng();
        for _ in 0..ntests {
            let a = ((rng.next_u64() as u128) << 64 | rng.next_u64() as u128) % product;
            let a = BigUint::from(a);
            let rests = rns.project(&a);
            assert_eq!(rests.len(), 3);
            assert_eq!(rns.lift(&rests), a);
        }

        assert_eq!(rns.lift(&[0, 0, 0]), BigUint::from(0u64));
        assert_eq!(rns.project(&BigUint::from(product)), vec![0, 0, 0]);
    }
}
