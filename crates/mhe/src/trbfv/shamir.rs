//! Shamir secret sharing of ring elements.
//!
//! A secret s in R_Q is the constant term of a polynomial
//! f(X) = s + a_1 X + ... + a_{t-1} X^{t-1} whose other coefficients are
//! uniform in R_Q. Evaluations at non-zero public points are the shares, and
//! any t of them recover s through Lagrange interpolation at 0, applied
//! independently modulo every ciphertext modulus.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::trbfv::ShamirPublicPoint;
use crate::{ConfigurationError, Result};
use mhe_math::rq::{Context, Poly};
use rand::{CryptoRng, RngCore};
use zeroize::Zeroize;

/// A sharing polynomial with coefficients in R_Q, the constant term being the
/// shared secret.
#[derive(Debug, zeroize_derive::Zeroize, zeroize_derive::ZeroizeOnDrop)]
pub struct ShamirPolynomial {
    constant: Poly,
    higher: Vec<Poly>,
}

impl ShamirPolynomial {
    /// Sample a polynomial of degree `threshold - 1` hiding `secret`.
    pub(crate) fn random<R: RngCore + CryptoRng>(
        secret: &Poly,
        threshold: usize,
        rng: &mut R,
    ) -> Self {
        Self {
            constant: secret.clone(),
            higher: (1..threshold)
                .map(|_| Poly::random(secret.ctx(), secret.representation(), rng))
                .collect(),
        }
    }

    /// The degree of the polynomial, i.e. the threshold minus one.
    pub fn degree(&self) -> usize {
        self.higher.len()
    }

    /// Evaluate the polynomial at a public point, using Horner's rule.
    pub fn evaluate(&self, point: ShamirPublicPoint) -> Poly {
        let x = point.value();
        let mut acc = Poly::zero(self.constant.ctx(), self.constant.representation());
        for c in self.higher.iter().rev() {
            acc += c;
            acc.mul_scalar(x);
        }
        acc += &self.constant;
        acc
    }
}

/// The evaluation of one dealer's sharing polynomial at a recipient's point.
#[derive(Debug, Clone, zeroize_derive::Zeroize, zeroize_derive::ZeroizeOnDrop)]
pub struct ShamirShare {
    #[zeroize(skip)]
    pub(crate) dealer: usize,
    #[zeroize(skip)]
    pub(crate) recipient: ShamirPublicPoint,
    pub(crate) value: Poly,
}

impl ShamirShare {
    /// The participant whose polynomial was evaluated.
    pub fn dealer(&self) -> usize {
        self.dealer
    }

    /// The public point the polynomial was evaluated at.
    pub fn recipient(&self) -> ShamirPublicPoint {
        self.recipient
    }
}

/// A participant's long-lived share of the joint secret.
#[derive(Debug, Clone)]
pub enum ThresholdShare {
    /// With t == N the participant's own secret is used directly.
    Unsharded {
        /// The owner of the secret.
        participant: usize,
        /// The secret, in NTT representation.
        secret: Poly,
    },
    /// The sum of the evaluations of the dealers' polynomials at `point`.
    Shamir {
        /// The point of the recipient.
        point: ShamirPublicPoint,
        /// The dealers whose evaluations have been added.
        dealers: BTreeSet<usize>,
        /// The running sum.
        value: Poly,
    },
}

impl ThresholdShare {
    /// The participant holding the share.
    pub fn participant(&self) -> usize {
        match self {
            ThresholdShare::Unsharded { participant, .. } => *participant,
            ThresholdShare::Shamir { point, .. } => point.participant(),
        }
    }
}

impl Zeroize for ThresholdShare {
    fn zeroize(&mut self) {
        match self {
            ThresholdShare::Unsharded { secret, .. } => secret.zeroize(),
            ThresholdShare::Shamir { value, .. } => value.zeroize(),
        }
    }
}

impl Drop for ThresholdShare {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Residues modulo each ciphertext modulus of the Lagrange coefficient at 0
/// of `point` over `points`:
///
/// lambda = prod_{x_j != x} x_j / (x_j - x)
pub(crate) fn lagrange_coefficient(
    point: ShamirPublicPoint,
    points: &[ShamirPublicPoint],
    ctx: &Arc<Context>,
) -> Result<Vec<u64>> {
    ctx.moduli_operators()
        .iter()
        .map(|qi| -> Result<u64> {
            let x = qi.reduce(point.value());
            let (num, den) = points
                .iter()
                .filter(|p| **p != point)
                .fold((1u64, 1u64), |(num, den), p| {
                    let xj = qi.reduce(p.value());
                    (qi.mul(num, xj), qi.mul(den, qi.sub(xj, x)))
                });
            let den_inv = qi.inv(den).ok_or(ConfigurationError::DegeneratePoints)?;
            Ok(qi.mul(num, den_inv))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{lagrange_coefficient, ShamirPolynomial};
    use crate::bfv::BfvParameters;
    use crate::trbfv::ShamirPublicPoint;
    use crate::{ConfigurationError, Error};
    use mhe_math::rq::{Poly, Representation};
    use rand::thread_rng;

    fn points(xs: &[u64]) -> Vec<ShamirPublicPoint> {
        xs.iter()
            .map(|x| ShamirPublicPoint::new(*x).unwrap())
            .collect()
    }

    #[test]
    fn constant_polynomial() {
        let mut rng = thread_rng();
        let par = BfvParameters::default_arc(2, 16);
        let secret = Poly::random(par.ctx(), Representation::Ntt, &mut rng);
        let f = ShamirPolynomial::random(&secret, 1, &mut rng);
        assert_eq!(f.degree(), 0);
        assert_eq!(f.evaluate(ShamirPublicPoint::for_participant(4).unwrap()), secret);
    }

    #[test]
    fn any_threshold_subset_interpolates_the_secret() {
        let mut rng = thread_rng();
        let par = BfvParameters::default_arc(2, 16);
        let secret = Poly::random(par.ctx(), Representation::Ntt, &mut rng);
        let f = ShamirPolynomial::random(&secret, 3, &mut rng);
        assert_eq!(f.degree(), 2);

        for subset in [[1u64, 2, 3], [2, 4, 5], [1, 3, 5]] {
            let quorum = points(&subset);
            let mut acc = Poly::zero(par.ctx(), Representation::Ntt);
            for p in &quorum {
                let mut y = f.evaluate(*p);
                y.mul_rns_scalar(&lagrange_coefficient(*p, &quorum, par.ctx()).unwrap())
                    .unwrap();
                acc += &y;
            }
            assert_eq!(acc, secret);
        }

        // Too few points land somewhere else.
        let quorum = points(&[1, 2]);
        let mut acc = Poly::zero(par.ctx(), Representation::Ntt);
        for p in &quorum {
            let mut y = f.evaluate(*p);
            y.mul_rns_scalar(&lagrange_coefficient(*p, &quorum, par.ctx()).unwrap())
                .unwrap();
            acc += &y;
        }
        assert_ne!(acc, secret);
    }

    #[test]
    fn lagrange_small_values() {
        let par = BfvParameters::default_arc(1, 16);
        let q = par.moduli()[0];
        let quorum = points(&[1, 2]);
        // lambda_1 = 2 / (2 - 1) = 2 and lambda_2 = 1 / (1 - 2) = -1.
        assert_eq!(
            lagrange_coefficient(quorum[0], &quorum, par.ctx()).unwrap(),
            vec![2]
        );
        assert_eq!(
            lagrange_coefficient(quorum[1], &quorum, par.ctx()).unwrap(),
            vec![q - 1]
        );
    }

    #[test]
    fn degenerate_points() {
        let par = BfvParameters::default_arc(1, 16);
        let q = par.moduli()[0];
        // q + 1 and 1 collide modulo q.
        let quorum = points(&[1, q + 1]);
        assert_eq!(
            lagrange_coefficient(quorum[0], &quorum, par.ctx()),
            Err(Error::ConfigurationError(ConfigurationError::DegeneratePoints))
        );
    }
}
