#![warn(missing_docs, unused_imports)]

//! Polynomials in R_q\[x\] = (ZZ_q1 x ... x ZZ_qn)\[x\] where the qi's are
//! prime moduli in zq.

mod context;
mod convert;
mod ops;
pub mod traits;

pub use context::Context;

use crate::{ntt::NttOperator, Error, Result};
use itertools::izip;
use ndarray::{Array2, ArrayView2, ArrayViewMut1};
use rand::{CryptoRng, Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use traits::TryConvertFrom;
use zeroize::Zeroize;

/// Possible representations of the underlying polynomial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Representation {
    /// This is the list of coefficients ci, such that the polynomial is c0 +
    /// c1 * x + ... + c_(degree - 1) * x^(degree - 1)
    #[default]
    PowerBasis,
    /// This is the NTT representation of the PowerBasis representation.
    Ntt,
}

/// Struct that holds a polynomial for a specific context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poly {
    ctx: Arc<Context>,
    representation: Representation,
    coefficients: Array2<u64>,
}

impl Zeroize for Poly {
    fn zeroize(&mut self) {
        self.coefficients.iter_mut().for_each(|c| c.zeroize());
    }
}

impl Poly {
    /// Creates a polynomial holding the constant 0.
    pub fn zero(ctx: &Arc<Context>, representation: Representation) -> Self {
        Self {
            ctx: ctx.clone(),
            representation,
            coefficients: Array2::zeros((ctx.q.len(), ctx.degree)),
        }
    }

    /// Generate a random polynomial.
    pub fn random<R: RngCore + CryptoRng>(
        ctx: &Arc<Context>,
        representation: Representation,
        rng: &mut R,
    ) -> Self {
        let mut p = Poly::zero(ctx, representation);
        izip!(p.coefficients.outer_iter_mut(), ctx.q.iter()).for_each(|(mut row, qi)| {
            row.iter_mut()
                .for_each(|c| *c = rng.gen_range(0..qi.modulus()));
        });
        p
    }

    /// Generate a random polynomial deterministically from a seed.
    pub fn random_from_seed(
        ctx: &Arc<Context>,
        representation: Representation,
        seed: <ChaCha8Rng as SeedableRng>::Seed,
    ) -> Self {
        let mut rng = ChaCha8Rng::from_seed(seed);
        Self::random(ctx, representation, &mut rng)
    }

    /// Generate a small polynomial whose coefficients follow a centered
    /// binomial distribution of the given variance.
    ///
    /// Returns an error if the variance does not belong to [1, ..., 16].
    pub fn small<R: RngCore + CryptoRng>(
        ctx: &Arc<Context>,
        representation: Representation,
        variance: usize,
        rng: &mut R,
    ) -> Result<Self> {
        let coeffs = mhe_util::sample_vec_cbd(ctx.degree, variance, rng)
            .map_err(|e| Error::Default(e.to_string()))?;
        Self::from_small_coefficients(ctx, representation, &coeffs)
    }

    /// Generate a polynomial whose coefficients follow a rounded gaussian of
    /// the given variance.
    pub fn normal<R: RngCore + CryptoRng>(
        ctx: &Arc<Context>,
        representation: Representation,
        variance: f64,
        rng: &mut R,
    ) -> Result<Self> {
        let coeffs = mhe_util::sample_vec_normal(ctx.degree, variance, rng)
            .map_err(|e| Error::Default(e.to_string()))?;
        Self::from_small_coefficients(ctx, representation, &coeffs)
    }

    /// Create a polynomial from signed coefficients given in power basis, and
    /// convert it to the requested representation.
    pub fn from_small_coefficients(
        ctx: &Arc<Context>,
        representation: Representation,
        coeffs: &[i64],
    ) -> Result<Self> {
        let mut p = Poly::try_convert_from(coeffs, ctx, Representation::PowerBasis)?;
        p.change_representation(representation);
        Ok(p)
    }

    /// Access the polynomial coefficients in RNS representation.
    pub fn coefficients(&self) -> ArrayView2<u64> {
        self.coefficients.view()
    }

    /// Returns the context of the polynomial.
    pub fn ctx(&self) -> &Arc<Context> {
        &self.ctx
    }

    /// Returns the current representation of the polynomial.
    pub const fn representation(&self) -> Representation {
        self.representation
    }

    /// Change the representation of the underlying polynomial.
    pub fn change_representation(&mut self, to: Representation) {
        match (self.representation, to) {
            (Representation::PowerBasis, Representation::Ntt) => {
                izip!(self.coefficients.outer_iter_mut(), self.ctx.ops.iter())
                    .for_each(|(row, op)| apply_ntt(row, op, NttOperator::forward));
            }
            (Representation::Ntt, Representation::PowerBasis) => {
                izip!(self.coefficients.outer_iter_mut(), self.ctx.ops.iter())
                    .for_each(|(row, op)| apply_ntt(row, op, NttOperator::backward));
            }
            _ => {}
        }
        self.representation = to;
    }

    /// Multiply the polynomial by a scalar, reduced modulo each prime.
    pub fn mul_scalar(&mut self, scalar: u64) {
        izip!(self.coefficients.outer_iter_mut(), self.ctx.q.iter()).for_each(|(mut row, qi)| {
            let s = qi.reduce(scalar);
            row.iter_mut().for_each(|c| *c = qi.mul(*c, s));
        });
    }

    /// Multiply the polynomial by a scalar given by its residues modulo each
    /// prime of the context.
    pub fn mul_rns_scalar(&mut self, residues: &[u64]) -> Result<()> {
        if residues.len() != self.ctx.q.len() {
            return Err(Error::Default(format!(
                "Expected {} residues, got {}",
                self.ctx.q.len(),
                residues.len()
            )));
        }
        izip!(self.coefficients.outer_iter_mut(), self.ctx.q.iter(), residues).for_each(
            |(mut row, qi, s)| {
                let s = qi.reduce(*s);
                row.iter_mut().for_each(|c| *c = qi.mul(*c, s));
            },
        );
        Ok(())
    }

    /// Returns whether every coefficient is zero.
    pub fn is_zero(&self) -> bool {
        self.coefficients.iter().all(|c| *c == 0)
    }
}

/// Run an in-place transform over a row of coefficients.
fn apply_ntt(
    mut row: ArrayViewMut1<u64>,
    op: &NttOperator,
    transform: fn(&NttOperator, &mut [u64]),
) {
    if let Some(slice) = row.as_slice_mut() {
        transform(op, slice);
    } else {
        let mut v = row.to_vec();
        transform(op, &mut v);
        row.iter_mut().zip(v).for_each(|(c, vi)| *c = vi);
    }
}
