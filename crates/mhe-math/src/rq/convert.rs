//! Implementation of conversions from and to polynomials.

use super::{traits::TryConvertFrom, Context, Poly, Representation};
use crate::{Error, Result};
use mhe_traits::Serialize;
use ndarray::{Array2, Axis};
use num_bigint::BigUint;
use std::sync::Arc;

impl Poly {
    fn check_length(len: usize, ctx: &Context, representation: Representation) -> Result<()> {
        let valid = match representation {
            Representation::PowerBasis => len <= ctx.degree,
            Representation::Ntt => len == ctx.degree,
        };
        if valid {
            Ok(())
        } else {
            Err(Error::Default(format!(
                "Invalid number of coefficients: {len} for degree {}",
                ctx.degree
            )))
        }
    }
}

impl TryConvertFrom<&[i64]> for Poly {
    fn try_convert_from(
        v: &[i64],
        ctx: &Arc<Context>,
        representation: Representation,
    ) -> Result<Self> {
        Self::check_length(v.len(), ctx, representation)?;
        let mut p = Poly::zero(ctx, representation);
        for (mut row, qi) in p.coefficients.outer_iter_mut().zip(ctx.q.iter()) {
            row.iter_mut()
                .zip(v)
                .for_each(|(c, vi)| *c = qi.reduce_i64(*vi));
        }
        Ok(p)
    }
}

impl TryConvertFrom<&[u64]> for Poly {
    fn try_convert_from(
        v: &[u64],
        ctx: &Arc<Context>,
        representation: Representation,
    ) -> Result<Self> {
        Self::check_length(v.len(), ctx, representation)?;
        let mut p = Poly::zero(ctx, representation);
        for (mut row, qi) in p.coefficients.outer_iter_mut().zip(ctx.q.iter()) {
            row.iter_mut()
                .zip(v)
                .for_each(|(c, vi)| *c = qi.reduce(*vi));
        }
        Ok(p)
    }
}

impl TryConvertFrom<&[BigUint]> for Poly {
    fn try_convert_from(
        v: &[BigUint],
        ctx: &Arc<Context>,
        representation: Representation,
    ) -> Result<Self> {
        Self::check_length(v.len(), ctx, representation)?;
        let mut p = Poly::zero(ctx, representation);
        for (mut column, vi) in p.coefficients.axis_iter_mut(Axis(1)).zip(v) {
            column
                .iter_mut()
                .zip(ctx.rns.project(vi))
                .for_each(|(c, r)| *c = r);
        }
        Ok(p)
    }
}

impl TryConvertFrom<Array2<u64>> for Poly {
    fn try_convert_from(
        a: Array2<u64>,
        ctx: &Arc<Context>,
        representation: Representation,
    ) -> Result<Self> {
        if a.shape() != [ctx.moduli.len(), ctx.degree] {
            return Err(Error::Default(
                "The array of coefficients does not have the correct shape".to_string(),
            ));
        }
        for (row, qi) in a.outer_iter().zip(ctx.q.iter()) {
            if row.iter().any(|c| *c >= qi.modulus()) {
                return Err(Error::Default(
                    "Coefficients must be reduced modulo their prime".to_string(),
                ));
            }
        }
        Ok(Self {
            ctx: ctx.clone(),
            representation,
            coefficients: a.as_standard_layout().into_owned(),
        })
    }
}

impl TryConvertFrom<Vec<u64>> for Poly {
    fn try_convert_from(
        v: Vec<u64>,
        ctx: &Arc<Context>,
        representation: Representation,
    ) -> Result<Self> {
        Poly::try_convert_from(v.as_slice(), ctx, representation)
    }
}

impl TryConvertFrom<&Vec<i64>> for Poly {
    fn try_convert_from(
        v: &Vec<i64>,
        ctx: &Arc<Context>,
        representation: Representation,
    ) -> Result<Self> {
        Poly::try_convert_from(v.as_slice(), ctx, representation)
    }
}

impl Poly {
    /// Returns the coefficients as big integers in [0, Q).
    ///
    /// Returns an error if the polynomial is not in power-basis
    /// representation.
    pub fn to_biguint_vec(&self) -> Result<Vec<BigUint>> {
        if self.representation != Representation::PowerBasis {
            return Err(Error::IncorrectRepresentation(
                self.representation,
                Representation::PowerBasis,
            ));
        }
        Ok(self
            .coefficients
            .axis_iter(Axis(1))
            .map(|column| self.ctx.rns.lift(&column.to_vec()))
            .collect())
    }
}

impl Serialize for Poly {
    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(9 + 8 * self.coefficients.len());
        bytes.push(match self.representation {
            Representation::PowerBasis => 0,
            Representation::Ntt => 1,
        });
        bytes.extend_from_slice(&(self.ctx.degree as u64).to_le_bytes());
        self.coefficients
            .iter()
            .for_each(|c| bytes.extend_from_slice(&c.to_le_bytes()));
        bytes
    }
}
