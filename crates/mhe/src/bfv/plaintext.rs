//! Plaintext type in the BFV encryption scheme.

use crate::bfv::{encoding::EncodingEnum, BfvParameters, Encoding};
use crate::{Error, Result};
use mhe_math::rq::{traits::TryConvertFrom, Poly, Representation};
use mhe_traits::{FheDecoder, FheEncoder, FheParametrized, FhePlaintext};
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use std::sync::Arc;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A plaintext object, that encodes a vector according to a specific
/// encoding.
#[derive(Debug, Clone, Eq)]
pub struct Plaintext {
    /// The parameters of the underlying BFV encryption scheme.
    pub(crate) par: Arc<BfvParameters>,
    /// The coefficients of the plaintext polynomial, modulo t.
    pub(crate) value: Box<[u64]>,
    /// The encoding of the plaintext, if known
    pub(crate) encoding: Option<Encoding>,
}

impl FheParametrized for Plaintext {
    type Parameters = BfvParameters;
}

impl FhePlaintext for Plaintext {
    type Encoding = Encoding;
}

// Zeroizing of plaintexts.
impl ZeroizeOnDrop for Plaintext {}

impl Zeroize for Plaintext {
    fn zeroize(&mut self) {
        self.value.zeroize();
    }
}

impl Drop for Plaintext {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl PartialEq for Plaintext {
    fn eq(&self, other: &Self) -> bool {
        let mut eq = self.par == other.par;
        eq &= self.value == other.value;
        if self.encoding.is_some() && other.encoding.is_some() {
            eq &= self.encoding == other.encoding
        }
        eq
    }
}

impl Plaintext {
    /// Returns the scaled plaintext Δ·m as a polynomial in NTT representation.
    pub(crate) fn to_poly(&self) -> Result<Poly> {
        let mut m = Poly::try_convert_from(
            self.value.as_ref(),
            self.par.ctx(),
            Representation::PowerBasis,
        )?;
        m.mul_rns_scalar(&self.par.delta)?;
        m.change_representation(Representation::Ntt);
        Ok(m)
    }

    /// Recover the plaintext from a noisy ciphertext phase x = Δ·m + e by
    /// computing round(t·x / Q) mod t.
    pub(crate) fn from_phase(par: &Arc<BfvParameters>, mut x: Poly) -> Result<Self> {
        x.change_representation(Representation::PowerBasis);
        let q = par.ctx().modulus();
        let t = BigUint::from(par.plaintext());
        let half_q: BigUint = q >> 1usize;

        let value = x
            .to_biguint_vec()?
            .into_iter()
            .map(|xi| {
                ((xi * &t + &half_q) / q % &t)
                    .to_u64()
                    .ok_or_else(|| Error::DefaultError("Invalid plaintext value".to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        x.zeroize();

        Ok(Self {
            par: par.clone(),
            value: value.into_boxed_slice(),
            encoding: None,
        })
    }

    /// Returns the encoding of the plaintext, if known.
    pub fn encoding(&self) -> Option<Encoding> {
        self.encoding
    }
}

impl FheEncoder<&[u64]> for Plaintext {
    type Error = Error;

    fn try_encode(
        value: &[u64],
        encoding: Encoding,
        par: &Arc<BfvParameters>,
    ) -> Result<Self> {
        if value.len() > par.degree() {
            return Err(Error::TooManyValues(value.len(), par.degree()));
        }
        let mut v = vec![0u64; par.degree()];
        v[..value.len()].copy_from_slice(value);
        v.iter_mut().for_each(|vi| *vi = par.plaintext.reduce(*vi));

        match encoding.encoding {
            EncodingEnum::Poly => {}
            EncodingEnum::Simd => {
                let op = par
                    .op
                    .as_ref()
                    .ok_or_else(|| Error::EncodingNotSupported(EncodingEnum::Simd.to_string()))?;
                op.backward(&mut v);
            }
        }

        Ok(Self {
            par: par.clone(),
            value: v.into_boxed_slice(),
            encoding: Some(encoding),
        })
    }
}

impl FheEncoder<&Vec<u64>> for Plaintext {
    type Error = Error;

    fn try_encode(
        value: &Vec<u64>,
        encoding: Encoding,
        par: &Arc<BfvParameters>,
    ) -> Result<Self> {
        Plaintext::try_encode(value.as_slice(), encoding, par)
    }
}

impl FheDecoder<Plaintext> for Vec<u64> {
    type Error = Error;

    fn try_decode<O>(pt: &Plaintext, encoding: O) -> Result<Vec<u64>>
    where
        O: Into<Option<Encoding>>,
    {
        let encoding = match (pt.encoding, encoding.into()) {
            (Some(pt_enc), Some(enc)) if pt_enc != enc => {
                return Err(Error::EncodingMismatch(enc.into(), pt_enc.into()))
            }
            (Some(enc), _) | (None, Some(enc)) => enc,
            (None, None) => {
                return Err(Error::UnspecifiedInput("No encoding specified".to_string()))
            }
        };

        let mut w = pt.value.to_vec();
        match encoding.encoding {
            EncodingEnum::Poly => {}
            EncodingEnum::Simd => {
                let op = pt
                    .par
                    .op
                    .as_ref()
                    .ok_or_else(|| Error::EncodingNotSupported(EncodingEnum::Simd.to_string()))?;
                op.forward(&mut w);
            }
        }
        Ok(w)
    }
}
