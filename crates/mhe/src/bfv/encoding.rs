//! Encodings of plaintexts.

use mhe_traits::FhePlaintextEncoding;
use std::fmt::Display;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) enum EncodingEnum {
    Poly,
    Simd,
}

impl Display for EncodingEnum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// An encoding for the plaintext.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Encoding {
    pub(crate) encoding: EncodingEnum,
}

impl Encoding {
    /// A Poly encoding encodes a vector as coefficients of a polynomial;
    /// homomorphic operations are therefore polynomial operations.
    pub fn poly() -> Self {
        Self {
            encoding: EncodingEnum::Poly,
        }
    }

    /// A Simd encoding encodes a vector so that homomorphic operations are
    /// component-wise operations on the coefficients of the underlying
    /// vectors. The Simd encoding require that the plaintext modulus is
    /// congruent to 1 modulo the degree of the underlying polynomial.
    pub fn simd() -> Self {
        Self {
            encoding: EncodingEnum::Simd,
        }
    }
}

impl From<Encoding> for String {
    fn from(e: Encoding) -> Self {
        String::from(&e)
    }
}

impl From<&Encoding> for String {
    fn from(e: &Encoding) -> Self {
        format!("{e:?}")
    }
}

impl Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.encoding.fmt(f)
    }
}

impl FhePlaintextEncoding for Encoding {}
