//! Ring operations for moduli up to 62 bits.

use crate::{Error, Result};
use rand::{CryptoRng, Rng, RngCore};

/// Structure encapsulating an integer modulus up to 62 bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modulus {
    p: u64,
    nbits: usize,
}

impl Modulus {
    /// Create a modulus from an integer of at most 62 bits.
    pub fn new(p: u64) -> Result<Self> {
        if p < 2 || (p >> 62) != 0 {
            Err(Error::InvalidModulus(p))
        } else {
            Ok(Self {
                p,
                nbits: 64 - p.leading_zeros() as usize,
            })
        }
    }

    /// Returns the value of the modulus.
    pub const fn modulus(&self) -> u64 {
        self.p
    }

    /// Returns the number of bits of the modulus.
    pub const fn nbits(&self) -> usize {
        self.nbits
    }

    /// Modular addition of a and b. Both must be reduced.
    pub const fn add(&self, a: u64, b: u64) -> u64 {
        debug_assert!(a < self.p && b < self.p);
        let c = a + b;
        if c >= self.p {
            c - self.p
        } else {
            c
        }
    }

    /// Modular subtraction of a and b. Both must be reduced.
    pub const fn sub(&self, a: u64, b: u64) -> u64 {
        debug_assert!(a < self.p && b < self.p);
        if a >= b {
            a - b
        } else {
            a + self.p - b
        }
    }

    /// Modular multiplication of a and b.
    pub const fn mul(&self, a: u64, b: u64) -> u64 {
        ((a as u128 * b as u128) % (self.p as u128)) as u64
    }

    /// Modular negation of a, which must be reduced.
    pub const fn neg(&self, a: u64) -> u64 {
        debug_assert!(a < self.p);
        if a == 0 {
            0
        } else {
            self.p - a
        }
    }

    /// Reduce a u64 modulo p.
    pub const fn reduce(&self, a: u64) -> u64 {
        a % self.p
    }

    /// Reduce a u128 modulo p.
    pub const fn reduce_u128(&self, a: u128) -> u64 {
        (a % (self.p as u128)) as u64
    }

    /// Reduce a signed integer modulo p.
    pub const fn reduce_i64(&self, a: i64) -> u64 {
        let r = (a as i128).rem_euclid(self.p as i128);
        r as u64
    }

    /// Returns the representative of a in (-p/2, p/2].
    pub const fn center(&self, a: u64) -> i64 {
        debug_assert!(a < self.p);
        if a > self.p >> 1 {
            a as i64 - self.p as i64
        } else {
            a as i64
        }
    }

    /// Modular exponentiation.
    pub const fn pow(&self, a: u64, n: u64) -> u64 {
        let mut result = 1 % self.p;
        let mut base = a % self.p;
        let mut exp = n;
        while exp > 0 {
            if exp & 1 == 1 {
                result = self.mul(result, base);
            }
            base = self.mul(base, base);
            exp >>= 1;
        }
        result
    }

    /// Modular inverse of a, when it exists.
    ///
    /// Returns None when a is not invertible modulo p.
    pub fn inv(&self, a: u64) -> Option<u64> {
        let (mut r0, mut r1) = (self.p as i128, self.reduce(a) as i128);
        let (mut t0, mut t1) = (0i128, 1i128);
        while r1 != 0 {
            let q = r0 / r1;
            (r0, r1) = (r1, r0 - q * r1);
            (t0, t1) = (t1, t0 - q * t1);
        }
        if r0 != 1 {
            None
        } else {
            Some(t0.rem_euclid(self.p as i128) as u64)
        }
    }

    /// Modular addition of vectors in place.
    pub fn add_vec(&self, a: &mut [u64], b: &[u64]) {
        debug_assert_eq!(a.len(), b.len());
        a.iter_mut().zip(b).for_each(|(ai, bi)| *ai = self.add(*ai, *bi));
    }

    /// Modular subtraction of vectors in place.
    pub fn sub_vec(&self, a: &mut [u64], b: &[u64]) {
        debug_assert_eq!(a.len(), b.len());
        a.iter_mut().zip(b).for_each(|(ai, bi)| *ai = self.sub(*ai, *bi));
    }

    /// Modular multiplication of vectors in place.
    pub fn mul_vec(&self, a: &mut [u64], b: &[u64]) {
        debug_assert_eq!(a.len(), b.len());
        a.iter_mut().zip(b).for_each(|(ai, bi)| *ai = self.mul(*ai, *bi));
    }

    /// Modular scalar multiplication of a vector in place.
    pub fn scalar_mul_vec(&self, a: &mut [u64], b: u64) {
        let b = self.reduce(b);
        a.iter_mut().for_each(|ai| *ai = self.mul(*ai, b));
    }

    /// Modular negation of a vector in place.
    pub fn neg_vec(&self, a: &mut [u64]) {
        a.iter_mut().for_each(|ai| *ai = self.neg(*ai));
    }

    /// Reduce a vector of signed integers.
    pub fn reduce_vec_i64(&self, a: &[i64]) -> Vec<u64> {
        a.iter().map(|ai| self.reduce_i64(*ai)).collect()
    }

    /// Center a vector of reduced values.
    pub fn center_vec(&self, a: &[u64]) -> Vec<i64> {
        a.iter().map(|ai| self.center(*ai)).collect()
    }

    /// Sample a vector of `size` uniform values modulo p.
    pub fn random_vec<R: RngCore + CryptoRng>(&self, size: usize, rng: &mut R) -> Vec<u64> {
        (0..size).map(|_| rng.gen_range(0..self.p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::Modulus;
    use crate::Error;
    use proptest::prelude::*;
    use rand::thread_rng;

    #[test]
    fn constructor() {
        assert_eq!(Modulus::new(0), Err(Error::InvalidModulus(0)));
        assert_eq!(Modulus::new(1), Err(Error::InvalidModulus(1)));
        assert_eq!(Modulus::new(1 << 62), Err(Error::InvalidModulus(1 << 62)));
        assert!(Modulus::new(2).is_ok());
        assert!(Modulus::new((1 << 62) - 1).is_ok());
        assert_eq!(Modulus::new(65537).unwrap().nbits(), 17);
    }

    #[test]
    fn inverse() {
        let q = Modulus::new(65537).unwrap();
        assert_eq!(q.inv(0), None);
        assert_eq!(q.inv(1), Some(1));
        for a in [2u64, 3, 12345, 65536] {
            let a_inv = q.inv(a).unwrap();
            assert_eq!(q.mul(a, a_inv), 1);
        }

        // Non-prime modulus: only units are invertible.
        let q = Modulus::new(12).unwrap();
        assert_eq!(q.inv(4), None);
        assert_eq!(q.inv(5), Some(5));
    }

    #[test]
    fn centering() {
        let q = Modulus::new(17).unwrap();
        assert_eq!(q.center(0), 0);
        assert_eq!(q.center(8), 8);
        assert_eq!(q.center(9), -8);
        assert_eq!(q.center(16), -1);
        assert_eq!(q.reduce_i64(-1), 16);
        assert_eq!(q.reduce_i64(-35), 16);
    }

    #[test]
    fn vectors() {
        let q = Modulus::new(4611686018326724609).unwrap();
        let mut rng = thread_rng();
        let a = q.random_vec(64, &mut rng);
        let b = q.random_vec(64, &mut rng);

        let mut c = a.clone();
        q.add_vec(&mut c, &b);
        q.sub_vec(&mut c, &b);
        assert_eq!(c, a);

        let mut d = a.clone();
        q.neg_vec(&mut d);
        q.add_vec(&mut d, &a);
        assert_eq!(d, vec![0; 64]);

        let mut e = a.clone();
        q.scalar_mul_vec(&mut e, 2);
        let mut f = a.clone();
        q.add_vec(&mut f, &a);
        assert_eq!(e, f);
    }

    proptest! {
        #[test]
        fn ring_laws(p in 2u64..(1 << 62), a: u64, b: u64, c: u64) {
            let q = Modulus::new(p).unwrap();
            let (a, b, c) = (q.reduce(a), q.reduce(b), q.reduce(c));
            prop_assert_eq!(q.add(a, b), ((a as u128 + b as u128) % p as u128) as u64);
            prop_assert_eq!(q.add(q.sub(a, b), b), a);
            prop_assert_eq!(q.add(a, q.neg(a)), 0);
            prop_assert_eq!(
                q.mul(a, q.add(b, c)),
                q.add(q.mul(a, b), q.mul(a, c))
            );
            prop_assert_eq!(q.pow(a, 3), q.mul(a, q.mul(a, a)));
        }
    }
}
