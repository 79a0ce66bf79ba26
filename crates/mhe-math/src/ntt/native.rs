use crate::zq::Modulus;
use itertools::Itertools;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::iter::successors;

/// Negacyclic Number-Theoretic Transform operator.
///
/// The forward transform evaluates a polynomial of Z_p\[X\]/(X^n + 1) at the
/// odd powers of a primitive 2n-th root of unity, in bit-reversed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NttOperator {
    p: Modulus,
    size: usize,
    psi_rev: Box<[u64]>,
    psi_inv_rev: Box<[u64]>,
    size_inv: u64,
}

impl NttOperator {
    /// Create an NTT operator given a modulus for a specific size.
    ///
    /// Returns None if the modulus does not support the NTT for this specific
    /// size.
    pub fn new(p: &Modulus, size: usize) -> Option<Self> {
        if !super::supports_ntt(p.modulus(), size) {
            return None;
        }

        let size_inv = p.inv(size as u64)?;
        let psi = Self::primitive_root(size, p);
        let psi_inv = p.inv(psi)?;

        let powers = successors(Some(1u64), |n| Some(p.mul(*n, psi)))
            .take(size)
            .collect_vec();
        let powers_inv = successors(Some(1u64), |n| Some(p.mul(*n, psi_inv)))
            .take(size)
            .collect_vec();

        let (psi_rev, psi_inv_rev): (Vec<u64>, Vec<u64>) = (0..size)
            .map(|i| {
                let j = i.reverse_bits() >> (size.leading_zeros() + 1);
                (powers[j], powers_inv[j])
            })
            .unzip();

        Some(Self {
            p: p.clone(),
            size,
            psi_rev: psi_rev.into_boxed_slice(),
            psi_inv_rev: psi_inv_rev.into_boxed_slice(),
            size_inv,
        })
    }

    /// Returns the size handled by the operator.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Compute the forward NTT in place.
    /// Aborts if a is not of the size handled by the operator.
    pub fn forward(&self, a: &mut [u64]) {
        assert_eq!(a.len(), self.size);

        let mut t = self.size;
        let mut m = 1;
        while m < self.size {
            t >>= 1;
            for i in 0..m {
                let s = self.psi_rev[m + i];
                let start = 2 * i * t;
                for j in start..(start + t) {
                    let u = a[j];
                    let v = self.p.mul(a[j + t], s);
                    a[j] = self.p.add(u, v);
                    a[j + t] = self.p.sub(u, v);
                }
            }
            m <<= 1;
        }
    }

    /// Compute the backward NTT in place.
    /// Aborts if a is not of the size handled by the operator.
    pub fn backward(&self, a: &mut [u64]) {
        assert_eq!(a.len(), self.size);

        let mut t = 1;
        let mut m = self.size;
        while m > 1 {
            let h = m >> 1;
            let mut start = 0;
            for i in 0..h {
                let s = self.psi_inv_rev[h + i];
                for j in start..(start + t) {
                    let u = a[j];
                    let v = a[j + t];
                    a[j] = self.p.add(u, v);
                    a[j + t] = self.p.mul(self.p.sub(u, v), s);
                }
                start += 2 * t;
            }
            t <<= 1;
            m = h;
        }

        a.iter_mut()
            .for_each(|ai| *ai = self.p.mul(*ai, self.size_inv));
    }

    /// Returns a primitive 2n-th root of unity modulo p.
    ///
    /// The root is drawn from a fixed seed so that every operator built for the
    /// same (p, n) uses the same evaluation points.
    fn primitive_root(size: usize, p: &Modulus) -> u64 {
        let lambda = (p.modulus() - 1) / (2 * size as u64);
        let minus_one = p.modulus() - 1;

        let mut rng = ChaCha8Rng::seed_from_u64(0);
        loop {
            let root = p.pow(rng.gen_range(1..p.modulus()), lambda);
            // The order divides 2n, a power of two, so it equals 2n exactly
            // when root^n = -1.
            if p.pow(root, size as u64) == minus_one {
                return root;
            }
        }
    }
}
