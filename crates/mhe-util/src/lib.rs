#![crate_name = "mhe_util"]
#![crate_type = "lib"]
#![warn(missing_docs, unused_imports)]

//! Utilities for the mhe.rs library.

use num_bigint_dig::{prime::probably_prime, BigUint};
use num_traits::ToPrimitive;
use rand::{CryptoRng, Rng, RngCore};
use rand_distr::{Distribution, Normal};

/// Returns whether the modulus p is prime; this function is 100% accurate.
pub fn is_prime(p: u64) -> bool {
    probably_prime(&BigUint::from(p), 0)
}

/// Generate a `num_bits`-bit prime, congruent to 1 mod `modulo`, strictly
/// smaller than `upper_bound`. Note that `num_bits` must belong to (10..=62),
/// and upper_bound must be <= 1 << num_bits.
pub fn generate_prime(num_bits: usize, modulo: u64, upper_bound: u64) -> Option<u64> {
    if !(10..=62).contains(&num_bits) || modulo == 0 || upper_bound > (1 << num_bits) {
        return None;
    }
    if upper_bound < modulo + 1 {
        return None;
    }

    let lower_bound = 1u64 << (num_bits - 1);
    let largest = upper_bound - 1;
    let mut candidate = largest - ((largest - 1) % modulo);

    while candidate >= lower_bound {
        if is_prime(candidate) {
            return Some(candidate);
        }
        candidate = candidate.checked_sub(modulo)?;
    }

    None
}

/// Sample a vector of independent centered binomial distributions of a given
/// variance. Returns an error if the variance is strictly larger than 16.
pub fn sample_vec_cbd<R: RngCore + CryptoRng>(
    vector_size: usize,
    variance: usize,
    rng: &mut R,
) -> Result<Vec<i64>, &'static str> {
    if !(1..=16).contains(&variance) {
        return Err("The variance should be between 1 and 16");
    }

    // Each half is a sum of 2 * variance fair bits.
    let nbits = 2 * variance;
    let mask = u64::MAX >> (64 - nbits);
    Ok((0..vector_size)
        .map(|_| {
            let plus = (rng.next_u64() & mask).count_ones() as i64;
            let minus = (rng.next_u64() & mask).count_ones() as i64;
            plus - minus
        })
        .collect())
}

/// Sample a vector of independent uniform values in {-1, 0, 1}.
pub fn sample_vec_ternary<R: RngCore + CryptoRng>(vector_size: usize, rng: &mut R) -> Vec<i64> {
    (0..vector_size).map(|_| rng.gen_range(-1i64..=1)).collect()
}

/// Sample a vector of independent rounded gaussians of standard deviation
/// `sqrt(variance)`. Used for smudging noise, whose variance does not fit the
/// centered binomial sampler.
pub fn sample_vec_normal<R: RngCore + CryptoRng>(
    vector_size: usize,
    variance: f64,
    rng: &mut R,
) -> Result<Vec<i64>, &'static str> {
    if !variance.is_finite() || variance < 0.0 {
        return Err("The variance should be a finite non-negative number");
    }
    let normal = Normal::new(0.0, variance.sqrt()).map_err(|_| "Invalid normal distribution")?;
    (0..vector_size)
        .map(|_| {
            normal
                .sample(rng)
                .round()
                .to_i64()
                .ok_or("Sample does not fit in an i64")
        })
        .collect()
}

/// Compute the sample variance of a list of values.
pub fn variance<T: ToPrimitive>(values: &[T]) -> f64 {
    assert!(values.len() > 1);
    let values = values
        .iter()
        .map(|v| v.to_f64().unwrap_or_default())
        .collect::<Vec<_>>();
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (values.len() as f64 - 1.0)
}
