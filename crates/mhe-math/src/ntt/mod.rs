//! Number-Theoretic Transform in ZZ_q.

mod native;

pub use native::NttOperator;

/// Returns whether a modulus p is prime and supports the Number Theoretic
/// Transform of size n.
///
/// Aborts if n is not a power of 2 that is >= 8.
pub fn supports_ntt(p: u64, n: usize) -> bool {
    debug_assert!(n >= 8 && n.is_power_of_two());

    p % ((n as u64) << 1) == 1 && mhe_util::is_prime(p)
}

#[cfg(test)]
mod tests {
    use super::{supports_ntt, NttOperator};
    use crate::zq::Modulus;
    use rand::thread_rng;

    #[test]
    fn constructor() {
        for size in [8, 1024] {
            for p in [1153, 65537, 4611686018326724609] {
                let q = Modulus::new(p).unwrap();
                assert_eq!(NttOperator::new(&q, size).is_some(), supports_ntt(p, size));
            }
        }
        assert!(NttOperator::new(&Modulus::new(65537).unwrap(), 1024).is_some());
        assert!(NttOperator::new(&Modulus::new(1153).unwrap(), 1024).is_none());
        // 4 * 2^k + 1 composite: not supported.
        assert!(!supports_ntt(2049, 8));
    }

    #[test]
    fn bijection() {
        let ntests = 20;
        let mut rng = thread_rng();
        for size in [8, 1024] {
            for p in [65537, 4611686018326724609] {
                let q = Modulus::new(p).unwrap();
                let op = NttOperator::new(&q, size).unwrap();
                for _ in 0..ntests {
                    let mut a = q.random_vec(size, &mut rng);
                    let a_clone = a.clone();

                    op.forward(&mut a);
                    assert_ne!(a, a_clone);
                    op.backward(&mut a);
                    assert_eq!(a, a_clone);
                }
            }
        }
    }

    #[test]
    fn negacyclic_product() {
        // (X^{n-1}) * X = X^n = -1 in Z_q[X]/(X^n + 1).
        let size = 8;
        let q = Modulus::new(65537).unwrap();
        let op = NttOperator::new(&q, size).unwrap();

        let mut a = vec![0u64; size];
        a[size - 1] = 1;
        let mut b = vec![0u64; size];
        b[1] = 1;
        op.forward(&mut a);
        op.forward(&mut b);
        q.mul_vec(&mut a, &b);
        op.backward(&mut a);

        let mut expected = vec![0u64; size];
        expected[0] = q.neg(1);
        assert_eq!(a, expected);
    }

    #[test]
    fn schoolbook_agreement() {
        let size = 16;
        let q = Modulus::new(65537).unwrap();
        let op = NttOperator::new(&q, size).unwrap();
        let mut rng = thread_rng();
        let a = q.random_vec(size, &mut rng);
        let b = q.random_vec(size, &mut rng);

        let mut expected = vec![0u64; size];
        for i in 0..size {
            for j in 0..size {
                let prod = q.mul(a[i], b[j]);
                let k = (i + j) % size;
                if i + j >= size {
                    expected[k] = q.sub(expected[k], prod);
                } else {
                    expected[k] = q.add(expected[k], prod);
                }
            }
        }

        let mut a_ntt = a.clone();
        let mut b_ntt = b.clone();
        op.forward(&mut a_ntt);
        op.forward(&mut b_ntt);
        q.mul_vec(&mut a_ntt, &b_ntt);
        op.backward(&mut a_ntt);
        assert_eq!(a_ntt, expected);
    }
}
