use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use mhe_math::{ntt::NttOperator, zq::Modulus};
use rand::thread_rng;
use std::time::Duration;

pub fn ntt_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("ntt");
    group.sample_size(50);
    group.warm_up_time(Duration::from_secs(1));

    let mut rng = thread_rng();
    for vector_size in [1024usize, 4096] {
        for p in [4611686018326724609u64, 40961] {
            let p_nbits = 64 - p.leading_zeros();
            let q = Modulus::new(p).unwrap();
            let Some(op) = NttOperator::new(&q, vector_size) else {
                continue;
            };
            let mut a = q.random_vec(vector_size, &mut rng);

            group.bench_function(
                BenchmarkId::new("forward", format!("{vector_size}/{p_nbits}")),
                |b| b.iter(|| op.forward(&mut a)),
            );
            group.bench_function(
                BenchmarkId::new("backward", format!("{vector_size}/{p_nbits}")),
                |b| b.iter(|| op.backward(&mut a)),
            );
        }
    }

    group.finish();
}

criterion_group!(ntt, ntt_benchmark);
criterion_main!(ntt);
