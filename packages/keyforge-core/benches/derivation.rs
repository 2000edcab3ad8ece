use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use keyforge_core::{expand, stretch, StretchParams};

const DEK_CONTEXT: &str = "My Application 2025-02-03 11:30:00 Data Encryption Key";

/// Stretching at a few cost levels, up to the reference N = 2^17.
fn benchmark_stretch(c: &mut Criterion) {
    let mut group = c.benchmark_group("Stretch");
    group.sample_size(10); // each iteration is deliberately slow

    for log_n in [14u8, 15, 17] {
        let params = StretchParams {
            log_n,
            ..StretchParams::default()
        };
        group.bench_function(format!("scrypt_n_2^{}_r8_p1", log_n), |b| {
            b.iter(|| {
                stretch(
                    black_box(b"user-password"),
                    black_box(b"unique-salt-for-user"),
                    &params,
                )
                .unwrap()
            });
        });
    }

    group.finish();
}

/// Expansion should stay in the sub-microsecond range.
fn benchmark_expand(c: &mut Criterion) {
    let master = [42u8; 32];

    c.bench_function("expand_blake3_keyed", |b| {
        b.iter(|| expand(black_box(&master), black_box(DEK_CONTEXT)).unwrap());
    });
}

criterion_group!(benches, benchmark_stretch, benchmark_expand);
criterion_main!(benches);
