use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use sdr_category::{CategoryEncoder, EncoderConfig};

fn populated(count: usize) -> CategoryEncoder {
    let mut encoder = CategoryEncoder::new(EncoderConfig::default()).unwrap();
    for i in 0..count {
        encoder.encode(Some(&i.to_string()));
    }
    encoder
}

fn bench_allocate(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocate");
    let values: Vec<String> = (0..100).map(|i| format!("fresh-{i}")).collect();

    // Cost of minting new categories grows with how crowded the universe is.
    for &existing in &[0usize, 1_000] {
        let base = populated(existing);
        group.bench_function(format!("100_new_after_{existing}"), |b| {
            b.iter_batched(
                || base.clone(),
                |mut encoder| {
                    for value in &values {
                        encoder.encode(Some(value));
                    }
                    encoder
                },
                BatchSize::LargeInput,
            )
        });
    }
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");
    let mut encoder = populated(1_000);
    let values: Vec<String> = (0..1_000).map(|i| i.to_string()).collect();

    group.bench_function("encode_known_1000", |b| {
        b.iter(|| {
            for value in &values {
                encoder.encode(Some(value));
            }
        })
    });
}

criterion_group!(benches, bench_allocate, bench_lookup);
criterion_main!(benches);
