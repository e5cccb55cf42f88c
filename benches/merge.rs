use criterion::{black_box, criterion_group, criterion_main, Criterion};
use snapmag::gallery::merge;
use snapmag::gallery::record::{ContentKey, ImageRecord, Locator};

fn bench_merge(c: &mut Criterion) {
    // every fourth capture resurfaces an earlier identity
    let records: Vec<ImageRecord> = (0..10_000i64)
        .map(|i| {
            let identity = if i % 4 == 0 { i / 8 } else { i };
            ImageRecord::new(
                ContentKey::new(format!("{identity:064x}")),
                Locator::new(format!("/shots/{i}.png")),
                10_000 - i,
            )
        })
        .collect();
    c.bench_function("merge_10k", |b| b.iter(|| merge(black_box(&records))));
}

criterion_group!(benches, bench_merge);
criterion_main!(benches);
