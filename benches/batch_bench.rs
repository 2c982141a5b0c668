use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use vecstore::{BatchInput, Metadata, StubEmbedder, prepare_insert, prepare_update};

const DIM: usize = 384;

fn input_with_vectors(rows: usize) -> BatchInput {
    let ids: Vec<String> = (0..rows).map(|i| format!("doc-{i}")).collect();
    let embeddings: Vec<Vec<f32>> = (0..rows)
        .map(|i| (0..DIM).map(|d| ((i * DIM + d) % 97) as f32 / 97.0).collect())
        .collect();
    BatchInput::new(ids)
        .with_embeddings(embeddings)
        .with_metadatas(vec![Metadata::new(); rows])
}

fn input_with_documents(rows: usize) -> BatchInput {
    let ids: Vec<String> = (0..rows).map(|i| format!("doc-{i}")).collect();
    let documents: Vec<String> = (0..rows)
        .map(|i| format!("document number {i} about vector search"))
        .collect();
    BatchInput::new(ids).with_documents(documents)
}

/// Validation cost when vectors are supplied by the caller.
fn bench_prepare_insert(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("prepare_insert");

    for &rows in &[1usize, 100, 1_000, 10_000] {
        let input = input_with_vectors(rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &input, |b, input| {
            b.to_async(&runtime).iter(|| async {
                prepare_insert(black_box(input.clone()), None)
                    .await
                    .expect("valid batch")
            });
        });
    }

    group.finish();
}

/// Validation plus embedding through the deterministic stub.
fn bench_prepare_insert_embedded(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let stub = StubEmbedder::new(DIM);
    let mut group = c.benchmark_group("prepare_insert_embedded");

    for &rows in &[1usize, 100, 1_000] {
        let input = input_with_documents(rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &input, |b, input| {
            b.to_async(&runtime).iter(|| async {
                prepare_insert(black_box(input.clone()), Some(&stub))
                    .await
                    .expect("valid batch")
            });
        });
    }

    group.finish();
}

fn bench_prepare_update(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let ids: Vec<String> = (0..1_000).map(|i| format!("doc-{i}")).collect();
    let input = BatchInput::new(ids).with_metadatas(vec![Metadata::new(); 1_000]);

    c.bench_function("prepare_update_metadata_1000", |b| {
        b.to_async(&runtime).iter(|| async {
            prepare_update(black_box(input.clone()), None)
                .await
                .expect("valid update")
        });
    });
}

criterion_group!(
    benches,
    bench_prepare_insert,
    bench_prepare_insert_embedded,
    bench_prepare_update
);
criterion_main!(benches);
