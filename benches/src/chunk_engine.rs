mod common;

use common::generate_orders_csv;
use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use futures::io::Cursor;
use order_batch::prelude::*;
use order_batch::report::{OrderTransform, OrderUpsertWriter};
use tokio::runtime::Runtime;

/// Import throughput as a function of chunk size (one transaction per chunk)
fn bench_chunk_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("import_chunk_size");
    let runtime = Runtime::new().unwrap();
    let transform = OrderTransform::new(&ReportConfig::default());
    let csv_data = generate_orders_csv(10_000, 10);

    for chunk_size in [1usize, 2, 16, 256] {
        group.bench_with_input(
            BenchmarkId::from_parameter(chunk_size),
            &chunk_size,
            |b, &chunk_size| {
                b.to_async(&runtime).iter_batched(
                    || (SqliteStore::in_memory().unwrap(), csv_data.clone()),
                    |(store, csv_data)| {
                        let transform = &transform;
                        async move {
                            let engine = ChunkEngine::new(&store, chunk_size).unwrap();
                            let source =
                                CsvRecordStream::<OrderCsvRecord>::new(Cursor::new(csv_data));
                            black_box(
                                engine
                                    .run("bench", source, transform, &OrderUpsertWriter)
                                    .await,
                            );
                        }
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

/// Same workload against the in-memory store
fn bench_memory_store(c: &mut Criterion) {
    let runtime = Runtime::new().unwrap();
    let transform = OrderTransform::new(&ReportConfig::default());
    let csv_data = generate_orders_csv(10_000, 10);

    c.bench_function("import_memory_store", |b| {
        b.to_async(&runtime).iter_batched(
            || (MemoryStore::new(), csv_data.clone()),
            |(store, csv_data)| {
                let transform = &transform;
                async move {
                    let engine = ChunkEngine::new(&store, 16).unwrap();
                    let source = CsvRecordStream::<OrderCsvRecord>::new(Cursor::new(csv_data));
                    black_box(
                        engine
                            .run("bench", source, transform, &OrderUpsertWriter)
                            .await,
                    );
                }
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_chunk_sizes, bench_memory_store);
criterion_main!(benches);
