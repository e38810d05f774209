use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::Utc;
use stockpile_catalog::{NewProduct, NewSupplier};
use stockpile_core::{ProductId, SupplierId};
use stockpile_infra::{InventoryStore, MemoryStore};
use stockpile_ledger::{Direction, MovementRequest};

fn bench_plan(c: &mut Criterion) {
    let request = MovementRequest {
        direction: Direction::Out,
        quantity: 3,
        note: "bench".to_string(),
    };

    c.bench_function("ledger/plan_out", |b| {
        b.iter(|| black_box(&request).plan(black_box(1_000)))
    });
}

fn bench_apply_movement(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");

    let mut group = c.benchmark_group("ledger/apply_movement");
    for batch in [1u64, 16, 64] {
        group.throughput(Throughput::Elements(batch));
        group.bench_with_input(BenchmarkId::from_parameter(batch), &batch, |b, &batch| {
            b.iter(|| {
                rt.block_on(async {
                    let store = MemoryStore::new();
                    let supplier = store
                        .create_supplier(
                            NewSupplier {
                                name: "Bench Supplier".to_string(),
                                ..NewSupplier::default()
                            }
                            .into_supplier(SupplierId::new(), Utc::now())
                            .expect("supplier"),
                        )
                        .await
                        .expect("create supplier");

                    let product = store
                        .create_product(
                            NewProduct {
                                sku: "BENCH-1".to_string(),
                                name: "Bench Product".to_string(),
                                description: String::new(),
                                price_cents: 100,
                                initial_stock: 0,
                                min_stock: 0,
                                image_url: None,
                                supplier_id: supplier.id,
                                category_id: None,
                            }
                            .into_product(ProductId::new(), Utc::now())
                            .expect("product"),
                        )
                        .await
                        .expect("create product");

                    for _ in 0..batch {
                        store
                            .apply_movement(
                                product.id,
                                MovementRequest {
                                    direction: Direction::In,
                                    quantity: 5,
                                    note: String::new(),
                                },
                            )
                            .await
                            .expect("movement");
                    }
                })
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_plan, bench_apply_movement);
criterion_main!(benches);
