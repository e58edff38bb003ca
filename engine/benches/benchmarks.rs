//! Performance benchmarks for console-engine

use console_engine::{record, ListConfig, ListQueryEngine, Record};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;

fn create_engine() -> ListQueryEngine<Record> {
    let config = ListConfig::<Record>::new()
        .search_field(|r| record::field_text(r, "vehicleNumber"))
        .search_field(|r| record::field_text(r, "vendor.name"))
        .search_field(|r| record::field_text(r, "site.name"))
        .filter("siteId", |r, site| {
            record::field_text(r, "site._id").as_deref() == Some(site)
        })
        .filter("status", |r, status| {
            record::field_text(r, "status").as_deref() == Some(status)
        })
        .key(|r| record::key_of(r, "_id"));
    ListQueryEngine::new(config).unwrap()
}

fn create_records(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| {
            json!({
                "_id": format!("trip_{}", i),
                "vehicleNumber": format!("MH12AB{:05}", i),
                "vendor": {"name": format!("Vendor {}", i % 40)},
                "site": {"_id": format!("S{}", i % 8), "name": format!("Gate {}", i % 8)},
                "status": if i % 3 == 0 { "exited" } else { "inside" },
            })
        })
        .collect()
}

fn bench_set_records(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_records");

    for size in [100, 1000, 5000] {
        let records = create_records(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            let mut engine = create_engine();
            b.iter(|| engine.set_records(black_box(records.clone())))
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    for size in [100, 1000, 5000] {
        let mut engine = create_engine();
        engine.set_records(create_records(size));

        group.bench_with_input(BenchmarkId::new("keystrokes", size), &size, |b, _| {
            b.iter(|| {
                for text in ["g", "ga", "gat", "gate", "gate 3"] {
                    engine.set_search_text(black_box(text));
                }
            })
        });
    }

    group.finish();
}

fn bench_filter_and_page(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_and_page");

    let mut engine = create_engine();
    engine.set_records(create_records(5000));

    group.bench_function("filter_site", |b| {
        b.iter(|| engine.set_filter_value(black_box("siteId"), black_box("S3")))
    });

    group.bench_function("go_to_page", |b| {
        let mut page = 0i64;
        b.iter(|| {
            page = (page + 7) % 90;
            engine.go_to_page(black_box(page))
        })
    });

    group.bench_function("view", |b| b.iter(|| black_box(engine.view().page_records.len())));

    group.finish();
}

criterion_group!(benches, bench_set_records, bench_search, bench_filter_and_page);
criterion_main!(benches);
