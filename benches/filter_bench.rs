//! Filter throughput over a large catalog, the path re-evaluated after every roster change.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use muster::catalog::{ingest_with, visible, FilterCriteria, NationFilter, NonceIds, UnitCatalog};

const NATIONS: &[&str] = &["Germany", "USA", "USSR", "UK", "Italy", "Japan"];

fn large_catalog(rows: usize) -> UnitCatalog {
    let mut raw = String::from("Name,Nation,Points,Move,Aim,Shoot,Speed,Front,Side,Rear,Special\n");
    for idx in 0..rows {
        let nation = NATIONS[idx % NATIONS.len()];
        raw.push_str(&format!(
            "Unit {idx} Mk {},{nation},{},6,3,4,2,5,4,2,\n",
            idx % 7,
            1 + idx % 40
        ));
    }
    ingest_with(&raw, &mut NonceIds::new(7)).expect("bench table is well formed")
}

fn bench_filter(c: &mut Criterion) {
    let catalog = large_catalog(10_000);

    let mut group = c.benchmark_group("filter");
    group.throughput(Throughput::Elements(catalog.len() as u64));

    let open = FilterCriteria {
        budget: 1000,
        ..FilterCriteria::default()
    };
    group.bench_function("no_search_all_nations", |b| {
        b.iter(|| visible(black_box(&catalog), black_box(&open)).len())
    });

    let narrow = FilterCriteria {
        search: "mk 3".to_string(),
        nation: NationFilter::Only("USSR".to_string()),
        budget: 1000,
        roster_total: 980,
    };
    group.bench_function("search_nation_near_budget", |b| {
        b.iter(|| visible(black_box(&catalog), black_box(&narrow)).len())
    });

    group.finish();
}

fn bench_ingest(c: &mut Criterion) {
    c.bench_function("ingest_10k_rows", |b| b.iter(|| large_catalog(black_box(10_000)).len()));
}

criterion_group!(benches, bench_filter, bench_ingest);
criterion_main!(benches);
