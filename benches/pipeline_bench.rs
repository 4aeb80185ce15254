//! Criterion benchmarks for the capital flow join and ranking

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use posterkit::parsers::Sheet;
use posterkit::services::{Aggregator, Ranker};
use posterkit::templates::{parse_sheet, TemplateName};
use posterkit::types::{MainContractItem, PlateItem, QuoteFields, SnapshotData};
use std::collections::HashMap;
use std::path::PathBuf;

const MARKETS: [&str; 5] = ["65", "66", "67", "-127", "UGFF"];

/// Synthetic feed: `n` varieties spread over the markets, every other one quoted
fn synthetic_feed(n: usize) -> (Vec<MainContractItem>, SnapshotData, Vec<PlateItem>) {
    let mut contracts = Vec::with_capacity(n);
    let mut snapshot: SnapshotData = HashMap::new();
    let mut plates = Vec::with_capacity(n);

    for i in 0..n {
        let market = MARKETS[i % MARKETS.len()];
        let code = format!("v{}", i);
        contracts.push(MainContractItem {
            market: market.to_string(),
            variety: code.to_uppercase(),
            variety_code: code.clone(),
            variety_short_name: format!("品种{}", i),
            ..Default::default()
        });

        if i % 2 == 0 {
            let snapshot_market = if market == "-127" { "129" } else { market };
            let flow = (i as f64 * 37.0) % 1000.0 - 500.0;
            snapshot.entry(snapshot_market.to_string()).or_default().insert(
                format!("{}8888", code),
                QuoteFields {
                    deposit_funds: Some(flow.abs() * 3.0),
                    funds_flow: Some(flow),
                    change_rate: Some(flow / 100.0),
                },
            );
        }

        plates.push(PlateItem {
            variety: code,
            plate_level: "2".to_string(),
            plate_name: format!("板块{}", i % 12),
            ..Default::default()
        });
    }

    (contracts, snapshot, plates)
}

fn bench_combine_and_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");

    for n in [100usize, 1_000, 10_000] {
        let (contracts, snapshot, plates) = synthetic_feed(n);
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("combine_rank", n), &n, |b, _| {
            b.iter(|| {
                let plate_map = Aggregator::build_plate_map(black_box(&plates));
                let combined =
                    Aggregator::combine(black_box(&contracts), black_box(&snapshot), &plate_map);
                Ranker::rank(&combined)
            });
        });
    }

    group.finish();
}

fn bench_sheet_mapping(c: &mut Criterion) {
    let fixture = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("limit_review.csv");
    let Ok(sheet) = Sheet::load(&fixture) else {
        eprintln!("Warning: fixture {} not readable", fixture.display());
        return;
    };

    let mut group = c.benchmark_group("sheet");
    group.throughput(Throughput::Elements(sheet.len() as u64));

    group.bench_function("limit_review", |b| {
        b.iter(|| parse_sheet(TemplateName::LimitReview, black_box(&sheet)));
    });

    group.finish();
}

criterion_group!(benches, bench_combine_and_rank, bench_sheet_mapping);
criterion_main!(benches);
