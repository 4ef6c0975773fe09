//! Replay benchmarks.
//!
//! Builds a synthetic count where every candidate in turn passes some of its
//! ballots on to each candidate declared after it.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use stv_transfers::config::ReplayConfig;
use stv_transfers::engine::ReplayEvent;
use stv_transfers::replay::replay;

fn synthetic_count(candidates: usize) -> Vec<ReplayEvent> {
    let id = |i: usize| format!("{:04}", 1000 + i);
    let mut events: Vec<ReplayEvent> = (0..candidates)
        .map(|i| ReplayEvent::DeclareCandidate {
            id: id(i),
            name: format!("Candidate {}", i),
            vote_count: Decimal::from(1000 + 10 * i as i64),
        })
        .collect();

    for source in 0..candidates - 1 {
        events.push(ReplayEvent::Transfer {
            source: id(source),
            destination: id(source + 1),
            weight: dec!(1),
            vote_count: dec!(10),
        });
        for dest in source + 2..candidates {
            events.push(ReplayEvent::Transfer {
                source: id(source),
                destination: id(dest),
                weight: dec!(1),
                vote_count: dec!(1),
            });
        }
    }

    events
}

fn bench_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay/chain");
    let config = ReplayConfig {
        progress: false,
        ..ReplayConfig::default()
    };

    for candidates in [10usize, 50, 100].iter() {
        let events = synthetic_count(*candidates);
        group.bench_with_input(BenchmarkId::from_parameter(candidates), &events, |b, events| {
            b.iter(|| replay(black_box(events), &config).unwrap());
        });
    }

    group.finish();
}

fn bench_overlaps(c: &mut Criterion) {
    let config = ReplayConfig {
        progress: false,
        ..ReplayConfig::default()
    };
    let (election, _) = replay(&synthetic_count(100), &config).unwrap();

    c.bench_function("overlaps/100", |b| {
        b.iter(|| election.overlaps(black_box(0.0)))
    });
}

criterion_group!(benches, bench_replay, bench_overlaps);
criterion_main!(benches);
