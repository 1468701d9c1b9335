//! Benchmarks for American-odds conversion

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rust_decimal_macros::dec;
use sharpline::odds::{american_odds, implied_probability};

fn benchmark_implied_probability(c: &mut Criterion) {
    c.bench_function("implied_probability_favorite", |b| {
        b.iter(|| implied_probability(black_box(dec!(-150))))
    });
    c.bench_function("implied_probability_underdog", |b| {
        b.iter(|| implied_probability(black_box(dec!(135))))
    });
}

fn benchmark_american_odds(c: &mut Criterion) {
    c.bench_function("american_odds", |b| {
        b.iter(|| american_odds(black_box(dec!(0.6))))
    });
}

fn benchmark_round_trip(c: &mut Criterion) {
    c.bench_function("odds_round_trip", |b| {
        b.iter(|| {
            let p = implied_probability(black_box(dec!(-110))).unwrap();
            american_odds(p)
        })
    });
}

criterion_group!(
    benches,
    benchmark_implied_probability,
    benchmark_american_odds,
    benchmark_round_trip
);
criterion_main!(benches);
