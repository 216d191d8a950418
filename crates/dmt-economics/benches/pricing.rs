//! Pricing formula benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dmt_common::{AgentType, MS_PER_DAY};
use dmt_economics::{FormulaPricing, PricingModel};
use rust_decimal_macros::dec;

fn bench_mint_cost(c: &mut Criterion) {
    let pricing = FormulaPricing::default();
    let mut group = c.benchmark_group("mint_cost");

    for level in [1u32, 10, 50].iter() {
        group.bench_with_input(BenchmarkId::new("master", level), level, |b, &level| {
            b.iter(|| pricing.mint_cost(black_box(AgentType::Master), black_box(level)))
        });
    }
    group.finish();
}

fn bench_evolution_cost(c: &mut Criterion) {
    let pricing = FormulaPricing::default();
    c.bench_function("evolution_cost", |b| {
        b.iter(|| pricing.evolution_cost(black_box(12), black_box(4_500)))
    });
}

fn bench_fees_and_yield(c: &mut Criterion) {
    let pricing = FormulaPricing::default();
    let mut group = c.benchmark_group("fees");

    group.bench_function("marketplace_fee", |b| {
        b.iter(|| pricing.marketplace_fee(black_box(dec!(1234.56))))
    });
    group.bench_function("platform_fee", |b| {
        b.iter(|| pricing.platform_fee(black_box(dec!(1234.56))))
    });
    group.bench_function("staking_reward_30d", |b| {
        b.iter(|| pricing.staking_reward(black_box(dec!(2500)), black_box(30 * MS_PER_DAY)))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_mint_cost,
    bench_evolution_cost,
    bench_fees_and_yield
);
criterion_main!(benches);
