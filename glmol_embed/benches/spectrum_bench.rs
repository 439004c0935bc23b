use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glmol_embed::prelude::*;

fn make_embed(n: usize) -> Embed {
    let scores = (0..n).map(|i| (i as f64 * 0.37).sin()).collect();
    Embed::new("").with_residue_property("score", ResidueProperty::new(scores))
}

fn spectrum(c: &mut Criterion) {
    let ramp = ColorRamp::palette("viridis").unwrap();
    let scores: Vec<f64> = (0..10000).map(|i| (i as f64 * 0.37).sin()).collect();

    c.bench_function("map scores 10k", |b| {
        b.iter(|| map_scores(black_box(&scores), &ramp, None))
    });

    let embed = make_embed(1000);
    let m = Modifier::from(ResidueSpectrum::new("score").with_palette("coolwarm"));
    c.bench_function("spectrum modifier 1k", |b| {
        b.iter(|| embed.with_modifier(black_box(&m)).unwrap())
    });
}

fn selectors(c: &mut Criterion) {
    c.bench_function("parse selector", |b| {
        b.iter(|| black_box("residue_number 5-10; heavy; bb").parse::<Selector>().unwrap())
    });

    let labels: String = "LLHHHHHHHLLLEEEEELLL".repeat(50);
    c.bench_function("structure modifiers", |b| {
        b.iter(|| structure_modifiers(black_box(&labels), &ResidueNumbering::default()).unwrap())
    });
}

criterion_group!(benches, spectrum, selectors);
criterion_main!(benches);
