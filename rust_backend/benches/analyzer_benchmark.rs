use ags_rust::algorithms::{AlwaysReachable, AsterismAnalyzer, IndexCombinations};
use ags_rust::catalog::{CandidateSet, CatalogSearchCriterion, RadiusLimits, SearchCriterion, SearchKey};
use ags_rust::config::AnalyzerConfig;
use ags_rust::core::angle::{arcmin, degrees, Angle};
use ags_rust::core::{
    GuideProbeGroup, GuideStarType, Magnitude, MagnitudeBand, MagnitudeLimits, ObservationContext, Offset, Quality,
    SkyCoordinates, SkyObject,
};
use ags_rust::error::EstimatorError;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn base() -> SkyCoordinates {
    SkyCoordinates::from_degrees(83.82, -5.39)
}

fn candidates(tiptilt: usize, flexure: usize) -> Vec<CandidateSet> {
    let stars = |prefix: &str, n: usize, q: f64| -> Vec<SkyObject> {
        (0..n)
            .map(|i| {
                let p = -1.0 + 2.0 * i as f64 / n.max(1) as f64;
                let coordinates = base().offset_by(&Offset::new(arcmin(p), arcmin(q + 0.1 * (i % 3) as f64)));
                SkyObject::builder(format!("{}{}", prefix, i), coordinates)
                    .catalog_id(format!("{}{}", prefix, i))
                    .magnitude(Magnitude::new(MagnitudeBand::R, 11.0 + 0.25 * i as f64))
                    .build()
            })
            .collect()
    };
    let set = |star_type: GuideStarType, group: GuideProbeGroup, stars: Vec<SkyObject>| {
        CandidateSet::new(
            SearchCriterion::new(
                SearchKey::new(star_type, group),
                CatalogSearchCriterion::new(
                    "bench",
                    MagnitudeLimits::faint_only(MagnitudeBand::R, 18.0).unwrap(),
                    RadiusLimits::disc(arcmin(2.0)).unwrap(),
                ),
            ),
            stars,
        )
    };
    let canopus = GuideProbeGroup::new("CWFS", vec!["CWFS1".into(), "CWFS2".into(), "CWFS3".into()])
        .with_anchor_probe("CWFS3".into())
        .with_reverse_order(true);
    let odgw = GuideProbeGroup::new("ODGW", vec!["ODGW1".into(), "ODGW2".into()]);
    vec![
        set(GuideStarType::Tiptilt, canopus, stars("t", tiptilt, 0.3)),
        set(GuideStarType::Flexure, odgw, stars("f", flexure, -0.6)),
    ]
}

fn estimator(stars: &[SkyObject], _: &ObservationContext) -> Result<Quality, EstimatorError> {
    let total: f64 = stars
        .iter()
        .filter_map(|s| s.magnitude(MagnitudeBand::R))
        .map(|m| 20.0 - m.brightness)
        .sum();
    Ok(Quality::uniform(total / 100.0))
}

fn bench_analyzer(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyzer");
    group.sample_size(20);

    let context = ObservationContext::new(base(), degrees(0.0));
    let angles: Vec<Angle> = (0..8).map(|i| degrees(45.0 * i as f64)).collect();

    for &n in &[6usize, 10, 14] {
        let sets = candidates(n, 4);
        for parallel in [false, true] {
            let config = AnalyzerConfig {
                parallel,
                ..AnalyzerConfig::default()
            };
            let label = if parallel { "parallel" } else { "sequential" };
            group.bench_with_input(BenchmarkId::new(label, n), &sets, |b, sets| {
                let analyzer = AsterismAnalyzer::new(config.clone(), &AlwaysReachable, &estimator);
                b.iter(|| black_box(analyzer.analyze(black_box(&context), &angles, sets)));
            });
        }
    }

    group.finish();
}

fn bench_combinations(c: &mut Criterion) {
    let mut group = c.benchmark_group("combinations");

    group.bench_function("c_30_3", |b| {
        b.iter(|| {
            let mut count = 0usize;
            let mut combos = IndexCombinations::new(black_box(30), 3);
            while let Some(indices) = combos.advance() {
                count += indices[0];
            }
            black_box(count)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_analyzer, bench_combinations);
criterion_main!(benches);
