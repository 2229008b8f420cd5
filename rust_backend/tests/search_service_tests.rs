//! Guide star search service tests over a JSON-loaded local catalog.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ags_rust::algorithms::{AlwaysReachable, ProgressEvent, QualityEstimator, ReachabilityOracle};
use ags_rust::catalog::{
    CatalogQuery, CatalogQueryPlan, GroupSearchSpec, LocalCatalog, RadiusLimits, SearchOptions, TipTiltMode,
};
use ags_rust::config::AgsConfig;
use ags_rust::core::angle::{arcmin, degrees};
use ags_rust::core::{
    GuideProbeGroup, MagnitudeBand, MagnitudeLimits, ObservationContext, Quality, SkyCoordinates, SkyObject,
};
use ags_rust::error::{AgsError, AgsResult, EstimatorError};
use ags_rust::io::CatalogLoader;
use ags_rust::GuideStarSearch;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use tempfile::NamedTempFile;

const CATALOG: &str = r#"[
    {"id": "s1", "name": "s1", "ra": 150.0, "dec": -29.99, "magnitudes": {"R": 11.0}},
    {"id": "s2", "name": "s2", "ra": 150.0, "dec": -30.01, "magnitudes": {"R": 11.5}},
    {"id": "s3", "name": "s3", "ra": 150.01, "dec": -30.0, "magnitudes": {"R": 12.0}},
    {"id": "s4", "name": "s4", "ra": 149.99, "dec": -30.0, "magnitudes": {"R": 12.5}},
    {"id": "faint", "name": "faint", "ra": 150.0, "dec": -29.995, "magnitudes": {"R": 19.0}},
    {"id": "far", "name": "far", "ra": 150.0, "dec": -29.9, "magnitudes": {"R": 12.0}},
    {"id": "h1", "name": "h1", "ra": 150.01, "dec": -29.99, "magnitudes": {"H": {"value": 13.0, "error": 0.02}}},
    {"id": "h2", "name": "h2", "ra": 149.99, "dec": -30.01, "magnitudes": {"H": 13.5}},
    {"name": "broken", "ra": "nowhere", "dec": 0.0}
]"#;

fn catalog_file() -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(CATALOG.as_bytes()).unwrap();
    file
}

fn catalog() -> Arc<dyn CatalogQuery> {
    let file = catalog_file();
    let loaded = CatalogLoader::load_from_file(file.path()).unwrap();
    assert_eq!(loaded.skipped, 1);
    Arc::new(loaded.into_catalog("user"))
}

fn canopus() -> GuideProbeGroup {
    GuideProbeGroup::new("CWFS", vec!["CWFS1".into(), "CWFS2".into(), "CWFS3".into()])
        .with_display_name("Canopus")
        .with_anchor_probe("CWFS3".into())
        .with_flexure_probe("CWFS3".into())
        .with_reverse_order(true)
}

fn odgw() -> GuideProbeGroup {
    GuideProbeGroup::new(
        "ODGW",
        vec!["ODGW1".into(), "ODGW2".into(), "ODGW3".into(), "ODGW4".into()],
    )
    .with_display_name("GSAOI")
}

fn options(ao_group: GuideProbeGroup) -> SearchOptions {
    SearchOptions {
        ao: GroupSearchSpec {
            group: ao_group,
            radius_limits: RadiusLimits::disc(arcmin(1.5)).unwrap(),
            tiptilt_limits: MagnitudeLimits::new(MagnitudeBand::R, 16.0, Some(8.0)).unwrap(),
            flexure_limits: MagnitudeLimits::faint_only(MagnitudeBand::R, 16.0).unwrap(),
            tiptilt_capable: true,
        },
        instrument: GroupSearchSpec {
            group: odgw(),
            radius_limits: RadiusLimits::disc(arcmin(1.0)).unwrap(),
            tiptilt_limits: MagnitudeLimits::faint_only(MagnitudeBand::H, 15.0).unwrap(),
            flexure_limits: MagnitudeLimits::faint_only(MagnitudeBand::H, 17.0).unwrap(),
            tiptilt_capable: false,
        },
        mode: TipTiltMode::Both,
        position_angles: vec![degrees(0.0), degrees(180.0)],
        offset: None,
    }
}

fn context() -> ObservationContext {
    ObservationContext::new(SkyCoordinates::from_degrees(150.0, -30.0), degrees(0.0))
}

fn brightness_estimator() -> Arc<dyn QualityEstimator> {
    Arc::new(|stars: &[SkyObject], _: &ObservationContext| {
        let total: f64 = stars
            .iter()
            .filter_map(|s| s.magnitude(MagnitudeBand::R))
            .map(|m| 20.0 - m.brightness)
            .sum();
        Ok::<_, EstimatorError>(Quality::uniform(total / 100.0))
    })
}

/// Forwards to the JSON catalog and keeps every plan it answers.
struct RecordingCatalog {
    inner: Arc<dyn CatalogQuery>,
    plans: Mutex<Vec<CatalogQueryPlan>>,
}

#[async_trait]
impl CatalogQuery for RecordingCatalog {
    fn name(&self) -> &str {
        "recording"
    }

    fn bands(&self) -> Vec<MagnitudeBand> {
        self.inner.bands()
    }

    async fn query(&self, plan: &CatalogQueryPlan) -> AgsResult<Vec<SkyObject>> {
        self.plans.lock().push(plan.clone());
        self.inner.query(plan).await
    }
}

fn service(config: AgsConfig) -> GuideStarSearch {
    let oracle: Arc<dyn ReachabilityOracle> = Arc::new(AlwaysReachable);
    GuideStarSearch::new(config, oracle, brightness_estimator()).with_catalog(catalog())
}

#[tokio::test]
async fn test_end_to_end_search() {
    let search = service(AgsConfig::default());
    let outcome = search.search(&options(canopus()), &context()).await.unwrap();

    // The instrument cannot do tiptilt, so only Canopus tiptilt + GSAOI
    // flexure is searched: 2 angles x C(4,3) x 2 flexure stars.
    assert_eq!(outcome.total, 16);
    assert_eq!(outcome.evaluated, 16);
    assert_eq!(outcome.asterisms.len(), 32);
    assert_eq!(outcome.estimator_calls, 4);

    let best = outcome.best().unwrap();
    assert!((best.quality().avg - 0.255).abs() < 1e-12);
    assert_eq!(best.position_angle().value(), 0.0);
    assert_eq!(best.star_for(&"CWFS3".into()).unwrap().name(), "s1");
    assert_eq!(best.star_for(&"ODGW1".into()).unwrap().name(), "h1");
}

#[tokio::test]
async fn test_candidates_are_filtered_by_criteria() {
    let search = service(AgsConfig::default());
    let sets = search.find_candidates(&options(canopus()), &context()).await.unwrap();

    assert_eq!(sets.len(), 2);
    let tiptilt: Vec<&str> = sets[0].candidates().iter().map(|s| s.name()).collect();
    assert_eq!(tiptilt, vec!["s1", "s2", "s3", "s4"]);
    let flexure: Vec<&str> = sets[1].candidates().iter().map(|s| s.name()).collect();
    assert_eq!(flexure, vec!["h1", "h2"]);
}

#[tokio::test]
async fn test_query_plan_merging() {
    let merged = service(AgsConfig::default());
    let plans = merged.plan(&options(canopus()), &context()).unwrap();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].criteria, vec![0, 1]);
    assert_eq!(plans[0].magnitude_limits.len(), 2);

    let config: AgsConfig = "[catalog]\nmerge_queries = false".parse().unwrap();
    let split = service(config);
    assert_eq!(split.plan(&options(canopus()), &context()).unwrap().len(), 2);
}

#[tokio::test]
async fn test_invalid_group_is_rejected() {
    let broken = canopus().with_anchor_probe("PWFS1".into());
    let search = service(AgsConfig::default());
    let err = search.search(&options(broken), &context()).await.unwrap_err();
    assert!(matches!(err, AgsError::InvalidConfiguration(_)));
}

#[tokio::test]
async fn test_search_without_catalogs() {
    let search = GuideStarSearch::new(
        AgsConfig::default(),
        Arc::new(AlwaysReachable),
        Arc::new(|_: &[SkyObject], _: &ObservationContext| Ok::<_, EstimatorError>(Quality::uniform(0.1))),
    );
    let err = search.search(&options(canopus()), &context()).await.unwrap_err();
    assert!(matches!(err, AgsError::CatalogError(_)));
}

#[tokio::test]
async fn test_progress_sink_can_cancel() {
    let events = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&events);
    let config: AgsConfig = "[analyzer]\nparallel = false".parse().unwrap();
    let search = service(config).with_progress(Arc::new(move |_: &ProgressEvent| {
        counter.fetch_add(1, Ordering::SeqCst) < 2
    }));
    let outcome = search.search(&options(canopus()), &context()).await.unwrap();

    assert!(outcome.cancelled);
    assert!(outcome.asterisms.len() < 32);
    assert!(events.load(Ordering::SeqCst) >= 3);
}

#[tokio::test]
async fn test_merge_queries_controls_catalog_requests() {
    let run = |config: AgsConfig| async move {
        let recorder = Arc::new(RecordingCatalog {
            inner: catalog(),
            plans: Mutex::new(Vec::new()),
        });
        let catalog: Arc<dyn CatalogQuery> = recorder.clone();
        let search = GuideStarSearch::new(config, Arc::new(AlwaysReachable), brightness_estimator())
            .with_catalog(catalog);
        let outcome = search.search(&options(canopus()), &context()).await.unwrap();
        let plans = recorder.plans.lock().clone();
        (plans, outcome)
    };

    let (merged_plans, merged) = run(AgsConfig::default()).await;
    assert_eq!(merged_plans.len(), 1);
    assert_eq!(merged_plans[0].criteria, vec![0, 1]);
    assert_eq!(merged_plans[0].magnitude_limits.len(), 2);

    let (split_plans, split) = run("[catalog]\nmerge_queries = false".parse().unwrap()).await;
    assert_eq!(split_plans.len(), 2);
    assert_eq!(split_plans[0].criteria, vec![0]);
    assert_eq!(split_plans[1].criteria, vec![1]);
    assert!(split_plans.iter().all(|p| p.magnitude_limits.len() == 1));

    assert_eq!(merged.total, 16);
    assert_eq!(merged.checksum(), split.checksum());
}

#[tokio::test]
async fn test_observation_instant_moves_candidates() {
    // 5' north of the base at J2000, moving 60"/yr south.
    let moving = r#"[
        {"id": "mover", "name": "mover", "ra": 150.0, "dec": -29.916666666666668,
         "pm_dec": -60000.0, "magnitudes": {"R": 12.0}}
    ]"#;
    let loaded = CatalogLoader::load_from_json_str(moving).unwrap();
    let catalog: Arc<dyn CatalogQuery> = Arc::new(loaded.into_catalog("moving"));
    let search = GuideStarSearch::new(AgsConfig::default(), Arc::new(AlwaysReachable), brightness_estimator())
        .with_catalog(catalog);

    let now = context().with_instant(Utc.with_ymd_and_hms(2005, 1, 1, 0, 0, 0).unwrap());
    let sets = search.find_candidates(&options(canopus()), &now).await.unwrap();
    let names: Vec<&str> = sets[0].candidates().iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["mover"]);

    let sets = search.find_candidates(&options(canopus()), &context()).await.unwrap();
    assert!(sets[0].is_empty());
}

#[tokio::test]
async fn test_analyze_rejects_invalid_analyzer_config() {
    let mut config = AgsConfig::default();
    config.analyzer.min_separation_arcsec = f64::NAN;
    let search = service(config);
    let candidates = service(AgsConfig::default())
        .find_candidates(&options(canopus()), &context())
        .await
        .unwrap();

    let err = search
        .analyze(candidates, &options(canopus()), &context())
        .await
        .unwrap_err();
    assert!(matches!(err, AgsError::ConfigurationError(_)));
}
