//! Catalog query seam and an in-memory catalog.
//!
//! Remote catalog protocols live outside this crate. Anything able to answer
//! a [`CatalogQueryPlan`] (a region plus per-band magnitude ranges)
//! implements [`CatalogQuery`]; [`LocalCatalog`] is the in-memory
//! implementation used for user-supplied star lists and tests.
//! [`search_catalogs`] plans the queries, fans them out and sorts the answers
//! back into one candidate set per criterion.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::task::JoinSet;

use super::candidates::{CandidateAggregator, CandidateSet, SearchCriterion};
use super::planning::{plan_queries, CatalogQueryPlan};
use crate::core::coordinates::SkyCoordinates;
use crate::core::magnitude::MagnitudeBand;
use crate::core::sky_object::SkyObject;
use crate::error::{AgsError, AgsResult};

/// A source of guide star candidates.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` so that several catalogs can be
/// queried concurrently.
#[async_trait]
pub trait CatalogQuery: Send + Sync {
    /// Catalog name used in logs.
    fn name(&self) -> &str;

    /// Bands this catalog provides magnitudes in.
    fn bands(&self) -> Vec<MagnitudeBand>;

    /// Stars inside the plan's region that fall in at least one of its
    /// magnitude ranges. Only bands returned by [`CatalogQuery::bands`] are
    /// ever requested.
    async fn query(&self, plan: &CatalogQueryPlan) -> AgsResult<Vec<SkyObject>>;

    /// Returns one candidate set per criterion, in criterion order, from a
    /// single merged query.
    async fn search(
        &self,
        criteria: &[SearchCriterion],
        base: &SkyCoordinates,
    ) -> AgsResult<Vec<CandidateSet>> {
        let mut aggregator = CandidateAggregator::new(base, criteria.to_vec());
        for plan in plan_queries(base, criteria, true)? {
            let stars = self.query(&plan).await?;
            aggregator.add_results(stars.iter());
        }
        Ok(aggregator.finish())
    }
}

/// In-memory catalog.
#[derive(Clone)]
pub struct LocalCatalog {
    name: String,
    bands: BTreeSet<MagnitudeBand>,
    stars: Arc<RwLock<Vec<SkyObject>>>,
}

impl LocalCatalog {
    pub fn new(name: impl Into<String>, bands: impl IntoIterator<Item = MagnitudeBand>) -> Self {
        Self {
            name: name.into(),
            bands: bands.into_iter().collect(),
            stars: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Catalog whose bands are those measured on at least one of `stars`.
    pub fn from_stars(name: impl Into<String>, stars: Vec<SkyObject>) -> Self {
        let bands: BTreeSet<MagnitudeBand> = stars
            .iter()
            .flat_map(|s| s.magnitudes().iter().map(|m| m.band))
            .collect();
        let catalog = Self::new(name, bands);
        catalog.add_stars(stars);
        catalog
    }

    pub fn add_stars(&self, stars: impl IntoIterator<Item = SkyObject>) {
        self.stars.write().extend(stars);
    }

    pub fn len(&self) -> usize {
        self.stars.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.read().is_empty()
    }

    pub fn provides(&self, band: MagnitudeBand) -> bool {
        self.bands.contains(&band)
    }
}

#[async_trait]
impl CatalogQuery for LocalCatalog {
    fn name(&self) -> &str {
        &self.name
    }

    fn bands(&self) -> Vec<MagnitudeBand> {
        self.bands.iter().copied().collect()
    }

    async fn query(&self, plan: &CatalogQueryPlan) -> AgsResult<Vec<SkyObject>> {
        if let Some(band) = plan.bands().find(|band| !self.provides(*band)) {
            return Err(AgsError::CatalogError(format!(
                "Catalog {} has no {} magnitudes",
                self.name, band
            )));
        }

        let stars = self.stars.read();
        Ok(stars.iter().filter(|s| plan.admits(s)).cloned().collect())
    }
}

/// Queries several catalogs concurrently and merges their answers per
/// criterion.
///
/// Each catalog only receives the criteria whose band it provides, planned
/// with [`plan_queries`]. With `instant`, proper motion is applied both in
/// the catalog's region test and in the per-criterion matchers. Results are
/// merged in catalog order, then plan order, so the first catalog to report a
/// star wins.
pub async fn search_catalogs(
    catalogs: &[Arc<dyn CatalogQuery>],
    criteria: &[SearchCriterion],
    base: &SkyCoordinates,
    merge: bool,
    instant: Option<DateTime<Utc>>,
) -> AgsResult<Vec<CandidateSet>> {
    let mut merged: Vec<CandidateSet> = criteria
        .iter()
        .map(|c| CandidateSet::new(c.clone(), Vec::new()))
        .collect();

    for (i, c) in criteria.iter().enumerate() {
        let band = c.criterion.band();
        if !catalogs.iter().any(|cat| cat.bands().contains(&band)) {
            log::warn!(
                "No catalog provides {} magnitudes; criterion {} ('{}') will have no candidates",
                band,
                i,
                c.criterion.name()
            );
        }
    }

    // Criterion indices served by each catalog.
    let mut served: Vec<Vec<usize>> = Vec::with_capacity(catalogs.len());
    let mut tasks = JoinSet::new();
    for (catalog_index, catalog) in catalogs.iter().enumerate() {
        let bands = catalog.bands();
        let (indices, subset): (Vec<usize>, Vec<SearchCriterion>) = criteria
            .iter()
            .enumerate()
            .filter(|(_, c)| bands.contains(&c.criterion.band()))
            .map(|(i, c)| (i, c.clone()))
            .unzip();
        served.push(indices);

        for (plan_index, plan) in plan_queries(base, &subset, merge)?.into_iter().enumerate() {
            let plan = plan.at_instant(instant);
            log::debug!(
                "Catalog {} query around {} within {} for {} criteria ({} bands)",
                catalog.name(),
                plan.center,
                plan.radius_limits,
                plan.criteria.len(),
                plan.magnitude_limits.len()
            );
            let catalog = Arc::clone(catalog);
            tasks.spawn(async move {
                let result = catalog.query(&plan).await;
                (catalog_index, plan_index, plan, result)
            });
        }
    }

    let mut answers = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let (catalog_index, plan_index, plan, result) =
            joined.map_err(|e| AgsError::CatalogError(format!("Catalog task failed: {e}")))?;
        answers.push((catalog_index, plan_index, plan, result?));
    }
    answers.sort_by_key(|(catalog_index, plan_index, _, _)| (*catalog_index, *plan_index));

    for (catalog_index, _, plan, stars) in answers {
        log::debug!(
            "Catalog {} returned {} stars",
            catalogs[catalog_index].name(),
            stars.len()
        );
        let indices: Vec<usize> = plan
            .criteria
            .iter()
            .map(|&k| served[catalog_index][k])
            .collect();
        let plan_criteria: Vec<SearchCriterion> =
            indices.iter().map(|&i| criteria[i].clone()).collect();
        let mut aggregator = match instant {
            Some(instant) => CandidateAggregator::at_instant(base, plan_criteria, instant),
            None => CandidateAggregator::new(base, plan_criteria),
        };
        aggregator.add_results(stars.iter());
        for (index, set) in indices.into_iter().zip(aggregator.finish()) {
            merged[index].extend(set.candidates().iter().cloned());
        }
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::candidates::SearchKey;
    use crate::catalog::criterion::{CatalogSearchCriterion, RadiusLimits};
    use crate::core::angle::arcmin;
    use crate::core::coordinates::ProperMotion;
    use crate::core::guide::{GuideProbeGroup, GuideStarType};
    use crate::core::magnitude::{Magnitude, MagnitudeLimits};
    use chrono::TimeZone;
    use parking_lot::Mutex;

    fn criterion(band: MagnitudeBand) -> SearchCriterion {
        SearchCriterion::new(
            SearchKey::new(
                GuideStarType::Tiptilt,
                GuideProbeGroup::new("g", vec!["P1".into()]),
            ),
            CatalogSearchCriterion::new(
                format!("g {}", band),
                MagnitudeLimits::faint_only(band, 15.0).unwrap(),
                RadiusLimits::disc(arcmin(2.0)).unwrap(),
            ),
        )
    }

    fn star(id: &str, band: MagnitudeBand) -> SkyObject {
        SkyObject::builder(id, SkyCoordinates::from_degrees(10.0, 15.01))
            .catalog_id(id)
            .magnitude(Magnitude::new(band, 12.0))
            .build()
    }

    fn base() -> SkyCoordinates {
        SkyCoordinates::from_degrees(10.0, 15.0)
    }

    /// Wraps a catalog and keeps every plan it is asked to answer.
    struct RecordingCatalog {
        inner: LocalCatalog,
        plans: Mutex<Vec<CatalogQueryPlan>>,
    }

    #[async_trait]
    impl CatalogQuery for RecordingCatalog {
        fn name(&self) -> &str {
            self.inner.name()
        }

        fn bands(&self) -> Vec<MagnitudeBand> {
            self.inner.bands()
        }

        async fn query(&self, plan: &CatalogQueryPlan) -> AgsResult<Vec<SkyObject>> {
            self.plans.lock().push(plan.clone());
            self.inner.query(plan).await
        }
    }

    #[tokio::test]
    async fn test_local_catalog_query() {
        let catalog = LocalCatalog::from_stars(
            "user",
            vec![
                star("a", MagnitudeBand::R),
                star("b", MagnitudeBand::R),
                SkyObject::builder("far", SkyCoordinates::from_degrees(10.0, 15.1))
                    .magnitude(Magnitude::new(MagnitudeBand::R, 12.0))
                    .build(),
            ],
        );
        assert_eq!(catalog.len(), 3);
        let plan = plan_queries(&base(), &[criterion(MagnitudeBand::R)], true)
            .unwrap()
            .remove(0);
        let stars = catalog.query(&plan).await.unwrap();
        let ids: Vec<&str> = stars.iter().map(|s| s.name()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_local_catalog_search() {
        let catalog = LocalCatalog::from_stars(
            "user",
            vec![star("a", MagnitudeBand::R), star("h", MagnitudeBand::H)],
        );
        let sets = catalog
            .search(&[criterion(MagnitudeBand::R), criterion(MagnitudeBand::H)], &base())
            .await
            .unwrap();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].candidates()[0].name(), "a");
        assert_eq!(sets[1].candidates()[0].name(), "h");
        assert_eq!(sets[0].len() + sets[1].len(), 2);
    }

    #[tokio::test]
    async fn test_local_catalog_rejects_missing_band() {
        let catalog = LocalCatalog::new("user", [MagnitudeBand::R]);
        let plan = plan_queries(&base(), &[criterion(MagnitudeBand::H)], true)
            .unwrap()
            .remove(0);
        let err = catalog.query(&plan).await.unwrap_err();
        assert!(matches!(err, AgsError::CatalogError(_)));
    }

    #[tokio::test]
    async fn test_search_catalogs_merges_by_band() {
        let r_catalog: Arc<dyn CatalogQuery> = Arc::new(LocalCatalog::from_stars(
            "optical",
            vec![star("a", MagnitudeBand::R), star("shared", MagnitudeBand::R)],
        ));
        let h_catalog: Arc<dyn CatalogQuery> = Arc::new(LocalCatalog::from_stars(
            "infrared",
            vec![star("c", MagnitudeBand::H)],
        ));
        let dup_catalog: Arc<dyn CatalogQuery> = Arc::new(LocalCatalog::from_stars(
            "copy",
            vec![star("shared", MagnitudeBand::R)],
        ));
        let sets = search_catalogs(
            &[r_catalog, h_catalog, dup_catalog],
            &[criterion(MagnitudeBand::R), criterion(MagnitudeBand::H), criterion(MagnitudeBand::K)],
            &base(),
            true,
            None,
        )
        .await
        .unwrap();
        assert_eq!(sets.len(), 3);
        let r_ids: Vec<&str> = sets[0].candidates().iter().map(|s| s.name()).collect();
        assert_eq!(r_ids, vec!["a", "shared"]);
        assert_eq!(sets[1].len(), 1);
        assert!(sets[2].is_empty());
    }

    #[tokio::test]
    async fn test_search_catalogs_follows_merge_setting() {
        let mut tight = criterion(MagnitudeBand::R);
        tight.criterion = CatalogSearchCriterion::new(
            "tight",
            MagnitudeLimits::faint_only(MagnitudeBand::R, 13.0).unwrap(),
            RadiusLimits::disc(arcmin(1.0)).unwrap(),
        );
        let criteria = vec![criterion(MagnitudeBand::R), tight];

        let run = |merge: bool| {
            let criteria = criteria.clone();
            async move {
                let recorder = Arc::new(RecordingCatalog {
                    inner: LocalCatalog::from_stars("user", vec![star("a", MagnitudeBand::R)]),
                    plans: Mutex::new(Vec::new()),
                });
                let catalog: Arc<dyn CatalogQuery> = recorder.clone();
                let sets = search_catalogs(&[catalog], &criteria, &base(), merge, None)
                    .await
                    .unwrap();
                let plans = recorder.plans.lock().clone();
                (plans, sets)
            }
        };

        let (merged_plans, merged_sets) = run(true).await;
        assert_eq!(merged_plans.len(), 1);
        assert_eq!(merged_plans[0].criteria, vec![0, 1]);
        assert_eq!(merged_plans[0].magnitude_limits.len(), 1);
        assert_eq!(merged_plans[0].magnitude_limits[0].faintness_limit(), 15.0);

        let (split_plans, split_sets) = run(false).await;
        assert_eq!(split_plans.len(), 2);
        assert_eq!(split_plans[0].criteria, vec![0]);
        assert_eq!(split_plans[1].criteria, vec![1]);
        assert_eq!(split_plans[1].magnitude_limits[0].faintness_limit(), 13.0);

        // Either way each criterion ends up with the same candidates.
        for (a, b) in merged_sets.iter().zip(&split_sets) {
            assert_eq!(a.len(), b.len());
        }
        assert_eq!(merged_sets[0].len(), 1);
        assert_eq!(merged_sets[1].len(), 1);
    }

    #[tokio::test]
    async fn test_search_catalogs_applies_proper_motion() {
        // 5' north at J2000, drifting 60"/yr south: at the base by 2005.
        let moving = SkyObject::builder(
            "moving",
            SkyCoordinates::from_degrees(10.0, 15.0 + 5.0 / 60.0)
                .with_proper_motion(ProperMotion::new(0.0, -60_000.0)),
        )
        .magnitude(Magnitude::new(MagnitudeBand::R, 12.0))
        .build();
        let catalog: Arc<dyn CatalogQuery> = Arc::new(LocalCatalog::from_stars("user", vec![moving]));
        let catalogs = vec![catalog];
        let criteria = [criterion(MagnitudeBand::R)];
        let instant = Utc.with_ymd_and_hms(2005, 1, 1, 12, 0, 0).unwrap();

        let static_sets = search_catalogs(&catalogs, &criteria, &base(), true, None)
            .await
            .unwrap();
        assert!(static_sets[0].is_empty());

        for merge in [true, false] {
            let sets = search_catalogs(&catalogs, &criteria, &base(), merge, Some(instant))
                .await
                .unwrap();
            assert_eq!(sets[0].len(), 1);
        }
    }
}
