//! Guide star search orchestration.
//!
//! Builds the search criteria for the requested tip-tilt mode, queries every
//! configured catalog, and runs the asterism analyzer on a blocking worker so
//! the async runtime is never stalled by the combinatorial search.

use std::sync::Arc;

use tokio::task;

use crate::algorithms::analyzer::{AnalysisOutcome, AsterismAnalyzer};
use crate::algorithms::estimator::QualityEstimator;
use crate::algorithms::progress::ProgressSink;
use crate::algorithms::reachability::ReachabilityOracle;
use crate::catalog::candidates::{CandidateSet, SearchCriterion};
use crate::catalog::local::{search_catalogs, CatalogQuery};
use crate::catalog::options::SearchOptions;
use crate::catalog::planning::{plan_queries, CatalogQueryPlan};
use crate::config::AgsConfig;
use crate::core::context::ObservationContext;
use crate::error::{AgsError, AgsResult};

/// End-to-end guide star search: catalogs in, ranked asterisms out.
///
/// # Thread Safety
/// All collaborators are shared through `Arc` and must be `Send + Sync`; a
/// single `GuideStarSearch` can serve concurrent searches.
pub struct GuideStarSearch {
    catalogs: Vec<Arc<dyn CatalogQuery>>,
    config: AgsConfig,
    oracle: Arc<dyn ReachabilityOracle>,
    estimator: Arc<dyn QualityEstimator>,
    progress: Option<Arc<dyn ProgressSink>>,
}

impl GuideStarSearch {
    pub fn new(
        config: AgsConfig,
        oracle: Arc<dyn ReachabilityOracle>,
        estimator: Arc<dyn QualityEstimator>,
    ) -> Self {
        Self {
            catalogs: Vec::new(),
            config,
            oracle,
            estimator,
            progress: None,
        }
    }

    pub fn with_catalog(mut self, catalog: Arc<dyn CatalogQuery>) -> Self {
        self.catalogs.push(catalog);
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> &AgsConfig {
        &self.config
    }

    pub fn catalogs(&self) -> &[Arc<dyn CatalogQuery>] {
        &self.catalogs
    }

    /// Criteria for the options, with every guide probe group validated.
    pub fn criteria(&self, options: &SearchOptions) -> AgsResult<Vec<SearchCriterion>> {
        let criteria = options.search_criteria();
        for criterion in &criteria {
            criterion.group().validate()?;
        }
        Ok(criteria)
    }

    /// Catalog queries covering the options around the context's base.
    pub fn plan(
        &self,
        options: &SearchOptions,
        context: &ObservationContext,
    ) -> AgsResult<Vec<CatalogQueryPlan>> {
        let criteria = self.criteria(options)?;
        plan_queries(&context.base, &criteria, self.config.catalog.merge_queries)
    }

    /// Queries all catalogs and returns one candidate set per criterion.
    ///
    /// Queries are planned per catalog, merged or not according to
    /// `catalog.merge_queries`. The context's instant, when set, moves stars
    /// with proper motion before they are matched.
    pub async fn find_candidates(
        &self,
        options: &SearchOptions,
        context: &ObservationContext,
    ) -> AgsResult<Vec<CandidateSet>> {
        if self.catalogs.is_empty() {
            return Err(AgsError::CatalogError("No catalogs configured".to_string()));
        }
        let criteria = self.criteria(options)?;
        let candidates = search_catalogs(
            &self.catalogs,
            &criteria,
            &context.base,
            self.config.catalog.merge_queries,
            context.instant,
        )
        .await?;
        log::info!(
            "Found {} candidates for {} criteria in {} catalogs",
            candidates.iter().map(CandidateSet::len).sum::<usize>(),
            criteria.len(),
            self.catalogs.len()
        );
        Ok(candidates)
    }

    /// Runs a complete search.
    ///
    /// The position angles of `options` are analyzed; with none, the context's
    /// position angle is used.
    pub async fn search(
        &self,
        options: &SearchOptions,
        context: &ObservationContext,
    ) -> AgsResult<AnalysisOutcome> {
        self.config.validate()?;
        let candidates = self.find_candidates(options, context).await?;
        self.analyze(candidates, options, context).await
    }

    /// Runs the analyzer on already gathered candidates.
    pub async fn analyze(
        &self,
        candidates: Vec<CandidateSet>,
        options: &SearchOptions,
        context: &ObservationContext,
    ) -> AgsResult<AnalysisOutcome> {
        self.config.analyzer.validate()?;
        let config = self.config.analyzer.clone();
        let oracle = Arc::clone(&self.oracle);
        let estimator = Arc::clone(&self.estimator);
        let progress = self.progress.clone();
        let angles = options.position_angles.clone();
        let context = context.clone();

        task::spawn_blocking(move || {
            let mut analyzer = AsterismAnalyzer::new(config, oracle.as_ref(), estimator.as_ref());
            if let Some(progress) = &progress {
                analyzer = analyzer.with_progress(progress.as_ref());
            }
            analyzer.analyze(&context, &angles, &candidates)
        })
        .await
        .map_err(|e| AgsError::InternalError(format!("Analyzer task failed: {e}")))
    }
}
