//! Asterism analysis.
//!
//! For every tiptilt/flexure candidate pair and every position angle the
//! analyzer enumerates star selections, rejects the ones failing the cheap
//! geometric checks, assigns the survivors to probes, asks the (memoized)
//! quality estimator about the tiptilt stars and ranks everything at the end.
//!
//! Work is split in two phases:
//! 1. one unit per (pair, position angle): reachability tables are built and
//!    unreachable candidates dropped;
//! 2. every unit enumerates its combinations.
//!
//! Both phases run on the rayon pool when `parallel` is set. The final sort is
//! the only source of ordering, so the output does not depend on scheduling.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use rayon::prelude::*;

use super::assignment::{assign_flexure, assign_tiptilt, ProbeAssignment, ProbeOrder, ReachTable};
use super::combinations::{binomial, IndexCombinations};
use super::estimator::QualityEstimator;
use super::memo::{MemoKey, QualityCache};
use super::progress::{NoProgress, ProgressEvent, ProgressSink};
use super::ranking::{rank, ranking_checksum};
use super::reachability::ReachabilityOracle;
use crate::catalog::candidates::{pair_tiptilt_flexure, CandidateSet};
use crate::config::AnalyzerConfig;
use crate::core::angle::{dedup_angles, Angle};
use crate::core::asterism::{Asterism, Quality};
use crate::core::context::ObservationContext;
use crate::core::guide::GuideProbeGroup;
use crate::core::magnitude::MagnitudeBand;
use crate::core::sky_object::SkyObject;
use crate::error::EstimatorError;

/// Result of one analyzer run.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    /// Ranked asterisms, best first.
    pub asterisms: Vec<Asterism>,
    /// Whether the progress sink stopped the run early.
    pub cancelled: bool,
    pub evaluated: u64,
    pub total: u64,
    pub estimator_calls: usize,
    pub failures: usize,
}

impl AnalysisOutcome {
    fn empty() -> Self {
        Self {
            asterisms: Vec::new(),
            cancelled: false,
            evaluated: 0,
            total: 0,
            estimator_calls: 0,
            failures: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.asterisms.is_empty()
    }

    pub fn best(&self) -> Option<&Asterism> {
        self.asterisms.first()
    }

    pub fn checksum(&self) -> String {
        ranking_checksum(&self.asterisms)
    }
}

/// Candidates of one group sorted brightest first in the criterion band.
struct PreparedSet {
    group: GuideProbeGroup,
    stars: Vec<SkyObject>,
    brightness: Vec<f64>,
}

impl PreparedSet {
    fn new(set: &CandidateSet) -> Self {
        let band = set.criterion().criterion.band();
        let mut rows: Vec<(f64, &SkyObject)> = set
            .candidates()
            .iter()
            .filter_map(|s| brightness_in(s, band).map(|b| (b, s)))
            .collect();
        rows.sort_by(|a, b| {
            a.0.total_cmp(&b.0)
                .then_with(|| a.1.identity().cmp(&b.1.identity()))
        });
        Self {
            group: set.group().clone(),
            brightness: rows.iter().map(|(b, _)| *b).collect(),
            stars: rows.into_iter().map(|(_, s)| s.clone()).collect(),
        }
    }
}

fn brightness_in(star: &SkyObject, band: MagnitudeBand) -> Option<f64> {
    star.magnitude(band).map(|m| m.brightness)
}

struct PreparedPair {
    tiptilt: PreparedSet,
    flexure: Option<PreparedSet>,
}

/// One (pair, position angle) work unit.
struct Unit<'p> {
    pair: &'p PreparedPair,
    position_angle: Angle,
    tiptilt_table: ReachTable,
    flexure_table: Option<ReachTable>,
    /// Indices into `pair.tiptilt.stars` reachable at this angle.
    tiptilt: Vec<usize>,
    flexure: Vec<usize>,
    total: u64,
}

/// State shared by all units of a run.
struct RunState {
    cache: QualityCache,
    evaluated: AtomicU64,
    cancelled: AtomicBool,
    total: u64,
}

impl RunState {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Enumerates, evaluates and ranks asterisms.
pub struct AsterismAnalyzer<'a> {
    config: AnalyzerConfig,
    oracle: &'a dyn ReachabilityOracle,
    estimator: &'a dyn QualityEstimator,
    progress: &'a dyn ProgressSink,
}

impl<'a> AsterismAnalyzer<'a> {
    pub fn new(
        config: AnalyzerConfig,
        oracle: &'a dyn ReachabilityOracle,
        estimator: &'a dyn QualityEstimator,
    ) -> Self {
        Self {
            config,
            oracle,
            estimator,
            progress: &NoProgress,
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressSink) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyzes the candidate sets at each position angle.
    ///
    /// An empty angle list means the context's own position angle. The
    /// estimator receives `context` unchanged, whatever the angle being
    /// evaluated.
    pub fn analyze(
        &self,
        context: &ObservationContext,
        position_angles: &[Angle],
        candidates: &[CandidateSet],
    ) -> AnalysisOutcome {
        let angles = if position_angles.is_empty() {
            vec![context.position_angle]
        } else {
            dedup_angles(position_angles)
        };

        let pairs: Vec<PreparedPair> = pair_tiptilt_flexure(candidates)
            .into_iter()
            .filter(|(t, f)| usable_group(t) && f.map_or(true, usable_group))
            .map(|(t, f)| PreparedPair {
                tiptilt: PreparedSet::new(t),
                flexure: f.map(PreparedSet::new),
            })
            .collect();
        if pairs.is_empty() {
            log::debug!("No tiptilt candidate sets to analyze");
            return AnalysisOutcome::empty();
        }

        for pair in &pairs {
            self.progress
                .set_title(&format!("Finding asterisms for {}", pair.tiptilt.group.display_name()));
        }

        let jobs: Vec<(&PreparedPair, Angle)> = pairs
            .iter()
            .flat_map(|pair| angles.iter().map(move |&pa| (pair, pa)))
            .collect();
        let units: Vec<Unit<'_>> = if self.config.parallel {
            jobs.par_iter()
                .filter_map(|&(pair, pa)| self.prepare(pair, pa, context))
                .collect()
        } else {
            jobs.iter()
                .filter_map(|&(pair, pa)| self.prepare(pair, pa, context))
                .collect()
        };

        let total = units
            .iter()
            .fold(0u64, |acc, unit| acc.saturating_add(unit.total));
        log::info!(
            "Analyzing {} candidate pairs at {} position angles: {} combinations",
            pairs.len(),
            angles.len(),
            total
        );

        let state = RunState {
            cache: QualityCache::new(),
            evaluated: AtomicU64::new(0),
            cancelled: AtomicBool::new(false),
            total,
        };

        let found: Vec<Asterism> = if self.config.parallel {
            units
                .par_iter()
                .flat_map_iter(|unit| self.evaluate(unit, context, &state))
                .collect()
        } else {
            units
                .iter()
                .flat_map(|unit| self.evaluate(unit, context, &state))
                .collect()
        };

        let cancelled = state.is_cancelled();
        let asterisms = rank(found, self.config.max_results);
        let outcome = AnalysisOutcome {
            asterisms,
            cancelled,
            evaluated: state.evaluated.load(Ordering::Relaxed),
            total,
            estimator_calls: state.cache.estimator_calls(),
            failures: state.cache.failures(),
        };

        log::info!(
            "Found {} asterisms ({} of {} combinations evaluated, {} estimator calls, {} failures{})",
            outcome.asterisms.len(),
            outcome.evaluated,
            outcome.total,
            outcome.estimator_calls,
            outcome.failures,
            if cancelled { ", cancelled" } else { "" }
        );
        if log::log_enabled!(log::Level::Debug) {
            log::debug!("Ranking checksum {}", outcome.checksum());
        }
        outcome
    }

    /// Builds the work unit of a pair at one angle, or `None` when either
    /// group has fewer reachable candidates than slots.
    fn prepare<'p>(
        &self,
        pair: &'p PreparedPair,
        position_angle: Angle,
        context: &ObservationContext,
    ) -> Option<Unit<'p>> {
        let at_angle = context.at_position_angle(position_angle);
        let tiptilt = &pair.tiptilt;
        let tiptilt_table = ReachTable::build(
            &tiptilt.group,
            &tiptilt.stars,
            position_angle,
            &at_angle,
            self.oracle,
        );
        let tiptilt_ok: Vec<usize> = (0..tiptilt.stars.len())
            .filter(|&i| tiptilt_table.reaches_any(i))
            .collect();
        let k = tiptilt.group.tiptilt_slots();
        if tiptilt_ok.len() < k {
            log::debug!(
                "{} at {:.2}°: {} reachable tiptilt candidates for {} slots",
                tiptilt.group.key(),
                position_angle.value(),
                tiptilt_ok.len(),
                k
            );
            return None;
        }

        let (flexure_table, flexure_ok, m) = match &pair.flexure {
            None => (None, Vec::new(), 0),
            Some(flexure) => {
                let table = ReachTable::build(
                    &flexure.group,
                    &flexure.stars,
                    position_angle,
                    &at_angle,
                    self.oracle,
                );
                let ok: Vec<usize> = (0..flexure.stars.len())
                    .filter(|&i| table.reaches_any(i))
                    .collect();
                (Some(table), ok, flexure.group.flexure_slots())
            }
        };
        if flexure_ok.len() < m {
            log::debug!(
                "{} at {:.2}°: {} reachable flexure candidates for {} slots",
                tiptilt.group.key(),
                position_angle.value(),
                flexure_ok.len(),
                m
            );
            return None;
        }

        let total = binomial(tiptilt_ok.len(), k).saturating_mul(binomial(flexure_ok.len(), m));
        Some(Unit {
            pair,
            position_angle,
            tiptilt_table,
            flexure_table,
            tiptilt: tiptilt_ok,
            flexure: flexure_ok,
            total,
        })
    }

    fn evaluate(
        &self,
        unit: &Unit<'_>,
        context: &ObservationContext,
        state: &RunState,
    ) -> Vec<Asterism> {
        let tiptilt = &unit.pair.tiptilt;
        let k = tiptilt.group.tiptilt_slots();
        let m = unit
            .pair
            .flexure
            .as_ref()
            .map_or(0, |f| f.group.flexure_slots());
        let per_selection = binomial(unit.flexure.len(), m);

        let mut found = Vec::new();
        let mut selections = IndexCombinations::new(unit.tiptilt.len(), k);
        'selections: while let Some(positions) = selections.advance() {
            if state.is_cancelled() {
                break;
            }
            let selection: Vec<usize> = positions.iter().map(|&p| unit.tiptilt[p]).collect();
            let assignments = if self.tiptilt_selection_ok(tiptilt, &selection) {
                self.tiptilt_assignments(unit, &selection)
            } else {
                Vec::new()
            };
            if assignments.is_empty() {
                state.evaluated.fetch_add(per_selection, Ordering::Relaxed);
                continue;
            }

            let mut flexures = IndexCombinations::new(unit.flexure.len(), m);
            while let Some(flexure_positions) = flexures.advance() {
                if state.is_cancelled() {
                    break 'selections;
                }
                state.evaluated.fetch_add(1, Ordering::Relaxed);
                let flexure_selection: Vec<usize> = flexure_positions
                    .iter()
                    .map(|&p| unit.flexure[p])
                    .collect();
                let Some(flexure_assignment) =
                    self.flexure_assignment(unit, &selection, &flexure_selection)
                else {
                    continue;
                };

                let key = MemoKey::new(
                    tiptilt.group.key(),
                    selection.iter().map(|&i| &tiptilt.stars[i]),
                );
                let result = state
                    .cache
                    .get_or_estimate(key, || self.estimate(tiptilt, &selection, context));
                match result {
                    Err(err) => {
                        log::debug!("Discarding selection in {}: {}", tiptilt.group.key(), err);
                        self.report(state, None, false);
                    }
                    Ok(quality) => {
                        for assignment in &assignments {
                            if state.is_cancelled() {
                                break 'selections;
                            }
                            found.push(self.assemble(unit, assignment, &flexure_assignment, quality));
                            self.report(state, Some(quality), true);
                        }
                    }
                }
            }
        }
        found
    }

    /// Magnitude spread and pairwise separation of a tiptilt selection.
    fn tiptilt_selection_ok(&self, set: &PreparedSet, selection: &[usize]) -> bool {
        if let (Some(spread), Some(&first), Some(&last)) =
            (self.config.max_magnitude_spread, selection.first(), selection.last())
        {
            // Selections are brightest first.
            if set.brightness[last] - set.brightness[first] > spread {
                return false;
            }
        }
        let min = self.config.min_separation();
        selection.iter().enumerate().all(|(n, &a)| {
            selection[n + 1..]
                .iter()
                .all(|&b| separated(&set.stars[a], &set.stars[b], min))
        })
    }

    /// Forward assignment, plus the reverse one when the group asks for it
    /// and it differs.
    fn tiptilt_assignments(&self, unit: &Unit<'_>, selection: &[usize]) -> Vec<ProbeAssignment> {
        let group = &unit.pair.tiptilt.group;
        let mut assignments = Vec::with_capacity(2);
        if let Some(forward) =
            assign_tiptilt(group, &unit.tiptilt_table, selection, ProbeOrder::Forward)
        {
            assignments.push(forward);
        }
        if group.reverse_order() {
            if let Some(reverse) =
                assign_tiptilt(group, &unit.tiptilt_table, selection, ProbeOrder::Reverse)
            {
                if !assignments.contains(&reverse) {
                    assignments.push(reverse);
                }
            }
        }
        assignments
    }

    fn flexure_assignment(
        &self,
        unit: &Unit<'_>,
        tiptilt_selection: &[usize],
        flexure_selection: &[usize],
    ) -> Option<ProbeAssignment> {
        let (Some(flexure), Some(table)) = (&unit.pair.flexure, &unit.flexure_table) else {
            return Some(Vec::new());
        };
        let tiptilt = &unit.pair.tiptilt;
        let min = self.config.min_separation();

        for (n, &f) in flexure_selection.iter().enumerate() {
            let star = &flexure.stars[f];
            let clear_of_flexure = flexure_selection[n + 1..]
                .iter()
                .all(|&g| separated(star, &flexure.stars[g], min));
            let clear_of_tiptilt = tiptilt_selection.iter().all(|&t| {
                let other = &tiptilt.stars[t];
                star.identity() != other.identity() && separated(star, other, min)
            });
            if !clear_of_flexure || !clear_of_tiptilt {
                return None;
            }
        }
        assign_flexure(&flexure.group, table, flexure_selection)
    }

    fn estimate(
        &self,
        set: &PreparedSet,
        selection: &[usize],
        context: &ObservationContext,
    ) -> Result<Quality, EstimatorError> {
        let stars: Vec<SkyObject> = selection.iter().map(|&i| set.stars[i].clone()).collect();
        let result = catch_unwind(AssertUnwindSafe(|| self.estimator.estimate(&stars, context)))
            .unwrap_or_else(|payload| Err(EstimatorError::Panicked(panic_message(payload.as_ref()))))
            .and_then(|quality| {
                if quality.is_finite() {
                    Ok(quality)
                } else {
                    Err(EstimatorError::Degenerate(format!(
                        "non-finite quality {:?}",
                        quality
                    )))
                }
            });
        if let Err(err) = &result {
            let names: Vec<&str> = stars.iter().map(SkyObject::name).collect();
            log::warn!(
                "Quality estimation failed for [{}] in {}: {}",
                names.join(", "),
                set.group.key(),
                err
            );
        }
        result
    }

    fn assemble(
        &self,
        unit: &Unit<'_>,
        tiptilt_assignment: &ProbeAssignment,
        flexure_assignment: &ProbeAssignment,
        quality: Quality,
    ) -> Asterism {
        let tiptilt = &unit.pair.tiptilt;
        let mut assignments = std::collections::BTreeMap::new();
        let mut brightness_sum = 0.0;

        for &(probe, star) in tiptilt_assignment {
            assignments.insert(
                unit.tiptilt_table.probes()[probe].clone(),
                tiptilt.stars[star].clone(),
            );
            brightness_sum += tiptilt.brightness[star];
        }
        if let (Some(flexure), Some(table)) = (&unit.pair.flexure, &unit.flexure_table) {
            for &(probe, star) in flexure_assignment {
                assignments.insert(table.probes()[probe].clone(), flexure.stars[star].clone());
                brightness_sum += flexure.brightness[star];
            }
        }

        Asterism::new(
            unit.position_angle,
            tiptilt.group.key(),
            unit.pair.flexure.as_ref().map(|f| f.group.key().to_string()),
            assignments,
            quality,
            brightness_sum,
        )
    }

    fn report(&self, state: &RunState, quality: Option<Quality>, usable: bool) {
        if state.is_cancelled() {
            return;
        }
        let event = ProgressEvent {
            quality,
            evaluated: state.evaluated.load(Ordering::Relaxed),
            total: state.total,
            usable,
        };
        if !self.progress.on_progress(&event) && !state.cancelled.swap(true, Ordering::Relaxed) {
            log::info!(
                "Analysis cancelled after {} of {} combinations",
                event.evaluated,
                event.total
            );
        }
    }
}

fn usable_group(set: &CandidateSet) -> bool {
    match set.group().validate() {
        Ok(()) => true,
        Err(err) => {
            log::warn!("Skipping candidate set {}: {}", set.key(), err);
            false
        }
    }
}

/// Whether two stars are farther apart than `min`.
fn separated(a: &SkyObject, b: &SkyObject, min: Angle) -> bool {
    a.coordinates().separation(b.coordinates()).value() > min.value()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::reachability::AlwaysReachable;
    use crate::catalog::candidates::{SearchCriterion, SearchKey};
    use crate::catalog::criterion::{CatalogSearchCriterion, RadiusLimits};
    use crate::core::angle::{arcmin, degrees};
    use crate::core::coordinates::SkyCoordinates;
    use crate::core::guide::GuideStarType;
    use crate::core::magnitude::{Magnitude, MagnitudeLimits};

    fn base() -> SkyCoordinates {
        SkyCoordinates::from_degrees(150.0, -30.0)
    }

    fn star(id: &str, dra_arcmin: f64, ddec_arcmin: f64, mag: f64) -> SkyObject {
        let c = base().offset_by(&crate::core::coordinates::Offset::new(
            arcmin(dra_arcmin),
            arcmin(ddec_arcmin),
        ));
        SkyObject::builder(id, c)
            .catalog_id(id)
            .magnitude(Magnitude::new(MagnitudeBand::R, mag))
            .build()
    }

    fn set(star_type: GuideStarType, group: GuideProbeGroup, stars: Vec<SkyObject>) -> CandidateSet {
        CandidateSet::new(
            SearchCriterion::new(
                SearchKey::new(star_type, group),
                CatalogSearchCriterion::new(
                    "c",
                    MagnitudeLimits::faint_only(MagnitudeBand::R, 18.0).unwrap(),
                    RadiusLimits::disc(arcmin(2.0)).unwrap(),
                ),
            ),
            stars,
        )
    }

    fn sum_estimator(stars: &[SkyObject], _: &ObservationContext) -> Result<Quality, EstimatorError> {
        let total: f64 = stars
            .iter()
            .filter_map(|s| s.magnitude(MagnitudeBand::R))
            .map(|m| 20.0 - m.brightness)
            .sum();
        Ok(Quality::uniform(total / 100.0))
    }

    fn config(parallel: bool) -> AnalyzerConfig {
        AnalyzerConfig {
            parallel,
            ..AnalyzerConfig::default()
        }
    }

    #[test]
    fn test_empty_candidates() {
        let ctx = ObservationContext::new(base(), degrees(0.0));
        let analyzer = AsterismAnalyzer::new(config(false), &AlwaysReachable, &sum_estimator);
        let outcome = analyzer.analyze(&ctx, &[degrees(0.0)], &[]);
        assert!(outcome.is_empty());
        assert!(!outcome.cancelled);
        assert_eq!(outcome.total, 0);
    }

    #[test]
    fn test_two_slot_group_prefers_brightest_pair() {
        let group = GuideProbeGroup::new("g", vec!["P1".into(), "P2".into()]);
        let sets = vec![set(
            GuideStarType::Tiptilt,
            group,
            vec![
                star("a", 0.5, 0.0, 12.0),
                star("b", -0.5, 0.0, 11.0),
                star("c", 0.0, 0.5, 14.0),
            ],
        )];
        let ctx = ObservationContext::new(base(), degrees(0.0));
        let analyzer = AsterismAnalyzer::new(config(false), &AlwaysReachable, &sum_estimator);
        let outcome = analyzer.analyze(&ctx, &[degrees(0.0)], &sets);

        assert_eq!(outcome.total, 3);
        assert_eq!(outcome.evaluated, 3);
        assert_eq!(outcome.asterisms.len(), 3);
        let best = outcome.best().unwrap();
        assert_eq!(best.star_for(&"P1".into()).unwrap().name(), "b");
        assert_eq!(best.star_for(&"P2".into()).unwrap().name(), "a");
        assert_eq!(best.brightness_sum(), 23.0);
    }

    #[test]
    fn test_collision_threshold_rejects_close_pairs() {
        let group = GuideProbeGroup::new("g", vec!["P1".into(), "P2".into()]);
        let sets = vec![set(
            GuideStarType::Tiptilt,
            group,
            vec![star("a", 0.0, 0.0, 12.0), star("b", 0.0, 0.01, 12.5)],
        )];
        let ctx = ObservationContext::new(base(), degrees(0.0));
        let analyzer = AsterismAnalyzer::new(config(false), &AlwaysReachable, &sum_estimator);
        let outcome = analyzer.analyze(&ctx, &[degrees(0.0)], &sets);
        // 0.6" apart, below the default 2" threshold.
        assert!(outcome.is_empty());
        assert_eq!(outcome.estimator_calls, 0);
        assert_eq!(outcome.evaluated, outcome.total);
    }

    #[test]
    fn test_magnitude_spread_limit() {
        let group = GuideProbeGroup::new("g", vec!["P1".into(), "P2".into()]);
        let sets = vec![set(
            GuideStarType::Tiptilt,
            group,
            vec![star("a", 0.5, 0.0, 10.0), star("b", -0.5, 0.0, 15.0)],
        )];
        let ctx = ObservationContext::new(base(), degrees(0.0));
        let cfg = AnalyzerConfig {
            max_magnitude_spread: Some(2.0),
            ..config(false)
        };
        let analyzer = AsterismAnalyzer::new(cfg, &AlwaysReachable, &sum_estimator);
        assert!(analyzer.analyze(&ctx, &[degrees(0.0)], &sets).is_empty());
    }

    #[test]
    fn test_flexure_star_cannot_repeat_tiptilt_star() {
        let tiptilt_group = GuideProbeGroup::new("ao", vec!["CWFS1".into()]);
        let flexure_group = GuideProbeGroup::new("inst", vec!["ODGW1".into()]);
        let shared = star("shared", 0.2, 0.2, 12.0);
        let sets = vec![
            set(GuideStarType::Tiptilt, tiptilt_group, vec![shared.clone()]),
            set(
                GuideStarType::Flexure,
                flexure_group,
                vec![shared, star("other", -0.5, 0.5, 13.0)],
            ),
        ];
        let ctx = ObservationContext::new(base(), degrees(0.0));
        let analyzer = AsterismAnalyzer::new(config(false), &AlwaysReachable, &sum_estimator);
        let outcome = analyzer.analyze(&ctx, &[degrees(0.0)], &sets);
        assert_eq!(outcome.total, 2);
        assert_eq!(outcome.asterisms.len(), 1);
        let asterism = &outcome.asterisms[0];
        assert_eq!(asterism.star_for(&"ODGW1".into()).unwrap().name(), "other");
        assert_eq!(asterism.flexure_group(), Some("inst"));
    }

    #[test]
    fn test_empty_angle_list_uses_context_angle() {
        let group = GuideProbeGroup::new("g", vec!["P1".into()]);
        let sets = vec![set(GuideStarType::Tiptilt, group, vec![star("a", 0.5, 0.0, 12.0)])];
        let ctx = ObservationContext::new(base(), degrees(30.0));
        let analyzer = AsterismAnalyzer::new(config(false), &AlwaysReachable, &sum_estimator);
        let outcome = analyzer.analyze(&ctx, &[], &sets);
        assert_eq!(outcome.asterisms.len(), 1);
        assert_eq!(outcome.asterisms[0].position_angle().value(), 30.0);
    }

    #[test]
    fn test_non_finite_quality_is_a_failure() {
        let group = GuideProbeGroup::new("g", vec!["P1".into()]);
        let sets = vec![set(GuideStarType::Tiptilt, group, vec![star("a", 0.5, 0.0, 12.0)])];
        let ctx = ObservationContext::new(base(), degrees(0.0));
        let estimator = |_: &[SkyObject], _: &ObservationContext| Ok::<_, EstimatorError>(Quality::uniform(f64::NAN));
        let analyzer = AsterismAnalyzer::new(config(false), &AlwaysReachable, &estimator);
        let outcome = analyzer.analyze(&ctx, &[degrees(0.0)], &sets);
        assert!(outcome.is_empty());
        assert_eq!(outcome.failures, 1);
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
    }
}
