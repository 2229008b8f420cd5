//! Merging search criteria into catalog queries.
//!
//! Criteria of different groups usually overlap heavily, so by default they
//! are folded into a single query covering the union of their regions with
//! one magnitude range per band. The matchers then sort the results back out
//! per criterion.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::candidates::SearchCriterion;
use super::criterion::RadiusLimits;
use crate::core::angle::{degrees, Angle};
use crate::core::coordinates::SkyCoordinates;
use crate::core::magnitude::{MagnitudeBand, MagnitudeLimits};
use crate::core::sky_object::SkyObject;
use crate::error::AgsResult;

/// Saturation limit used when merging a criterion that has none.
pub const DEFAULT_SATURATION_LIMIT: f64 = 0.0;

/// One catalog query: a region plus the magnitude ranges to request.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogQueryPlan {
    pub center: SkyCoordinates,
    pub radius_limits: RadiusLimits,
    pub magnitude_limits: Vec<MagnitudeLimits>,
    /// Indices of the criteria this query serves.
    pub criteria: Vec<usize>,
    /// Star positions are propagated to this instant before the region test.
    pub instant: Option<DateTime<Utc>>,
}

impl CatalogQueryPlan {
    pub fn at_instant(mut self, instant: Option<DateTime<Utc>>) -> Self {
        self.instant = instant;
        self
    }

    pub fn bands(&self) -> impl Iterator<Item = MagnitudeBand> + '_ {
        self.magnitude_limits.iter().map(MagnitudeLimits::band)
    }

    /// Coarse region and photometry test a catalog applies before returning a
    /// star; the per-criterion matchers make the final decision.
    pub fn admits(&self, star: &SkyObject) -> bool {
        let photometric = self.magnitude_limits.iter().any(|limits| {
            star.magnitude(limits.band())
                .is_some_and(|magnitude| limits.accepts(magnitude))
        });
        if !photometric {
            return false;
        }
        let separation = match &self.instant {
            Some(instant) => {
                let position = star.coordinates().at_epoch(instant).coordinates();
                self.center.separation(&position)
            }
            None => self.center.separation(star.coordinates()),
        };
        self.radius_limits.contains(separation)
    }
}

/// Region around the base covering every criterion's region.
///
/// Offset criteria are widened by the offset length on both edges.
pub fn merge_radius_limits(criteria: &[SearchCriterion]) -> AgsResult<Option<RadiusLimits>> {
    let mut merged: Option<(Angle, Angle)> = None;
    for c in criteria {
        let shift = c
            .criterion
            .offset()
            .map(|o| o.distance())
            .unwrap_or(degrees(0.0));
        let limits = c.criterion.radius_limits().widened(shift);
        let (outer, inner) = (limits.outer(), limits.inner());
        merged = Some(match merged {
            None => (outer, inner),
            Some((o, i)) => (
                degrees(o.value().max(outer.value())),
                degrees(i.value().min(inner.value())),
            ),
        });
    }
    merged
        .map(|(outer, inner)| RadiusLimits::new(outer, inner))
        .transpose()
}

/// One magnitude range per band: the faintest faintness limit and the
/// brightest saturation limit of the criteria in that band.
pub fn merge_magnitude_limits(criteria: &[SearchCriterion]) -> AgsResult<Vec<MagnitudeLimits>> {
    let mut by_band: BTreeMap<MagnitudeBand, (f64, f64)> = BTreeMap::new();
    for c in criteria {
        let limits = c.criterion.magnitude_limits();
        let faint = limits.faintness_limit();
        let saturation = limits.saturation_limit().unwrap_or(DEFAULT_SATURATION_LIMIT);
        by_band
            .entry(limits.band())
            .and_modify(|(f, s)| {
                *f = f.max(faint);
                *s = s.min(saturation);
            })
            .or_insert((faint, saturation));
    }
    by_band
        .into_iter()
        .map(|(band, (faint, saturation))| {
            MagnitudeLimits::new(band, faint, Some(saturation.min(faint)))
        })
        .collect()
}

/// Plans the catalog queries for a set of criteria.
///
/// With `merge` the result holds at most one query centered on the base;
/// otherwise there is one query per criterion, centered on its own search
/// center. Plans are built without an instant; see
/// [`CatalogQueryPlan::at_instant`].
pub fn plan_queries(
    base: &SkyCoordinates,
    criteria: &[SearchCriterion],
    merge: bool,
) -> AgsResult<Vec<CatalogQueryPlan>> {
    if criteria.is_empty() {
        return Ok(Vec::new());
    }

    if merge {
        let Some(radius_limits) = merge_radius_limits(criteria)? else {
            return Ok(Vec::new());
        };
        return Ok(vec![CatalogQueryPlan {
            center: *base,
            radius_limits,
            magnitude_limits: merge_magnitude_limits(criteria)?,
            criteria: (0..criteria.len()).collect(),
            instant: None,
        }]);
    }

    Ok(criteria
        .iter()
        .enumerate()
        .map(|(i, c)| CatalogQueryPlan {
            center: c.criterion.search_center(base),
            radius_limits: *c.criterion.radius_limits(),
            magnitude_limits: vec![*c.criterion.magnitude_limits()],
            criteria: vec![i],
            instant: None,
        })
        .collect())
}
