//! Catalog search criteria and the matchers they produce.
//!
//! A [`CatalogSearchCriterion`] describes the acceptance region of one guide
//! probe group: an annulus around a (possibly offset and rotated) center plus
//! a magnitude range in one band. Binding it to a base position yields a
//! [`Matcher`], a stateless predicate over catalog stars.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::angle::{canonical, degrees, to_arcmin, Angle};
use crate::core::coordinates::{Offset, SkyCoordinates};
use crate::core::magnitude::{MagnitudeBand, MagnitudeLimits};
use crate::core::sky_object::SkyObject;
use crate::error::{AgsError, AgsResult};

/// Annular search region: inner ≤ separation ≤ outer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RadiusLimits {
    outer: Angle,
    inner: Angle,
}

impl RadiusLimits {
    pub fn new(outer: Angle, inner: Angle) -> AgsResult<Self> {
        let (o, i) = (outer.value(), inner.value());
        if !o.is_finite() || !i.is_finite() {
            return Err(AgsError::InvalidConfiguration(
                "Radius limits must be finite".to_string(),
            ));
        }
        if i < 0.0 {
            return Err(AgsError::InvalidConfiguration(format!(
                "Inner radius {:.3}' is negative",
                to_arcmin(inner)
            )));
        }
        if o < i {
            return Err(AgsError::InvalidConfiguration(format!(
                "Outer radius {:.3}' is smaller than inner radius {:.3}'",
                to_arcmin(outer),
                to_arcmin(inner)
            )));
        }
        Ok(Self { outer, inner })
    }

    /// A disc with no inner exclusion.
    pub fn disc(outer: Angle) -> AgsResult<Self> {
        Self::new(outer, degrees(0.0))
    }

    pub fn outer(&self) -> Angle {
        self.outer
    }

    pub fn inner(&self) -> Angle {
        self.inner
    }

    /// Inclusive test of a separation against both radii.
    pub fn contains(&self, separation: Angle) -> bool {
        let s = separation.value();
        s >= self.inner.value() && s <= self.outer.value()
    }

    /// Grows the annulus by `amount` on both edges; the inner radius stops at zero.
    pub fn widened(&self, amount: Angle) -> Self {
        Self {
            outer: self.outer + amount,
            inner: degrees((self.inner - amount).value().max(0.0)),
        }
    }
}

impl fmt::Display for RadiusLimits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2}'..{:.2}'",
            to_arcmin(self.inner),
            to_arcmin(self.outer)
        )
    }
}

/// Immutable description of one group's acceptance region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogSearchCriterion {
    name: String,
    magnitude_limits: MagnitudeLimits,
    radius_limits: RadiusLimits,
    offset: Option<Offset>,
    position_angle: Option<Angle>,
}

impl CatalogSearchCriterion {
    pub fn new(
        name: impl Into<String>,
        magnitude_limits: MagnitudeLimits,
        radius_limits: RadiusLimits,
    ) -> Self {
        Self {
            name: name.into(),
            magnitude_limits,
            radius_limits,
            offset: None,
            position_angle: None,
        }
    }

    pub fn with_offset(mut self, offset: Offset) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_position_angle(mut self, position_angle: Angle) -> Self {
        self.position_angle = Some(canonical(position_angle));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn band(&self) -> MagnitudeBand {
        self.magnitude_limits.band()
    }

    pub fn magnitude_limits(&self) -> &MagnitudeLimits {
        &self.magnitude_limits
    }

    pub fn radius_limits(&self) -> &RadiusLimits {
        &self.radius_limits
    }

    pub fn offset(&self) -> Option<&Offset> {
        self.offset.as_ref()
    }

    pub fn position_angle(&self) -> Option<Angle> {
        self.position_angle
    }

    /// Center of the search region for the given base position.
    ///
    /// The offset is rotated by the position angle when both are present.
    /// Without an offset the base is returned unchanged.
    pub fn search_center(&self, base: &SkyCoordinates) -> SkyCoordinates {
        match (&self.offset, self.position_angle) {
            (None, _) => *base,
            (Some(offset), Some(pa)) => base.offset_by(&offset.rotated(pa)),
            (Some(offset), None) => base.offset_by(offset),
        }
    }

    pub fn matcher(&self, base: &SkyCoordinates) -> Matcher {
        Matcher {
            center: self.search_center(base),
            magnitude_limits: self.magnitude_limits,
            radius_limits: self.radius_limits,
            instant: None,
        }
    }

    /// Matcher that propagates candidate proper motion to `instant` before
    /// the geometric test.
    pub fn matcher_at(&self, base: &SkyCoordinates, instant: DateTime<Utc>) -> Matcher {
        Matcher {
            instant: Some(instant),
            ..self.matcher(base)
        }
    }
}

impl fmt::Display for CatalogSearchCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}, {}",
            self.name, self.magnitude_limits, self.radius_limits
        )
    }
}

/// Predicate deciding whether a catalog star satisfies a criterion.
#[derive(Debug, Clone, PartialEq)]
pub struct Matcher {
    center: SkyCoordinates,
    magnitude_limits: MagnitudeLimits,
    radius_limits: RadiusLimits,
    instant: Option<DateTime<Utc>>,
}

impl Matcher {
    pub fn center(&self) -> &SkyCoordinates {
        &self.center
    }

    pub fn band(&self) -> MagnitudeBand {
        self.magnitude_limits.band()
    }

    /// Photometric test first, geometric test second. A star without a
    /// magnitude in the criterion band never matches.
    pub fn matches(&self, candidate: &SkyObject) -> bool {
        let Some(magnitude) = candidate.magnitude(self.magnitude_limits.band()) else {
            return false;
        };
        if !self.magnitude_limits.accepts(magnitude) {
            return false;
        }
        self.radius_limits.contains(self.separation(candidate))
    }

    /// Angular distance from the search center to the candidate.
    pub fn separation(&self, candidate: &SkyObject) -> Angle {
        match &self.instant {
            Some(instant) => {
                let position = candidate.coordinates().at_epoch(instant).coordinates();
                self.center.separation(&position)
            }
            None => self.center.separation(candidate.coordinates()),
        }
    }
}
