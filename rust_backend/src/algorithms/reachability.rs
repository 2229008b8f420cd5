//! Geometric reachability of stars by guide probes.

use std::collections::HashMap;

use crate::catalog::criterion::RadiusLimits;
use crate::core::angle::Angle;
use crate::core::context::ObservationContext;
use crate::core::coordinates::{Offset, SkyCoordinates};
use crate::core::guide::GuideProbe;

/// Decides whether a probe can reach a position at a position angle.
pub trait ReachabilityOracle: Send + Sync {
    fn is_reachable(
        &self,
        probe: &GuideProbe,
        position_angle: Angle,
        coordinates: &SkyCoordinates,
        context: &ObservationContext,
    ) -> bool;
}

impl<F> ReachabilityOracle for F
where
    F: Fn(&GuideProbe, Angle, &SkyCoordinates, &ObservationContext) -> bool + Send + Sync,
{
    fn is_reachable(
        &self,
        probe: &GuideProbe,
        position_angle: Angle,
        coordinates: &SkyCoordinates,
        context: &ObservationContext,
    ) -> bool {
        self(probe, position_angle, coordinates, context)
    }
}

/// Every probe reaches every star.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysReachable;

impl ReachabilityOracle for AlwaysReachable {
    fn is_reachable(
        &self,
        _probe: &GuideProbe,
        _position_angle: Angle,
        _coordinates: &SkyCoordinates,
        _context: &ObservationContext,
    ) -> bool {
        true
    }
}

/// Annular patrol field of one probe.
///
/// The field center sits at `offset` from the base position in the
/// instrument frame and turns with the position angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatrolField {
    pub offset: Offset,
    pub limits: RadiusLimits,
}

impl PatrolField {
    pub fn new(offset: Offset, limits: RadiusLimits) -> Self {
        Self { offset, limits }
    }

    pub fn centered(limits: RadiusLimits) -> Self {
        Self::new(Offset::zero(), limits)
    }

    pub fn center(&self, base: &SkyCoordinates, position_angle: Angle) -> SkyCoordinates {
        base.offset_by(&self.offset.rotated(position_angle))
    }

    pub fn contains(
        &self,
        base: &SkyCoordinates,
        position_angle: Angle,
        coordinates: &SkyCoordinates,
    ) -> bool {
        let center = self.center(base, position_angle);
        self.limits.contains(center.separation(coordinates))
    }
}

/// Reachability from per-probe patrol fields. Probes without a field reach
/// nothing.
#[derive(Debug, Clone, Default)]
pub struct PatrolFieldOracle {
    fields: HashMap<GuideProbe, PatrolField>,
}

impl PatrolFieldOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, probe: GuideProbe, field: PatrolField) -> Self {
        self.fields.insert(probe, field);
        self
    }

    pub fn field(&self, probe: &GuideProbe) -> Option<&PatrolField> {
        self.fields.get(probe)
    }
}

impl ReachabilityOracle for PatrolFieldOracle {
    fn is_reachable(
        &self,
        probe: &GuideProbe,
        position_angle: Angle,
        coordinates: &SkyCoordinates,
        context: &ObservationContext,
    ) -> bool {
        self.fields
            .get(probe)
            .is_some_and(|field| field.contains(&context.base, position_angle, coordinates))
    }
}
