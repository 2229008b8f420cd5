//! Assignment of selected stars to guide probes.
//!
//! Stars are handed out brightest first, each to the first free probe (in
//! group order, or reversed) that reaches it. A group's anchor probe must take
//! the brightest tiptilt star, or failing that the second brightest; a single
//! tiptilt star always goes to the anchor. Flexure stars may only go to the
//! group's flexure probe when one is set.

use std::panic::{catch_unwind, AssertUnwindSafe};

use super::reachability::ReachabilityOracle;
use crate::core::angle::Angle;
use crate::core::context::ObservationContext;
use crate::core::guide::{GuideProbe, GuideProbeGroup, GuideStarType};
use crate::core::sky_object::SkyObject;

/// Order in which probes are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOrder {
    Forward,
    Reverse,
}

/// Which probes of a group reach which candidates at one position angle.
#[derive(Debug, Clone)]
pub struct ReachTable {
    probes: Vec<GuideProbe>,
    /// `rows[star][probe]`
    rows: Vec<Vec<bool>>,
}

impl ReachTable {
    /// Queries the oracle once per (star, probe). A panicking oracle counts as
    /// unreachable.
    pub fn build(
        group: &GuideProbeGroup,
        stars: &[SkyObject],
        position_angle: Angle,
        context: &ObservationContext,
        oracle: &dyn ReachabilityOracle,
    ) -> Self {
        let probes = group.probes().to_vec();
        let rows = stars
            .iter()
            .map(|star| {
                probes
                    .iter()
                    .map(|probe| {
                        catch_unwind(AssertUnwindSafe(|| {
                            oracle.is_reachable(probe, position_angle, star.coordinates(), context)
                        }))
                        .unwrap_or_else(|_| {
                            log::warn!(
                                "Reachability check panicked for {} on {}; treating as unreachable",
                                star.name(),
                                probe
                            );
                            false
                        })
                    })
                    .collect()
            })
            .collect();
        Self { probes, rows }
    }

    pub fn probes(&self) -> &[GuideProbe] {
        &self.probes
    }

    pub fn reaches(&self, star: usize, probe: usize) -> bool {
        self.rows
            .get(star)
            .and_then(|row| row.get(probe))
            .copied()
            .unwrap_or(false)
    }

    /// Whether at least one probe of the group reaches the star.
    pub fn reaches_any(&self, star: usize) -> bool {
        self.rows
            .get(star)
            .is_some_and(|row| row.iter().any(|&r| r))
    }

    fn probe_index(&self, probe: &GuideProbe) -> Option<usize> {
        self.probes.iter().position(|p| p == probe)
    }

    fn ordered(&self, order: ProbeOrder) -> Vec<usize> {
        match order {
            ProbeOrder::Forward => (0..self.probes.len()).collect(),
            ProbeOrder::Reverse => (0..self.probes.len()).rev().collect(),
        }
    }
}

/// Probe index → star index pairs.
pub type ProbeAssignment = Vec<(usize, usize)>;

/// Position of the tiptilt star the anchor probe must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnchorRule {
    Brightest,
    SecondBrightest,
}

/// Assigns a tiptilt selection, given brightest first, to distinct probes.
///
/// Returns `None` when some star cannot be placed under either anchor rule.
pub fn assign_tiptilt(
    group: &GuideProbeGroup,
    table: &ReachTable,
    selection: &[usize],
    order: ProbeOrder,
) -> Option<ProbeAssignment> {
    let anchor = group.anchor_probe().and_then(|p| table.probe_index(p));
    let rules: &[AnchorRule] = if anchor.is_some() && selection.len() > 1 {
        &[AnchorRule::Brightest, AnchorRule::SecondBrightest]
    } else {
        &[AnchorRule::Brightest]
    };
    let probes = table.ordered(order);

    rules.iter().find_map(|&rule| {
        let mut used = vec![false; table.probes.len()];
        let mut assignment = Vec::with_capacity(selection.len());
        for (position, &star) in selection.iter().enumerate() {
            let probe = probes.iter().copied().find(|&p| {
                !used[p] && table.reaches(star, p) && anchor_allows(anchor, p, position, selection.len(), rule)
            })?;
            used[probe] = true;
            assignment.push((probe, star));
        }
        Some(assignment)
    })
}

fn anchor_allows(
    anchor: Option<usize>,
    probe: usize,
    position: usize,
    count: usize,
    rule: AnchorRule,
) -> bool {
    let Some(anchor) = anchor else {
        return true;
    };
    let is_anchor = probe == anchor;
    if count <= 1 {
        return is_anchor;
    }
    let anchored_position = match rule {
        AnchorRule::Brightest => 0,
        AnchorRule::SecondBrightest => 1,
    };
    is_anchor == (position == anchored_position)
}

/// Assigns a flexure selection to distinct probes of the flexure group.
pub fn assign_flexure(
    group: &GuideProbeGroup,
    table: &ReachTable,
    selection: &[usize],
) -> Option<ProbeAssignment> {
    let allowed: Vec<usize> = group
        .probes_for(GuideStarType::Flexure)
        .into_iter()
        .filter_map(|p| table.probe_index(p))
        .collect();
    let mut used = vec![false; table.probes.len()];
    let mut assignment = Vec::with_capacity(selection.len());
    for &star in selection {
        let probe = allowed
            .iter()
            .copied()
            .find(|&p| !used[p] && table.reaches(star, p))?;
        used[probe] = true;
        assignment.push((probe, star));
    }
    Some(assignment)
}
