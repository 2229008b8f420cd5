//! Ranked output of the asterism analyzer.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::angle::{abs_signed, canonical, Angle};
use super::guide::GuideProbe;
use super::sky_object::{SkyObject, StarIdentity};

/// Quality estimate of a tiptilt star selection. Larger is better.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quality {
    pub avg: f64,
    pub rms: f64,
    pub min: f64,
    pub max: f64,
}

impl Quality {
    pub fn new(avg: f64, rms: f64, min: f64, max: f64) -> Self {
        Self { avg, rms, min, max }
    }

    /// A quality with every statistic equal to `value`.
    pub fn uniform(value: f64) -> Self {
        Self::new(value, 0.0, value, value)
    }

    pub fn is_finite(&self) -> bool {
        self.avg.is_finite() && self.rms.is_finite() && self.min.is_finite() && self.max.is_finite()
    }

    /// Multiplies the Strehl-like statistics by `factor`. The rms is left as is.
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.avg * factor, self.rms, self.min * factor, self.max * factor)
    }
}

/// A complete, validated guide star assignment at one position angle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asterism {
    position_angle: Angle,
    tiptilt_group: String,
    flexure_group: Option<String>,
    assignments: BTreeMap<GuideProbe, SkyObject>,
    quality: Quality,
    brightness_sum: f64,
}

impl Asterism {
    pub fn new(
        position_angle: Angle,
        tiptilt_group: impl Into<String>,
        flexure_group: Option<String>,
        assignments: BTreeMap<GuideProbe, SkyObject>,
        quality: Quality,
        brightness_sum: f64,
    ) -> Self {
        Self {
            position_angle: canonical(position_angle),
            tiptilt_group: tiptilt_group.into(),
            flexure_group,
            assignments,
            quality,
            brightness_sum,
        }
    }

    pub fn position_angle(&self) -> Angle {
        self.position_angle
    }

    pub fn tiptilt_group(&self) -> &str {
        &self.tiptilt_group
    }

    pub fn flexure_group(&self) -> Option<&str> {
        self.flexure_group.as_deref()
    }

    pub fn assignments(&self) -> &BTreeMap<GuideProbe, SkyObject> {
        &self.assignments
    }

    pub fn star_for(&self, probe: &GuideProbe) -> Option<&SkyObject> {
        self.assignments.get(probe)
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn brightness_sum(&self) -> f64 {
        self.brightness_sum
    }

    /// Probe → star identity pairs, in probe order.
    pub fn assignment_identities(&self) -> Vec<(&GuideProbe, StarIdentity)> {
        self.assignments
            .iter()
            .map(|(probe, star)| (probe, star.identity()))
            .collect()
    }

    /// Whether both asterisms assign the same stars to the same probes in the
    /// same group at the same position angle.
    pub fn same_assignment(&self, other: &Asterism) -> bool {
        self.position_angle == other.position_angle
            && self.tiptilt_group == other.tiptilt_group
            && self.flexure_group == other.flexure_group
            && self.assignment_identities() == other.assignment_identities()
    }

    /// Total ranking order: best quality first, then position angle closest
    /// to zero, then brightest assignment. Remaining ties are broken by group,
    /// canonical position angle and assignment so that the order is total.
    pub fn ranking_cmp(&self, other: &Asterism) -> Ordering {
        other
            .quality
            .avg
            .total_cmp(&self.quality.avg)
            .then_with(|| {
                abs_signed(self.position_angle)
                    .value()
                    .total_cmp(&abs_signed(other.position_angle).value())
            })
            .then_with(|| self.brightness_sum.total_cmp(&other.brightness_sum))
            .then_with(|| self.tiptilt_group.cmp(&other.tiptilt_group))
            .then_with(|| self.flexure_group.cmp(&other.flexure_group))
            .then_with(|| {
                self.position_angle
                    .value()
                    .total_cmp(&other.position_angle.value())
            })
            .then_with(|| self.assignment_identities().cmp(&other.assignment_identities()))
    }
}

impl PartialEq for Asterism {
    fn eq(&self, other: &Self) -> bool {
        self.ranking_cmp(other) == Ordering::Equal
    }
}

impl Eq for Asterism {}

impl PartialOrd for Asterism {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Asterism {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ranking_cmp(other)
    }
}

impl fmt::Display for Asterism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PA {:.2}° {} [",
            self.position_angle.value(),
            self.tiptilt_group
        )?;
        for (i, (probe, star)) in self.assignments.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", probe, star.name())?;
        }
        write!(f, "] avg={:.4}", self.quality.avg)
    }
}
