//! Guide probes and the groups they are assigned in.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AgsError, AgsResult};

/// A single guide probe, identified by name (e.g. `"CWFS1"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GuideProbe(String);

impl GuideProbe {
    pub fn new(name: impl Into<String>) -> Self {
        GuideProbe(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GuideProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GuideProbe {
    fn from(name: &str) -> Self {
        GuideProbe::new(name)
    }
}

/// Role a guide star plays in an asterism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GuideStarType {
    Tiptilt,
    Flexure,
}

impl GuideStarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuideStarType::Tiptilt => "tiptilt",
            GuideStarType::Flexure => "flexure",
        }
    }
}

impl fmt::Display for GuideStarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of probes that must be assigned simultaneously.
///
/// The same group can serve as the tiptilt group (needing `tiptilt_slots`
/// stars) or as the flexure group (needing `flexure_slots` stars) of an
/// asterism.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuideProbeGroup {
    key: String,
    display_name: String,
    probes: Vec<GuideProbe>,
    tiptilt_slots: usize,
    flexure_slots: usize,
    anchor_probe: Option<GuideProbe>,
    flexure_probe: Option<GuideProbe>,
    reverse_order: bool,
}

impl GuideProbeGroup {
    /// Creates a group that takes one star per probe as tiptilt group and one
    /// star as flexure group.
    pub fn new(key: impl Into<String>, probes: Vec<GuideProbe>) -> Self {
        let key = key.into();
        let tiptilt_slots = probes.len();
        Self {
            display_name: key.clone(),
            key,
            probes,
            tiptilt_slots,
            flexure_slots: 1,
            anchor_probe: None,
            flexure_probe: None,
            reverse_order: false,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub fn with_tiptilt_slots(mut self, slots: usize) -> Self {
        self.tiptilt_slots = slots;
        self
    }

    pub fn with_flexure_slots(mut self, slots: usize) -> Self {
        self.flexure_slots = slots;
        self
    }

    /// Probe that must carry the brightest tiptilt star.
    pub fn with_anchor_probe(mut self, probe: GuideProbe) -> Self {
        self.anchor_probe = Some(probe);
        self
    }

    /// The only probe allowed to carry a flexure star.
    pub fn with_flexure_probe(mut self, probe: GuideProbe) -> Self {
        self.flexure_probe = Some(probe);
        self
    }

    pub fn with_reverse_order(mut self, reverse: bool) -> Self {
        self.reverse_order = reverse;
        self
    }

    /// Checks slot counts and that special probes belong to the group.
    pub fn validate(&self) -> AgsResult<()> {
        if self.probes.is_empty() {
            return Err(AgsError::InvalidConfiguration(format!(
                "Guide probe group {} has no probes",
                self.key
            )));
        }
        if self.tiptilt_slots == 0 {
            return Err(AgsError::InvalidConfiguration(format!(
                "Guide probe group {} needs at least one tiptilt star",
                self.key
            )));
        }
        if self.tiptilt_slots > self.probes.len() {
            return Err(AgsError::InvalidConfiguration(format!(
                "Guide probe group {} needs {} tiptilt stars but has {} probes",
                self.key,
                self.tiptilt_slots,
                self.probes.len()
            )));
        }
        let flexure_capacity = if self.flexure_probe.is_some() {
            1
        } else {
            self.probes.len()
        };
        if self.flexure_slots > flexure_capacity {
            return Err(AgsError::InvalidConfiguration(format!(
                "Guide probe group {} needs {} flexure stars but can hold {}",
                self.key, self.flexure_slots, flexure_capacity
            )));
        }
        for probe in self.anchor_probe.iter().chain(self.flexure_probe.iter()) {
            if !self.probes.contains(probe) {
                return Err(AgsError::InvalidConfiguration(format!(
                    "Probe {} is not part of guide probe group {}",
                    probe, self.key
                )));
            }
        }
        Ok(())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn probes(&self) -> &[GuideProbe] {
        &self.probes
    }

    pub fn tiptilt_slots(&self) -> usize {
        self.tiptilt_slots
    }

    pub fn flexure_slots(&self) -> usize {
        self.flexure_slots
    }

    pub fn slots(&self, star_type: GuideStarType) -> usize {
        match star_type {
            GuideStarType::Tiptilt => self.tiptilt_slots,
            GuideStarType::Flexure => self.flexure_slots,
        }
    }

    pub fn anchor_probe(&self) -> Option<&GuideProbe> {
        self.anchor_probe.as_ref()
    }

    pub fn flexure_probe(&self) -> Option<&GuideProbe> {
        self.flexure_probe.as_ref()
    }

    pub fn reverse_order(&self) -> bool {
        self.reverse_order
    }

    /// Probes that may carry a star of the given type.
    pub fn probes_for(&self, star_type: GuideStarType) -> Vec<&GuideProbe> {
        match (star_type, &self.flexure_probe) {
            (GuideStarType::Flexure, Some(probe)) => vec![probe],
            _ => self.probes.iter().collect(),
        }
    }
}

impl fmt::Display for GuideProbeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name)
    }
}
