//! Search options for a two-group (AO system + instrument) configuration.

use serde::{Deserialize, Serialize};

use super::candidates::{SearchCriterion, SearchKey};
use super::criterion::{CatalogSearchCriterion, RadiusLimits};
use crate::core::angle::{dedup_angles, Angle};
use crate::core::coordinates::Offset;
use crate::core::guide::{GuideProbeGroup, GuideStarType};
use crate::core::magnitude::MagnitudeLimits;

/// Which side of the system provides tiptilt correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TipTiltMode {
    #[default]
    Ao,
    Instrument,
    Both,
}

impl TipTiltMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TipTiltMode::Ao => "ao",
            TipTiltMode::Instrument => "instrument",
            TipTiltMode::Both => "both",
        }
    }
}

/// Search region and magnitude ranges of one probe group.
#[derive(Debug, Clone)]
pub struct GroupSearchSpec {
    pub group: GuideProbeGroup,
    pub radius_limits: RadiusLimits,
    pub tiptilt_limits: MagnitudeLimits,
    pub flexure_limits: MagnitudeLimits,
    pub tiptilt_capable: bool,
}

impl GroupSearchSpec {
    fn criterion(&self, star_type: GuideStarType) -> CatalogSearchCriterion {
        let limits = match star_type {
            GuideStarType::Tiptilt => self.tiptilt_limits,
            GuideStarType::Flexure => self.flexure_limits,
        };
        CatalogSearchCriterion::new(
            format!("{} {}", self.group.display_name(), star_type.as_str()),
            limits,
            self.radius_limits,
        )
    }
}

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub ao: GroupSearchSpec,
    pub instrument: GroupSearchSpec,
    pub mode: TipTiltMode,
    pub position_angles: Vec<Angle>,
    pub offset: Option<Offset>,
}

impl SearchOptions {
    /// Mode actually searched. An instrument that cannot do tiptilt forces
    /// AO tiptilt.
    pub fn effective_mode(&self) -> TipTiltMode {
        if self.instrument.tiptilt_capable {
            self.mode
        } else {
            TipTiltMode::Ao
        }
    }

    /// Criteria for the effective mode.
    ///
    /// The criterion position angle is only fixed when exactly one position
    /// angle is searched; with several, the region is left unrotated.
    pub fn search_criteria(&self) -> Vec<SearchCriterion> {
        let angles = dedup_angles(&self.position_angles);
        let position_angle = match angles.as_slice() {
            [single] => Some(*single),
            _ => None,
        };

        let roles: Vec<(&GroupSearchSpec, GuideStarType)> = match self.effective_mode() {
            TipTiltMode::Ao => vec![
                (&self.ao, GuideStarType::Tiptilt),
                (&self.instrument, GuideStarType::Flexure),
            ],
            TipTiltMode::Instrument => vec![
                (&self.instrument, GuideStarType::Tiptilt),
                (&self.ao, GuideStarType::Flexure),
            ],
            TipTiltMode::Both => vec![
                (&self.ao, GuideStarType::Tiptilt),
                (&self.instrument, GuideStarType::Flexure),
                (&self.instrument, GuideStarType::Tiptilt),
                (&self.ao, GuideStarType::Flexure),
            ],
        };

        roles
            .into_iter()
            .map(|(spec, star_type)| {
                let mut criterion = spec.criterion(star_type);
                if let Some(offset) = self.offset {
                    criterion = criterion.with_offset(offset);
                }
                if let Some(pa) = position_angle {
                    criterion = criterion.with_position_angle(pa);
                }
                SearchCriterion::new(SearchKey::new(star_type, spec.group.clone()), criterion)
            })
            .collect()
    }
}
