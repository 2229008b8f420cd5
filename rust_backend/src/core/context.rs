//! Observation conditions handed to the reachability oracle and the quality
//! estimator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::angle::{canonical, Angle};
use super::coordinates::SkyCoordinates;
use super::magnitude::MagnitudeBand;

/// Image quality percentile of the observing conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ImageQuality {
    Percent20,
    Percent70,
    Percent85,
    #[default]
    Any,
}

impl ImageQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageQuality::Percent20 => "IQ20",
            ImageQuality::Percent70 => "IQ70",
            ImageQuality::Percent85 => "IQ85",
            ImageQuality::Any => "IQAny",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationContext {
    pub base: SkyCoordinates,
    pub position_angle: Angle,
    pub science_band: Option<MagnitudeBand>,
    pub image_quality: ImageQuality,
    pub instant: Option<DateTime<Utc>>,
}

impl ObservationContext {
    pub fn new(base: SkyCoordinates, position_angle: Angle) -> Self {
        Self {
            base,
            position_angle: canonical(position_angle),
            science_band: None,
            image_quality: ImageQuality::default(),
            instant: None,
        }
    }

    pub fn with_science_band(mut self, band: MagnitudeBand) -> Self {
        self.science_band = Some(band);
        self
    }

    pub fn with_image_quality(mut self, iq: ImageQuality) -> Self {
        self.image_quality = iq;
        self
    }

    pub fn with_instant(mut self, instant: DateTime<Utc>) -> Self {
        self.instant = Some(instant);
        self
    }

    /// Same conditions at another position angle.
    pub fn at_position_angle(&self, position_angle: Angle) -> Self {
        Self {
            position_angle: canonical(position_angle),
            ..self.clone()
        }
    }
}
