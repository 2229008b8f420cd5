//! Photometric bands, magnitudes and magnitude limits.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AgsError, AgsResult};

/// Photometric band of a magnitude measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MagnitudeBand {
    U,
    B,
    G,
    V,
    UC,
    R,
    I,
    Y,
    J,
    H,
    K,
    L,
    M,
    N,
    Q,
    AP,
}

impl MagnitudeBand {
    pub const ALL: [MagnitudeBand; 16] = [
        MagnitudeBand::U,
        MagnitudeBand::B,
        MagnitudeBand::G,
        MagnitudeBand::V,
        MagnitudeBand::UC,
        MagnitudeBand::R,
        MagnitudeBand::I,
        MagnitudeBand::Y,
        MagnitudeBand::J,
        MagnitudeBand::H,
        MagnitudeBand::K,
        MagnitudeBand::L,
        MagnitudeBand::M,
        MagnitudeBand::N,
        MagnitudeBand::Q,
        MagnitudeBand::AP,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MagnitudeBand::U => "U",
            MagnitudeBand::B => "B",
            MagnitudeBand::G => "g",
            MagnitudeBand::V => "V",
            MagnitudeBand::UC => "UC",
            MagnitudeBand::R => "R",
            MagnitudeBand::I => "I",
            MagnitudeBand::Y => "Y",
            MagnitudeBand::J => "J",
            MagnitudeBand::H => "H",
            MagnitudeBand::K => "K",
            MagnitudeBand::L => "L",
            MagnitudeBand::M => "M",
            MagnitudeBand::N => "N",
            MagnitudeBand::Q => "Q",
            MagnitudeBand::AP => "AP",
        }
    }
}

impl fmt::Display for MagnitudeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MagnitudeBand {
    type Err = AgsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        MagnitudeBand::ALL
            .iter()
            .copied()
            .find(|band| band.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| AgsError::InvalidConfiguration(format!("Unknown magnitude band: {}", s)))
    }
}

/// Magnitude system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MagnitudeSystem {
    #[default]
    Vega,
    AB,
    Jy,
}

impl MagnitudeSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            MagnitudeSystem::Vega => "Vega",
            MagnitudeSystem::AB => "AB",
            MagnitudeSystem::Jy => "Jy",
        }
    }
}

impl FromStr for MagnitudeSystem {
    type Err = AgsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vega" => Ok(MagnitudeSystem::Vega),
            "ab" => Ok(MagnitudeSystem::AB),
            "jy" => Ok(MagnitudeSystem::Jy),
            _ => Err(AgsError::InvalidConfiguration(format!(
                "Unknown magnitude system: {}",
                s
            ))),
        }
    }
}

/// A brightness measurement. Smaller values are brighter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Magnitude {
    pub band: MagnitudeBand,
    pub brightness: f64,
    pub error: Option<f64>,
    pub system: MagnitudeSystem,
}

impl Magnitude {
    pub fn new(band: MagnitudeBand, brightness: f64) -> Self {
        Self {
            band,
            brightness,
            error: None,
            system: MagnitudeSystem::default(),
        }
    }

    pub fn with_error(mut self, error: f64) -> Self {
        self.error = Some(error);
        self
    }

    pub fn with_system(mut self, system: MagnitudeSystem) -> Self {
        self.system = system;
        self
    }
}

impl fmt::Display for Magnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:.2}", self.band, self.brightness)?;
        if let Some(err) = self.error {
            write!(f, "±{:.2}", err)?;
        }
        Ok(())
    }
}

/// Acceptable brightness range in one band.
///
/// The faintness limit is the numerically largest magnitude accepted. The
/// optional saturation limit is the numerically smallest; without one, any
/// star brighter than the faintness limit is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MagnitudeLimits {
    band: MagnitudeBand,
    faintness_limit: f64,
    saturation_limit: Option<f64>,
}

impl MagnitudeLimits {
    /// Fails when the saturation limit is fainter than the faintness limit.
    pub fn new(
        band: MagnitudeBand,
        faintness_limit: f64,
        saturation_limit: Option<f64>,
    ) -> AgsResult<Self> {
        if !faintness_limit.is_finite() || saturation_limit.is_some_and(|s| !s.is_finite()) {
            return Err(AgsError::InvalidConfiguration(format!(
                "Magnitude limits for band {} must be finite",
                band
            )));
        }
        if let Some(saturation) = saturation_limit {
            if faintness_limit < saturation {
                return Err(AgsError::InvalidConfiguration(format!(
                    "Faintness limit {} is brighter than saturation limit {} in band {}",
                    faintness_limit, saturation, band
                )));
            }
        }
        Ok(Self {
            band,
            faintness_limit,
            saturation_limit,
        })
    }

    pub fn faint_only(band: MagnitudeBand, faintness_limit: f64) -> AgsResult<Self> {
        Self::new(band, faintness_limit, None)
    }

    pub fn band(&self) -> MagnitudeBand {
        self.band
    }

    pub fn faintness_limit(&self) -> f64 {
        self.faintness_limit
    }

    pub fn saturation_limit(&self) -> Option<f64> {
        self.saturation_limit
    }

    /// Inclusive test of a brightness against both limits.
    pub fn contains(&self, brightness: f64) -> bool {
        if brightness.is_nan() || brightness > self.faintness_limit {
            return false;
        }
        match self.saturation_limit {
            Some(saturation) => brightness >= saturation,
            None => true,
        }
    }

    /// Tests a magnitude, requiring its band to match.
    pub fn accepts(&self, magnitude: &Magnitude) -> bool {
        magnitude.band == self.band && self.contains(magnitude.brightness)
    }
}

impl fmt::Display for MagnitudeLimits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.saturation_limit {
            Some(s) => write!(f, "{:.2} <= {} <= {:.2}", s, self.band, self.faintness_limit),
            None => write!(f, "{} <= {:.2}", self.band, self.faintness_limit),
        }
    }
}
