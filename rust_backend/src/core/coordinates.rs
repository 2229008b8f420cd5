//! Sky coordinates, tangent-plane offsets and epoch propagation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::angle::{canonical, degrees, from_radians, to_radians, Angle};

/// Julian date of the Unix epoch (1970-01-01T00:00:00Z).
const UNIX_EPOCH_JD: f64 = 2_440_587.5;
/// Julian date of J2000.0.
const J2000_JD: f64 = 2_451_545.0;
const DAYS_PER_JULIAN_YEAR: f64 = 365.25;
const MAS_PER_DEGREE: f64 = 3_600_000.0;

/// Converts an instant into a Julian epoch year (e.g. 2024.5).
pub fn julian_year(instant: &DateTime<Utc>) -> f64 {
    let seconds = instant.timestamp() as f64 + f64::from(instant.timestamp_subsec_nanos()) * 1e-9;
    let jd = UNIX_EPOCH_JD + seconds / 86_400.0;
    2000.0 + (jd - J2000_JD) / DAYS_PER_JULIAN_YEAR
}

/// Proper motion in milliarcseconds per year.
///
/// `ra_mas_per_year` is the RA component already multiplied by cos(δ), the
/// convention used by modern astrometric catalogs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProperMotion {
    pub ra_mas_per_year: f64,
    pub dec_mas_per_year: f64,
}

impl ProperMotion {
    pub fn new(ra_mas_per_year: f64, dec_mas_per_year: f64) -> Self {
        Self {
            ra_mas_per_year,
            dec_mas_per_year,
        }
    }
}

/// An angular offset in the tangent plane of a position.
///
/// `p` runs along increasing right ascension, `q` along increasing
/// declination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    pub p: Angle,
    pub q: Angle,
}

impl Offset {
    pub fn new(p: Angle, q: Angle) -> Self {
        Self { p, q }
    }

    pub fn zero() -> Self {
        Self::new(degrees(0.0), degrees(0.0))
    }

    /// Rotates the offset vector by a position angle.
    ///
    /// ```
    /// use ags_rust::core::angle::{arcmin, degrees};
    /// use ags_rust::core::coordinates::Offset;
    ///
    /// let rotated = Offset::new(arcmin(1.0), arcmin(0.0)).rotated(degrees(90.0));
    /// assert!(rotated.p.value().abs() < 1e-12);
    /// assert!((rotated.q.value() + arcmin(1.0).value()).abs() < 1e-12);
    /// ```
    pub fn rotated(&self, position_angle: Angle) -> Offset {
        let (sin, cos) = position_angle.sin_cos();
        let p = self.p.value();
        let q = self.q.value();
        Offset {
            p: degrees(p * cos + q * sin),
            q: degrees(-p * sin + q * cos),
        }
    }

    /// Length of the offset vector.
    pub fn distance(&self) -> Angle {
        degrees(self.p.value().hypot(self.q.value()))
    }
}

/// Coordinates expressed at a specific epoch, after proper motion has been
/// applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochCoordinates {
    pub ra: Angle,
    pub dec: Angle,
    /// Julian epoch year of the position.
    pub epoch: f64,
}

impl EpochCoordinates {
    /// Drops the epoch, keeping the propagated position.
    pub fn coordinates(&self) -> SkyCoordinates {
        SkyCoordinates::new(self.ra, self.dec).with_epoch(self.epoch)
    }
}

/// Immutable equatorial position.
///
/// Right ascension is kept in `[0°, 360°)`. An optional proper motion allows
/// the position to be evaluated at other epochs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyCoordinates {
    ra: Angle,
    dec: Angle,
    epoch: f64,
    proper_motion: Option<ProperMotion>,
}

impl SkyCoordinates {
    pub fn new(ra: Angle, dec: Angle) -> Self {
        Self {
            ra: canonical(ra),
            dec,
            epoch: 2000.0,
            proper_motion: None,
        }
    }

    pub fn from_degrees(ra_deg: f64, dec_deg: f64) -> Self {
        Self::new(degrees(ra_deg), degrees(dec_deg))
    }

    pub fn with_epoch(mut self, epoch: f64) -> Self {
        self.epoch = epoch;
        self
    }

    pub fn with_proper_motion(mut self, proper_motion: ProperMotion) -> Self {
        self.proper_motion = Some(proper_motion);
        self
    }

    pub fn ra(&self) -> Angle {
        self.ra
    }

    pub fn dec(&self) -> Angle {
        self.dec
    }

    pub fn ra_deg(&self) -> f64 {
        self.ra.value()
    }

    pub fn dec_deg(&self) -> f64 {
        self.dec.value()
    }

    pub fn epoch(&self) -> f64 {
        self.epoch
    }

    pub fn proper_motion(&self) -> Option<ProperMotion> {
        self.proper_motion
    }

    /// Great-circle separation using the spherical law of cosines.
    ///
    /// The cosine is clamped to `[-1, 1]` so rounding never produces NaN for
    /// coincident or antipodal points.
    pub fn separation(&self, other: &SkyCoordinates) -> Angle {
        let (sin_d1, cos_d1) = self.dec.sin_cos();
        let (sin_d2, cos_d2) = other.dec.sin_cos();
        let cos_dra = (self.ra - other.ra).cos();
        let cos_sep = (sin_d1 * sin_d2 + cos_d1 * cos_d2 * cos_dra).clamp(-1.0, 1.0);
        from_radians(cos_sep.acos())
    }

    /// Translates the position by a tangent-plane offset.
    ///
    /// The RA component is scaled by 1/cos(δ). Positions pushed past a pole
    /// are folded back with RA flipped by 180°.
    pub fn offset_by(&self, offset: &Offset) -> SkyCoordinates {
        let cos_dec = self.dec.cos();
        let mut ra = if cos_dec.abs() < 1e-12 {
            self.ra.value()
        } else {
            self.ra.value() + offset.p.value() / cos_dec
        };
        let mut dec = self.dec.value() + offset.q.value();
        if dec > 90.0 {
            dec = 180.0 - dec;
            ra += 180.0;
        } else if dec < -90.0 {
            dec = -180.0 - dec;
            ra += 180.0;
        }
        SkyCoordinates {
            ra: canonical(degrees(ra)),
            dec: degrees(dec),
            epoch: self.epoch,
            proper_motion: self.proper_motion,
        }
    }

    /// Position at the given instant, with proper motion applied.
    ///
    /// Without proper motion the position is unchanged and only the epoch
    /// label moves.
    pub fn at_epoch(&self, instant: &DateTime<Utc>) -> EpochCoordinates {
        let target_epoch = julian_year(instant);
        match self.proper_motion {
            None => EpochCoordinates {
                ra: self.ra,
                dec: self.dec,
                epoch: target_epoch,
            },
            Some(pm) => {
                let years = target_epoch - self.epoch;
                let dec = self.dec.value() + pm.dec_mas_per_year * years / MAS_PER_DEGREE;
                let cos_dec = self.dec.cos();
                let ra = if cos_dec.abs() < 1e-12 {
                    self.ra.value()
                } else {
                    self.ra.value() + pm.ra_mas_per_year * years / MAS_PER_DEGREE / cos_dec
                };
                EpochCoordinates {
                    ra: canonical(degrees(ra)),
                    dec: degrees(dec),
                    epoch: target_epoch,
                }
            }
        }
    }
}

impl fmt::Display for SkyCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_seconds = self.ra.value() / 15.0 * 3600.0;
        let hours = (total_seconds / 3600.0).floor();
        let minutes = ((total_seconds - hours * 3600.0) / 60.0).floor();
        let seconds = total_seconds - hours * 3600.0 - minutes * 60.0;

        let sign = if self.dec.value() < 0.0 { '-' } else { '+' };
        let dec_arcsec = self.dec.value().abs() * 3600.0;
        let d = (dec_arcsec / 3600.0).floor();
        let m = ((dec_arcsec - d * 3600.0) / 60.0).floor();
        let s = dec_arcsec - d * 3600.0 - m * 60.0;

        write!(
            f,
            "{:02}:{:02}:{:06.3} {}{:02}:{:02}:{:05.2}",
            hours as u32, minutes as u32, seconds, sign, d as u32, m as u32, s
        )
    }
}
