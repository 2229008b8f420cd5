//! Angle helpers built on top of `qtty` angular quantities.
//!
//! Every angle in the crate is a [`qtty::Degrees`] quantity. Arcminute and
//! arcsecond values are converted on construction, so arithmetic and
//! comparisons always happen in a single unit.

use qtty::{Arcminute, Arcminutes, Arcsecond, Arcseconds, Radian, Radians};

/// Unit-aware angle (stored in degrees).
pub type Angle = qtty::Degrees;

/// Creates an angle from a value in degrees.
#[inline]
pub fn degrees(value: f64) -> Angle {
    Angle::new(value)
}

/// Creates an angle from a value in arcminutes.
///
/// ```
/// use ags_rust::core::angle::{arcmin, degrees};
///
/// assert!((arcmin(90.0).value() - degrees(1.5).value()).abs() < 1e-12);
/// ```
#[inline]
pub fn arcmin(value: f64) -> Angle {
    Arcminutes::new(value).to()
}

/// Creates an angle from a value in arcseconds.
#[inline]
pub fn arcsec(value: f64) -> Angle {
    Arcseconds::new(value).to()
}

/// Creates an angle from a value in radians.
#[inline]
pub fn from_radians(value: f64) -> Angle {
    Radians::new(value).to()
}

/// Returns the angle in radians.
#[inline]
pub fn to_radians(angle: Angle) -> f64 {
    angle.to::<Radian>().value()
}

/// Returns the angle in arcminutes.
#[inline]
pub fn to_arcmin(angle: Angle) -> f64 {
    angle.to::<Arcminute>().value()
}

/// Returns the angle in arcseconds.
#[inline]
pub fn to_arcsec(angle: Angle) -> f64 {
    angle.to::<Arcsecond>().value()
}

/// Normalizes an angle into the canonical range `[0°, 360°)`.
///
/// Negative zero is folded to positive zero so equal angles share one
/// representation.
#[inline]
pub fn canonical(angle: Angle) -> Angle {
    let wrapped = angle.wrap_pos().value();
    if wrapped == 0.0 {
        Angle::new(0.0)
    } else {
        Angle::new(wrapped)
    }
}

/// Absolute distance of an angle from zero, taken over the signed range
/// `(-180°, 180°]`. A position angle of 350° is 10° away from north.
#[inline]
pub fn abs_signed(angle: Angle) -> Angle {
    Angle::new(angle.wrap_signed().value().abs())
}

/// Hashable identity of an angle, equal for all representations of the same
/// canonical direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AngleKey(u64);

impl AngleKey {
    pub fn new(angle: Angle) -> Self {
        AngleKey(canonical(angle).value().to_bits())
    }
}

impl From<Angle> for AngleKey {
    fn from(angle: Angle) -> Self {
        AngleKey::new(angle)
    }
}

/// Removes duplicate directions from a list of angles, keeping the first
/// occurrence of each.
pub fn dedup_angles(angles: &[Angle]) -> Vec<Angle> {
    let mut seen = std::collections::HashSet::with_capacity(angles.len());
    angles
        .iter()
        .copied()
        .filter(|a| seen.insert(AngleKey::new(*a)))
        .collect()
}
