//! Core value objects for guide star selection.
//!
//! This module defines the immutable data structures shared by the catalog
//! and analysis layers: angles and sky positions, magnitudes, catalog stars,
//! guide probe groups and the asterisms produced by the analyzer.

pub mod angle;
pub mod asterism;
pub mod context;
pub mod coordinates;
pub mod guide;
pub mod magnitude;
pub mod sky_object;

pub use angle::{arcmin, arcsec, canonical, degrees, Angle, AngleKey};
pub use asterism::{Asterism, Quality};
pub use context::{ImageQuality, ObservationContext};
pub use coordinates::{EpochCoordinates, Offset, ProperMotion, SkyCoordinates};
pub use guide::{GuideProbe, GuideProbeGroup, GuideStarType};
pub use magnitude::{Magnitude, MagnitudeBand, MagnitudeLimits, MagnitudeSystem};
pub use sky_object::{SkyObject, SkyObjectBuilder, StarIdentity};
