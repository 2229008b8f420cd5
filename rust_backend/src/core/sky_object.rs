//! Catalog stars.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::coordinates::SkyCoordinates;
use super::magnitude::{Magnitude, MagnitudeBand};

/// Stable identity of a star across catalog queries.
///
/// Stars with a catalog id are identified by it. Others fall back to their
/// name plus coordinates rounded to the milliarcsecond.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StarIdentity {
    Catalog(String),
    Named { name: String, ra_mas: i64, dec_mas: i64 },
}

impl fmt::Display for StarIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StarIdentity::Catalog(id) => f.write_str(id),
            StarIdentity::Named {
                name,
                ra_mas,
                dec_mas,
            } => write!(f, "{}@{},{}", name, ra_mas, dec_mas),
        }
    }
}

/// An immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyObject {
    name: String,
    catalog_id: Option<String>,
    coordinates: SkyCoordinates,
    magnitudes: Vec<Magnitude>,
}

impl SkyObject {
    pub fn builder(name: impl Into<String>, coordinates: SkyCoordinates) -> SkyObjectBuilder {
        SkyObjectBuilder {
            name: name.into(),
            catalog_id: None,
            coordinates,
            magnitudes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn catalog_id(&self) -> Option<&str> {
        self.catalog_id.as_deref()
    }

    pub fn coordinates(&self) -> &SkyCoordinates {
        &self.coordinates
    }

    pub fn magnitudes(&self) -> &[Magnitude] {
        &self.magnitudes
    }

    /// Magnitude in the given band, if the star was measured in it.
    pub fn magnitude(&self, band: MagnitudeBand) -> Option<&Magnitude> {
        self.magnitudes.iter().find(|m| m.band == band)
    }

    pub fn identity(&self) -> StarIdentity {
        match &self.catalog_id {
            Some(id) => StarIdentity::Catalog(id.clone()),
            None => StarIdentity::Named {
                name: self.name.clone(),
                ra_mas: (self.coordinates.ra_deg() * 3_600_000.0).round() as i64,
                dec_mas: (self.coordinates.dec_deg() * 3_600_000.0).round() as i64,
            },
        }
    }
}

impl fmt::Display for SkyObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.coordinates)
    }
}

/// Builder for [`SkyObject`].
#[derive(Debug, Clone)]
pub struct SkyObjectBuilder {
    name: String,
    catalog_id: Option<String>,
    coordinates: SkyCoordinates,
    magnitudes: Vec<Magnitude>,
}

impl SkyObjectBuilder {
    pub fn catalog_id(mut self, id: impl Into<String>) -> Self {
        self.catalog_id = Some(id.into());
        self
    }

    /// Adds a magnitude, replacing any earlier one in the same band.
    pub fn magnitude(mut self, magnitude: Magnitude) -> Self {
        self.magnitudes.retain(|m| m.band != magnitude.band);
        self.magnitudes.push(magnitude);
        self
    }

    pub fn magnitudes(self, magnitudes: impl IntoIterator<Item = Magnitude>) -> Self {
        magnitudes.into_iter().fold(self, |b, m| b.magnitude(m))
    }

    pub fn build(self) -> SkyObject {
        SkyObject {
            name: self.name,
            catalog_id: self.catalog_id,
            coordinates: self.coordinates,
            magnitudes: self.magnitudes,
        }
    }
}
