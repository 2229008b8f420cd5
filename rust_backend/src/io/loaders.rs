use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::catalog::local::LocalCatalog;
use crate::core::coordinates::{ProperMotion, SkyCoordinates};
use crate::core::magnitude::{Magnitude, MagnitudeBand, MagnitudeSystem};
use crate::core::sky_object::SkyObject;

/// Result of loading a star catalog file
#[derive(Debug)]
pub struct CatalogLoadResult {
    pub stars: Vec<SkyObject>,
    /// Rows that could not be turned into a star
    pub skipped: usize,
}

impl CatalogLoadResult {
    /// Wrap the stars into an in-memory catalog
    pub fn into_catalog(self, name: impl Into<String>) -> LocalCatalog {
        LocalCatalog::from_stars(name, self.stars)
    }
}

#[derive(Debug, Deserialize)]
struct StarRow {
    #[serde(default)]
    id: Option<String>,
    name: String,
    ra: f64,
    dec: f64,
    #[serde(default)]
    epoch: Option<f64>,
    #[serde(default)]
    pm_ra: Option<f64>,
    #[serde(default)]
    pm_dec: Option<f64>,
    #[serde(default)]
    magnitudes: BTreeMap<String, MagnitudeValue>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MagnitudeValue {
    Plain(f64),
    Detailed {
        value: f64,
        #[serde(default)]
        error: Option<f64>,
        #[serde(default)]
        system: Option<String>,
    },
}

impl StarRow {
    fn into_sky_object(self) -> Result<SkyObject> {
        if !self.ra.is_finite() || !self.dec.is_finite() || self.dec.abs() > 90.0 {
            anyhow::bail!("invalid position ra={} dec={}", self.ra, self.dec);
        }

        let mut coordinates = SkyCoordinates::from_degrees(self.ra, self.dec);
        if let Some(epoch) = self.epoch {
            coordinates = coordinates.with_epoch(epoch);
        }
        if self.pm_ra.is_some() || self.pm_dec.is_some() {
            coordinates = coordinates.with_proper_motion(ProperMotion::new(
                self.pm_ra.unwrap_or(0.0),
                self.pm_dec.unwrap_or(0.0),
            ));
        }

        let mut magnitudes = Vec::with_capacity(self.magnitudes.len());
        for (band, value) in self.magnitudes {
            let band: MagnitudeBand = band
                .parse()
                .with_context(|| format!("unknown band '{}'", band))?;
            let magnitude = match value {
                MagnitudeValue::Plain(v) => Magnitude::new(band, v),
                MagnitudeValue::Detailed {
                    value,
                    error,
                    system,
                } => {
                    let mut m = Magnitude::new(band, value);
                    if let Some(error) = error {
                        m = m.with_error(error);
                    }
                    if let Some(system) = system {
                        let system: MagnitudeSystem = system
                            .parse()
                            .with_context(|| format!("unknown magnitude system '{}'", system))?;
                        m = m.with_system(system);
                    }
                    m
                }
            };
            if !magnitude.brightness.is_finite() {
                anyhow::bail!("non-finite {} magnitude", band);
            }
            magnitudes.push(magnitude);
        }

        let mut builder = SkyObject::builder(self.name, coordinates).magnitudes(magnitudes);
        if let Some(id) = self.id {
            builder = builder.catalog_id(id);
        }
        Ok(builder.build())
    }
}

/// Loader for user-supplied JSON star catalogs
///
/// The file holds an array of rows such as
/// `{"id": "gaia:1", "name": "S1", "ra": 10.5, "dec": -30.0, "magnitudes": {"R": 12.1}}`.
/// Rows with bad positions, unknown bands or malformed values are skipped with
/// a warning.
pub struct CatalogLoader;

impl CatalogLoader {
    /// Load a catalog from a JSON file
    pub fn load_from_file(path: &Path) -> Result<CatalogLoadResult> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .context("File has no extension")?;
        if !extension.eq_ignore_ascii_case("json") {
            anyhow::bail!("Unsupported file format: {}", extension);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file {}", path.display()))?;
        let result = Self::load_from_json_str(&content).context("Failed to parse JSON file")?;
        log::info!(
            "Loaded {} stars from {} ({} rows skipped)",
            result.stars.len(),
            path.display(),
            result.skipped
        );
        Ok(result)
    }

    /// Load a catalog from a JSON string
    pub fn load_from_json_str(json_str: &str) -> Result<CatalogLoadResult> {
        let rows: Vec<serde_json::Value> =
            serde_json::from_str(json_str).context("Expected a JSON array of stars")?;

        let mut stars = Vec::with_capacity(rows.len());
        let mut skipped = 0;
        for (index, row) in rows.into_iter().enumerate() {
            let parsed = serde_json::from_value::<StarRow>(row)
                .context("malformed row")
                .and_then(StarRow::into_sky_object);
            match parsed {
                Ok(star) => stars.push(star),
                Err(e) => {
                    log::warn!("Skipping catalog row {}: {:#}", index, e);
                    skipped += 1;
                }
            }
        }

        Ok(CatalogLoadResult { stars, skipped })
    }
}
