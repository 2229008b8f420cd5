//! Quality estimator contract.
//!
//! The numerical estimation (PSF/Strehl simulation) happens outside this
//! crate. The analyzer only sees a selection of tiptilt stars going in and a
//! [`Quality`] or an [`EstimatorError`] coming out.

use crate::core::asterism::Quality;
use crate::core::context::{ImageQuality, ObservationContext};
use crate::core::magnitude::MagnitudeBand;
use crate::core::sky_object::SkyObject;
use crate::error::EstimatorError;

/// Estimates the correction quality delivered by a tiptilt star selection.
///
/// Estimators are called from worker threads and must be `Send + Sync`.
///
/// # Blocking
/// An estimate runs while its selection's cache slot is held: other workers
/// that need the same selection block on it until it returns. When the
/// analyzer runs in parallel those workers are rayon threads, so an
/// implementation must not itself wait on the global rayon pool (`par_iter`,
/// `rayon::join`, `scope`). Use a dedicated `rayon::ThreadPool` or plain
/// threads for internal parallelism.
pub trait QualityEstimator: Send + Sync {
    fn estimate(
        &self,
        tiptilt_stars: &[SkyObject],
        context: &ObservationContext,
    ) -> Result<Quality, EstimatorError>;
}

impl<F> QualityEstimator for F
where
    F: Fn(&[SkyObject], &ObservationContext) -> Result<Quality, EstimatorError> + Send + Sync,
{
    fn estimate(
        &self,
        tiptilt_stars: &[SkyObject],
        context: &ObservationContext,
    ) -> Result<Quality, EstimatorError> {
        self(tiptilt_stars, context)
    }
}

/// Strehl scale factor for a science band under the given image quality.
pub fn strehl_factor(band: Option<MagnitudeBand>, image_quality: ImageQuality) -> f64 {
    use ImageQuality::*;
    match (band, image_quality) {
        (Some(MagnitudeBand::J), Percent20) => 0.12,
        (Some(MagnitudeBand::J), Percent70) => 0.06,
        (Some(MagnitudeBand::J), Percent85) => 0.024,
        (Some(MagnitudeBand::J), Any) => 0.01,
        (Some(MagnitudeBand::H), Percent20) => 0.18,
        (Some(MagnitudeBand::H), Percent70) => 0.14,
        (Some(MagnitudeBand::H), Percent85) => 0.06,
        (Some(MagnitudeBand::H), Any) => 0.01,
        (Some(MagnitudeBand::K), Percent20) => 0.35,
        (Some(MagnitudeBand::K), Percent70) => 0.18,
        (Some(MagnitudeBand::K), Percent85) => 0.12,
        (Some(MagnitudeBand::K), Any) => 0.01,
        _ => 0.3,
    }
}

/// Wraps an estimator and scales its Strehl statistics by the observing
/// conditions in the context.
pub struct ConditionScaledEstimator<E> {
    inner: E,
}

impl<E: QualityEstimator> ConditionScaledEstimator<E> {
    pub fn new(inner: E) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }
}

impl<E: QualityEstimator> QualityEstimator for ConditionScaledEstimator<E> {
    fn estimate(
        &self,
        tiptilt_stars: &[SkyObject],
        context: &ObservationContext,
    ) -> Result<Quality, EstimatorError> {
        let quality = self.inner.estimate(tiptilt_stars, context)?;
        Ok(quality.scaled(strehl_factor(
            context.science_band,
            context.image_quality,
        )))
    }
}
