use std::time::Instant;

use nalgebra::Vector3;
use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::constants::R_ELECTRON;
use crate::db::MaterialDb;
use crate::detector::{Detector, QGrid};
use crate::error::{DiffractError, Result};
use crate::particle::{EvaluationContext, ScatteringModel};
use crate::source::Source;

/// How volumetric maps reach reciprocal space. Atoms and spheroids are
/// evaluated exactly either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PropagationMode {
    /// Project the rotated density along the beam, then a 2D transform.
    #[serde(rename = "projection")]
    Projection,
    /// 3D transform sampled on the Ewald sphere.
    #[default]
    #[serde(rename = "3d")]
    ThreeDSampling,
}

/// Kernel for sampling a transformed map between grid points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    Nearest,
    /// Trilinear in 3D, bilinear in projection mode.
    #[default]
    Trilinear,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationOptions {
    pub mode: PropagationMode,
    pub interpolation: Interpolation,
    /// Minimum ratio of padded to original grid extent per axis.
    pub oversampling: usize,
}

impl Default for PropagationOptions {
    fn default() -> Self {
        PropagationOptions {
            mode: PropagationMode::ThreeDSampling,
            interpolation: Interpolation::Trilinear,
            oversampling: 4,
        }
    }
}

impl PropagationOptions {
    pub fn with_mode(mut self, mode: PropagationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn with_oversampling(mut self, oversampling: usize) -> Self {
        self.oversampling = oversampling;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.oversampling == 0 || self.oversampling > 16 {
            return Err(DiffractError::InvalidParameter {
                name: "oversampling",
                reason: format!("must be between 1 and 16, got {}", self.oversampling),
            });
        }
        Ok(())
    }
}

/// Amplitude and intensity on the detector, both shaped `(ny, nx)`.
#[derive(Debug, Clone)]
pub struct ParticleResult {
    amplitude: Array2<Complex64>,
    intensity: Array2<f64>,
}

impl ParticleResult {
    pub(crate) fn from_amplitude(amplitude: Array2<Complex64>) -> Self {
        let intensity = amplitude.mapv(|a| a.norm_sqr());
        ParticleResult {
            amplitude,
            intensity,
        }
    }

    /// Amplitude in sqrt(photons) per pixel.
    pub fn amplitude(&self) -> &Array2<Complex64> {
        &self.amplitude
    }

    /// Photons per pixel.
    pub fn intensity(&self) -> &Array2<f64> {
        &self.intensity
    }

    pub fn total_intensity(&self) -> f64 {
        self.intensity.sum()
    }
}

/// Evaluates one particle on a detector with the default database.
pub fn propagate<M: ScatteringModel + ?Sized>(
    source: &Source,
    detector: &Detector,
    model: &M,
    options: &PropagationOptions,
) -> Result<ParticleResult> {
    let grid = detector.q_grid(source.wavelength())?;
    propagate_on_grid(&grid, source, model, options, &MaterialDb::new())
}

/// Evaluates one particle on a prepared q-grid.
///
/// Per pixel `A = r_e sqrt(I_ph Ω P) S(q) exp(-i q·p)`, with `S` the
/// model amplitude in electrons, `I_ph` the photon fluence at the particle
/// position `p`, `Ω` the pixel solid angle and `P` the polarization factor.
pub fn propagate_on_grid<M: ScatteringModel + ?Sized>(
    grid: &QGrid,
    source: &Source,
    model: &M,
    options: &PropagationOptions,
    db: &MaterialDb,
) -> Result<ParticleResult> {
    options.validate()?;
    if !model.supports_mode(options.mode) {
        return Err(DiffractError::UnsupportedMode {
            model: model.kind(),
            mode: options.mode,
        });
    }

    let started = Instant::now();
    let ctx = EvaluationContext {
        db,
        source,
        options,
        q_step: grid.q_step(),
    };
    let structure = model.amplitude_at(grid.q(), &ctx)?;
    if structure.len() != grid.len() {
        return Err(DiffractError::ShapeMismatch(format!(
            "{} returned {} amplitudes for {} pixels",
            model.kind(),
            structure.len(),
            grid.len()
        )));
    }

    let position: Vector3<f64> = model.position();
    let photon_fluence = source.photon_fluence_at(position.x.hypot(position.y));
    let amplitude: Vec<Complex64> = structure
        .iter()
        .zip(grid.q())
        .zip(grid.solid_angle().iter().zip(grid.polarization()))
        .map(|((s, q), (omega, pol))| {
            let scale = R_ELECTRON * (photon_fluence * omega * pol).sqrt();
            *s * scale * Complex64::cis(-q.dot(&position))
        })
        .collect();

    let (nx, ny) = grid.shape();
    let amplitude = Array2::from_shape_vec((ny, nx), amplitude)
        .map_err(|e| DiffractError::ShapeMismatch(e.to_string()))?;
    log::debug!(
        "{} evaluated on {nx}x{ny} pixels in {:.1?} ({:?})",
        model.kind(),
        started.elapsed(),
        options.mode
    );
    Ok(ParticleResult::from_amplitude(amplitude))
}

/// `Σ|I₁ - I₂| / ((ΣI₁ + ΣI₂) / 2)`, the relative difference of two patterns.
pub fn relative_difference(a: &Array2<f64>, b: &Array2<f64>) -> Result<f64> {
    if a.dim() != b.dim() {
        return Err(DiffractError::ShapeMismatch(format!(
            "patterns of shape {:?} and {:?}",
            a.dim(),
            b.dim()
        )));
    }
    let diff: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum();
    Ok(diff / ((a.sum() + b.sum()) / 2.0))
}
