//! Particle representations behind one scattering capability.

use nalgebra::Vector3;
use num_complex::Complex64;

use crate::db::MaterialDb;
use crate::error::Result;
use crate::propagation::{PropagationMode, PropagationOptions};
use crate::rotation::{Convention, Rotation};
use crate::source::Source;

pub mod atoms;
pub mod geometry;
pub mod map;
pub mod spheroid;

pub use atoms::AtomicEnsemble;
pub use geometry::Geometry;
pub use map::VolumetricMap;
pub use spheroid::{AnalyticSpheroid, semi_axes, spheroid_diameter, spheroid_flattening};

/// Everything a model needs besides the q-vectors.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub db: &'a MaterialDb,
    pub source: &'a Source,
    pub options: &'a PropagationOptions,
    /// Detector |Δq| between neighboring pixels (1/m).
    pub q_step: f64,
}

/// Something that scatters X-rays.
///
/// `amplitude_at` returns the amplitude in electrons, `Σ f exp(-i q·r)`,
/// for the particle centered at the origin. The propagation engine adds
/// the position phase and the physical scaling.
pub trait ScatteringModel: Send + Sync {
    /// Short name used in logs and errors.
    fn kind(&self) -> &'static str;

    fn supports_mode(&self, _mode: PropagationMode) -> bool {
        true
    }

    /// Particle center in the laboratory frame (m).
    fn position(&self) -> Vector3<f64>;

    fn amplitude_at(&self, q: &[Vector3<f64>], ctx: &EvaluationContext<'_>)
    -> Result<Vec<Complex64>>;
}

/// The built-in particle representations.
#[derive(Debug, Clone)]
pub enum Particle {
    Atoms(AtomicEnsemble),
    Map(VolumetricMap),
    Spheroid(AnalyticSpheroid),
}

impl Particle {
    pub fn rotation(&self) -> &Rotation {
        match self {
            Particle::Atoms(p) => p.rotation(),
            Particle::Map(p) => p.rotation(),
            Particle::Spheroid(p) => p.rotation(),
        }
    }

    /// Replaces the orientation.
    pub fn with_rotation(self, rotation: Rotation) -> Self {
        match self {
            Particle::Atoms(p) => Particle::Atoms(p.with_rotation(rotation)),
            Particle::Map(p) => Particle::Map(p.with_rotation(rotation)),
            Particle::Spheroid(p) => Particle::Spheroid(p.with_rotation(rotation)),
        }
    }

    /// Composes `rotation` with the current orientation.
    pub fn rotated(&self, rotation: &Rotation, convention: Convention) -> Self {
        let orientation = self.rotation().then(rotation, convention);
        self.clone().with_rotation(orientation)
    }

    pub fn with_position(self, position: Vector3<f64>) -> Self {
        match self {
            Particle::Atoms(p) => Particle::Atoms(p.with_position(position)),
            Particle::Map(p) => Particle::Map(p.with_position(position)),
            Particle::Spheroid(p) => Particle::Spheroid(p.with_position(position)),
        }
    }

    fn model(&self) -> &dyn ScatteringModel {
        match self {
            Particle::Atoms(p) => p,
            Particle::Map(p) => p,
            Particle::Spheroid(p) => p,
        }
    }
}

impl ScatteringModel for Particle {
    fn kind(&self) -> &'static str {
        self.model().kind()
    }

    fn supports_mode(&self, mode: PropagationMode) -> bool {
        self.model().supports_mode(mode)
    }

    fn position(&self) -> Vector3<f64> {
        self.model().position()
    }

    fn amplitude_at(
        &self,
        q: &[Vector3<f64>],
        ctx: &EvaluationContext<'_>,
    ) -> Result<Vec<Complex64>> {
        self.model().amplitude_at(q, ctx)
    }
}

impl From<AtomicEnsemble> for Particle {
    fn from(p: AtomicEnsemble) -> Self {
        Particle::Atoms(p)
    }
}

impl From<VolumetricMap> for Particle {
    fn from(p: VolumetricMap) -> Self {
        Particle::Map(p)
    }
}

impl From<AnalyticSpheroid> for Particle {
    fn from(p: AnalyticSpheroid) -> Self {
        Particle::Spheroid(p)
    }
}
