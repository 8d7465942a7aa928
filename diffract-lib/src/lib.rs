pub mod constants;
pub mod db;
pub mod detector;
pub(crate) mod elements_db;
pub mod error;
pub mod experiment;
pub mod fft;
pub mod form_factor;
pub mod formula;
pub mod henke;
pub(crate) mod henke_db;
pub mod interp;
pub mod map_io;
pub mod material;
pub(crate) mod materials_db;
pub mod particle;
pub mod propagation;
pub mod rotation;
pub mod source;

pub use db::MaterialDb;
pub use detector::{Detector, Polarization, QGrid};
pub use error::{DiffractError, Result};
pub use experiment::{Experiment, ResultBundle};
pub use material::{Material, MaterialSpec};
pub use particle::{
    AnalyticSpheroid, AtomicEnsemble, EvaluationContext, Geometry, Particle, ScatteringModel,
    VolumetricMap,
};
pub use propagation::{
    Interpolation, ParticleResult, PropagationMode, PropagationOptions, propagate,
    propagate_on_grid, relative_difference,
};
pub use rotation::{Convention, Rotation, RotationSpec};
pub use source::{BeamProfile, Source};
pub use diffract_data;
