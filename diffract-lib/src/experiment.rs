use std::time::Instant;

use ndarray::Array2;
use num_complex::Complex64;
use rayon::prelude::*;

use crate::db::MaterialDb;
use crate::detector::{Detector, QGrid};
use crate::error::{DiffractError, Result};
use crate::particle::Particle;
use crate::propagation::{ParticleResult, PropagationOptions, propagate_on_grid};
use crate::rotation::{Convention, Rotation};
use crate::source::Source;

/// A source, a detector and named particles evaluated independently.
#[derive(Debug, Clone)]
pub struct Experiment {
    source: Source,
    detector: Detector,
    particles: Vec<(String, Particle)>,
    options: PropagationOptions,
    db: MaterialDb,
}

impl Experiment {
    pub fn new(source: Source, detector: Detector) -> Self {
        Experiment {
            source,
            detector,
            particles: Vec::new(),
            options: PropagationOptions::default(),
            db: MaterialDb::new(),
        }
    }

    pub fn with_options(mut self, options: PropagationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_database(mut self, db: MaterialDb) -> Self {
        self.db = db;
        self
    }

    /// Adds a particle; names must be unique within the experiment.
    pub fn add_particle(
        &mut self,
        name: impl Into<String>,
        particle: impl Into<Particle>,
    ) -> Result<()> {
        let name = name.into();
        if self.particles.iter().any(|(n, _)| *n == name) {
            return Err(DiffractError::InvalidParameter {
                name: "particle",
                reason: format!("duplicate particle name '{name}'"),
            });
        }
        self.particles.push((name, particle.into()));
        Ok(())
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn detector(&self) -> &Detector {
        &self.detector
    }

    pub fn options(&self) -> &PropagationOptions {
        &self.options
    }

    pub fn particles(&self) -> impl Iterator<Item = (&str, &Particle)> {
        self.particles.iter().map(|(n, p)| (n.as_str(), p))
    }

    /// Evaluates every particle at its own orientation.
    pub fn run(&self) -> Result<ResultBundle> {
        let grid = self.detector.q_grid(self.source.wavelength())?;
        self.run_on_grid(&grid, None)
    }

    /// One bundle per rotation, each applied on top of every particle's
    /// orientation with the given convention.
    pub fn run_rotations(
        &self,
        rotations: &[Rotation],
        convention: Convention,
    ) -> Result<Vec<ResultBundle>> {
        let grid = self.detector.q_grid(self.source.wavelength())?;
        rotations
            .iter()
            .map(|rotation| self.run_on_grid(&grid, Some((rotation, convention))))
            .collect()
    }

    fn run_on_grid(
        &self,
        grid: &QGrid,
        rotation: Option<(&Rotation, Convention)>,
    ) -> Result<ResultBundle> {
        let started = Instant::now();
        let entries = self
            .particles
            .par_iter()
            .map(|(name, particle)| {
                let result = match rotation {
                    Some((r, convention)) => {
                        let rotated = particle.rotated(r, convention);
                        propagate_on_grid(grid, &self.source, &rotated, &self.options, &self.db)
                    }
                    None => {
                        propagate_on_grid(grid, &self.source, particle, &self.options, &self.db)
                    }
                };
                result.map(|r| (name.clone(), r))
            })
            .collect::<Result<Vec<_>>>()?;

        let bundle = ResultBundle { entries };
        log::info!(
            "propagated {} particle(s) in {:.1?}, {:.3e} photons total",
            bundle.len(),
            started.elapsed(),
            bundle.iter().map(|(_, r)| r.total_intensity()).sum::<f64>()
        );
        Ok(bundle)
    }
}

/// Per-particle results in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ResultBundle {
    entries: Vec<(String, ParticleResult)>,
}

impl ResultBundle {
    pub fn get(&self, name: &str) -> Option<&ParticleResult> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, r)| r)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParticleResult)> {
        self.entries.iter().map(|(n, r)| (n.as_str(), r))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pattern of all particles scattering together: amplitudes add.
    pub fn coherent_sum(&self) -> Option<ParticleResult> {
        let (_, first) = self.entries.first()?;
        let mut amplitude: Array2<Complex64> = first.amplitude().clone();
        for (_, r) in &self.entries[1..] {
            amplitude += r.amplitude();
        }
        Some(ParticleResult::from_amplitude(amplitude))
    }
}
