use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use diffract::map_io::{dataset, read_archive};
use diffract::{
    AnalyticSpheroid, AtomicEnsemble, BeamProfile, Convention, Detector, Experiment, Geometry,
    MaterialDb, MaterialSpec, Particle, Polarization, PropagationOptions, Rotation, RotationSpec,
    Source, VolumetricMap,
};
use nalgebra::Vector3;
use serde::Deserialize;

/// Top level of an experiment TOML file.
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct ExperimentConfig {
    /// Scattering-factor table from `diffract-generate`; the embedded one otherwise.
    pub database: Option<PathBuf>,
    pub source: SourceConfig,
    pub detector: DetectorConfig,
    #[serde(default)]
    pub propagation: PropagationOptions,
    /// Extra orientations, each evaluated as its own run.
    #[serde(default)]
    pub rotations: Vec<RotationSpec>,
    #[serde(default)]
    pub rotation_convention: Convention,
    #[serde(default)]
    pub particles: Vec<ParticleConfig>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// m
    pub wavelength: f64,
    /// J
    pub pulse_energy: f64,
    /// m
    pub focus_diameter: f64,
    #[serde(default)]
    pub profile: BeamProfile,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct DetectorConfig {
    pub distance: f64,
    pub pixel_size: f64,
    pub nx: usize,
    pub ny: usize,
    /// Beam center in pixels, `[cx, cy]`.
    pub center: Option<[f64; 2]>,
    #[serde(default)]
    pub polarization: Polarization,
    #[serde(default = "default_true")]
    pub solid_angle_correction: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize, Debug)]
pub struct ParticleConfig {
    pub name: String,
    #[serde(flatten)]
    pub kind: ParticleKind,
    pub material: Option<MaterialSpec>,
    pub rotation: Option<RotationSpec>,
    /// m
    pub position: Option<[f64; 3]>,
}

#[derive(Deserialize, Debug)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ParticleKind {
    /// Semi-axes `a`, `c`, or a volume-equivalent `diameter` with `flattening`.
    Spheroid {
        a: Option<f64>,
        c: Option<f64>,
        diameter: Option<f64>,
        flattening: Option<f64>,
    },
    /// A rasterized `shape` at spacing `dx`, or a dataset from a map archive.
    Map {
        shape: Option<Geometry>,
        dx: Option<f64>,
        archive: Option<PathBuf>,
        dataset: Option<String>,
    },
    Atoms {
        pdb: PathBuf,
    },
}

impl ExperimentConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let mut config: ExperimentConfig = toml::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Makes relative file references relative to the config file.
    fn resolve_paths(&mut self, base: &Path) {
        let fix = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        if let Some(db) = self.database.as_mut() {
            fix(db);
        }
        for particle in &mut self.particles {
            match &mut particle.kind {
                ParticleKind::Map {
                    archive: Some(archive),
                    ..
                } => fix(archive),
                ParticleKind::Atoms { pdb } => fix(pdb),
                _ => {}
            }
        }
    }

    pub fn database(&self) -> Result<MaterialDb> {
        match &self.database {
            Some(path) => MaterialDb::from_path(path)
                .with_context(|| format!("failed to load database {}", path.display())),
            None => Ok(MaterialDb::new()),
        }
    }

    pub fn build(&self) -> Result<Experiment> {
        let db = self.database()?;
        let s = &self.source;
        let source = Source::new(s.wavelength, s.pulse_energy, s.focus_diameter)
            .context("invalid [source]")?
            .with_profile(s.profile);

        let d = &self.detector;
        let mut detector = Detector::new(d.distance, d.pixel_size, d.nx, d.ny)
            .context("invalid [detector]")?
            .with_polarization(d.polarization)
            .with_solid_angle_correction(d.solid_angle_correction);
        if let Some([cx, cy]) = d.center {
            detector = detector
                .with_center(cx, cy)
                .context("invalid [detector] center")?;
        }

        let mut experiment = Experiment::new(source, detector)
            .with_options(self.propagation)
            .with_database(db.clone());
        for config in &self.particles {
            let particle = config
                .build(&db)
                .with_context(|| format!("invalid particle '{}'", config.name))?;
            experiment.add_particle(config.name.clone(), particle)?;
        }
        Ok(experiment)
    }

    pub fn rotations(&self) -> Result<Vec<Rotation>> {
        self.rotations
            .iter()
            .map(|spec| Rotation::from_spec(spec).context("invalid entry in rotations"))
            .collect()
    }
}

impl ParticleConfig {
    fn material(&self) -> Result<MaterialSpec> {
        match &self.material {
            Some(m) => Ok(m.clone()),
            None => bail!("a material is required"),
        }
    }

    pub fn build(&self, db: &MaterialDb) -> Result<Particle> {
        let particle: Particle = match &self.kind {
            ParticleKind::Spheroid {
                a,
                c,
                diameter,
                flattening,
            } => match (a, c, diameter) {
                (Some(a), Some(c), None) => AnalyticSpheroid::new(*a, *c, self.material()?)?.into(),
                (None, None, Some(d)) => {
                    AnalyticSpheroid::from_diameter(*d, flattening.unwrap_or(0.0), self.material()?)?
                        .into()
                }
                _ => bail!("give either `a` and `c`, or `diameter` (with optional `flattening`)"),
            },
            ParticleKind::Map {
                shape,
                dx,
                archive,
                dataset: name,
            } => match (shape, archive) {
                (Some(shape), None) => {
                    let Some(dx) = dx else {
                        bail!("`dx` is required with `shape`")
                    };
                    VolumetricMap::from_geometry(*shape, *dx, self.material()?)?.into()
                }
                (None, Some(archive)) => {
                    let maps = read_archive(archive)?;
                    let ds = match name {
                        Some(name) => dataset(&maps, name)?,
                        None => match maps.datasets.as_slice() {
                            [only] => only,
                            _ => bail!("`dataset` is required for archives with several maps"),
                        },
                    };
                    VolumetricMap::from_dataset(ds, self.material()?)?.into()
                }
                _ => bail!("give either `shape` or `archive`"),
            },
            ParticleKind::Atoms { pdb } => AtomicEnsemble::from_pdb_path(pdb, db)?.into(),
        };

        let particle = match &self.rotation {
            Some(spec) => particle.with_rotation(Rotation::from_spec(spec)?),
            None => particle,
        };
        Ok(match self.position {
            Some([x, y, z]) => particle.with_position(Vector3::new(x, y, z)),
            None => particle,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"
        rotations = [{ axis = [0.0, 0.0, 1.0], angle_deg = 90.0 }, { seed = 4 }]

        [source]
        wavelength = 1e-10
        pulse_energy = 1e-3
        focus_diameter = 1e-6

        [detector]
        distance = 0.5
        pixel_size = 750e-6
        nx = 32
        ny = 24
        center = [15.0, 11.0]
        polarization = "unpolarized"

        [propagation]
        mode = "projection"

        [[particles]]
        name = "spheroid"
        kind = "spheroid"
        a = 1.5e-9
        c = 3e-9
        material = "water"
        rotation = { quaternion = [1.0, 0.0, 0.0, 0.0] }

        [[particles]]
        name = "ball"
        kind = "map"
        shape = { geometry = "sphere", diameter = 3e-9 }
        dx = 0.5e-9
        material = { formula = "H2O", mass_density = 1000.0 }
        position = [0.0, 0.0, 1e-9]
    "#;

    #[test]
    fn test_parse_and_build() {
        let config: ExperimentConfig = toml::from_str(EXAMPLE).unwrap();
        assert_eq!(config.particles.len(), 2);
        assert_eq!(config.rotations().unwrap().len(), 2);
        assert_eq!(config.propagation.oversampling, 4);

        let experiment = config.build().unwrap();
        assert_eq!(experiment.detector().shape(), (32, 24));
        let names: Vec<&str> = experiment.particles().map(|(n, _)| n).collect();
        assert_eq!(names, ["spheroid", "ball"]);
    }

    #[test]
    fn test_incomplete_particles_rejected() {
        let db = MaterialDb::new();
        let no_material: ParticleConfig = toml::from_str(
            r#"
            name = "s"
            kind = "spheroid"
            diameter = 5e-9
            "#,
        )
        .unwrap();
        assert!(no_material.build(&db).is_err());

        let no_dx: ParticleConfig = toml::from_str(
            r#"
            name = "m"
            kind = "map"
            shape = { geometry = "cube", diameter = 2e-9 }
            material = "protein"
            "#,
        )
        .unwrap();
        assert!(no_dx.build(&db).is_err());
    }
}
