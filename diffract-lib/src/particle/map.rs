use std::f64::consts::PI;

use diffract_data::MapDataset;
use nalgebra::Vector3;
use ndarray::{Array2, Array3, Zip};
use num_complex::Complex64;
use rayon::prelude::*;

use super::geometry::Geometry;
use super::spheroid::semi_axes;
use super::{EvaluationContext, ScatteringModel};
use crate::error::{DiffractError, Result, require_positive};
use crate::fft::{fftn, padded_len};
use crate::material::MaterialSpec;
use crate::propagation::{Interpolation, PropagationMode};
use crate::rotation::Rotation;

/// Relative tolerance for treating per-axis spacings as equal.
const SPACING_TOLERANCE: f64 = 1e-6;

/// Largest transform or resampling grid, in samples (2 GiB of `Complex64`).
pub const MAX_TRANSFORM_LEN: usize = 1 << 27;

/// Relative density on a uniform grid, indexed `[[z, y, x]]`.
///
/// Voxel `(iz, iy, ix)` is centered at `((ix - (nx-1)/2) dx, ...)` in the
/// particle frame. Values scale the material's scattering density.
#[derive(Debug, Clone)]
pub struct VolumetricMap {
    density: Array3<f64>,
    dx: f64,
    material: MaterialSpec,
    rotation: Rotation,
    position: Vector3<f64>,
}

impl VolumetricMap {
    /// A user-supplied map with grid spacing `dx` in m.
    pub fn custom(
        density: Array3<f64>,
        dx: f64,
        material: impl Into<MaterialSpec>,
    ) -> Result<Self> {
        require_positive("dx", dx)?;
        if density.is_empty() {
            return Err(DiffractError::ShapeMismatch("map has no voxels".to_string()));
        }
        if density.iter().any(|v| !v.is_finite()) {
            return Err(DiffractError::InvalidParameter {
                name: "density",
                reason: "map values must be finite".to_string(),
            });
        }
        Ok(VolumetricMap {
            density,
            dx,
            material: material.into(),
            rotation: Rotation::identity(),
            position: Vector3::zeros(),
        })
    }

    /// Like `custom`, with per-axis spacings `[dz, dy, dx]` that must agree.
    pub fn with_spacing(
        density: Array3<f64>,
        spacing: [f64; 3],
        material: impl Into<MaterialSpec>,
    ) -> Result<Self> {
        let dx = spacing[2];
        if spacing
            .iter()
            .any(|s| (s - dx).abs() > SPACING_TOLERANCE * dx.abs())
        {
            return Err(DiffractError::ShapeMismatch(format!(
                "non-uniform grid spacing {spacing:?}"
            )));
        }
        Self::custom(density, dx, material)
    }

    pub fn from_dataset(dataset: &MapDataset, material: impl Into<MaterialSpec>) -> Result<Self> {
        let [n0, n1, n2] = dataset.shape.map(|n| n as usize);
        if n0 * n1 * n2 != dataset.data.len() {
            return Err(DiffractError::ShapeMismatch(format!(
                "dataset '{}' has shape {:?} but {} values",
                dataset.name,
                dataset.shape,
                dataset.data.len()
            )));
        }
        let values = dataset.data.iter().map(|&v| f64::from(v)).collect();
        let density = Array3::from_shape_vec((n0, n1, n2), values)
            .map_err(|e| DiffractError::ShapeMismatch(e.to_string()))?;
        Self::with_spacing(density, dataset.spacing, material)
    }

    /// Rasterizes an analytic solid with supersampled partial-volume occupancy.
    pub fn from_geometry(
        geometry: Geometry,
        dx: f64,
        material: impl Into<MaterialSpec>,
    ) -> Result<Self> {
        let density = geometry.rasterize(dx)?;
        log::debug!("rasterized {geometry:?} onto {:?} voxels", density.dim());
        Self::custom(density, dx, material)
    }

    pub fn sphere(diameter: f64, dx: f64, material: impl Into<MaterialSpec>) -> Result<Self> {
        Self::from_geometry(Geometry::Sphere { diameter }, dx, material)
    }

    /// Spheroid with equatorial semi-axis `a` and polar semi-axis `c` along z.
    pub fn spheroid(a: f64, c: f64, dx: f64, material: impl Into<MaterialSpec>) -> Result<Self> {
        Self::from_geometry(Geometry::Spheroid { a, c }, dx, material)
    }

    pub fn spheroid_from_diameter(
        diameter: f64,
        flattening: f64,
        dx: f64,
        material: impl Into<MaterialSpec>,
    ) -> Result<Self> {
        let (a, c) = semi_axes(diameter, flattening)?;
        Self::spheroid(a, c, dx, material)
    }

    pub fn cube(diameter: f64, dx: f64, material: impl Into<MaterialSpec>) -> Result<Self> {
        Self::from_geometry(Geometry::Cube { diameter }, dx, material)
    }

    pub fn icosahedron(
        diameter: f64,
        dx: f64,
        material: impl Into<MaterialSpec>,
    ) -> Result<Self> {
        Self::from_geometry(Geometry::Icosahedron { diameter }, dx, material)
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_position(mut self, position: Vector3<f64>) -> Self {
        self.position = position;
        self
    }

    pub fn rotation(&self) -> &Rotation {
        &self.rotation
    }

    pub fn density(&self) -> &Array3<f64> {
        &self.density
    }

    pub fn dx(&self) -> f64 {
        self.dx
    }

    pub fn material(&self) -> &MaterialSpec {
        &self.material
    }

    /// Snapshot for a map archive.
    pub fn to_dataset(&self, name: impl Into<String>) -> MapDataset {
        let (n0, n1, n2) = self.density.dim();
        MapDataset {
            name: name.into(),
            shape: [n0 as u32, n1 as u32, n2 as u32],
            spacing: [self.dx; 3],
            data: self.density.iter().map(|&v| v as f32).collect(),
        }
    }

    /// Fourier transform of the unrotated map sampled at `Rᵀ q`.
    fn sample_3d(
        &self,
        q: &[Vector3<f64>],
        interpolation: Interpolation,
        oversampling: usize,
        q_step: f64,
    ) -> Result<Vec<Complex64>> {
        let (n0, n1, n2) = self.density.dim();
        let len = |n| transform_len(n, self.dx, q_step, oversampling);
        let padded = (len(n0), len(n1), len(n2));
        check_transform_size(&[padded.0, padded.1, padded.2])?;
        let mut field = Array3::<Complex64>::zeros(padded);
        for ((i0, i1, i2), &v) in self.density.indexed_iter() {
            if v != 0.0 {
                let at = [
                    wrap(i0, n0, padded.0),
                    wrap(i1, n1, padded.1),
                    wrap(i2, n2, padded.2),
                ];
                field[at] = Complex64::new(v, 0.0);
            }
        }
        log::debug!("3D transform of {n0}x{n1}x{n2} map padded to {padded:?}");
        fftn(&mut field)?;

        let dx = self.dx;
        let shift = Vector3::new(center_shift(n2), center_shift(n1), center_shift(n0)) * dx;
        let scale = [
            padded.0 as f64 * dx / (2.0 * PI),
            padded.1 as f64 * dx / (2.0 * PI),
            padded.2 as f64 * dx / (2.0 * PI),
        ];
        Ok(q.par_iter()
            .map(|qv| {
                let qp = self.rotation.apply_inverse(qv);
                let u = [qp.z * scale[0], qp.y * scale[1], qp.x * scale[2]];
                sample_wrapped_3d(&field, u, interpolation) * Complex64::cis(-qp.dot(&shift))
            })
            .collect())
    }

    /// Projection along the beam of the rotated map, sampled at `(q_x, q_y)`.
    fn sample_projection(
        &self,
        q: &[Vector3<f64>],
        interpolation: Interpolation,
        oversampling: usize,
        q_step: f64,
    ) -> Result<Vec<Complex64>> {
        let (n0, n1, n2) = self.density.dim();
        let m = (3f64.sqrt() * n0.max(n1).max(n2) as f64).ceil() as usize;
        // The rotated resampling visits m³ points.
        check_transform_size(&[m, m, m])?;
        let np = transform_len(m, self.dx, q_step, oversampling);
        check_transform_size(&[np, np])?;
        let out_center = (m as f64 - 1.0) / 2.0;
        let in_center = [
            (n0 as f64 - 1.0) / 2.0,
            (n1 as f64 - 1.0) / 2.0,
            (n2 as f64 - 1.0) / 2.0,
        ];

        let mut projection = Array2::<f64>::zeros((m, m));
        Zip::indexed(&mut projection).par_for_each(|(iy, ix), v| {
            let mut column = 0.0;
            for iz in 0..m {
                // Voxel units; the spacing cancels.
                let lab = Vector3::new(
                    ix as f64 - out_center,
                    iy as f64 - out_center,
                    iz as f64 - out_center,
                );
                let r = self.rotation.apply_inverse(&lab);
                column += sample_density(
                    &self.density,
                    [r.z + in_center[0], r.y + in_center[1], r.x + in_center[2]],
                );
            }
            *v = column;
        });

        let mut field = Array2::<Complex64>::zeros((np, np));
        for ((iy, ix), &v) in projection.indexed_iter() {
            if v != 0.0 {
                field[[wrap(iy, m, np), wrap(ix, m, np)]] = Complex64::new(v, 0.0);
            }
        }
        log::debug!("2D transform of {m}x{m} projection padded to {np}x{np}");
        fftn(&mut field)?;

        let dx = self.dx;
        let shift = center_shift(m) * dx;
        let scale = np as f64 * dx / (2.0 * PI);
        Ok(q.par_iter()
            .map(|qv| {
                let u = [qv.y * scale, qv.x * scale];
                sample_wrapped_2d(&field, u, interpolation)
                    * Complex64::cis(-(qv.x + qv.y) * shift)
            })
            .collect())
    }
}

/// Padded transform length for `n` samples of spacing `dx`: fine enough
/// that the reciprocal step `2π / (N dx)` does not exceed `q_step`, never
/// shorter than `n` and never longer than needed for `oversampling n`.
fn transform_len(n: usize, dx: f64, q_step: f64, oversampling: usize) -> usize {
    let cap = oversampling * n;
    let needed = if q_step.is_finite() && q_step > 0.0 {
        ((2.0 * PI / (q_step * dx)).ceil() as usize).min(cap)
    } else {
        cap
    };
    padded_len(needed.max(n))
}

/// Rejects transforms and resamplings above `MAX_TRANSFORM_LEN` samples.
fn check_transform_size(shape: &[usize]) -> Result<()> {
    let len = shape
        .iter()
        .try_fold(1usize, |acc, &n| acc.checked_mul(n))
        .filter(|&len| len <= MAX_TRANSFORM_LEN);
    match len {
        Some(_) => Ok(()),
        None => Err(DiffractError::InvalidParameter {
            name: "map",
            reason: format!(
                "{shape:?} samples exceed the limit of {MAX_TRANSFORM_LEN}, coarsen dx or lower oversampling"
            ),
        }),
    }
}

/// Padded index of voxel `i` of `n`, centered at `floor(n/2)`.
fn wrap(i: usize, n: usize, padded: usize) -> usize {
    (i as isize - (n / 2) as isize).rem_euclid(padded as isize) as usize
}

/// Offset in voxels between `floor(n/2)` and the geometric center.
fn center_shift(n: usize) -> f64 {
    (n / 2) as f64 - (n as f64 - 1.0) / 2.0
}

fn wrapped(i: isize, n: usize) -> usize {
    i.rem_euclid(n as isize) as usize
}

fn sample_wrapped_3d(
    field: &Array3<Complex64>,
    u: [f64; 3],
    interpolation: Interpolation,
) -> Complex64 {
    let (a, b, c) = field.dim();
    let n = [a, b, c];
    match interpolation {
        Interpolation::Nearest => {
            let idx = |d: usize| wrapped(u[d].round() as isize, n[d]);
            field[[idx(0), idx(1), idx(2)]]
        }
        Interpolation::Trilinear => {
            let base = u.map(f64::floor);
            let t = [u[0] - base[0], u[1] - base[1], u[2] - base[2]];
            let mut acc = Complex64::new(0.0, 0.0);
            for corner in 0..8usize {
                let mut weight = 1.0;
                let mut at = [0usize; 3];
                for d in 0..3 {
                    let step = (corner >> d) & 1;
                    weight *= if step == 1 { t[d] } else { 1.0 - t[d] };
                    at[d] = wrapped(base[d] as isize + step as isize, n[d]);
                }
                acc += field[at] * weight;
            }
            acc
        }
    }
}

fn sample_wrapped_2d(
    field: &Array2<Complex64>,
    u: [f64; 2],
    interpolation: Interpolation,
) -> Complex64 {
    let (a, b) = field.dim();
    let n = [a, b];
    match interpolation {
        Interpolation::Nearest => {
            field[[wrapped(u[0].round() as isize, n[0]), wrapped(u[1].round() as isize, n[1])]]
        }
        Interpolation::Trilinear => {
            let base = u.map(f64::floor);
            let t = [u[0] - base[0], u[1] - base[1]];
            let mut acc = Complex64::new(0.0, 0.0);
            for corner in 0..4usize {
                let mut weight = 1.0;
                let mut at = [0usize; 2];
                for d in 0..2 {
                    let step = (corner >> d) & 1;
                    weight *= if step == 1 { t[d] } else { 1.0 - t[d] };
                    at[d] = wrapped(base[d] as isize + step as isize, n[d]);
                }
                acc += field[at] * weight;
            }
            acc
        }
    }
}

/// Trilinear density at fractional voxel indices, zero outside the grid.
fn sample_density(density: &Array3<f64>, p: [f64; 3]) -> f64 {
    let (a, b, c) = density.dim();
    let n = [a, b, c];
    if (0..3).any(|d| p[d] <= -1.0 || p[d] >= n[d] as f64) {
        return 0.0;
    }
    let base = p.map(f64::floor);
    let t = [p[0] - base[0], p[1] - base[1], p[2] - base[2]];
    let mut acc = 0.0;
    for corner in 0..8usize {
        let mut weight = 1.0;
        let mut at = [0usize; 3];
        let mut inside = true;
        for d in 0..3 {
            let step = (corner >> d) & 1;
            weight *= if step == 1 { t[d] } else { 1.0 - t[d] };
            let i = base[d] as isize + step as isize;
            inside &= i >= 0 && (i as usize) < n[d];
            at[d] = i.max(0) as usize;
        }
        if inside && weight > 0.0 {
            acc += density[at] * weight;
        }
    }
    acc
}

impl ScatteringModel for VolumetricMap {
    fn kind(&self) -> &'static str {
        "map"
    }

    fn position(&self) -> Vector3<f64> {
        self.position
    }

    fn amplitude_at(
        &self,
        q: &[Vector3<f64>],
        ctx: &EvaluationContext<'_>,
    ) -> Result<Vec<Complex64>> {
        let nyquist = PI / self.dx;
        let q_max = q.iter().map(|v| v.norm()).fold(0.0, f64::max);
        if q_max > nyquist {
            log::warn!(
                "detector reaches q = {q_max:.3e} 1/m beyond the map Nyquist limit {nyquist:.3e} 1/m, refine dx"
            );
        }

        let material = self.material.resolve(ctx.db)?;
        let strength = material.scattering_density(ctx.db, ctx.source.photon_energy_ev())?
            * self.dx.powi(3);
        let options = ctx.options;
        let transform = match options.mode {
            PropagationMode::ThreeDSampling => {
                self.sample_3d(q, options.interpolation, options.oversampling, ctx.q_step)?
            }
            PropagationMode::Projection => {
                self.sample_projection(q, options.interpolation, options.oversampling, ctx.q_step)?
            }
        };
        Ok(transform.into_iter().map(|v| v * strength).collect())
    }
}
