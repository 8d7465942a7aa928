use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{DiffractError, Result, require_positive};

/// Polarization of the incident beam, for the per-pixel polarization factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarization {
    /// No polarization correction.
    #[default]
    Ignore,
    /// Electric field along detector y.
    Vertical,
    /// Electric field along detector x.
    Horizontal,
    Unpolarized,
}

impl Polarization {
    /// Factor for a scattered direction `(x, y, z)` of unit length.
    fn factor(self, x: f64, y: f64) -> f64 {
        match self {
            Polarization::Ignore => 1.0,
            Polarization::Vertical => 1.0 - y * y,
            Polarization::Horizontal => 1.0 - x * x,
            Polarization::Unpolarized => 1.0 - (x * x + y * y) / 2.0,
        }
    }
}

/// Flat pixel detector perpendicular to the beam (+z).
///
/// Pixel `(ix, iy)` sits at `((ix - cx) p, (iy - cy) p, D)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Detector {
    distance: f64,
    pixel_size: f64,
    nx: usize,
    ny: usize,
    cx: f64,
    cy: f64,
    polarization: Polarization,
    solid_angle_correction: bool,
}

impl Detector {
    /// Distance and pixel size in m. The beam center defaults to the grid center.
    pub fn new(distance: f64, pixel_size: f64, nx: usize, ny: usize) -> Result<Self> {
        if nx == 0 || ny == 0 {
            return Err(DiffractError::InvalidParameter {
                name: "pixels",
                reason: format!("grid must be non-empty, got {nx}x{ny}"),
            });
        }
        Ok(Detector {
            distance: require_positive("distance", distance)?,
            pixel_size: require_positive("pixel_size", pixel_size)?,
            nx,
            ny,
            cx: (nx as f64 - 1.0) / 2.0,
            cy: (ny as f64 - 1.0) / 2.0,
            polarization: Polarization::Ignore,
            solid_angle_correction: true,
        })
    }

    /// Beam center in (fractional) pixel coordinates.
    pub fn with_center(mut self, cx: f64, cy: f64) -> Result<Self> {
        if !cx.is_finite() || !cy.is_finite() {
            return Err(DiffractError::InvalidParameter {
                name: "center",
                reason: format!("must be finite, got ({cx}, {cy})"),
            });
        }
        self.cx = cx;
        self.cy = cy;
        Ok(self)
    }

    pub fn with_polarization(mut self, polarization: Polarization) -> Self {
        self.polarization = polarization;
        self
    }

    /// Without correction every pixel gets the on-axis solid angle `p²/D²`.
    pub fn with_solid_angle_correction(mut self, enabled: bool) -> Self {
        self.solid_angle_correction = enabled;
        self
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn pixel_size(&self) -> f64 {
        self.pixel_size
    }

    /// Grid size as (nx, ny).
    pub fn shape(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    pub fn center(&self) -> (f64, f64) {
        (self.cx, self.cy)
    }

    pub fn polarization(&self) -> Polarization {
        self.polarization
    }

    /// Scattering vectors on the Ewald sphere for every pixel.
    ///
    /// Fails with `GeometryMismatch` when every pixel maps to `q = 0`.
    pub fn q_grid(&self, wavelength: f64) -> Result<QGrid> {
        let k = 2.0 * std::f64::consts::PI / require_positive("wavelength", wavelength)?;
        let p = self.pixel_size;
        let d = self.distance;
        let n = self.nx * self.ny;

        let mut q = Vec::with_capacity(n);
        let mut solid_angle = Vec::with_capacity(n);
        let mut polarization = Vec::with_capacity(n);
        for iy in 0..self.ny {
            let y = (iy as f64 - self.cy) * p;
            for ix in 0..self.nx {
                let x = (ix as f64 - self.cx) * p;
                let r = (x * x + y * y + d * d).sqrt();
                let (ux, uy, uz) = (x / r, y / r, d / r);
                q.push(Vector3::new(k * ux, k * uy, k * (uz - 1.0)));
                solid_angle.push(if self.solid_angle_correction {
                    p * p * d / (r * r * r)
                } else {
                    p * p / (d * d)
                });
                polarization.push(self.polarization.factor(ux, uy));
            }
        }

        let grid = QGrid {
            nx: self.nx,
            ny: self.ny,
            q,
            solid_angle,
            polarization,
        };
        if grid.q_max() == 0.0 {
            return Err(DiffractError::GeometryMismatch(format!(
                "all {n} pixels map to q = 0"
            )));
        }
        Ok(grid)
    }
}

/// Per-pixel reciprocal-space sampling, row-major `(ny, nx)`.
#[derive(Debug, Clone)]
pub struct QGrid {
    nx: usize,
    ny: usize,
    q: Vec<Vector3<f64>>,
    solid_angle: Vec<f64>,
    polarization: Vec<f64>,
}

impl QGrid {
    /// Grid size as (nx, ny).
    pub fn shape(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    pub fn len(&self) -> usize {
        self.q.len()
    }

    pub fn is_empty(&self) -> bool {
        self.q.is_empty()
    }

    /// Scattering vectors in 1/m.
    pub fn q(&self) -> &[Vector3<f64>] {
        &self.q
    }

    /// Pixel solid angles in sr.
    pub fn solid_angle(&self) -> &[f64] {
        &self.solid_angle
    }

    pub fn polarization(&self) -> &[f64] {
        &self.polarization
    }

    /// Largest |q| in 1/m.
    pub fn q_max(&self) -> f64 {
        self.q.iter().map(|q| q.norm()).fold(0.0, f64::max)
    }

    /// Smallest |Δq| between neighboring pixels in 1/m; infinite for a
    /// single pixel.
    pub fn q_step(&self) -> f64 {
        let at = |ix: usize, iy: usize| self.q[iy * self.nx + ix];
        let mut step = f64::INFINITY;
        for iy in 0..self.ny {
            for ix in 0..self.nx {
                if ix + 1 < self.nx {
                    step = step.min((at(ix + 1, iy) - at(ix, iy)).norm());
                }
                if iy + 1 < self.ny {
                    step = step.min((at(ix, iy + 1) - at(ix, iy)).norm());
                }
            }
        }
        step
    }
}
