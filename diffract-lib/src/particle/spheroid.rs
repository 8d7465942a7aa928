use std::f64::consts::PI;

use nalgebra::Vector3;
use num_complex::Complex64;
use rayon::prelude::*;

use super::{EvaluationContext, ScatteringModel};
use crate::error::{DiffractError, Result, require_positive};
use crate::material::MaterialSpec;
use crate::rotation::Rotation;

/// Volume-equivalent diameter `2 (a² c)^(1/3)` of a spheroid.
pub fn spheroid_diameter(a: f64, c: f64) -> f64 {
    2.0 * (a * a * c).cbrt()
}

/// Flattening `1 - a/c`.
pub fn spheroid_flattening(a: f64, c: f64) -> f64 {
    1.0 - a / c
}

/// Semi-axes `(a, c)` from a volume-equivalent diameter and a flattening.
pub fn semi_axes(diameter: f64, flattening: f64) -> Result<(f64, f64)> {
    require_positive("diameter", diameter)?;
    if !flattening.is_finite() || flattening >= 1.0 {
        return Err(DiffractError::InvalidParameter {
            name: "flattening",
            reason: format!("must be below 1, got {flattening}"),
        });
    }
    let c = diameter / 2.0 / (1.0 - flattening).powf(2.0 / 3.0);
    Ok((c * (1.0 - flattening), c))
}

/// `3 (sin x - x cos x) / x³`, the normalized sphere form factor.
pub(crate) fn sphere_form(x: f64) -> f64 {
    if x.abs() < 1e-3 {
        let x2 = x * x;
        1.0 - x2 / 10.0 + x2 * x2 / 280.0
    } else {
        3.0 * (x.sin() - x * x.cos()) / (x * x * x)
    }
}

/// Homogeneous spheroid evaluated in closed form.
///
/// `a` is the equatorial semi-axis (particle x and y), `c` the polar
/// semi-axis along particle z.
#[derive(Debug, Clone)]
pub struct AnalyticSpheroid {
    a: f64,
    c: f64,
    material: MaterialSpec,
    rotation: Rotation,
    position: Vector3<f64>,
}

impl AnalyticSpheroid {
    pub fn new(a: f64, c: f64, material: impl Into<MaterialSpec>) -> Result<Self> {
        Ok(AnalyticSpheroid {
            a: require_positive("a", a)?,
            c: require_positive("c", c)?,
            material: material.into(),
            rotation: Rotation::identity(),
            position: Vector3::zeros(),
        })
    }

    pub fn from_diameter(
        diameter: f64,
        flattening: f64,
        material: impl Into<MaterialSpec>,
    ) -> Result<Self> {
        let (a, c) = semi_axes(diameter, flattening)?;
        Self::new(a, c, material)
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

    pub fn material(&self) -> &MaterialSpec {
        &self.material
    }

    /// Semi-axes `(a, c)` in m.
    pub fn semi_axes(&self) -> (f64, f64) {
        (self.a, self.c)
    }

    pub fn diameter(&self) -> f64 {
        spheroid_diameter(self.a, self.c)
    }

    pub fn flattening(&self) -> f64 {
        spheroid_flattening(self.a, self.c)
    }

    pub fn volume(&self) -> f64 {
        4.0 / 3.0 * PI * self.a * self.a * self.c
    }
}

impl ScatteringModel for AnalyticSpheroid {
    fn kind(&self) -> &'static str {
        "spheroid"
    }

    fn position(&self) -> Vector3<f64> {
        self.position
    }

    fn amplitude_at(
        &self,
        q: &[Vector3<f64>],
        ctx: &EvaluationContext<'_>,
    ) -> Result<Vec<Complex64>> {
        let material = self.material.resolve(ctx.db)?;
        let strength =
            material.scattering_density(ctx.db, ctx.source.photon_energy_ev())? * self.volume();
        let (a2, c2) = (self.a * self.a, self.c * self.c);
        Ok(q.par_iter()
            .map(|qv| {
                let qp = self.rotation.apply_inverse(qv);
                let x = (a2 * (qp.x * qp.x + qp.y * qp.y) + c2 * qp.z * qp.z).sqrt();
                strength * sphere_form(x)
            })
            .collect())
    }
}
