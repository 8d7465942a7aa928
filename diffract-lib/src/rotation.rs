use std::f64::consts::PI;

use nalgebra::{Matrix3, Quaternion, Rotation3, Unit, UnitQuaternion, Vector3};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::error::{DiffractError, Result};

const MATRIX_TOLERANCE: f64 = 1e-6;

/// Composition order of a rotation with an existing orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Convention {
    /// About the fixed laboratory axes.
    #[default]
    Extrinsic,
    /// About the particle's own, already rotated axes.
    Intrinsic,
}

/// A proper rotation of the particle frame into the laboratory frame.
///
/// Particle coordinates `r` map to laboratory coordinates `R r`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    inner: Rotation3<f64>,
}

impl Rotation {
    pub fn identity() -> Self {
        Rotation {
            inner: Rotation3::identity(),
        }
    }

    /// Builds from quaternion components `(w, x, y, z)`, renormalized.
    pub fn from_quaternion(w: f64, x: f64, y: f64, z: f64) -> Result<Self> {
        let q = Quaternion::new(w, x, y, z);
        let norm = q.norm();
        if !norm.is_finite() || norm < f64::EPSILON {
            return Err(DiffractError::InvalidRotation(format!(
                "quaternion ({w}, {x}, {y}, {z}) cannot be normalized"
            )));
        }
        Ok(Rotation {
            inner: UnitQuaternion::from_quaternion(q).to_rotation_matrix(),
        })
    }

    /// Rotation by `angle` radians about `axis` (normalized).
    pub fn from_axis_angle(axis: Vector3<f64>, angle: f64) -> Result<Self> {
        if !angle.is_finite() {
            return Err(DiffractError::InvalidRotation(format!(
                "non-finite angle {angle}"
            )));
        }
        let axis = Unit::try_new(axis, f64::EPSILON)
            .filter(|a| a.iter().all(|c| c.is_finite()))
            .ok_or_else(|| {
                DiffractError::InvalidRotation(format!("axis {axis:?} cannot be normalized"))
            })?;
        Ok(Rotation {
            inner: Rotation3::from_axis_angle(&axis, angle),
        })
    }

    /// Euler angles in radians about the axes z, x, z.
    ///
    /// Extrinsic: `Rz(gamma) Rx(beta) Rz(alpha)`, intrinsic:
    /// `Rz(alpha) Rx(beta) Rz(gamma)`.
    pub fn from_euler(alpha: f64, beta: f64, gamma: f64, convention: Convention) -> Result<Self> {
        if ![alpha, beta, gamma].iter().all(|a| a.is_finite()) {
            return Err(DiffractError::InvalidRotation(format!(
                "non-finite Euler angles ({alpha}, {beta}, {gamma})"
            )));
        }
        let rz = |a: f64| Rotation3::from_axis_angle(&Vector3::z_axis(), a);
        let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), beta);
        let inner = match convention {
            Convention::Extrinsic => rz(gamma) * rx * rz(alpha),
            Convention::Intrinsic => rz(alpha) * rx * rz(gamma),
        };
        Ok(Rotation { inner })
    }

    /// Validates orthonormal columns and a determinant of +1.
    pub fn from_matrix(matrix: Matrix3<f64>) -> Result<Self> {
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err(DiffractError::InvalidRotation(
                "matrix has non-finite entries".to_string(),
            ));
        }
        let deviation = (matrix.transpose() * matrix - Matrix3::identity()).amax();
        if deviation > MATRIX_TOLERANCE {
            return Err(DiffractError::InvalidRotation(format!(
                "columns are not orthonormal (deviation {deviation:.3e})"
            )));
        }
        let det = matrix.determinant();
        if (det - 1.0).abs() > MATRIX_TOLERANCE {
            return Err(DiffractError::InvalidRotation(format!(
                "determinant is {det}, expected +1"
            )));
        }
        Ok(Rotation {
            inner: Rotation3::from_matrix_unchecked(matrix),
        })
    }

    /// Uniformly distributed random rotation (Shoemake's method).
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let u1: f64 = rng.r#gen();
        let u2: f64 = rng.r#gen();
        let u3: f64 = rng.r#gen();
        let (a, b) = ((1.0 - u1).sqrt(), u1.sqrt());
        let q = Quaternion::new(
            b * (2.0 * PI * u3).cos(),
            a * (2.0 * PI * u2).sin(),
            a * (2.0 * PI * u2).cos(),
            b * (2.0 * PI * u3).sin(),
        );
        Rotation {
            inner: UnitQuaternion::from_quaternion(q).to_rotation_matrix(),
        }
    }

    pub fn from_spec(spec: &RotationSpec) -> Result<Self> {
        match spec {
            RotationSpec::Quaternion { quaternion: [w, x, y, z] } => {
                Self::from_quaternion(*w, *x, *y, *z)
            }
            RotationSpec::AxisAngle { axis, angle_deg } => {
                Self::from_axis_angle(Vector3::from(*axis), angle_deg.to_radians())
            }
            RotationSpec::Euler {
                euler_deg: [a, b, g],
                convention,
            } => Self::from_euler(a.to_radians(), b.to_radians(), g.to_radians(), *convention),
            RotationSpec::Matrix { matrix } => {
                Self::from_matrix(Matrix3::from_fn(|i, j| matrix[i][j]))
            }
            RotationSpec::Random { seed } => Ok(Self::random(&mut StdRng::seed_from_u64(*seed))),
        }
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        self.inner.matrix()
    }

    /// Unit quaternion `(w, x, y, z)` with `w >= 0`.
    pub fn quaternion(&self) -> [f64; 4] {
        let q = UnitQuaternion::from_rotation_matrix(&self.inner);
        let sign = if q.w < 0.0 { -1.0 } else { 1.0 };
        [sign * q.w, sign * q.i, sign * q.j, sign * q.k]
    }

    pub fn inverse(&self) -> Self {
        Rotation {
            inner: self.inner.inverse(),
        }
    }

    /// Composes `other` after `self`.
    ///
    /// Extrinsic: `other` acts about the laboratory axes (`other · self`).
    /// Intrinsic: `other` acts about the rotated particle axes (`self · other`).
    pub fn then(&self, other: &Rotation, convention: Convention) -> Self {
        let inner = match convention {
            Convention::Extrinsic => other.inner * self.inner,
            Convention::Intrinsic => self.inner * other.inner,
        };
        Rotation { inner }
    }

    pub fn apply(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.inner * v
    }

    pub fn apply_inverse(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.inner.inverse_transform_vector(v)
    }

    /// Rotates every point; returns a new vector of the same length.
    pub fn rotate(&self, points: &[Vector3<f64>]) -> Vec<Vector3<f64>> {
        points.iter().map(|p| self.apply(p)).collect()
    }

    pub fn rotate_inverse(&self, points: &[Vector3<f64>]) -> Vec<Vector3<f64>> {
        points.iter().map(|p| self.apply_inverse(p)).collect()
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::identity()
    }
}

/// Serializable rotation description. Angles are in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RotationSpec {
    Quaternion {
        quaternion: [f64; 4],
    },
    AxisAngle {
        axis: [f64; 3],
        angle_deg: f64,
    },
    Euler {
        euler_deg: [f64; 3],
        #[serde(default)]
        convention: Convention,
    },
    Matrix {
        matrix: [[f64; 3]; 3],
    },
    Random {
        seed: u64,
    },
}
