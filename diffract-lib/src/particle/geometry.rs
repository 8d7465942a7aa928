use std::f64::consts::PI;

use nalgebra::Vector3;
use ndarray::{Array3, Zip};
use serde::{Deserialize, Serialize};

use crate::error::{DiffractError, Result, require_positive};

/// Sub-samples per axis when estimating partial voxel occupancy.
const SUPERSAMPLING: usize = 4;

/// Analytic solids that can be rasterized onto a voxel grid.
///
/// Sizes are volume-equivalent diameters, except the spheroid which takes
/// its semi-axes (`a` along x and y, `c` along z).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "geometry", rename_all = "lowercase")]
pub enum Geometry {
    Sphere { diameter: f64 },
    Spheroid { a: f64, c: f64 },
    Cube { diameter: f64 },
    Icosahedron { diameter: f64 },
}

fn golden_ratio() -> f64 {
    (1.0 + 5.0f64.sqrt()) / 2.0
}

impl Geometry {
    fn validate(&self) -> Result<()> {
        match *self {
            Geometry::Sphere { diameter }
            | Geometry::Cube { diameter }
            | Geometry::Icosahedron { diameter } => {
                require_positive("diameter", diameter)?;
            }
            Geometry::Spheroid { a, c } => {
                require_positive("a", a)?;
                require_positive("c", c)?;
            }
        }
        Ok(())
    }

    /// Half-width of the axis-aligned bounding box.
    fn half_extent(&self) -> f64 {
        match *self {
            Geometry::Sphere { diameter } => diameter / 2.0,
            Geometry::Spheroid { a, c } => a.max(c),
            Geometry::Cube { diameter } => cube_edge(diameter) / 2.0,
            // Circumradius.
            Geometry::Icosahedron { diameter } => {
                icosahedron_edge(diameter) * (2.0 * PI / 5.0).sin()
            }
        }
    }

    pub fn contains(&self, p: &Vector3<f64>) -> bool {
        match *self {
            Geometry::Sphere { diameter } => p.norm_squared() <= (diameter / 2.0).powi(2),
            Geometry::Spheroid { a, c } => {
                (p.x * p.x + p.y * p.y) / (a * a) + p.z * p.z / (c * c) <= 1.0
            }
            Geometry::Cube { diameter } => p.amax() <= cube_edge(diameter) / 2.0,
            Geometry::Icosahedron { diameter } => {
                let phi = golden_ratio();
                let inradius = icosahedron_edge(diameter) * phi * phi / (2.0 * 3.0f64.sqrt());
                icosahedron_normals(phi)
                    .iter()
                    .all(|n| n.dot(p) <= inradius)
            }
        }
    }

    /// Occupancy in [0, 1] on a cubic grid of spacing `dx`, indexed `[[z, y, x]]`.
    ///
    /// Voxel centers sit at `(i - (n - 1)/2) dx`; the grid spans the
    /// bounding box plus one voxel of margin.
    pub fn rasterize(&self, dx: f64) -> Result<Array3<f64>> {
        self.validate()?;
        require_positive("dx", dx)?;
        let n = (2.0 * self.half_extent() / dx - 1e-9).ceil() as usize + 2;
        if n > 1024 {
            return Err(DiffractError::InvalidParameter {
                name: "dx",
                reason: format!("{n}³ voxels requested, refine the grid spacing"),
            });
        }

        let center = (n as f64 - 1.0) / 2.0;
        let step = 1.0 / SUPERSAMPLING as f64;
        let offsets: Vec<f64> = (0..SUPERSAMPLING)
            .map(|s| (s as f64 + 0.5) * step - 0.5)
            .collect();
        let weight = 1.0 / (SUPERSAMPLING.pow(3)) as f64;

        let mut grid = Array3::<f64>::zeros((n, n, n));
        Zip::indexed(&mut grid).par_for_each(|(iz, iy, ix), v| {
            let mut inside = 0usize;
            for oz in &offsets {
                for oy in &offsets {
                    for ox in &offsets {
                        let p = Vector3::new(
                            (ix as f64 - center + ox) * dx,
                            (iy as f64 - center + oy) * dx,
                            (iz as f64 - center + oz) * dx,
                        );
                        if self.contains(&p) {
                            inside += 1;
                        }
                    }
                }
            }
            *v = inside as f64 * weight;
        });
        Ok(grid)
    }
}

/// Edge of the cube with the volume of a sphere of `diameter`.
fn cube_edge(diameter: f64) -> f64 {
    diameter * (PI / 6.0).cbrt()
}

/// Edge of the icosahedron with the volume of a sphere of `diameter`.
fn icosahedron_edge(diameter: f64) -> f64 {
    let volume = PI * diameter.powi(3) / 6.0;
    (volume / (5.0 / 12.0 * (3.0 + 5.0f64.sqrt()))).cbrt()
}

/// Unit face normals: the 20 vertex directions of the dual dodecahedron.
fn icosahedron_normals(phi: f64) -> Vec<Vector3<f64>> {
    let inv = 1.0 / phi;
    let mut normals = Vec::with_capacity(20);
    for sx in [-1.0, 1.0] {
        for sy in [-1.0, 1.0] {
            for sz in [-1.0, 1.0] {
                normals.push(Vector3::new(sx, sy, sz));
            }
        }
    }
    for s1 in [-1.0, 1.0] {
        for s2 in [-1.0, 1.0] {
            normals.push(Vector3::new(0.0, s1 * inv, s2 * phi));
            normals.push(Vector3::new(s1 * inv, s2 * phi, 0.0));
            normals.push(Vector3::new(s1 * phi, 0.0, s2 * inv));
        }
    }
    normals.into_iter().map(|n| n.normalize()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rasterized_volume(geometry: Geometry, dx: f64) -> f64 {
        geometry.rasterize(dx).unwrap().sum() * dx.powi(3)
    }

    #[test]
    fn test_volumes_match_equivalent_sphere() {
        let d: f64 = 10e-9;
        let expected = PI * d.powi(3) / 6.0;
        for geometry in [
            Geometry::Sphere { diameter: d },
            Geometry::Cube { diameter: d },
            Geometry::Icosahedron { diameter: d },
        ] {
            assert_relative_eq!(rasterized_volume(geometry, 0.4e-9), expected, max_relative = 0.02);
        }
    }

    #[test]
    fn test_spheroid_volume() {
        let (a, c) = (1.5e-9, 3e-9);
        let expected = 4.0 / 3.0 * PI * a * a * c;
        let v = rasterized_volume(Geometry::Spheroid { a, c }, 0.2e-9);
        assert_relative_eq!(v, expected, max_relative = 0.02);
    }

    #[test]
    fn test_icosahedron_is_between_in_and_circumsphere() {
        let g = Geometry::Icosahedron { diameter: 1.0 };
        assert!(g.contains(&Vector3::zeros()));
        let r = g.half_extent();
        assert!(!g.contains(&Vector3::new(r * 1.01, 0.0, 0.0)));
        assert!(g.contains(&Vector3::new(0.0, 0.0, 0.45)));
    }

    #[test]
    fn test_grid_size() {
        let grid = Geometry::Spheroid { a: 1.5e-9, c: 3e-9 }.rasterize(0.3e-9).unwrap();
        assert_eq!(grid.dim(), (22, 22, 22));
    }
}
