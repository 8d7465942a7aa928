//! Cross-checks between the particle representations on a common setup.

use diffract::{
    AnalyticSpheroid, AtomicEnsemble, Convention, Detector, DiffractError, EvaluationContext, Interpolation,
    MaterialDb, MaterialSpec, ParticleResult, PropagationMode, PropagationOptions, Result,
    Rotation, ScatteringModel, Source, VolumetricMap, propagate, relative_difference,
};
use diffract::constants::ATOMIC_MASS_UNIT;
use nalgebra::Vector3;
use ndarray::Array3;
use num_complex::Complex64;

fn source() -> Source {
    Source::new(0.1e-9, 1e-3, 1e-6).unwrap()
}

fn detector() -> Detector {
    Detector::new(0.5, 750e-6, 100, 100)
        .unwrap()
        .with_center(45.0, 59.0)
        .unwrap()
}

/// 72° about (0.43, 0.643, 0) as a quaternion, applied extrinsically.
fn orientation() -> Rotation {
    let axis = Vector3::new(0.43, 0.643, 0.0).normalize();
    let (s, c) = 36f64.to_radians().sin_cos();
    let q = Rotation::from_quaternion(c, s * axis.x, s * axis.y, s * axis.z).unwrap();
    Rotation::identity().then(&q, Convention::Extrinsic)
}

fn run<M: ScatteringModel + ?Sized>(model: &M, options: PropagationOptions) -> ParticleResult {
    propagate(&source(), &detector(), model, &options).unwrap()
}

fn difference(a: &ParticleResult, b: &ParticleResult) -> f64 {
    relative_difference(a.intensity(), b.intensity()).unwrap()
}

#[test]
fn test_spheroid_map_matches_analytic() {
    let analytic = AnalyticSpheroid::new(1.5e-9, 3e-9, "water")
        .unwrap()
        .with_rotation(orientation());
    let map = VolumetricMap::spheroid(1.5e-9, 3e-9, 0.3e-9, "water")
        .unwrap()
        .with_rotation(orientation());

    let exact = run(&analytic, PropagationOptions::default());
    let sampled = run(&map, PropagationOptions::default());
    let err = difference(&exact, &sampled);
    assert!(err < 0.15, "analytic vs map: {err}");
    assert!(exact.total_intensity() > 0.0);
}

#[test]
fn test_interpolation_kernels_agree() {
    let map = VolumetricMap::spheroid(1.5e-9, 3e-9, 0.4e-9, "water")
        .unwrap()
        .with_rotation(orientation());
    let trilinear = run(&map, PropagationOptions::default());
    let nearest = run(
        &map,
        PropagationOptions::default().with_interpolation(Interpolation::Nearest),
    );
    let err = difference(&trilinear, &nearest);
    assert!(err > 0.0 && err < 0.10, "trilinear vs nearest: {err}");
}

#[test]
fn test_projection_matches_3d_sampling() {
    let map = VolumetricMap::spheroid(1.5e-9, 3e-9, 0.3e-9, "water")
        .unwrap()
        .with_rotation(orientation());
    let three_d = run(&map, PropagationOptions::default());
    let projected = run(
        &map,
        PropagationOptions::default().with_mode(PropagationMode::Projection),
    );
    let err = difference(&three_d, &projected);
    assert!(err < 0.10, "3d vs projection: {err}");
}

/// An L-shaped block of hydrogen: a long arm along y and a cube on top.
fn two_lobe_density() -> Array3<f64> {
    let (long, short) = (20, 10);
    Array3::from_shape_fn((long, long, long), |(z, y, x)| {
        let lower = z < short && y < long && x < short;
        let upper = (short..2 * short).contains(&z) && y < short && x < short;
        if lower || upper { 1.0 } else { 0.0 }
    })
}

/// The two-lobe block as hydrogen, one atom's mass per voxel.
fn hydrogen_map(dx: f64) -> VolumetricMap {
    let db = MaterialDb::new();
    let hydrogen_mass = db.atomic_mass("H").unwrap() * ATOMIC_MASS_UNIT;
    let material = MaterialSpec::custom([("H", 1.0)], hydrogen_mass / dx.powi(3));
    VolumetricMap::custom(two_lobe_density(), dx, material)
        .unwrap()
        .with_rotation(orientation())
}

#[test]
fn test_atoms_match_map_of_same_atoms() {
    let dx = 6e-9 / 19.0;
    let density = two_lobe_density();
    let center = (density.dim().0 as f64 - 1.0) / 2.0;

    let mut positions = Vec::new();
    for ((z, y, x), &v) in density.indexed_iter() {
        if v > 0.0 {
            positions.push(
                Vector3::new(x as f64 - center, y as f64 - center, z as f64 - center) * dx,
            );
        }
    }
    let count = positions.len();
    assert_eq!(count, 3000);
    let atoms = AtomicEnsemble::new(positions, vec![1; count])
        .unwrap()
        .with_rotation(orientation());

    let from_atoms = run(&atoms, PropagationOptions::default());
    let from_map = run(&hydrogen_map(dx), PropagationOptions::default());
    let err = difference(&from_atoms, &from_map);
    assert!(err < 0.10, "atoms vs map: {err}");
}

fn linspace(end: f64, n: usize) -> impl Iterator<Item = f64> + Clone {
    (0..n).map(move |i| end * i as f64 / (n - 1) as f64)
}

#[test]
fn test_atoms_on_own_lattice_match_map() {
    // Atoms 3 nm / 9 apart, voxels 6 nm / 19 apart; the upper lobe sits at
    // half the long edge and nothing is centered.
    let (short, long) = (3e-9, 6e-9);
    let (n_short, n_long) = (10, 20);
    let mut positions = Vec::new();
    for z in linspace(short, n_short) {
        for y in linspace(long, n_long) {
            for x in linspace(short, n_short) {
                positions.push(Vector3::new(x, y, z));
            }
        }
    }
    for z in linspace(short, n_short) {
        for y in linspace(short, n_short) {
            for x in linspace(short, n_short) {
                positions.push(Vector3::new(x, y, z + long / 2.0));
            }
        }
    }
    let count = positions.len();
    let atoms = AtomicEnsemble::new(positions, vec![1; count])
        .unwrap()
        .with_rotation(orientation());

    let from_atoms = run(&atoms, PropagationOptions::default());
    let from_map = run(&hydrogen_map(long / 19.0), PropagationOptions::default());
    let err = difference(&from_atoms, &from_map);
    assert!(err < 0.10, "atoms vs map: {err}");
}

#[test]
fn test_cell_sized_map_propagates() {
    // 129 voxels per axis at 5 nm, a 645 nm cell.
    let map = VolumetricMap::custom(Array3::ones((129, 129, 129)), 5e-9, "cell")
        .unwrap()
        .with_rotation(orientation());
    let result = run(&map, PropagationOptions::default());
    assert!(result.total_intensity() > 0.0);
    assert!(result.intensity().iter().all(|v| v.is_finite()));
}

#[test]
fn test_oversized_map_transform_rejected() {
    // Sub-pixel voxels push the padding to the oversampling cap on every axis.
    let map = VolumetricMap::custom(Array3::ones((1, 1100, 1100)), 1e-11, "water").unwrap();
    for mode in [PropagationMode::ThreeDSampling, PropagationMode::Projection] {
        let err = propagate(
            &source(),
            &detector(),
            &map,
            &PropagationOptions::default().with_mode(mode),
        )
        .unwrap_err();
        assert!(
            matches!(err, DiffractError::InvalidParameter { name: "map", .. }),
            "{mode:?}: {err}"
        );
    }
}

#[test]
fn test_propagation_is_repeatable() {
    let map = VolumetricMap::cube(2e-9, 0.4e-9, "water")
        .unwrap()
        .with_rotation(orientation());
    let first = run(&map, PropagationOptions::default());
    let second = run(&map, PropagationOptions::default());
    assert_eq!(first.intensity(), second.intensity());
}

#[test]
fn test_position_along_beam_only_changes_phase() {
    let at_origin = AnalyticSpheroid::new(1.5e-9, 3e-9, "protein").unwrap();
    let shifted = at_origin
        .clone()
        .with_position(Vector3::new(0.0, 0.0, 5e-9));
    let a = run(&at_origin, PropagationOptions::default());
    let b = run(&shifted, PropagationOptions::default());
    assert!(difference(&a, &b) < 1e-9);
    assert!((a.amplitude()[[0, 0]] - b.amplitude()[[0, 0]]).norm() > 0.0);

    // Outside the top-hat focus nothing is illuminated.
    let dark = at_origin.with_position(Vector3::new(2e-6, 0.0, 0.0));
    assert_eq!(run(&dark, PropagationOptions::default()).total_intensity(), 0.0);
}

struct PointScatterer {
    amplitudes: Option<usize>,
}

impl ScatteringModel for PointScatterer {
    fn kind(&self) -> &'static str {
        "point"
    }

    fn supports_mode(&self, mode: PropagationMode) -> bool {
        mode == PropagationMode::ThreeDSampling
    }

    fn position(&self) -> Vector3<f64> {
        Vector3::zeros()
    }

    fn amplitude_at(
        &self,
        q: &[Vector3<f64>],
        _ctx: &EvaluationContext<'_>,
    ) -> Result<Vec<Complex64>> {
        Ok(vec![Complex64::new(1.0, 0.0); self.amplitudes.unwrap_or(q.len())])
    }
}

#[test]
fn test_custom_models() {
    let point = PointScatterer { amplitudes: None };
    let result = run(&point, PropagationOptions::default());
    assert_eq!(result.intensity().dim(), (100, 100));
    // A single electron still scatters.
    assert!(result.total_intensity() > 0.0);

    let err = propagate(
        &source(),
        &detector(),
        &point,
        &PropagationOptions::default().with_mode(PropagationMode::Projection),
    )
    .unwrap_err();
    assert!(matches!(err, DiffractError::UnsupportedMode { model: "point", .. }));

    let short = PointScatterer { amplitudes: Some(7) };
    let err = propagate(&source(), &detector(), &short, &PropagationOptions::default())
        .unwrap_err();
    assert!(matches!(err, DiffractError::ShapeMismatch(_)));
}

#[test]
fn test_invalid_options_and_patterns() {
    let point = PointScatterer { amplitudes: None };
    let err = propagate(
        &source(),
        &detector(),
        &point,
        &PropagationOptions::default().with_oversampling(0),
    )
    .unwrap_err();
    assert!(matches!(err, DiffractError::InvalidParameter { name: "oversampling", .. }));

    let a = ndarray::Array2::<f64>::zeros((2, 3));
    let b = ndarray::Array2::<f64>::zeros((3, 2));
    assert!(matches!(
        relative_difference(&a, &b),
        Err(DiffractError::ShapeMismatch(_))
    ));
}

#[test]
fn test_unknown_material_surfaces_at_propagation() {
    let map = VolumetricMap::sphere(2e-9, 0.5e-9, "unobtainium").unwrap();
    let err = propagate(&source(), &detector(), &map, &PropagationOptions::default())
        .unwrap_err();
    assert!(matches!(err, DiffractError::UnknownMaterial(_)));
}
