use approx::assert_relative_eq;
use diffract::{BeamProfile, Detector, DiffractError, Polarization, Source};

fn reference_detector() -> Detector {
    Detector::new(0.5, 750e-6, 100, 100)
        .unwrap()
        .with_center(45.0, 59.0)
        .unwrap()
}

#[test]
fn test_reference_source() {
    let source = Source::new(0.1e-9, 1e-3, 1e-6).unwrap();
    assert_relative_eq!(source.photon_energy_ev(), 12398.42, max_relative = 1e-5);
    assert_relative_eq!(source.wavenumber(), 2.0 * std::f64::consts::PI / 0.1e-9);
    let photons = source.photon_fluence() * std::f64::consts::PI * 0.25e-12;
    // 1 mJ of 12.4 keV photons.
    assert_relative_eq!(photons, 5.034e11, max_relative = 1e-3);
}

#[test]
fn test_gaussian_carries_full_pulse_energy() {
    let source = Source::new(0.1e-9, 1e-3, 1e-6)
        .unwrap()
        .with_profile(BeamProfile::Gaussian);
    // Radial integral of the profile on a fine grid.
    let dr = 1e-9;
    let energy: f64 = (0..5000)
        .map(|i| {
            let r = (i as f64 + 0.5) * dr;
            source.fluence_at(r) * 2.0 * std::f64::consts::PI * r * dr
        })
        .sum();
    assert_relative_eq!(energy, 1e-3, max_relative = 1e-4);
}

#[test]
fn test_grid_shape_and_center() {
    let det = reference_detector();
    let grid = det.q_grid(0.1e-9).unwrap();
    assert_eq!(grid.shape(), (100, 100));
    assert_eq!(grid.len(), 10_000);
    // Pixel (45, 59) sits on the beam.
    assert_relative_eq!(grid.q()[59 * 100 + 45].norm(), 0.0, epsilon = 1e-6);
    // Pixels left of the center have negative q_x.
    assert!(grid.q()[59 * 100].x < 0.0);
}

#[test]
fn test_solid_angle_falls_off() {
    let det = reference_detector();
    let grid = det.q_grid(0.1e-9).unwrap();
    let center = grid.solid_angle()[59 * 100 + 45];
    let corner = grid.solid_angle()[0];
    assert_relative_eq!(center, (750e-6f64 / 0.5).powi(2), max_relative = 1e-12);
    assert!(corner < center);

    let flat = reference_detector().with_solid_angle_correction(false);
    let grid = flat.q_grid(0.1e-9).unwrap();
    assert_relative_eq!(grid.solid_angle()[0], center, max_relative = 1e-12);
}

#[test]
fn test_polarization_factor_bounds() {
    let det = reference_detector().with_polarization(Polarization::Unpolarized);
    let grid = det.q_grid(0.1e-9).unwrap();
    assert!(grid.polarization().iter().all(|&p| p > 0.99 && p <= 1.0));
}

#[test]
fn test_invalid_detectors() {
    assert!(Detector::new(0.0, 1e-3, 10, 10).is_err());
    assert!(Detector::new(0.5, -1e-3, 10, 10).is_err());
    assert!(Detector::new(0.5, 1e-3, 0, 10).is_err());
    assert!(Detector::new(0.5, 1e-3, 10, 10)
        .unwrap()
        .with_center(f64::NAN, 1.0)
        .is_err());
    let single = Detector::new(0.5, 1e-3, 1, 1).unwrap();
    assert!(matches!(
        single.q_grid(1e-10),
        Err(DiffractError::GeometryMismatch(_))
    ));
}
