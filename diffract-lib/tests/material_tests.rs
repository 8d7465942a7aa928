use approx::assert_relative_eq;
use diffract::constants::{ATOMIC_MASS_UNIT, R_ELECTRON, wavelength_from_energy_ev};
use diffract::{DiffractError, MaterialDb, MaterialSpec};

#[test]
fn test_named_composition() {
    let db = MaterialDb::new();
    let water = db.atomic_composition("water").unwrap();
    assert_eq!(water.len(), 7);
    assert_eq!(water[0], ("H", 2.0));
    assert_eq!(water[3], ("O", 1.0));
    assert_relative_eq!(db.mass_density("water").unwrap(), 998.0);
    assert!(db.material_types().contains(&"mimivirus"));
}

#[test]
fn test_unknown_material() {
    let db = MaterialDb::new();
    let err = MaterialSpec::named("kryptonite").resolve(&db).unwrap_err();
    assert!(matches!(err, DiffractError::UnknownMaterial(_)));
}

#[test]
fn test_number_densities_of_water() {
    let db = MaterialDb::new();
    let water = MaterialSpec::named("water").resolve(&db).unwrap();
    let densities = water.number_densities(&db).unwrap();
    let molecule_mass = (2.0 * 1.00794 + 15.9994) * ATOMIC_MASS_UNIT;
    let molecules = 998.0 / molecule_mass;
    assert_eq!(densities[0].0, "H");
    assert_relative_eq!(densities[0].1, 2.0 * molecules, max_relative = 1e-9);
    assert_relative_eq!(densities[1].1, molecules, max_relative = 1e-9);
}

#[test]
fn test_formula_matches_custom_composition() {
    let db = MaterialDb::new();
    let by_formula = MaterialSpec::formula("C12H22O11", 1587.0).resolve(&db).unwrap();
    let named = MaterialSpec::named("sucrose").resolve(&db).unwrap();
    assert_eq!(by_formula.composition().len(), named.composition().len());
    for ((s1, f1), (s2, f2)) in by_formula.composition().iter().zip(named.composition()) {
        assert_eq!(s1, s2);
        assert_relative_eq!(f1, f2, max_relative = 1e-12);
    }
}

#[test]
fn test_refractive_contrast_of_water() {
    let db = MaterialDb::new();
    let water = MaterialSpec::named("water").resolve(&db).unwrap();
    let wavelength = 1e-10;
    let contrast = water.refractive_contrast(&db, wavelength).unwrap();
    // δ ≈ r_e λ² n_e / 2π for hard X-rays.
    let expected = R_ELECTRON * wavelength * wavelength * water.electron_density(&db).unwrap()
        / (2.0 * std::f64::consts::PI);
    assert_relative_eq!(contrast.re, expected, max_relative = 0.02);
    assert!(contrast.im > 0.0 && contrast.im < contrast.re * 1e-2);
}

#[test]
fn test_attenuation_length_is_physical() {
    let db = MaterialDb::new();
    let water = MaterialSpec::named("water").resolve(&db).unwrap();
    let length = water
        .attenuation_length(&db, wavelength_from_energy_ev(10_000.0))
        .unwrap();
    // Roughly a millimeter at 10 keV.
    assert!(length > 1e-4 && length < 1e-2, "length = {length}");
}

#[test]
fn test_invalid_compositions() {
    let db = MaterialDb::new();
    let cases = [
        MaterialSpec::custom([("H", 0.0), ("O", 0.0)], 1000.0),
        MaterialSpec::custom([("H", -1.0), ("O", 2.0)], 1000.0),
        MaterialSpec::custom([("H", 2.0), ("O", 1.0)], 0.0),
        MaterialSpec::custom([("H", 2.0), ("O", 1.0)], -5.0),
        MaterialSpec::custom(Vec::<(String, f64)>::new(), 1000.0),
    ];
    for spec in cases {
        assert!(
            matches!(spec.resolve(&db), Err(DiffractError::InvalidComposition(_))),
            "{spec:?} should be rejected"
        );
    }
}

#[test]
fn test_energy_out_of_table() {
    let db = MaterialDb::new();
    let water = MaterialSpec::named("water").resolve(&db).unwrap();
    for energy in [1.0, 1e6] {
        assert!(matches!(
            water.scattering_density(&db, energy),
            Err(DiffractError::OutOfTableRange { .. })
        ));
    }
}

#[test]
fn test_bad_formula() {
    let db = MaterialDb::new();
    assert!(matches!(
        MaterialSpec::formula("H2O)", 1000.0).resolve(&db),
        Err(DiffractError::InvalidFormula(_))
    ));
    assert!(matches!(
        MaterialSpec::formula("Qq2", 1000.0).resolve(&db),
        Err(DiffractError::UnknownElement(_))
    ));
}
