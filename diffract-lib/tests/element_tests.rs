use diffract::{DiffractError, MaterialDb};

#[test]
fn test_atomic_number_mixed_identifiers() {
    let db = MaterialDb::new();
    assert_eq!(db.atomic_number("Fe").unwrap(), 26);
    assert_eq!(db.atomic_number("iron").unwrap(), 26);
    assert_eq!(db.atomic_number("IRON").unwrap(), 26);
    assert_eq!(db.atomic_number("26").unwrap(), 26);
    assert_eq!(db.symbol("gold").unwrap(), "Au");
    assert_eq!(db.element_name("O").unwrap(), "oxygen");
}

#[test]
fn test_unknown_element() {
    let db = MaterialDb::new();
    assert!(matches!(
        db.atomic_number("Xx"),
        Err(DiffractError::UnknownElement(_))
    ));
    assert!(db.atomic_number("200").is_err());
}

#[test]
fn test_atomic_mass() {
    let db = MaterialDb::new();
    assert!((db.atomic_mass("H").unwrap() - 1.008).abs() < 1e-3);
    assert!((db.atomic_mass("O").unwrap() - 15.999).abs() < 1e-3);
}

#[test]
fn test_scattering_factor_interpolates() {
    let db = MaterialDb::new();
    let (f1, f2) = db.scattering_factor("O", 10_000.0).unwrap();
    assert!((f1 - 8.05).abs() < 0.1, "f1 = {f1}");
    assert!(f2 > 0.0 && f2 < 0.1, "f2 = {f2}");

    // Midway between two tabulated points is the mean of both.
    let (lo, _) = db.scattering_factor("C", 200.0).unwrap();
    let (hi, _) = db.scattering_factor("C", 300.0).unwrap();
    let (mid, _) = db.scattering_factor("C", 250.0).unwrap();
    assert!((mid - (lo + hi) / 2.0).abs() < 1e-12);
}

#[test]
fn test_scattering_factor_out_of_range() {
    let db = MaterialDb::new();
    let (min, max) = db.energy_range("H").unwrap();
    for energy in [min / 2.0, max * 2.0] {
        match db.scattering_factor("H", energy) {
            Err(DiffractError::OutOfTableRange { element, .. }) => assert_eq!(element, "H"),
            other => panic!("expected OutOfTableRange at {energy} eV, got {other:?}"),
        }
    }
    assert!(db.scattering_factor("H", min).is_ok());
    assert!(db.scattering_factor("H", max).is_ok());
}

#[test]
fn test_untabulated_element() {
    let db = MaterialDb::new();
    assert!(!db.has_scattering_factors("Fe"));
    assert!(db.has_scattering_factors("Au"));
    assert!(matches!(
        db.scattering_factor("Fe", 10_000.0),
        Err(DiffractError::UnknownElement(_))
    ));
}

#[test]
fn test_default_registry_is_shared() {
    let a = MaterialDb::new();
    let b = MaterialDb::default();
    assert_eq!(a.version(), b.version());
    assert_eq!(a.raw().elements.len(), 118);
}

#[test]
fn test_transuranic_elements() {
    let db = MaterialDb::new();
    assert_eq!(db.atomic_number("Np").unwrap(), 93);
    assert_eq!(db.atomic_number("oganesson").unwrap(), 118);
    assert_eq!(db.atomic_number("118").unwrap(), 118);
    assert_eq!(db.atomic_number("Uuo").unwrap(), 118);
    assert_eq!(db.atomic_number("Cp").unwrap(), 112);
    assert_eq!(db.symbol("Uus").unwrap(), "Ts");
    assert!(db.atomic_number("119").is_err());
}
