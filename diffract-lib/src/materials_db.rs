/// Element order of the relative compositions in `MATERIALS`.
pub(crate) const COMPOSITION_ELEMENTS: [&str; 7] = ["H", "C", "N", "O", "P", "S", "Au"];

/// Named material types.
///
/// Each entry: (name, mass density in kg/m³, relative atom counts of
/// H, C, N, O, P, S, Au)
pub(crate) const MATERIALS: &[(&str, f64, [f64; 7])] = &[
    ("protein", 1350.0, [86.0, 52.0, 13.0, 15.0, 0.0, 3.0, 0.0]),
    // Bergh et al. 2008
    ("cell", 1000.0, [23.0, 3.0, 1.0, 10.0, 0.0, 1.0, 0.0]),
    ("latex", 1050.0, [1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ("water", 998.0, [2.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0]),
    ("dna", 1700.0, [11.0, 10.0, 4.0, 6.0, 1.0, 0.0, 0.0]),
    ("lipid", 1000.0, [69.0, 36.0, 0.0, 6.0, 1.0, 0.0, 0.0]),
    ("genophore", 1560.0, [205.0, 134.0, 38.0, 48.0, 3.0, 6.0, 0.0]),
    ("virus", 1381.0, [72.43, 49.85, 16.32, 24.49, 2.57, 1.39, 0.0]),
    ("mimivirus", 1100.0, [23.0, 3.0, 1.0, 10.0, 0.0, 1.0, 0.0]),
    // Composition assumes protein and water are the only components.
    ("carboxysome", 1250.0, [0.51, 0.30, 0.07, 0.10, 0.0, 0.02, 0.0]),
    ("sucrose", 1587.0, [22.0, 12.0, 0.0, 11.0, 0.0, 0.0, 0.0]),
    ("gold", 19300.0, [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]),
];

/// Find a named material (case-insensitive). Returns (density, counts).
pub(crate) fn find_material(name: &str) -> Option<(f64, &'static [f64; 7])> {
    let lower = name.trim().to_lowercase();
    MATERIALS
        .iter()
        .find(|(mat_name, _, _)| *mat_name == lower)
        .map(|(_, density, counts)| (*density, counts))
}
