/// Embedded atomic scattering factors (Henke, Gullikson & Davis) on a
/// coarse energy grid for the elements of the named biological and
/// reference materials.
///
/// Edges between grid points are smoothed out; load a full table produced
/// by `diffract-generate` with `MaterialDb::from_path` when fine structure
/// near an absorption edge matters.
pub(crate) const HENKE_ENERGY_EV: &[f64] = &[
    10.0, 30.0, 70.0, 100.0, 200.0, 300.0, 500.0, 1000.0, 2000.0, 5000.0, 10000.0, 20000.0,
    30000.0,
];

/// Each entry: (symbol, f1, f2) sampled on `HENKE_ENERGY_EV`.
pub(crate) const HENKE_FACTORS: &[(&str, [f64; 13], [f64; 13])] = &[
    (
        "H",
        [
            0.31, 0.92, 0.99, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0,
        ],
        [
            0.75, 0.23, 0.035, 0.02, 4.5e-3, 2.0e-3, 7.0e-4, 1.7e-4, 3.7e-5, 4.8e-6, 1.2e-6,
            2.6e-7, 1.1e-7,
        ],
    ),
    (
        "C",
        [
            1.3, 2.9, 3.3, 3.1, 2.4, 0.8, 4.9, 5.8, 6.0, 6.0, 6.0, 6.0, 6.0,
        ],
        [
            3.3, 2.5, 1.1, 0.65, 0.17, 4.3, 1.9, 0.63, 0.17, 0.028, 5.7e-3, 1.1e-3, 4.7e-4,
        ],
    ),
    (
        "N",
        [
            1.3, 3.1, 3.9, 3.8, 3.2, 2.4, 4.6, 6.7, 7.0, 7.0, 7.0, 7.0, 7.0,
        ],
        [
            3.6, 3.1, 1.6, 1.0, 0.3, 0.12, 3.2, 1.1, 0.32, 0.053, 0.012, 2.4e-3, 1.0e-3,
        ],
    ),
    (
        "O",
        [
            1.4, 3.3, 4.4, 4.5, 4.0, 3.5, 2.4, 7.5, 8.0, 8.05, 8.05, 8.05, 8.04,
        ],
        [
            3.7, 3.6, 2.1, 1.4, 0.45, 0.19, 0.13, 1.7, 0.51, 0.097, 0.021, 4.6e-3, 1.8e-3,
        ],
    ),
    (
        "P",
        [
            2.0, 4.5, 6.5, 5.0, 8.5, 10.0, 11.5, 12.8, 11.5, 15.1, 15.2, 15.1, 15.1,
        ],
        [
            4.5, 5.2, 3.5, 6.5, 6.0, 4.3, 2.5, 1.4, 0.74, 0.78, 0.14, 0.044, 0.022,
        ],
    ),
    (
        "S",
        [
            2.1, 4.7, 7.0, 5.5, 9.0, 10.8, 12.5, 14.0, 13.3, 16.2, 16.2, 16.1, 16.1,
        ],
        [
            4.8, 5.6, 4.0, 6.8, 6.7, 5.0, 3.0, 1.6, 0.9, 1.03, 0.19, 0.058, 0.027,
        ],
    ),
    (
        "Au",
        [
            5.5, 10.0, 15.0, 18.0, 27.0, 32.0, 37.0, 46.0, 58.0, 70.0, 74.0, 76.0, 78.0,
        ],
        [
            6.0, 14.0, 20.0, 22.0, 26.0, 28.0, 27.0, 24.0, 17.0, 18.0, 5.5, 7.3, 3.8,
        ],
    ),
];
