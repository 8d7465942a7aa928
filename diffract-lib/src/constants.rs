//! Physical constants in SI units (CODATA 2018).

/// Elementary charge (C)
pub const ELEMENTARY_CHARGE: f64 = 1.602176634e-19;

/// Speed of light in vacuum (m/s)
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Planck's constant (J·s)
pub const PLANCK: f64 = 6.62607015e-34;

/// Classical electron radius (m)
pub const R_ELECTRON: f64 = 2.8179403262e-15;

/// Atomic mass constant (kg)
pub const ATOMIC_MASS_UNIT: f64 = 1.66053906660e-27;

/// Barn (m²)
pub const BARN: f64 = 1e-28;

/// Avogadro's number (mol^-1)
pub const AVOGADRO: f64 = 6.02214076e23;

/// Photon energy in eV for a wavelength in meters.
pub fn photon_energy_ev(wavelength: f64) -> f64 {
    PLANCK * SPEED_OF_LIGHT / (wavelength * ELEMENTARY_CHARGE)
}

/// Wavelength in meters for a photon energy in eV.
pub fn wavelength_from_energy_ev(energy_ev: f64) -> f64 {
    PLANCK * SPEED_OF_LIGHT / (energy_ev * ELEMENTARY_CHARGE)
}
