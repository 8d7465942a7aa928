use std::f64::consts::{LN_2, PI};

use serde::{Deserialize, Serialize};

use crate::constants::{ELEMENTARY_CHARGE, photon_energy_ev};
use crate::error::{Result, require_positive};

/// Transverse intensity profile of the focused beam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeamProfile {
    /// Uniform disc with the focus diameter.
    #[default]
    TopHat,
    /// Gaussian with the focus diameter as FWHM.
    Gaussian,
}

/// Pulsed monochromatic X-ray source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Source {
    wavelength: f64,
    pulse_energy: f64,
    focus_diameter: f64,
    profile: BeamProfile,
}

impl Source {
    /// Wavelength in m, pulse energy in J, focus diameter in m.
    pub fn new(wavelength: f64, pulse_energy: f64, focus_diameter: f64) -> Result<Self> {
        Ok(Source {
            wavelength: require_positive("wavelength", wavelength)?,
            pulse_energy: require_positive("pulse_energy", pulse_energy)?,
            focus_diameter: require_positive("focus_diameter", focus_diameter)?,
            profile: BeamProfile::TopHat,
        })
    }

    pub fn with_profile(mut self, profile: BeamProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn wavelength(&self) -> f64 {
        self.wavelength
    }

    pub fn pulse_energy(&self) -> f64 {
        self.pulse_energy
    }

    pub fn focus_diameter(&self) -> f64 {
        self.focus_diameter
    }

    pub fn profile(&self) -> BeamProfile {
        self.profile
    }

    pub fn photon_energy_ev(&self) -> f64 {
        photon_energy_ev(self.wavelength)
    }

    /// Photon energy in J.
    pub fn photon_energy(&self) -> f64 {
        self.photon_energy_ev() * ELEMENTARY_CHARGE
    }

    /// Wavenumber `2π/λ` in 1/m.
    pub fn wavenumber(&self) -> f64 {
        2.0 * PI / self.wavelength
    }

    /// Fluence in J/m² at a transverse distance from the beam axis.
    pub fn fluence_at(&self, transverse_distance: f64) -> f64 {
        let d = self.focus_diameter;
        match self.profile {
            BeamProfile::TopHat => {
                if transverse_distance <= d / 2.0 {
                    self.pulse_energy / (PI * d * d / 4.0)
                } else {
                    0.0
                }
            }
            BeamProfile::Gaussian => {
                let peak = self.pulse_energy * 4.0 * LN_2 / (PI * d * d);
                peak * (-4.0 * LN_2 * transverse_distance.powi(2) / (d * d)).exp()
            }
        }
    }

    /// Fluence in J/m² on the beam axis.
    pub fn fluence(&self) -> f64 {
        self.fluence_at(0.0)
    }

    /// Photons per m² at a transverse distance from the beam axis.
    pub fn photon_fluence_at(&self, transverse_distance: f64) -> f64 {
        self.fluence_at(transverse_distance) / self.photon_energy()
    }

    pub fn photon_fluence(&self) -> f64 {
        self.photon_fluence_at(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_photon_energy_of_1_angstrom() {
        let source = Source::new(1e-10, 1e-3, 1e-6).unwrap();
        assert_relative_eq!(source.photon_energy_ev(), 12398.4, max_relative = 1e-5);
    }

    #[test]
    fn test_top_hat_fluence() {
        let source = Source::new(1e-10, 1e-3, 1e-6).unwrap();
        let area = PI * 0.25e-12;
        assert_relative_eq!(source.fluence(), 1e-3 / area, max_relative = 1e-12);
        assert_eq!(source.fluence_at(0.6e-6), 0.0);
    }

    #[test]
    fn test_gaussian_half_maximum_at_half_fwhm() {
        let source = Source::new(1e-10, 1e-3, 1e-6)
            .unwrap()
            .with_profile(BeamProfile::Gaussian);
        assert_relative_eq!(
            source.fluence_at(0.5e-6),
            source.fluence() / 2.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_rejects_non_positive() {
        assert!(Source::new(0.0, 1e-3, 1e-6).is_err());
        assert!(Source::new(1e-10, -1.0, 1e-6).is_err());
        assert!(Source::new(1e-10, 1e-3, f64::NAN).is_err());
    }
}
