use crate::db::MaterialDb;
use crate::error::{DiffractError, Result};
use crate::interp::interp_linear;

impl MaterialDb {
    /// Returns tabulated energy bounds (eV) of the scattering factors of an element.
    pub fn energy_range(&self, element: &str) -> Result<(f64, f64)> {
        let z = self.resolve_element(element)?;
        self.energy_range_z(z)
    }

    fn energy_range_z(&self, z: u16) -> Result<(f64, f64)> {
        let record = self.factor_record(z).ok_or_else(|| self.untabulated(z))?;
        // Non-empty: checked when the tables were indexed.
        Ok((record.energy[0], record.energy[record.energy.len() - 1]))
    }

    /// Returns (f1, f2), the real and imaginary atomic scattering factor of
    /// an element in electrons/atom at a photon energy in eV.
    ///
    /// Linear interpolation between tabulated energies. Energies outside the
    /// table fail with `OutOfTableRange`.
    pub fn scattering_factor(&self, element: &str, energy_ev: f64) -> Result<(f64, f64)> {
        let z = self.resolve_element(element)?;
        self.scattering_factor_z(z, energy_ev)
    }

    /// Same as `scattering_factor`, keyed by atomic number.
    pub fn scattering_factor_z(&self, z: u16, energy_ev: f64) -> Result<(f64, f64)> {
        let record = self.factor_record(z).ok_or_else(|| self.untabulated(z))?;
        let out_of_range = || {
            let (min, max) = (record.energy[0], record.energy[record.energy.len() - 1]);
            DiffractError::OutOfTableRange {
                element: record.element.clone(),
                energy: energy_ev,
                min,
                max,
            }
        };
        let f1 = interp_linear(energy_ev, &record.energy, &record.f1).ok_or_else(out_of_range)?;
        let f2 = interp_linear(energy_ev, &record.energy, &record.f2).ok_or_else(out_of_range)?;
        Ok((f1, f2))
    }

    /// Returns true if scattering factors are tabulated for the element.
    pub fn has_scattering_factors(&self, element: &str) -> bool {
        self.resolve_element(element)
            .map(|z| self.factor_record(z).is_some())
            .unwrap_or(false)
    }

    fn untabulated(&self, z: u16) -> DiffractError {
        let symbol = self
            .element_by_z(z)
            .map(|e| e.symbol.clone())
            .unwrap_or_else(|_| format!("Z={z}"));
        DiffractError::UnknownElement(format!("{symbol} (no scattering factor table)"))
    }
}
