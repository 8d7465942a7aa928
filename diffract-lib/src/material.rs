use std::collections::BTreeMap;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::constants::{ATOMIC_MASS_UNIT, R_ELECTRON, photon_energy_ev};
use crate::db::MaterialDb;
use crate::error::{DiffractError, Result};
use crate::formula::parse_formula;
use crate::materials_db::{COMPOSITION_ELEMENTS, MATERIALS, find_material};

/// How a particle's material is described.
///
/// Deserializes from a bare string (`"water"`), a table with `composition`
/// and `mass_density`, or a table with `formula` and `mass_density`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaterialSpec {
    /// One of the named material types of the database.
    Named(String),
    /// Relative atom abundances (element → count) and mass density in kg/m³.
    Custom {
        composition: BTreeMap<String, f64>,
        mass_density: f64,
    },
    /// Chemical formula and mass density in kg/m³.
    Formula { formula: String, mass_density: f64 },
}

impl MaterialSpec {
    pub fn named(material_type: impl Into<String>) -> Self {
        MaterialSpec::Named(material_type.into())
    }

    pub fn custom<S: Into<String>>(
        composition: impl IntoIterator<Item = (S, f64)>,
        mass_density: f64,
    ) -> Self {
        MaterialSpec::Custom {
            composition: composition
                .into_iter()
                .map(|(el, n)| (el.into(), n))
                .collect(),
            mass_density,
        }
    }

    pub fn formula(formula: impl Into<String>, mass_density: f64) -> Self {
        MaterialSpec::Formula {
            formula: formula.into(),
            mass_density,
        }
    }

    /// Resolves element identifiers, checks abundances and density and
    /// normalizes the composition.
    pub fn resolve(&self, db: &MaterialDb) -> Result<Material> {
        match self {
            MaterialSpec::Named(name) => {
                let composition = db.atomic_composition(name)?;
                let density = db.mass_density(name)?;
                Material::from_counts(db, composition, density)
            }
            MaterialSpec::Custom {
                composition,
                mass_density,
            } => Material::from_counts(
                db,
                composition.iter().map(|(el, &n)| (el.as_str(), n)),
                *mass_density,
            ),
            MaterialSpec::Formula {
                formula,
                mass_density,
            } => {
                let counts = parse_formula(formula)?;
                Material::from_counts(
                    db,
                    counts.iter().map(|(el, &n)| (el.as_str(), n)),
                    *mass_density,
                )
            }
        }
    }
}

impl From<&str> for MaterialSpec {
    fn from(name: &str) -> Self {
        MaterialSpec::named(name)
    }
}

/// A resolved material: normalized atom fractions and mass density.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    composition: Vec<(String, f64)>,
    mass_density: f64,
}

impl Material {
    fn from_counts<'a>(
        db: &MaterialDb,
        counts: impl IntoIterator<Item = (&'a str, f64)>,
        mass_density: f64,
    ) -> Result<Self> {
        if !mass_density.is_finite() || mass_density <= 0.0 {
            return Err(DiffractError::InvalidComposition(format!(
                "mass density must be positive, got {mass_density} kg/m³"
            )));
        }

        let mut merged: BTreeMap<u16, f64> = BTreeMap::new();
        for (element, count) in counts {
            if !count.is_finite() || count < 0.0 {
                return Err(DiffractError::InvalidComposition(format!(
                    "abundance of {element} must be non-negative, got {count}"
                )));
            }
            let z = db.resolve_element(element)?;
            *merged.entry(z).or_insert(0.0) += count;
        }

        let total: f64 = merged.values().sum();
        if total <= 0.0 {
            return Err(DiffractError::InvalidComposition(
                "no element with positive abundance".to_string(),
            ));
        }

        let mut composition = Vec::with_capacity(merged.len());
        for (z, count) in merged {
            if count > 0.0 {
                composition.push((db.element_by_z(z)?.symbol.clone(), count / total));
            }
        }
        Ok(Material {
            composition,
            mass_density,
        })
    }

    /// Normalized atom fractions by element symbol, ordered by atomic number.
    pub fn composition(&self) -> &[(String, f64)] {
        &self.composition
    }

    /// Mass density in kg/m³.
    pub fn mass_density(&self) -> f64 {
        self.mass_density
    }

    /// Mean atomic mass in kg.
    fn mean_atom_mass(&self, db: &MaterialDb) -> Result<f64> {
        let mut mass = 0.0;
        for (symbol, frac) in &self.composition {
            mass += frac * db.atomic_mass(symbol)? * ATOMIC_MASS_UNIT;
        }
        Ok(mass)
    }

    /// Atom number density of each element in 1/m³.
    pub fn number_densities(&self, db: &MaterialDb) -> Result<Vec<(String, f64)>> {
        let atoms_per_volume = self.mass_density / self.mean_atom_mass(db)?;
        Ok(self
            .composition
            .iter()
            .map(|(symbol, frac)| (symbol.clone(), frac * atoms_per_volume))
            .collect())
    }

    /// Complex scattering density `Σ n (f1 + i f2)` in electrons/m³.
    pub fn scattering_density(&self, db: &MaterialDb, photon_energy_ev: f64) -> Result<Complex64> {
        let mut density = Complex64::new(0.0, 0.0);
        for (symbol, n) in self.number_densities(db)? {
            let (f1, f2) = db.scattering_factor(&symbol, photon_energy_ev)?;
            density += n * Complex64::new(f1, f2);
        }
        Ok(density)
    }

    /// Refractive index contrast `δ + iβ` (n = 1 - δ - iβ) at a wavelength in m.
    pub fn refractive_contrast(&self, db: &MaterialDb, wavelength: f64) -> Result<Complex64> {
        let density = self.scattering_density(db, photon_energy_ev(wavelength))?;
        Ok(density * (R_ELECTRON * wavelength * wavelength / (2.0 * std::f64::consts::PI)))
    }

    /// Free-electron density `Σ n Z` in 1/m³.
    pub fn electron_density(&self, db: &MaterialDb) -> Result<f64> {
        let mut density = 0.0;
        for (symbol, n) in self.number_densities(db)? {
            density += n * f64::from(db.atomic_number(&symbol)?);
        }
        Ok(density)
    }

    /// 1/e intensity attenuation length in m.
    pub fn attenuation_length(&self, db: &MaterialDb, wavelength: f64) -> Result<f64> {
        let energy = photon_energy_ev(wavelength);
        let mut mu = 0.0;
        for (symbol, n) in self.number_densities(db)? {
            let (_, f2) = db.scattering_factor(&symbol, energy)?;
            mu += n * 2.0 * R_ELECTRON * wavelength * f2;
        }
        Ok(1.0 / mu)
    }
}

impl MaterialDb {
    /// Relative atom counts of a named material type over H, C, N, O, P, S, Au.
    pub fn atomic_composition(&self, material_type: &str) -> Result<Vec<(&'static str, f64)>> {
        let (_, counts) = find_material(material_type)
            .ok_or_else(|| DiffractError::UnknownMaterial(material_type.to_string()))?;
        Ok(COMPOSITION_ELEMENTS
            .iter()
            .copied()
            .zip(counts.iter().copied())
            .collect())
    }

    /// Mass density of a named material type in kg/m³.
    pub fn mass_density(&self, material_type: &str) -> Result<f64> {
        find_material(material_type)
            .map(|(density, _)| density)
            .ok_or_else(|| DiffractError::UnknownMaterial(material_type.to_string()))
    }

    /// Names of all material types.
    pub fn material_types(&self) -> Vec<&'static str> {
        MATERIALS.iter().map(|(name, _, _)| *name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_custom_composition_is_normalized() {
        let db = MaterialDb::new();
        let material = MaterialSpec::custom([("H", 4.0), ("O", 2.0)], 1000.0)
            .resolve(&db)
            .unwrap();
        let comp = material.composition();
        assert_eq!(comp[0].0, "H");
        assert_relative_eq!(comp[0].1, 2.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(comp[1].1, 1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_identifiers_are_merged() {
        let db = MaterialDb::new();
        let material = MaterialSpec::custom([("H", 1.0), ("hydrogen", 1.0), ("8", 1.0)], 1000.0)
            .resolve(&db)
            .unwrap();
        assert_eq!(material.composition().len(), 2);
        assert_relative_eq!(material.composition()[0].1, 2.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_water_electron_density() {
        let db = MaterialDb::new();
        let water = MaterialSpec::named("water").resolve(&db).unwrap();
        // 10 electrons per molecule, 998 kg/m³.
        assert_relative_eq!(water.electron_density(&db).unwrap(), 3.34e29, max_relative = 1e-2);
    }

    #[test]
    fn test_named_lookup_is_case_insensitive() {
        let db = MaterialDb::new();
        assert_relative_eq!(db.mass_density("Protein").unwrap(), 1350.0);
        assert!(matches!(
            db.mass_density("unobtainium"),
            Err(DiffractError::UnknownMaterial(_))
        ));
        assert_eq!(db.material_types().len(), 12);
    }
}
