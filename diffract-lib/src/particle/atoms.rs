use std::collections::BTreeMap;
use std::path::Path;

use nalgebra::Vector3;
use num_complex::Complex64;
use rayon::prelude::*;

use super::{EvaluationContext, ScatteringModel};
use crate::db::MaterialDb;
use crate::error::{DiffractError, Result};
use crate::form_factor::AtomicFormFactor;
use crate::rotation::Rotation;

/// Explicit atoms: positions in m paired with atomic numbers.
#[derive(Debug, Clone)]
pub struct AtomicEnsemble {
    positions: Vec<Vector3<f64>>,
    atomic_numbers: Vec<u16>,
    rotation: Rotation,
    position: Vector3<f64>,
}

impl AtomicEnsemble {
    pub fn new(positions: Vec<Vector3<f64>>, atomic_numbers: Vec<u16>) -> Result<Self> {
        if positions.len() != atomic_numbers.len() {
            return Err(DiffractError::ShapeMismatch(format!(
                "{} atomic positions but {} atomic numbers",
                positions.len(),
                atomic_numbers.len()
            )));
        }
        if let Some(i) = atomic_numbers.iter().position(|&z| z == 0) {
            return Err(DiffractError::InvalidComposition(format!(
                "atom {i} has atomic number 0"
            )));
        }
        if positions.iter().any(|p| p.iter().any(|c| !c.is_finite())) {
            return Err(DiffractError::InvalidParameter {
                name: "positions",
                reason: "atomic positions must be finite".to_string(),
            });
        }
        Ok(AtomicEnsemble {
            positions,
            atomic_numbers,
            rotation: Rotation::identity(),
            position: Vector3::zeros(),
        })
    }

    /// Reads ATOM and HETATM records of a PDB file. Coordinates are in Å.
    pub fn from_pdb_str(text: &str, db: &MaterialDb) -> Result<Self> {
        let mut positions = Vec::new();
        let mut atomic_numbers = Vec::new();
        for (lineno, line) in text.lines().enumerate() {
            if !(line.starts_with("ATOM") || line.starts_with("HETATM")) {
                continue;
            }
            let coord = |range: std::ops::Range<usize>| -> Result<f64> {
                line.get(range)
                    .and_then(|s| s.trim().parse::<f64>().ok())
                    .ok_or_else(|| {
                        DiffractError::Data(format!("PDB line {}: bad coordinate", lineno + 1))
                    })
            };
            let (x, y, z) = (coord(30..38)?, coord(38..46)?, coord(46..54)?);
            let symbol = pdb_element(line).ok_or_else(|| {
                DiffractError::Data(format!("PDB line {}: no element symbol", lineno + 1))
            })?;
            atomic_numbers.push(db.atomic_number(&symbol)?);
            positions.push(Vector3::new(x, y, z) * 1e-10);
        }
        if positions.is_empty() {
            return Err(DiffractError::Data("PDB text has no atoms".to_string()));
        }
        log::debug!("read {} atoms from PDB", positions.len());
        Self::new(positions, atomic_numbers)
    }

    pub fn from_pdb_path(path: impl AsRef<Path>, db: &MaterialDb) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_pdb_str(&text, db)
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_position(mut self, position: Vector3<f64>) -> Self {
        self.position = position;
        self
    }

    pub fn rotation(&self) -> &Rotation {
        &self.rotation
    }

    /// Stored positions in the particle frame.
    pub fn positions(&self) -> &[Vector3<f64>] {
        &self.positions
    }

    pub fn atomic_numbers(&self) -> &[u16] {
        &self.atomic_numbers
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Element symbol from columns 77-78, else from the atom name.
fn pdb_element(line: &str) -> Option<String> {
    let raw = line
        .get(76..78)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| {
            line.get(12..16)?
                .chars()
                .find(|c| c.is_ascii_alphabetic())
                .map(String::from)
        })?;
    let mut chars = raw.chars();
    let first = chars.next()?.to_ascii_uppercase();
    Some(std::iter::once(first).chain(chars.map(|c| c.to_ascii_lowercase())).collect())
}

impl ScatteringModel for AtomicEnsemble {
    fn kind(&self) -> &'static str {
        "atoms"
    }

    fn position(&self) -> Vector3<f64> {
        self.position
    }

    fn amplitude_at(
        &self,
        q: &[Vector3<f64>],
        ctx: &EvaluationContext<'_>,
    ) -> Result<Vec<Complex64>> {
        let energy = ctx.source.photon_energy_ev();
        let mut species: BTreeMap<u16, usize> = BTreeMap::new();
        let mut factors = Vec::new();
        for &z in &self.atomic_numbers {
            if !species.contains_key(&z) {
                species.insert(z, factors.len());
                factors.push(AtomicFormFactor::new(ctx.db, z, energy)?);
            }
        }
        let kinds: Vec<usize> = self.atomic_numbers.iter().map(|z| species[z]).collect();
        let rotated = self.rotation.rotate(&self.positions);

        Ok(q.par_iter()
            .map_init(
                || vec![Complex64::new(0.0, 0.0); factors.len()],
                |f, qv| {
                    let q_norm = qv.norm();
                    for (slot, factor) in f.iter_mut().zip(&factors) {
                        *slot = factor.at(q_norm);
                    }
                    rotated
                        .iter()
                        .zip(&kinds)
                        .map(|(r, &kind)| f[kind] * Complex64::cis(-qv.dot(r)))
                        .sum::<Complex64>()
                },
            )
            .collect())
    }
}
