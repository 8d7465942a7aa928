#![no_std]

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// Element and scattering-factor tables, as stored in a compressed blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScatteringDatabase {
    pub version: String,
    pub elements: Vec<ElementRecord>,
    pub scattering_factors: Vec<ScatteringFactorRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementRecord {
    pub atomic_number: u16,
    pub symbol: String,
    pub name: String,
    /// Standard atomic weight in unified atomic mass units.
    pub atomic_mass: f64,
}

/// Tabulated anomalous scattering factors f1, f2 (electrons/atom) of one
/// element over photon energy (eV, ascending).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScatteringFactorRecord {
    pub element: String,
    pub energy: Vec<f64>,
    pub f1: Vec<f64>,
    pub f2: Vec<f64>,
}

/// A file of named volumetric datasets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapArchive {
    pub datasets: Vec<MapDataset>,
}

/// One 3D sample array, stored flat in `[z][y][x]` order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapDataset {
    pub name: String,
    /// Extent along (z, y, x).
    pub shape: [u32; 3],
    /// Sample spacing along (z, y, x) in meters.
    pub spacing: [f64; 3],
    pub data: Vec<f32>,
}

impl MapDataset {
    pub fn len(&self) -> usize {
        self.shape.iter().map(|&n| n as usize).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
