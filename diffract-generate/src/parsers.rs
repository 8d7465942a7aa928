use std::path::Path;

use diffract_data::{ElementRecord, ScatteringFactorRecord};

/// Henke tables mark energies without a defined f1 with this value.
const UNDEFINED_F1: f64 = -9999.0;

/// Reads `Z symbol name atomic_mass` lines.
pub fn parse_elements(path: &Path) -> Vec<ElementRecord> {
    let content = std::fs::read_to_string(path).expect("failed to read element list");
    parse_elements_str(&content)
}

fn parse_elements_str(content: &str) -> Vec<ElementRecord> {
    let mut records = Vec::new();
    for line in content.lines() {
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() >= 4 {
            records.push(ElementRecord {
                atomic_number: parts[0].parse().unwrap(),
                symbol: parts[1].to_string(),
                name: parts[2].to_string(),
                atomic_mass: parts[3].parse().unwrap(),
            });
        }
    }
    records.sort_by_key(|r| r.atomic_number);
    records
}

/// Reads one `<symbol>.nff` table: a header line, then `E f1 f2` rows.
pub fn parse_nff(path: &Path, symbol: &str) -> ScatteringFactorRecord {
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));
    parse_nff_str(&content, symbol)
}

fn parse_nff_str(content: &str, symbol: &str) -> ScatteringFactorRecord {
    let mut energy = Vec::new();
    let mut f1 = Vec::new();
    let mut f2 = Vec::new();
    for line in content.lines() {
        let parts: Vec<f64> = line
            .split_whitespace()
            .filter_map(|w| w.parse().ok())
            .collect();
        if parts.len() < 3 || parts[1] <= UNDEFINED_F1 {
            continue;
        }
        // Some tables repeat an energy at absorption edges; keep the first.
        if energy.last().is_some_and(|&last| parts[0] <= last) {
            continue;
        }
        energy.push(parts[0]);
        f1.push(parts[1]);
        f2.push(parts[2]);
    }
    ScatteringFactorRecord {
        element: symbol.to_string(),
        energy,
        f1,
        f2,
    }
}

/// Tables for every listed element that has a `<symbol>.nff` file in `dir`.
pub fn parse_henke_dir(dir: &Path, elements: &[ElementRecord]) -> Vec<ScatteringFactorRecord> {
    elements
        .iter()
        .filter_map(|el| {
            let path = dir.join(format!("{}.nff", el.symbol.to_lowercase()));
            path.exists().then(|| parse_nff(&path, &el.symbol))
        })
        .filter(|record| record.energy.len() >= 2)
        .collect()
}
