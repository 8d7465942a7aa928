use std::path::Path;

use anyhow::{Context, Result};
use diffract::ParticleResult;

/// Writes the intensity as `ny` rows of `nx` photon counts.
pub fn write_intensity(path: &Path, result: &ParticleResult) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for row in result.intensity().rows() {
        writer.write_record(row.iter().map(|v| format!("{v:.6e}")))?;
    }
    writer.flush()?;
    Ok(())
}

/// Lowercase letters, digits, `-` and `_`; anything else becomes `_`.
pub fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use diffract::{AnalyticSpheroid, Detector, PropagationOptions, Source, propagate};

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("Spheroid A/1"), "spheroid_a_1");
    }

    #[test]
    fn test_write_intensity_shape() {
        let source = Source::new(1e-10, 1e-3, 1e-6).unwrap();
        let detector = Detector::new(0.5, 750e-6, 5, 3).unwrap();
        let model = AnalyticSpheroid::new(1e-9, 2e-9, "water").unwrap();
        let result = propagate(&source, &detector, &model, &PropagationOptions::default()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pattern.csv");
        write_intensity(&path, &result).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.split(',').count() == 5));
    }
}
