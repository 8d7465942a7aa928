//! Volumetric map archives: named 3D datasets in one postcard file.

use std::path::Path;

use diffract_data::{MapArchive, MapDataset};

use crate::db::unpack;
use crate::error::{DiffractError, Result};

/// Decodes an archive from plain or zstd-framed postcard bytes.
pub fn decode_archive(bytes: &[u8]) -> Result<MapArchive> {
    let raw = unpack(bytes)?;
    postcard::from_bytes(&raw).map_err(|e| DiffractError::Data(format!("map archive: {e}")))
}

pub fn read_archive(path: impl AsRef<Path>) -> Result<MapArchive> {
    let path = path.as_ref();
    let archive = decode_archive(&std::fs::read(path)?)?;
    log::debug!(
        "read {} map dataset(s) from {}",
        archive.datasets.len(),
        path.display()
    );
    Ok(archive)
}

/// Writes plain postcard.
pub fn write_archive(path: impl AsRef<Path>, archive: &MapArchive) -> Result<()> {
    let bytes = postcard::to_allocvec(archive)
        .map_err(|e| DiffractError::Data(format!("map archive: {e}")))?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Looks up a dataset by name.
pub fn dataset<'a>(archive: &'a MapArchive, name: &str) -> Result<&'a MapDataset> {
    archive
        .datasets
        .iter()
        .find(|d| d.name == name)
        .ok_or_else(|| DiffractError::Data(format!("no dataset named '{name}' in map archive")))
}
