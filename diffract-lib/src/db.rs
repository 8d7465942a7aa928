use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use diffract_data::{ElementRecord, ScatteringDatabase, ScatteringFactorRecord};

use crate::elements_db::{ELEMENTS, LEGACY_SYMBOLS};
use crate::error::{DiffractError, Result};
use crate::henke_db::{HENKE_ENERGY_EV, HENKE_FACTORS};

const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

struct Tables {
    data: ScatteringDatabase,
    symbol_to_z: HashMap<String, u16>,
    name_to_z: HashMap<String, u16>,
    factors_by_z: HashMap<u16, usize>,
}

impl Tables {
    fn index(data: ScatteringDatabase) -> Result<Self> {
        let mut symbol_to_z = HashMap::new();
        let mut name_to_z = HashMap::new();
        for elem in &data.elements {
            symbol_to_z.insert(elem.symbol.clone(), elem.atomic_number);
            name_to_z.insert(elem.name.to_lowercase(), elem.atomic_number);
        }

        let mut factors_by_z = HashMap::new();
        for (idx, record) in data.scattering_factors.iter().enumerate() {
            let z = *symbol_to_z.get(&record.element).ok_or_else(|| {
                DiffractError::Data(format!(
                    "scattering factors for unlisted element '{}'",
                    record.element
                ))
            })?;
            check_table(record)?;
            factors_by_z.insert(z, idx);
        }

        Ok(Tables {
            data,
            symbol_to_z,
            name_to_z,
            factors_by_z,
        })
    }
}

fn check_table(record: &ScatteringFactorRecord) -> Result<()> {
    let n = record.energy.len();
    if n == 0 || record.f1.len() != n || record.f2.len() != n {
        return Err(DiffractError::Data(format!(
            "{}: energy/f1/f2 columns must be non-empty and of equal length",
            record.element
        )));
    }
    if record.energy.windows(2).any(|w| w[1] <= w[0]) {
        return Err(DiffractError::Data(format!(
            "{}: energies must be strictly ascending",
            record.element
        )));
    }
    Ok(())
}

fn embedded_database() -> ScatteringDatabase {
    let elements = ELEMENTS
        .iter()
        .map(|&(z, symbol, name, mass)| ElementRecord {
            atomic_number: z,
            symbol: symbol.to_string(),
            name: name.to_string(),
            atomic_mass: mass,
        })
        .collect();
    let scattering_factors = HENKE_FACTORS
        .iter()
        .map(|(symbol, f1, f2)| ScatteringFactorRecord {
            element: symbol.to_string(),
            energy: HENKE_ENERGY_EV.to_vec(),
            f1: f1.to_vec(),
            f2: f2.to_vec(),
        })
        .collect();
    ScatteringDatabase {
        version: "embedded-henke-subset".to_string(),
        elements,
        scattering_factors,
    }
}

static EMBEDDED: OnceLock<Arc<Tables>> = OnceLock::new();

fn embedded() -> Arc<Tables> {
    EMBEDDED
        .get_or_init(|| {
            Arc::new(Tables::index(embedded_database()).expect("embedded tables are consistent"))
        })
        .clone()
}

/// Strips a zstd frame if present, otherwise borrows the input.
pub(crate) fn unpack(bytes: &[u8]) -> Result<Cow<'_, [u8]>> {
    if !bytes.starts_with(&ZSTD_MAGIC) {
        return Ok(Cow::Borrowed(bytes));
    }
    let mut decoder = ruzstd::decoding::StreamingDecoder::new(bytes)
        .map_err(|e| DiffractError::Data(format!("zstd frame: {e:?}")))?;
    let mut decompressed = Vec::new();
    std::io::Read::read_to_end(&mut decoder, &mut decompressed)?;
    Ok(Cow::Owned(decompressed))
}

/// Element, scattering-factor and material lookups.
///
/// Cheap to clone. `MaterialDb::new()` shares one lazily built registry
/// per process; databases loaded from disk are independent.
#[derive(Clone)]
pub struct MaterialDb {
    tables: Arc<Tables>,
}

impl MaterialDb {
    pub fn new() -> Self {
        MaterialDb { tables: embedded() }
    }

    /// Builds a database from in-memory tables.
    pub fn from_database(data: ScatteringDatabase) -> Result<Self> {
        Ok(MaterialDb {
            tables: Arc::new(Tables::index(data)?),
        })
    }

    /// Loads a postcard-encoded database, optionally zstd compressed.
    pub fn from_compressed(bytes: &[u8]) -> Result<Self> {
        let raw = unpack(bytes)?;
        let data: ScatteringDatabase = postcard::from_bytes(&raw)
            .map_err(|e| DiffractError::Data(format!("scattering database: {e}")))?;
        log::debug!(
            "loaded scattering database '{}' ({} elements, {} tables)",
            data.version,
            data.elements.len(),
            data.scattering_factors.len()
        );
        Self::from_database(data)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_compressed(&bytes)
    }

    /// Access the raw tables.
    pub fn raw(&self) -> &ScatteringDatabase {
        &self.tables.data
    }

    pub fn version(&self) -> &str {
        &self.tables.data.version
    }

    /// Resolve an element identifier (symbol, name, or atomic number) to Z.
    pub fn resolve_element(&self, element: &str) -> Result<u16> {
        let element = element.trim();
        if let Ok(z) = element.parse::<u16>() {
            if self.tables.data.elements.iter().any(|e| e.atomic_number == z) {
                return Ok(z);
            }
        }
        if let Some(&z) = self.tables.symbol_to_z.get(element) {
            return Ok(z);
        }
        if let Some(&z) = self.tables.name_to_z.get(&element.to_lowercase()) {
            return Ok(z);
        }
        if let Some(&(_, z)) = LEGACY_SYMBOLS.iter().find(|(s, _)| *s == element) {
            if self.tables.data.elements.iter().any(|e| e.atomic_number == z) {
                return Ok(z);
            }
        }
        Err(DiffractError::UnknownElement(element.to_string()))
    }

    pub(crate) fn element_by_z(&self, z: u16) -> Result<&ElementRecord> {
        self.tables
            .data
            .elements
            .iter()
            .find(|e| e.atomic_number == z)
            .ok_or_else(|| DiffractError::UnknownElement(format!("Z={z}")))
    }

    fn element_record(&self, element: &str) -> Result<&ElementRecord> {
        self.element_by_z(self.resolve_element(element)?)
    }

    pub fn atomic_number(&self, element: &str) -> Result<u16> {
        self.resolve_element(element)
    }

    pub fn symbol(&self, element: &str) -> Result<&str> {
        Ok(&self.element_record(element)?.symbol)
    }

    pub fn element_name(&self, element: &str) -> Result<&str> {
        Ok(&self.element_record(element)?.name)
    }

    /// Standard atomic weight in u.
    pub fn atomic_mass(&self, element: &str) -> Result<f64> {
        Ok(self.element_record(element)?.atomic_mass)
    }

    pub(crate) fn factor_record(&self, z: u16) -> Option<&ScatteringFactorRecord> {
        self.tables
            .factors_by_z
            .get(&z)
            .map(|&idx| &self.tables.data.scattering_factors[idx])
    }
}

impl Default for MaterialDb {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MaterialDb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaterialDb")
            .field("version", &self.version())
            .field("elements", &self.tables.data.elements.len())
            .field("tables", &self.tables.data.scattering_factors.len())
            .finish()
    }
}
