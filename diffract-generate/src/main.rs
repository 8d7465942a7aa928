mod parsers;

use std::io::Write;
use std::path::{Path, PathBuf};

use diffract_data::ScatteringDatabase;

/// Usage: `diffract-generate [HENKE_DIR] [ELEMENT_LIST] [OUTPUT]`.
fn main() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .to_path_buf();
    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    let henke_dir = args
        .next()
        .unwrap_or_else(|| root.join("data_sources").join("henke"));
    let element_list = args
        .next()
        .unwrap_or_else(|| root.join("data_sources").join("elements.txt"));
    let out_path = args
        .next()
        .unwrap_or_else(|| root.join("data").join("scattering.bin.zst"));

    if !henke_dir.is_dir() {
        eprintln!("Error: Henke table directory not found at {:?}", henke_dir);
        eprintln!("Download the .nff files from https://henke.lbl.gov/optical_constants/asf.html");
        std::process::exit(1);
    }

    println!("Parsing tables from {:?}...", henke_dir);

    let elements = parsers::parse_elements(&element_list);
    println!("  Elements: {} entries", elements.len());

    let scattering_factors = parsers::parse_henke_dir(&henke_dir, &elements);
    println!(
        "  Scattering factors: {} elements, {} points",
        scattering_factors.len(),
        scattering_factors
            .iter()
            .map(|r| r.energy.len())
            .sum::<usize>()
    );

    let db = ScatteringDatabase {
        version: format!("henke-{}", scattering_factors.len()),
        elements,
        scattering_factors,
    };

    println!("\nSerializing with postcard...");
    let serialized = postcard::to_allocvec(&db).expect("postcard serialization failed");
    println!("  Serialized size: {} bytes", serialized.len());

    println!("Compressing with zstd (level 19)...");
    let compressed = zstd::encode_all(&serialized[..], 19).expect("zstd compression failed");
    println!(
        "  Compressed size: {} bytes ({:.1}x)",
        compressed.len(),
        serialized.len() as f64 / compressed.len() as f64
    );

    std::fs::create_dir_all(out_path.parent().unwrap()).unwrap();
    let mut f = std::fs::File::create(&out_path).expect("failed to create output file");
    f.write_all(&compressed)
        .expect("failed to write compressed data");

    println!("\nWrote {:?}", out_path);

    println!("Verifying round-trip deserialization...");
    let decompressed = zstd::decode_all(&compressed[..]).expect("zstd decompression failed");
    let db2: ScatteringDatabase =
        postcard::from_bytes(&decompressed).expect("postcard deserialization failed");
    assert_eq!(db2.elements.len(), db.elements.len());
    assert_eq!(db2.scattering_factors.len(), db.scattering_factors.len());
    println!("  Round-trip OK!");
}
