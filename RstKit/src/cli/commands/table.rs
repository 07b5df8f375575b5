//! CLI commands for inspecting string table files

use std::collections::HashSet;
use std::path::Path;

use crate::converter::rst_json::parse_key;
use crate::formats::rst::{ReadOptions, RstReader, RstVersion};

/// Print header and content statistics
pub fn info(path: &Path, v5_variant: RstVersion) -> anyhow::Result<()> {
    let data = std::fs::read(path)?;
    let options = ReadOptions::with_v5_variant(v5_variant);
    let reader = RstReader::with_options(&data, &options)?;
    let properties = reader.properties();
    let metadata = &properties.metadata;
    let algorithm = metadata.hash_algorithm();

    let unique_hashes: HashSet<u64> = reader.hashes().collect();
    let unique_offsets: HashSet<u64> = reader
        .raw_entries()
        .map(|raw| algorithm.unpack(raw).1)
        .collect();

    println!("File: {}", path.display());
    println!(
        "Version: {} (byte {})",
        metadata.version(),
        metadata.version().byte()
    );
    println!("Hash: {algorithm}");
    if let Some(config) = metadata.font_config() {
        println!("Font config: {config}");
    }
    println!("Entries: {}", reader.len());
    println!("Unique keys: {}", unique_hashes.len());
    println!("Unique strings: {}", unique_offsets.len());
    println!("Index offset: {}", properties.hashes_offset);
    println!("Content offset: {}", properties.content_offset);
    println!(
        "Content size: {} bytes",
        data.len().saturating_sub(properties.content_offset)
    );

    Ok(())
}

/// Print the text of one entry
pub fn get(path: &Path, key: &str, v5_variant: RstVersion) -> anyhow::Result<()> {
    let data = std::fs::read(path)?;
    let options = ReadOptions::with_v5_variant(v5_variant);
    let reader = RstReader::with_options(&data, &options)?;
    let table = reader.read_table()?;
    let hash = parse_key(key, table.hash_algorithm())?;

    match table.get(hash) {
        Some(text) => {
            println!("{text}");
            Ok(())
        }
        None => anyhow::bail!("Entry not found: {key} ({hash:x})"),
    }
}
